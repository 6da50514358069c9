// Numeric normalization for the mapped columns.
//
// Weekly comparables arrive in whatever shape the spreadsheet author used
// (`-20,5%`, `-0.205`, plain numbers); this module turns each column into
// canonical fractional ratios. Monetary columns get a plain forgiving
// parse with no rescaling.
use crate::types::Cell;
use crate::util::{mean_defined, parse_number_safe};

/// Columns whose parsed mean exceeds this magnitude are assumed to be in
/// percentage points (12.3 meaning 12.3%) and get divided by 100.
pub const PCT_UNIT_THRESHOLD: f64 = 1.5;

fn coerce(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_number_safe(s),
        Cell::Bool(_) | Cell::Empty => None,
    }
}

/// Normalize a weekly-comparable column into fractional ratios.
///
/// Cells that fail to parse become `None` and keep their position in the
/// column. The percentage-point heuristic is a single column-level
/// decision: if the mean of the parsed values exceeds
/// [`PCT_UNIT_THRESHOLD`] in magnitude, every value in the column is
/// divided by 100. An empty or all-undefined column has no mean and is
/// returned unchanged.
pub fn normalize_ratio(cells: &[Cell]) -> Vec<Option<f64>> {
    let parsed: Vec<Option<f64>> = cells.iter().map(coerce).collect();
    match mean_defined(&parsed) {
        Some(mean) if mean.abs() > PCT_UNIT_THRESHOLD => parsed
            .into_iter()
            .map(|v| v.map(|x| x / 100.0))
            .collect(),
        _ => parsed,
    }
}

/// Normalize a monetary column. Plain per-cell parse, no rescaling.
pub fn normalize_amount(cells: &[Cell]) -> Vec<Option<f64>> {
    cells.iter().map(coerce).collect()
}
