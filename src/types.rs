use crate::util::{fmt_money, fmt_pct};
use serde::Serialize;

/// A raw spreadsheet cell, before any numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Best-effort textual rendering, used for the store id/name columns.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            // Excel hands over integer store codes as floats.
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// One loaded sheet: ordered column headers plus row-major cells.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Extract one column by header name; short rows are padded with
    /// `Cell::Empty` so every column has one value per data row.
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(idx).cloned().unwrap_or(Cell::Empty))
                .collect(),
        )
    }
}

/// Which spreadsheet column feeds each semantic field.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub store_id: String,
    pub store_name: String,
    /// Oldest week first: [w-3, w-2, w-1, w0].
    pub weeks: [String; 4],
    pub period1: String,
    pub period2: String,
    pub target: String,
}

/// Free-form labels for the rendered tables; never used in computation.
#[derive(Debug, Clone)]
pub struct DisplayParams {
    pub week_num: u32,
    pub month_label: String,
}

/// One store with its normalized inputs and derived comparison metrics.
/// `None` means undefined and flows through every formula as undefined.
#[derive(Debug, Clone)]
pub struct StoreMetrics {
    pub store_id: String,
    pub store_name: String,
    pub weeks: [Option<f64>; 4],
    pub period1: Option<f64>,
    pub period2: Option<f64>,
    pub target: Option<f64>,
    pub difference: Option<f64>,
    pub pct_difference: Option<f64>,
    pub target_gap: Option<f64>,
    pub pct_of_target: Option<f64>,
}

/// A single rendered value. The raw number is kept alongside its kind so
/// CSV exports stay re-parseable while previews show the formatted form.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Ratio(Option<f64>),
    Money(Option<f64>),
}

impl Value {
    /// Human-facing form used in the console previews.
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Ratio(v) => fmt_pct(*v),
            Value::Money(v) => fmt_money(*v),
        }
    }

    /// Raw form used in the CSV exports; undefined is an empty field.
    pub fn raw(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Ratio(v) | Value::Money(v) => match v {
                Some(x) => x.to_string(),
                None => String::new(),
            },
        }
    }
}

/// One of the three report tables, ready for preview and export.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: String,
    pub stores: usize,
    pub period1_total: f64,
    pub period2_total: f64,
    pub target_total: f64,
    pub difference_total: f64,
    pub pct_difference_total: Option<f64>,
    pub pct_of_target_total: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_renders_integer_codes_without_decimals() {
        assert_eq!(Cell::Number(101.0).as_text(), "101");
        assert_eq!(Cell::Number(0.5).as_text(), "0.5");
        assert_eq!(Cell::Text("T1".into()).as_text(), "T1");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn column_pads_short_rows() {
        let ds = Dataset {
            columns: vec!["A".into(), "B".into()],
            rows: vec![
                vec![Cell::Number(1.0), Cell::Number(2.0)],
                vec![Cell::Number(3.0)],
            ],
        };
        assert_eq!(
            ds.column("B"),
            Some(vec![Cell::Number(2.0), Cell::Empty])
        );
        assert_eq!(ds.column("C"), None);
    }

    #[test]
    fn value_raw_round_trips_through_display_repr() {
        let v = Value::Money(Some(1234.56));
        assert_eq!(v.raw().parse::<f64>().unwrap(), 1234.56);
        assert_eq!(Value::Ratio(None).raw(), "");
    }
}
