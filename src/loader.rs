// Spreadsheet ingestion.
//
// Excel workbooks (xlsx/xlsm/xls/ods) are read with `calamine`; plain CSV
// files with the `csv` crate and presented as a single-sheet workbook.
// The loader only shapes raw cells; all numeric coercion happens later in
// `normalize`, so a messy file still loads.
use crate::types::{Cell, Dataset};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::error::Error;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub sheets: usize,
    pub total_rows: usize,
}

/// Load every sheet of the file at `path` into raw datasets.
///
/// The first row of each sheet is taken as the header row, with headers
/// trimmed. Failure to open or parse the file is the one terminal error
/// in the whole pipeline and is reported upward.
pub fn load_workbook(path: &str) -> Result<(Vec<(String, Dataset)>, LoadReport), Box<dyn Error>> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let sheets = if is_csv {
        load_csv(path)?
    } else {
        load_excel(path)?
    };
    if sheets.is_empty() {
        return Err(format!("'{}' contains no sheets with a header row", path).into());
    }
    let report = LoadReport {
        sheets: sheets.len(),
        total_rows: sheets.iter().map(|(_, d)| d.rows.len()).sum(),
    };
    Ok((sheets, report))
}

fn load_excel(path: &str) -> Result<Vec<(String, Dataset)>, Box<dyn Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::new();
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let mut rows_iter = range.rows();
        let Some(header) = rows_iter.next() else {
            continue;
        };
        let columns: Vec<String> = header
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect();
        let rows: Vec<Vec<Cell>> = rows_iter
            .map(|r| r.iter().map(convert_cell).collect())
            .collect();
        sheets.push((name, Dataset { columns, rows }));
    }
    Ok(sheets)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(t.to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates, durations and error cells degrade to text; the normalizer
        // will turn them into undefined if they are not numeric.
        other => Cell::Text(other.to_string()),
    }
}

fn load_csv(path: &str) -> Result<Vec<(String, Dataset)>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let t = field.trim();
                    if t.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(t.to_string())
                    }
                })
                .collect(),
        );
    }
    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string();
    Ok(vec![(name, Dataset { columns, rows })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_loads_as_single_sheet_with_trimmed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiendas.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "COD_TDA, NOM_TDA ,W0").unwrap();
        writeln!(f, "T1,Centro,10%").unwrap();
        writeln!(f, "T2,,").unwrap();
        drop(f);

        let (sheets, report) = load_workbook(path.to_str().unwrap()).unwrap();
        assert_eq!(report.sheets, 1);
        assert_eq!(report.total_rows, 2);
        let (name, ds) = &sheets[0];
        assert_eq!(name, "tiendas");
        assert_eq!(ds.columns, vec!["COD_TDA", "NOM_TDA", "W0"]);
        assert_eq!(ds.rows[0][2], Cell::Text("10%".into()));
        assert_eq!(ds.rows[1][1], Cell::Empty);
    }

    #[test]
    fn missing_file_is_a_terminal_error() {
        assert!(load_workbook("no_such_file.csv").is_err());
        assert!(load_workbook("no_such_file.xlsx").is_err());
    }
}
