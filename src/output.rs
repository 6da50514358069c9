use crate::types::ReportTable;
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use tabled::{builder::Builder, settings::Style};

/// Write one report as CSV. The file starts with a UTF-8 BOM so Excel
/// picks up the accented headers, and numeric cells are written raw (not
/// display-formatted) so the export re-parses to the same floats.
pub fn write_csv(path: &str, table: &ReportTable) -> Result<(), Box<dyn Error>> {
    let mut file = File::create(path)?;
    file.write_all(b"\xEF\xBB\xBF")?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|v| v.raw()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print a Markdown preview of a report table.
///
/// Long tables are truncated to `max_rows`, but the last row (the TOTAL
/// row) is always shown.
pub fn preview_table(table: &ReportTable, max_rows: usize) {
    if table.rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let truncated = table.rows.len() > max_rows && max_rows >= 2;
    let shown: Vec<&Vec<crate::types::Value>> = if truncated {
        let mut v: Vec<_> = table.rows.iter().take(max_rows - 1).collect();
        if let Some(last) = table.rows.last() {
            v.push(last);
        }
        v
    } else {
        table.rows.iter().collect()
    };

    let mut builder = Builder::default();
    builder.push_record(table.headers.clone());
    for row in shown {
        builder.push_record(row.iter().map(|v| v.display()));
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}", table_str);
    if truncated {
        println!(
            "(showing {} of {} rows; the CSV export has the full table)",
            max_rows,
            table.rows.len()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample_table() -> ReportTable {
        ReportTable {
            title: "COMPARABLE HISTÓRICO DEL MES".into(),
            headers: vec![
                "COD_TDA".into(),
                "NOM_TDA".into(),
                "PERIODO 1".into(),
                "% DIFERENCIA".into(),
            ],
            rows: vec![
                vec![
                    Value::Text("T1".into()),
                    Value::Text("Tienda Centro".into()),
                    Value::Money(Some(1000.25)),
                    Value::Ratio(Some(0.25)),
                ],
                vec![
                    Value::Text("T2".into()),
                    Value::Text("Tienda Ñora".into()),
                    Value::Money(Some(-512.5)),
                    Value::Ratio(None),
                ],
            ],
        }
    }

    #[test]
    fn csv_round_trips_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mes.csv");
        let table = sample_table();
        write_csv(path.to_str().unwrap(), &table).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> =
            rdr.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][2].parse::<f64>().unwrap(), 1000.25);
        assert_eq!(records[0][3].parse::<f64>().unwrap(), 0.25);
        assert_eq!(records[1][2].parse::<f64>().unwrap(), -512.5);
        // Undefined exports as an empty field, not zero.
        assert_eq!(&records[1][3], "");
    }

    #[test]
    fn csv_starts_with_utf8_bom_and_keeps_accents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mes.csv");
        write_csv(path.to_str().unwrap(), &sample_table()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("Tienda Ñora"));
    }
}
