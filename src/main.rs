// Entry point and high-level CLI flow.
//
// The Rust binary mirrors the original single-screen dashboard:
// - Option [1] loads a spreadsheet (xlsx/xlsm/xls/ods/csv) and caches it.
// - Option [2] maps columns to the semantic fields, computes the derived
//   comparison metrics and writes three report CSVs plus a JSON summary.
// - After generating reports, the user can go back to the menu or exit.
mod loader;
mod normalize;
mod output;
mod reports;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{Dataset, DisplayParams, FieldMapping};

// Simple in-memory app state so the spreadsheet is parsed once but reports
// can be regenerated with different mappings in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { sheet: None }));

struct AppState {
    sheet: Option<(String, Dataset)>,
}

/// Print a prompt and read a single trimmed line of input.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the spreadsheet and pick a sheet.
///
/// On success the chosen sheet is stored in `APP_STATE` together with its
/// name, and a short summary of what was loaded is printed.
fn handle_load() {
    let path = {
        let input = read_line("Spreadsheet path (.xlsx/.csv) [comparables.xlsx]: ");
        if input.is_empty() {
            "comparables.xlsx".to_string()
        } else {
            input
        }
    };
    match loader::load_workbook(&path) {
        Ok((sheets, report)) => {
            println!(
                "Loaded {} sheet(s), {} data rows in total.",
                util::format_int(report.sheets as i64),
                util::format_int(report.total_rows as i64)
            );
            let (name, dataset) = pick_sheet(sheets);
            if dataset.is_empty() {
                println!("Warning: sheet '{}' has no data rows.\n", name);
                return;
            }
            println!(
                "Using sheet '{}' ({} rows, {} columns).\n",
                name,
                util::format_int(dataset.rows.len() as i64),
                util::format_int(dataset.columns.len() as i64)
            );
            let mut state = APP_STATE.lock().unwrap();
            state.sheet = Some((name, dataset));
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Let the user pick a sheet when the workbook has more than one.
fn pick_sheet(sheets: Vec<(String, Dataset)>) -> (String, Dataset) {
    if sheets.len() == 1 {
        return sheets.into_iter().next().unwrap();
    }
    println!("Sheets:");
    for (i, (name, dataset)) in sheets.iter().enumerate() {
        println!("[{}] {} ({} rows)", i + 1, name, dataset.rows.len());
    }
    let idx = loop {
        match read_choice().parse::<usize>() {
            Ok(n) if (1..=sheets.len()).contains(&n) => break n - 1,
            _ => println!("Invalid choice. Please enter 1-{}.", sheets.len()),
        }
    };
    sheets.into_iter().nth(idx).unwrap()
}

/// Prompt a column choice by index, with a positional default.
fn prompt_column(cols: &[String], label: &str, default_idx: usize) -> String {
    loop {
        let input = read_line(&format!("{} [{}]: ", label, default_idx + 1));
        if input.is_empty() {
            return cols[default_idx].clone();
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=cols.len()).contains(&n) => return cols[n - 1].clone(),
            _ => println!("Invalid choice. Please enter 1-{}.", cols.len()),
        }
    }
}

/// Interactive column mapping: any column can feed any semantic field.
fn prompt_mapping(cols: &[String]) -> FieldMapping {
    println!("Columns:");
    for (i, c) in cols.iter().enumerate() {
        println!("[{}] {}", i + 1, c);
    }
    println!();
    // Positional defaults, clamped for narrow sheets.
    let d = |i: usize| i.min(cols.len() - 1);
    FieldMapping {
        store_id: prompt_column(cols, "Código tienda (COD_TDA)", d(0)),
        store_name: prompt_column(cols, "Nombre tienda (NOM_TDA)", d(1)),
        weeks: [
            prompt_column(cols, "Semana -3", d(2)),
            prompt_column(cols, "Semana -2", d(3)),
            prompt_column(cols, "Semana -1", d(4)),
            prompt_column(cols, "Semana 0", d(5)),
        ],
        period1: prompt_column(cols, "Periodo 1 (real)", d(6)),
        period2: prompt_column(cols, "Periodo 2 (comparativo)", d(7)),
        target: prompt_column(cols, "Objetivo del mes", d(8)),
    }
}

/// Display labels: the analyzed week number and the month name.
fn prompt_params() -> DisplayParams {
    let week_num = loop {
        let input = read_line("Semana a analizar [44]: ");
        if input.is_empty() {
            break 44;
        }
        match input.parse::<u32>() {
            Ok(n) if (1..=53).contains(&n) => break n,
            _ => println!("Invalid choice. Please enter a week number 1-53."),
        }
    };
    let month_label = {
        let input = read_line("Mes (texto) [OCTUBRE]: ");
        if input.is_empty() {
            "OCTUBRE".to_string()
        } else {
            input.to_uppercase()
        }
    };
    DisplayParams { week_num, month_label }
}

/// Handle option [2]: map columns, compute and export the three reports.
///
/// This function is intentionally side-effectful:
/// - writes three CSV files,
/// - writes a JSON summary,
/// - and prints Markdown previews of each report to the console.
fn handle_generate_reports() {
    let sheet = {
        let state = APP_STATE.lock().unwrap();
        state.sheet.clone()
    };
    let Some((name, dataset)) = sheet else {
        println!("Error: No data loaded. Please load a spreadsheet first (option 1).\n");
        return;
    };
    if dataset.is_empty() {
        println!("Warning: sheet '{}' has no data rows.\n", name);
        return;
    }

    let mapping = prompt_mapping(&dataset.columns);
    let params = prompt_params();

    println!("\nGenerating reports from sheet '{}'...\n", name);
    let reports = match reports::compute(&dataset, &mapping, &params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to compute reports: {}\n", e);
            return;
        }
    };

    let file1 = "comparables_semanas.csv";
    if let Err(e) = output::write_csv(file1, &reports.weekly) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: {}", reports.weekly.title);
    println!("(Semanas {}-{})\n", params.week_num as i64 - 3, params.week_num);
    output::preview_table(&reports.weekly, 12);
    println!("(Full table exported to {})\n", file1);

    let file2 = "comparable_mes.csv";
    if let Err(e) = output::write_csv(file2, &reports.monthly) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: {}", reports.monthly.title);
    println!("(PERIODO 1 vs PERIODO 2)\n");
    output::preview_table(&reports.monthly, 12);
    println!("(Full table exported to {})\n", file2);

    let file3 = "evolucion_objetivo.csv";
    if let Err(e) = output::write_csv(file3, &reports.target) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: {}", reports.target.title);
    println!("(Objetivo de {})\n", params.month_label);
    output::preview_table(&reports.target, 12);
    println!("(Full table exported to {})\n", file3);

    if let Err(e) = output::write_json("summary.json", &reports.summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{} tiendas, PERIODO 1 total {}, objetivo conseguido {}\n",
        util::format_int(reports.summary.stores as i64),
        util::fmt_money(Some(reports.summary.period1_total)),
        util::fmt_pct(reports.summary.pct_of_target_total)
    );
}

fn main() {
    loop {
        println!("Panel de comparables y objetivo");
        println!("[1] Load spreadsheet");
        println!("[2] Map columns & generate reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
