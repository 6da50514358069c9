// Derived-metrics engine and report assembly.
//
// Everything here is a pure function of the loaded dataset, the column
// mapping and the display labels; regenerating with a different mapping
// never touches the raw data.
use crate::normalize::{normalize_amount, normalize_ratio};
use crate::types::{
    Cell, Dataset, DisplayParams, FieldMapping, ReportTable, StoreMetrics, SummaryStats, Value,
};
use crate::util::{mean_defined, sum_defined};
use chrono::Local;
use std::error::Error;

pub struct Reports {
    pub weekly: ReportTable,
    pub monthly: ReportTable,
    pub target: ReportTable,
    pub summary: SummaryStats,
}

/// Aggregate totals across all stores. Percent fields are recomputed from
/// the summed amounts: a ratio of sums, never an average of per-row
/// ratios, so large stores weigh in proportionally.
struct Totals {
    weeks: [Option<f64>; 4],
    period1: f64,
    period2: f64,
    target: f64,
    difference: f64,
    pct_difference: Option<f64>,
    target_gap: Option<f64>,
    pct_of_target: Option<f64>,
}

/// Compute the three report tables plus the JSON summary for one dataset.
///
/// Fails only on dataset-level problems (empty sheet, mapped column
/// missing); every cell-level issue degrades to an undefined value.
pub fn compute(
    dataset: &Dataset,
    mapping: &FieldMapping,
    params: &DisplayParams,
) -> Result<Reports, Box<dyn Error>> {
    if dataset.is_empty() {
        return Err("the selected sheet is empty".into());
    }
    let rows = derive_rows(dataset, mapping)?;
    let totals = aggregate(&rows);
    Ok(Reports {
        weekly: weekly_table(&rows, &totals, params),
        monthly: monthly_table(&rows, &totals),
        target: target_table(&rows, &totals, params),
        summary: summary_stats(&rows, &totals),
    })
}

fn column(dataset: &Dataset, name: &str) -> Result<Vec<Cell>, Box<dyn Error>> {
    dataset
        .column(name)
        .ok_or_else(|| format!("mapped column '{}' not found in the sheet", name).into())
}

fn sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    }
}

/// Division with an explicit zero-denominator guard.
fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Normalize the mapped columns and derive the per-store metrics.
pub fn derive_rows(
    dataset: &Dataset,
    mapping: &FieldMapping,
) -> Result<Vec<StoreMetrics>, Box<dyn Error>> {
    let ids = column(dataset, &mapping.store_id)?;
    let names = column(dataset, &mapping.store_name)?;
    let mut weeks: Vec<Vec<Option<f64>>> = Vec::with_capacity(4);
    for week_col in &mapping.weeks {
        weeks.push(normalize_ratio(&column(dataset, week_col)?));
    }
    let period1 = normalize_amount(&column(dataset, &mapping.period1)?);
    let period2 = normalize_amount(&column(dataset, &mapping.period2)?);
    let target = normalize_amount(&column(dataset, &mapping.target)?);

    let mut out = Vec::with_capacity(dataset.rows.len());
    for i in 0..dataset.rows.len() {
        let (p1, p2, obj) = (period1[i], period2[i], target[i]);
        let difference = sub(p1, p2);
        out.push(StoreMetrics {
            store_id: ids[i].as_text(),
            store_name: names[i].as_text(),
            weeks: [weeks[0][i], weeks[1][i], weeks[2][i], weeks[3][i]],
            period1: p1,
            period2: p2,
            target: obj,
            difference,
            pct_difference: ratio(difference, p2),
            target_gap: sub(obj, p1),
            pct_of_target: ratio(p1, obj),
        });
    }
    Ok(out)
}

fn aggregate(rows: &[StoreMetrics]) -> Totals {
    let weeks: [Option<f64>; 4] = std::array::from_fn(|w| {
        let col: Vec<Option<f64>> = rows.iter().map(|r| r.weeks[w]).collect();
        mean_defined(&col)
    });
    let period1 = sum_defined(rows.iter().map(|r| r.period1));
    let period2 = sum_defined(rows.iter().map(|r| r.period2));
    let target = sum_defined(rows.iter().map(|r| r.target));
    let difference = period1 - period2;
    Totals {
        weeks,
        period1,
        period2,
        target,
        difference,
        pct_difference: ratio(Some(difference), Some(period2)),
        target_gap: Some(target - period1),
        pct_of_target: ratio(Some(period1), Some(target)),
    }
}

const TOTAL_ID: &str = "TOTAL";
const TOTAL_NAME: &str = "Todas las tiendas";

fn weekly_table(rows: &[StoreMetrics], totals: &Totals, params: &DisplayParams) -> ReportTable {
    let mut headers = vec!["COD_TDA".to_string(), "NOM_TDA".to_string()];
    // Oldest week first, labeled with the actual week numbers.
    for offset in (0..4u32).rev() {
        headers.push(format!("{}", params.week_num as i64 - offset as i64));
    }
    let mut out: Vec<Vec<Value>> = rows
        .iter()
        .map(|r| {
            let mut row = vec![Value::Text(r.store_id.clone()), Value::Text(r.store_name.clone())];
            row.extend(r.weeks.iter().map(|w| Value::Ratio(*w)));
            row
        })
        .collect();
    let mut total = vec![
        Value::Text(TOTAL_ID.to_string()),
        Value::Text(TOTAL_NAME.to_string()),
    ];
    total.extend(totals.weeks.iter().map(|w| Value::Ratio(*w)));
    out.push(total);
    ReportTable {
        title: "COMPARABLE HISTÓRICO ÚLTIMAS SEMANAS".to_string(),
        headers,
        rows: out,
    }
}

fn monthly_table(rows: &[StoreMetrics], totals: &Totals) -> ReportTable {
    let headers = vec![
        "COD_TDA".to_string(),
        "NOM_TDA".to_string(),
        "PERIODO 1".to_string(),
        "PERIODO 2".to_string(),
        "DIFERENCIA".to_string(),
        "% DIFERENCIA".to_string(),
    ];
    let mut out: Vec<Vec<Value>> = rows
        .iter()
        .map(|r| {
            vec![
                Value::Text(r.store_id.clone()),
                Value::Text(r.store_name.clone()),
                Value::Money(r.period1),
                Value::Money(r.period2),
                Value::Money(r.difference),
                Value::Ratio(r.pct_difference),
            ]
        })
        .collect();
    out.push(vec![
        Value::Text(TOTAL_ID.to_string()),
        Value::Text(TOTAL_NAME.to_string()),
        Value::Money(Some(totals.period1)),
        Value::Money(Some(totals.period2)),
        Value::Money(Some(totals.difference)),
        Value::Ratio(totals.pct_difference),
    ]);
    ReportTable {
        title: "COMPARABLE HISTÓRICO DEL MES".to_string(),
        headers,
        rows: out,
    }
}

fn target_table(rows: &[StoreMetrics], totals: &Totals, params: &DisplayParams) -> ReportTable {
    let headers = vec![
        "COD_TDA".to_string(),
        "NOM_TDA".to_string(),
        format!("OBJETIVO DE {}", params.month_label),
        "DIFER. CON PERIODO 1".to_string(),
        "% OBJETIVO CONSEGUIDO".to_string(),
    ];
    let mut out: Vec<Vec<Value>> = rows
        .iter()
        .map(|r| {
            vec![
                Value::Text(r.store_id.clone()),
                Value::Text(r.store_name.clone()),
                Value::Money(r.target),
                Value::Money(r.target_gap),
                Value::Ratio(r.pct_of_target),
            ]
        })
        .collect();
    out.push(vec![
        Value::Text(TOTAL_ID.to_string()),
        Value::Text(TOTAL_NAME.to_string()),
        Value::Money(Some(totals.target)),
        Value::Money(totals.target_gap),
        Value::Ratio(totals.pct_of_target),
    ]);
    ReportTable {
        title: "EVOLUCIÓN OBJETIVO".to_string(),
        headers,
        rows: out,
    }
}

fn summary_stats(rows: &[StoreMetrics], totals: &Totals) -> SummaryStats {
    SummaryStats {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        stores: rows.len(),
        period1_total: totals.period1,
        period2_total: totals.period2,
        target_total: totals.target,
        difference_total: totals.difference,
        pct_difference_total: totals.pct_difference,
        pct_of_target_total: totals.pct_of_target,
    }
}
