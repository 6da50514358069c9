// Utility helpers for parsing and display formatting.
//
// This module centralizes all the "dirty" number handling so the rest of
// the code can assume clean `Option<f64>` values: `None` always means
// "undefined / not a number", never zero.
use num_format::{CustomFormat, Grouping, Locale, ToFormattedString};
use once_cell::sync::Lazy;

// Money amounts always group with `.`, even for four-digit values, which
// is why this is an explicit format instead of `Locale::es` (CLDR only
// groups Spanish numbers from five digits up).
static MONEY_FORMAT: Lazy<CustomFormat> = Lazy::new(|| {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(".")
        .build()
        .unwrap()
});

/// Parse a single cell's text into `f64` while being forgiving about the
/// formatting conventions that show up in real spreadsheets.
///
/// - Trims whitespace and a trailing percent sign.
/// - Rejects values that contain alphabetic characters.
/// - Accepts both separator conventions: `"12,3"`, `"1.234,56"` as well as
///   `"-0.205"`, `"1,234.56"` (see `canonicalize_separators`).
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_number_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    canonicalize_separators(s).parse::<f64>().ok()
}

/// Rewrite a numeric string so that `.` is the decimal separator and no
/// thousands separators remain.
///
/// The decimal separator is decided per value: when both `.` and `,`
/// appear, the one occurring last is the decimal point; a repeated
/// separator can only be a thousands marker.
fn canonicalize_separators(s: &str) -> String {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();
    if dots > 0 && commas > 0 {
        let last_dot = s.rfind('.').unwrap_or(0);
        let last_comma = s.rfind(',').unwrap_or(0);
        if last_comma > last_dot {
            s.replace('.', "").replace(',', ".")
        } else {
            s.replace(',', "")
        }
    } else if commas > 1 {
        s.replace(',', "")
    } else if commas == 1 {
        s.replace(',', ".")
    } else if dots > 1 {
        s.replace('.', "")
    } else {
        s.to_string()
    }
}

/// Arithmetic mean of the defined values; `None` if nothing is defined.
pub fn mean_defined(values: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values.iter().flatten() {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Sum of the defined values; an all-undefined column sums to zero, which
/// matches how the totals row treats missing amounts.
pub fn sum_defined<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

/// Format a monetary amount the way the dashboard shows it: whole euros,
/// `.` as the thousands separator, ` €` suffix. Undefined renders blank.
pub fn fmt_money(v: Option<f64>) -> String {
    let Some(x) = v else {
        return String::new();
    };
    let units = x.abs().round() as i64;
    let body = units.to_formatted_string(&*MONEY_FORMAT);
    if x < 0.0 && units != 0 {
        format!("-{} €", body)
    } else {
        format!("{} €", body)
    }
}

/// Format a fractional ratio as a percentage with two decimals.
///
/// Values at or above 10 in magnitude are taken to already be in
/// percentage points and are printed as-is. Undefined renders blank.
pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(x) if x.abs() < 10.0 => format!("{:.2}%", x * 100.0),
        Some(x) => format!("{:.2}%", x),
        None => String::new(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
