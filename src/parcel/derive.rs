//! Field derivers: pure functions from raw column values to enriched fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::record::{OwnerType, RowDiagnostic};
use super::tables::LookupTables;

/// Substrings that mark an owner name as a business or trust. Matching is a plain
/// case-insensitive substring test, so "CO" also hits names such as "COOPER".
pub const ENTITY_KEYWORDS: [&str; 5] = ["LLC", "INC", "CORP", "CO", "TRUST"];

/// Optional sign, digits with an optional fraction (or a bare fraction), optional exponent.
static LEADING_DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("leading decimal pattern is valid")
});

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Fitness score for a land-use code.
///
/// Fails with a diagnostic when the code is missing, has no zoning category, or maps to a
/// category with no score. The caller records the diagnostic and emits a null score.
pub fn zoning_fit_score(
    tables: &LookupTables,
    land_use_code: Option<&str>,
) -> Result<u8, RowDiagnostic> {
    let code = land_use_code.ok_or(RowDiagnostic::UnmappedLandUse { code: None })?;
    let category = tables
        .zoning_category(code)
        .ok_or_else(|| RowDiagnostic::UnmappedLandUse {
            code: Some(code.to_string()),
        })?;
    tables
        .category_score(category)
        .ok_or_else(|| RowDiagnostic::UnscoredZoning {
            code: code.to_string(),
            category: category.to_string(),
        })
}

pub fn owner_type(owner: Option<&str>) -> OwnerType {
    match owner {
        None | Some("") => OwnerType::Unknown,
        Some(name) => {
            let upper = name.to_uppercase();
            if ENTITY_KEYWORDS.iter().any(|keyword| upper.contains(keyword)) {
                OwnerType::Entity
            } else {
                OwnerType::Individual
            }
        }
    }
}

/// Whole years between the sale year and `current_year`. Not clamped, so a sale
/// date in the future yields a negative value.
pub fn years_owned(
    date_sold: Option<&str>,
    current_year: i32,
) -> Result<Option<i32>, RowDiagnostic> {
    let Some(raw) = date_sold.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match sale_year(raw) {
        Some(year) => Ok(Some(current_year - year)),
        None => Err(RowDiagnostic::UnparsableDate {
            value: raw.to_string(),
        }),
    }
}

/// Calendar year of a sale date in any of the layouts county exports use.
pub fn sale_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();

    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.year());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date.year());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.year())
}

/// Non-negative amount from a numeric column.
///
/// Reads the longest leading decimal prefix ("3.5 ac" is 3.5). Missing, negative and
/// non-finite values become 0; a non-empty value with no numeric prefix also becomes 0
/// and is reported.
pub fn non_negative_amount(column: &str, value: Option<&str>) -> (f64, Option<RowDiagnostic>) {
    let Some(raw) = value.filter(|s| !s.is_empty()) else {
        return (0.0, None);
    };
    match leading_decimal(raw) {
        Some(parsed) if parsed.is_finite() && parsed > 0.0 => (parsed, None),
        Some(_) => (0.0, None),
        None => (
            0.0,
            Some(RowDiagnostic::UnparsableNumber {
                column: column.to_string(),
                value: raw.to_string(),
            }),
        ),
    }
}

fn leading_decimal(raw: &str) -> Option<f64> {
    LEADING_DECIMAL
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
