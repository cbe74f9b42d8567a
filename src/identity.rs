//! Identifier normalization
//!
//! Source tables carry the same identifier in several shapes: `"123"`,
//! `"123.0"` from a float round-trip, a numeric cell, or padded text. Every
//! join in the engine compares canonical identifiers, so every identifier
//! column goes through [`normalize_id`] before it is used.

use crate::table::Cell;

/// Tokens that mean "no value" in exported tables
const NULL_TOKENS: [&str; 4] = ["", "nan", "none", "null"];

/// Placeholder written into manager columns for vacant positions
pub const UNASSIGNED: &str = "UNASSIGNED";

/// Largest float that still maps onto an exact integer
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Anything that can be turned into a canonical identifier
pub trait IdValue {
    fn canonical_id(&self) -> Option<String>;
}

impl IdValue for str {
    fn canonical_id(&self) -> Option<String> {
        canonical_text(self)
    }
}

impl IdValue for &str {
    fn canonical_id(&self) -> Option<String> {
        canonical_text(self)
    }
}

impl IdValue for String {
    fn canonical_id(&self) -> Option<String> {
        canonical_text(self)
    }
}

impl IdValue for i64 {
    fn canonical_id(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IdValue for f64 {
    fn canonical_id(&self) -> Option<String> {
        if self.is_nan() {
            return None;
        }
        match integral_float(*self) {
            Some(whole) => Some(whole.to_string()),
            None => Some(self.to_string()),
        }
    }
}

impl IdValue for Cell {
    fn canonical_id(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) => canonical_text(text),
            Cell::Int(value) => value.canonical_id(),
            Cell::Float(value) => value.canonical_id(),
        }
    }
}

impl<T: IdValue> IdValue for Option<T> {
    fn canonical_id(&self) -> Option<String> {
        self.as_ref().and_then(|value| value.canonical_id())
    }
}

/// Normalize an identifier to its canonical form
///
/// Returns `None` for null or blank input. Integral numbers lose any decimal
/// suffix (`"123.0"` and `123.0` both become `"123"`); other text is kept
/// verbatim after trimming. Normalizing a canonical value returns it unchanged.
pub fn normalize_id<T: IdValue + ?Sized>(value: &T) -> Option<String> {
    value.canonical_id()
}

/// Problems that make a canonical identifier unusable as a join key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdIssue {
    /// Looks numeric but has a fractional part (`"123.5"`)
    Fractional,
    /// Parses as infinity
    NonFinite,
}

/// Check a canonical identifier for numeric artifacts that cannot be joined on
pub fn id_issue(canonical: &str) -> Option<IdIssue> {
    if canonical.parse::<i64>().is_ok() {
        return None;
    }
    match canonical.parse::<f64>() {
        Ok(value) if !value.is_finite() => Some(IdIssue::NonFinite),
        Ok(value) if integral_float(value).is_none() => Some(IdIssue::Fractional),
        _ => None,
    }
}

/// True for the vacant-position placeholder, in any case
pub fn is_unassigned(canonical: &str) -> bool {
    canonical.eq_ignore_ascii_case(UNASSIGNED)
}

fn canonical_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return None;
    }

    if let Ok(whole) = trimmed.parse::<i64>() {
        return Some(whole.to_string());
    }

    // "123.0", "1.2e3" and friends collapse to their integer text
    if looks_numeric(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            if let Some(whole) = integral_float(value) {
                return Some(whole.to_string());
            }
        }
    }

    Some(trimmed.to_string())
}

/// Only digit-led text is treated as a number, so "inf" or "e5" stay text
fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn integral_float(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_forms_share_one_id() {
        assert_eq!(normalize_id("123"), Some("123".to_string()));
        assert_eq!(normalize_id("123.0"), Some("123".to_string()));
        assert_eq!(normalize_id(&123.0_f64), Some("123".to_string()));
        assert_eq!(normalize_id(&123_i64), Some("123".to_string()));
        assert_eq!(normalize_id("  123.0 "), Some("123".to_string()));
        assert_eq!(normalize_id("007"), Some("7".to_string()));
    }

    #[test]
    fn test_null_and_blank() {
        assert_eq!(normalize_id(""), None);
        assert_eq!(normalize_id("   "), None);
        assert_eq!(normalize_id("NaN"), None);
        assert_eq!(normalize_id(&f64::NAN), None);
        assert_eq!(normalize_id(&Cell::Empty), None);
        assert_eq!(normalize_id(&None::<String>), None);
    }

    #[test]
    fn test_text_ids_kept_verbatim() {
        assert_eq!(normalize_id(" R1 "), Some("R1".to_string()));
        assert_eq!(normalize_id("UNASSIGNED"), Some("UNASSIGNED".to_string()));
        assert_eq!(normalize_id("inf"), Some("inf".to_string()));
        // Fractional values are not truncated into another person's id
        assert_eq!(normalize_id("123.5"), Some("123.5".to_string()));
    }

    #[test]
    fn test_idempotent() {
        let samples = ["123", "123.0", " 42 ", "R1", "123.5", "00012", "1.2e3", "x.0", "-5.0"];
        for raw in samples {
            let once = normalize_id(raw);
            let twice = once.as_deref().and_then(|id| normalize_id(id));
            assert_eq!(once, twice, "normalizing '{raw}' twice changed it");
        }
    }

    #[test]
    fn test_cells() {
        assert_eq!(normalize_id(&Cell::Float(40064102.0)), Some("40064102".to_string()));
        assert_eq!(normalize_id(&Cell::Text("55.0".into())), Some("55".to_string()));
    }

    #[test]
    fn test_id_issues() {
        assert_eq!(id_issue("123"), None);
        assert_eq!(id_issue("R1"), None);
        assert_eq!(id_issue("123.5"), Some(IdIssue::Fractional));
        assert_eq!(id_issue("inf"), Some(IdIssue::NonFinite));
        assert!(is_unassigned("unassigned"));
    }
}
