//! Locale-tolerant coercion of loosely typed source values.
//!
//! Every helper here is total: malformed input resolves to `None` (or the
//! documented default) and never to `NaN`/`Infinity`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::{CURRENCY_MARKERS, MAX_SESSION_YEAR, MIN_SESSION_YEAR};

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Parse a number, or a numeric string with thousands separators, a currency
/// marker or a trailing percent sign. Missing, empty and unparseable input
/// yields `None`.
pub fn parse_number(raw: Option<&Value>) -> Option<f64> {
    let parsed = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

pub fn parse_numeric_str(raw: &str) -> Option<f64> {
    let text = strip_currency(raw.trim());
    let text = text.strip_suffix('%').unwrap_or(text);

    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '\'' | '_'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // f64::from_str accepts "inf" and "NaN"; neither is a usable value here
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn strip_currency(text: &str) -> &str {
    for marker in CURRENCY_MARKERS {
        if let Some(prefix) = text.get(..marker.len()) {
            if prefix.eq_ignore_ascii_case(marker) {
                return text[marker.len()..].trim_start();
            }
        }
    }
    text
}

/// Non-negative whole count; anything unusable counts as zero
pub fn parse_count(raw: Option<&Value>) -> u32 {
    parse_number(raw)
        .filter(|n| *n >= 0.0)
        .map(|n| n.trunc() as u32)
        .unwrap_or(0)
}

/// Numeric field with a zero default
pub fn parse_number_or_zero(raw: Option<&Value>) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Extract the four-digit year of an academic session value.
///
/// Integers are accepted as-is when they have four digits. Strings must contain
/// exactly one distinct plausible year; "2010-09-01" and "Sep 2010" resolve,
/// "2010-2014" does not.
pub fn extract_year(raw: Option<&Value>) -> Option<i32> {
    match raw? {
        Value::Number(n) => {
            let value = n.as_f64()?;
            if value.fract() != 0.0 || !(1000.0..=9999.0).contains(&value) {
                return None;
            }
            Some(value as i32)
        }
        Value::String(s) => extract_year_str(s),
        _ => None,
    }
}

pub fn extract_year_str(raw: &str) -> Option<i32> {
    let mut candidates = DIGIT_RUN
        .find_iter(raw)
        .filter(|m| m.as_str().len() == 4)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .filter(|year| (MIN_SESSION_YEAR..=MAX_SESSION_YEAR).contains(year));

    let first = candidates.next()?;
    if candidates.any(|year| year != first) {
        return None;
    }
    Some(first)
}

/// Loose boolean: JSON bool, non-zero number, or "true"/"yes"/"1"
pub fn parse_bool(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}
