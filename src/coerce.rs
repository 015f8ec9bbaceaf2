use crate::error::{Result, ValorizationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target type a raw spreadsheet column is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Date,
    Text,
}

impl FromStr for SemanticType {
    type Err = ValorizationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(SemanticType::Integer),
            "date" => Ok(SemanticType::Date),
            "text" | "string" => Ok(SemanticType::Text),
            other => Err(ValorizationError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Date => write!(f, "date"),
            SemanticType::Text => write!(f, "text"),
        }
    }
}

/// One coerced cell. `Missing` marks a value that could not be parsed to the
/// requested type; it is never silently turned into a zero or empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Integer(i64),
    Date(NaiveDate),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Coerces a whole column to one semantic type.
///
/// The transform is pure and cell-independent: a cell that fails to parse
/// becomes [`CellValue::Missing`] and the rest of the column is unaffected.
pub fn coerce_column<S: AsRef<str>>(values: &[S], semantic_type: SemanticType) -> Vec<CellValue> {
    values
        .iter()
        .map(|raw| coerce_cell(raw.as_ref(), semantic_type))
        .collect()
}

pub fn coerce_cell(raw: &str, semantic_type: SemanticType) -> CellValue {
    match semantic_type {
        SemanticType::Integer => coerce_integer(raw)
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Missing),
        SemanticType::Date => coerce_date(raw)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Missing),
        SemanticType::Text => CellValue::Text(normalize_text(raw)),
    }
}

/// Parses an integer cell, discarding the `-` separators that identity
/// numbers carry in the source sheets (e.g. `20-12345678-9`).
pub fn coerce_integer(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Day-first date formats seen in the intake sheets. Two-digit-year formats
/// come first: `%Y` would otherwise swallow `21` as the year 21 AD.
const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%Y-%m-%d"];

const DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses a date cell with day-first interpretation: `05/03/2021` is
/// March 5th, not May 3rd.
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    None
}

/// Trims surrounding whitespace and title-cases each alphabetic run, so
/// `"  pLAstico duro "` and `"PLASTICO DURO"` both become `"Plastico Duro"`.
///
/// This is the join key between intake records and the price table and must
/// be applied identically on both sides.
pub fn normalize_text(raw: &str) -> String {
    title_case(raw.trim())
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alphabetic = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}
