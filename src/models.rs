//! Enforcement record model
//!
//! Records are carried around as raw JSON so that every field the API sends
//! reaches the destination. [`EnforcementRecord`] is a borrowed, typed view
//! over the handful of fields the connector itself relies on.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Destination table for enforcement records
pub const TABLE_NAME: &str = "food_enforcement_records";

/// Primary key column
pub const PRIMARY_KEY: &str = "recall_number";

/// Field used as the incremental cursor
pub const CURSOR_FIELD: &str = "report_date";

/// FDA hazard classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Class I")]
    ClassI,
    #[serde(rename = "Class II")]
    ClassII,
    #[serde(rename = "Class III")]
    ClassIII,
}

impl Classification {
    /// Parse the API's textual classification
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Class I" => Some(Self::ClassI),
            "Class II" => Some(Self::ClassII),
            "Class III" => Some(Self::ClassIII),
            _ => None,
        }
    }
}

/// Recall status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecallStatus {
    #[serde(rename = "On-Going")]
    OnGoing,
    Completed,
    Terminated,
    Pending,
}

impl RecallStatus {
    /// Parse the API's textual status
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "On-Going" | "Ongoing" => Some(Self::OnGoing),
            "Completed" => Some(Self::Completed),
            "Terminated" => Some(Self::Terminated),
            "Pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Typed view over a raw enforcement record
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcementRecord<'a> {
    /// Unique recall identifier
    pub recall_number: &'a str,
    /// Date the record was reported, if present and parseable
    pub report_date: Option<NaiveDate>,
    /// Date the recall was initiated, if present and parseable
    pub recall_initiation_date: Option<NaiveDate>,
    pub classification: Option<Classification>,
    pub status: Option<RecallStatus>,
}

impl<'a> EnforcementRecord<'a> {
    /// Build a view over a raw record.
    ///
    /// Fails only when the record is not an object or has no usable
    /// `recall_number`; unknown enum values and bad dates become `None`.
    pub fn from_value(value: &'a JsonValue) -> Result<Self> {
        let JsonValue::Object(map) = value else {
            return Err(Error::malformed("record is not a JSON object"));
        };

        let recall_number = match map.get(PRIMARY_KEY) {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => s.as_str(),
            Some(JsonValue::String(_)) => {
                return Err(Error::malformed(format!("empty '{PRIMARY_KEY}'")));
            }
            Some(other) => {
                return Err(Error::malformed(format!(
                    "'{PRIMARY_KEY}' is not a string: {other}"
                )));
            }
            None => return Err(Error::malformed(format!("missing '{PRIMARY_KEY}'"))),
        };

        let str_field = |name: &str| map.get(name).and_then(JsonValue::as_str);

        Ok(Self {
            recall_number,
            report_date: str_field(CURSOR_FIELD).and_then(parse_fda_date),
            recall_initiation_date: str_field("recall_initiation_date").and_then(parse_fda_date),
            classification: str_field("classification").and_then(Classification::parse),
            status: str_field("status").and_then(RecallStatus::parse),
        })
    }
}

/// Parse a date in any of the forms the API or older state files use.
///
/// Accepts `YYYYMMDD` (API wire format), `YYYY-MM-DD`, and timestamps whose
/// first ten characters are `YYYY-MM-DD` (e.g. `2024-01-15T00:00:00Z`).
pub fn parse_fda_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    let date_part = s.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Format a date the way the API's `search` syntax expects
pub fn format_fda_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
