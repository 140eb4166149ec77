//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::models::parse_fda_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Persisted sync state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Largest `report_date` checkpointed in this sync lineage
    #[serde(
        default,
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_date"
    )]
    pub last_sync_date: Option<NaiveDate>,

    /// Lifetime count of upserted records (metadata only)
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_processed: u64,

    /// Offset reached by the last run (informational)
    #[serde(default, deserialize_with = "deserialize_offset")]
    pub last_cursor: Option<u64>,
}

impl SyncState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// State that resumes from `date`
    pub fn since(date: NaiveDate) -> Self {
        Self {
            last_sync_date: Some(date),
            ..Self::default()
        }
    }

    /// Whether no sync has ever been checkpointed
    pub fn is_empty(&self) -> bool {
        self.last_sync_date.is_none() && self.total_processed == 0 && self.last_cursor.is_none()
    }
}

fn serialize_date<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_fda_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid last_sync_date '{s}'"))),
    }
}

/// Counters may arrive as numbers or numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn parse<E: serde::de::Error>(self, field: &str) -> std::result::Result<u64, E> {
        match self {
            Count::Number(n) => Ok(n),
            Count::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid {field} '{s}'"))),
        }
    }
}

fn deserialize_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u64, D::Error> {
    match Option::<Count>::deserialize(deserializer)? {
        Some(count) => count.parse("total_processed"),
        None => Ok(0),
    }
}

fn deserialize_offset<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    Option::<Count>::deserialize(deserializer)?
        .map(|count| count.parse("last_cursor"))
        .transpose()
}
