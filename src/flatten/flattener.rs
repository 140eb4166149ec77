//! Path-joining flattener
//!
//! Nested objects are joined with the separator (`openfda` + `brand_name`
//! becomes `openfda_brand_name`). Sequences are rendered according to the
//! configured [`ArrayMode`]. Empty objects and empty sequences produce an
//! explicit `null` under their key so the set of columns for a record does
//! not depend on whether a container happened to be empty.
//!
//! Two distinct paths are never merged into one key: if they would collide,
//! flattening fails with [`Error::KeyCollision`] and the caller skips the
//! record.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Default separator between path segments
pub const DEFAULT_SEPARATOR: &str = "_";

/// Column holding the time the row was produced by this connector
pub const SYNCED_COLUMN: &str = "_fivetran_synced";

/// Column marking soft deletes (the source never deletes, so always false)
pub const DELETED_COLUMN: &str = "_fivetran_deleted";

/// A flattened row: joined key path to scalar value, sorted by key
pub type FlatRecord = BTreeMap<String, JsonValue>;

/// How sequences are rendered in the flattened output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayMode {
    /// Store the whole sequence as compact JSON text under its key
    #[default]
    Json,
    /// Expand each element under `key{sep}{index}`
    Indexed,
}

/// Flattens nested JSON objects into [`FlatRecord`]s
#[derive(Debug, Clone)]
pub struct Flattener {
    separator: String,
    array_mode: ArrayMode,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new()
    }
}

impl Flattener {
    /// Create a flattener with the default separator and array mode
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            array_mode: ArrayMode::default(),
        }
    }

    /// Set the path separator
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the array mode
    #[must_use]
    pub fn with_array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = mode;
        self
    }

    /// Get the separator
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Get the array mode
    pub fn array_mode(&self) -> ArrayMode {
        self.array_mode
    }

    /// Flatten a single record.
    ///
    /// The top-level value must be an object. Traversal uses an explicit
    /// work stack, so nesting depth is bounded only by memory.
    pub fn flatten(&self, value: &JsonValue) -> Result<FlatRecord> {
        let JsonValue::Object(root) = value else {
            return Err(Error::malformed(format!(
                "expected a JSON object, found {}",
                kind_of(value)
            )));
        };

        let mut out = FlatRecord::new();
        let mut stack: Vec<(String, &JsonValue)> =
            root.iter().map(|(k, v)| (k.clone(), v)).collect();

        while let Some((key, value)) = stack.pop() {
            match value {
                JsonValue::Object(map) => {
                    if map.is_empty() {
                        insert_unique(&mut out, key, JsonValue::Null)?;
                    } else {
                        for (child, v) in map {
                            stack.push((self.join(&key, child), v));
                        }
                    }
                }
                JsonValue::Array(items) => {
                    if items.is_empty() {
                        insert_unique(&mut out, key, JsonValue::Null)?;
                        continue;
                    }
                    match self.array_mode {
                        ArrayMode::Json => {
                            let text = serde_json::to_string(items)?;
                            insert_unique(&mut out, key, JsonValue::String(text))?;
                        }
                        ArrayMode::Indexed => {
                            for (index, item) in items.iter().enumerate() {
                                stack.push((self.join(&key, &index.to_string()), item));
                            }
                        }
                    }
                }
                JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => {
                    insert_unique(&mut out, key, value.clone())?;
                }
            }
        }

        Ok(out)
    }

    fn join(&self, parent: &str, child: &str) -> String {
        let mut key = String::with_capacity(parent.len() + self.separator.len() + child.len());
        key.push_str(parent);
        key.push_str(&self.separator);
        key.push_str(child);
        key
    }
}

/// Append the synced timestamp and deletion marker columns
pub fn attach_sync_metadata(record: &mut FlatRecord, synced_at: DateTime<Utc>) -> Result<()> {
    insert_unique(
        record,
        SYNCED_COLUMN.to_string(),
        JsonValue::String(synced_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    )?;
    insert_unique(record, DELETED_COLUMN.to_string(), JsonValue::Bool(false))
}

fn insert_unique(out: &mut FlatRecord, key: String, value: JsonValue) -> Result<()> {
    match out.entry(key) {
        Entry::Occupied(entry) => Err(Error::KeyCollision {
            key: entry.key().clone(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
