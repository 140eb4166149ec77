//! Schema types

use crate::models::{PRIMARY_KEY, TABLE_NAME};
use serde::{Deserialize, Serialize};

/// One destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name
    pub table: String,
    /// Primary key columns
    pub primary_key: Vec<String>,
}

impl TableDefinition {
    /// Create a table definition
    pub fn new(table: impl Into<String>, primary_key: &[&str]) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Tables this connector writes
pub fn schema() -> Vec<TableDefinition> {
    vec![TableDefinition::new(TABLE_NAME, &[PRIMARY_KEY])]
}
