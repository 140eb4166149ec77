//! Connector configuration
//!
//! The configuration is an explicit immutable value: it is loaded once from a
//! JSON or YAML file (or an inline JSON string), validated, and then passed
//! into the fetcher and the sync engine.
//!
//! Hosts pass every value as a string, so numeric options accept either JSON
//! numbers or numeric strings.

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_BASE_URL;
use crate::flatten::{ArrayMode, Flattener, DEFAULT_SEPARATOR};
use crate::http::HttpClientConfig;
use crate::pagination::MAX_PAGE_SIZE;
use crate::types::{OptionStringExt, PropertyType, SyncMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

// ============================================================================
// Connector Config
// ============================================================================

/// Runtime configuration for the FDA enforcement connector
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// openFDA API key (required)
    #[serde(default)]
    pub api_key: String,

    /// Records per request (1..=1000)
    #[serde(default = "default_limit", deserialize_with = "lenient::u32")]
    pub limit: u32,

    /// Records fetched per invocation
    #[serde(default = "default_max_records", deserialize_with = "lenient::u64")]
    pub max_records: u64,

    /// Incremental (resume from cursor) or full
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request ceiling per minute
    #[serde(default = "default_requests_per_minute", deserialize_with = "lenient::u32")]
    pub requests_per_minute: u32,

    /// Retries per request after the first attempt
    #[serde(default = "default_max_retries", deserialize_with = "lenient::u32")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs", deserialize_with = "lenient::u64")]
    pub timeout_secs: u64,

    /// Separator between flattened key segments
    #[serde(default = "default_separator")]
    pub flatten_separator: String,

    /// How arrays are flattened
    #[serde(default)]
    pub array_mode: ArrayMode,
}

fn default_limit() -> u32 {
    1000
}

fn default_max_records() -> u64 {
    10_000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_requests_per_minute() -> u32 {
    240
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            limit: default_limit(),
            max_records: default_max_records(),
            sync_mode: SyncMode::default(),
            base_url: default_base_url(),
            requests_per_minute: default_requests_per_minute(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            flatten_separator: default_separator(),
            array_mode: ArrayMode::default(),
        }
    }
}

// The API key must never reach logs.
impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ConnectorConfig")
            .field("api_key", &api_key)
            .field("limit", &self.limit)
            .field("max_records", &self.max_records)
            .field("sync_mode", &self.sync_mode)
            .field("base_url", &self.base_url)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .field("flatten_separator", &self.flatten_separator)
            .field("array_mode", &self.array_mode)
            .finish()
    }
}

impl ConnectorConfig {
    /// Config with the given key and defaults for everything else
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load and validate a config file; `.yaml`/`.yml` are parsed as YAML,
    /// everything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    /// Parse and validate an inline JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    /// Validate, normalizing values that can be corrected
    ///
    /// `limit` above the API ceiling is clamped with a warning; zero values
    /// and a missing key are rejected.
    pub fn validated(mut self) -> Result<Self> {
        self.api_key = self
            .api_key
            .none_if_empty()
            .map(|key| key.trim().to_string())
            .ok_or_else(|| Error::missing_field("api_key"))?;

        if self.limit == 0 {
            return Err(Error::invalid_value("limit", "must be at least 1"));
        }
        if self.limit > MAX_PAGE_SIZE {
            warn!(
                "limit {} exceeds the API maximum, using {MAX_PAGE_SIZE}",
                self.limit
            );
            self.limit = MAX_PAGE_SIZE;
        }

        if self.max_records == 0 {
            return Err(Error::invalid_value("max_records", "must be at least 1"));
        }
        if self.requests_per_minute == 0 {
            return Err(Error::invalid_value(
                "requests_per_minute",
                "must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        if self.flatten_separator.is_empty() {
            return Err(Error::invalid_value(
                "flatten_separator",
                "must not be empty",
            ));
        }

        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(self)
    }

    /// HTTP client settings: base URL, API key, retries, spacing, timeout
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .requests_per_minute(self.requests_per_minute)
            .query("api_key", self.api_key.clone())
            .build()
    }

    /// Flattener with the configured separator and array mode
    pub fn flattener(&self) -> Flattener {
        Flattener::new()
            .with_separator(self.flatten_separator.clone())
            .with_array_mode(self.array_mode)
    }

    /// Describe the accepted configuration properties
    pub fn spec() -> SpecConfig {
        let mut properties = BTreeMap::new();

        properties.insert(
            "api_key".to_string(),
            PropertyConfig::new(PropertyType::String, "openFDA API key")
                .required()
                .secret(),
        );
        properties.insert(
            "limit".to_string(),
            PropertyConfig::new(PropertyType::Integer, "Records per request (max 1000)")
                .default_value(default_limit()),
        );
        properties.insert(
            "max_records".to_string(),
            PropertyConfig::new(PropertyType::Integer, "Records fetched per sync")
                .default_value(default_max_records()),
        );
        properties.insert(
            "sync_mode".to_string(),
            PropertyConfig::new(PropertyType::String, "Resume from the cursor or refetch all")
                .default_value(SyncMode::default().to_string())
                .allowed(&["incremental", "full"]),
        );
        properties.insert(
            "base_url".to_string(),
            PropertyConfig::new(PropertyType::String, "API root")
                .default_value(default_base_url()),
        );
        properties.insert(
            "requests_per_minute".to_string(),
            PropertyConfig::new(PropertyType::Integer, "Request ceiling per minute")
                .default_value(default_requests_per_minute()),
        );
        properties.insert(
            "max_retries".to_string(),
            PropertyConfig::new(PropertyType::Integer, "Retries per request")
                .default_value(default_max_retries()),
        );
        properties.insert(
            "timeout_secs".to_string(),
            PropertyConfig::new(PropertyType::Integer, "Request timeout in seconds")
                .default_value(default_timeout_secs()),
        );
        properties.insert(
            "flatten_separator".to_string(),
            PropertyConfig::new(PropertyType::String, "Separator for flattened keys")
                .default_value(default_separator()),
        );
        properties.insert(
            "array_mode".to_string(),
            PropertyConfig::new(PropertyType::String, "How arrays are flattened")
                .default_value("json")
                .allowed(&["json", "indexed"]),
        );

        SpecConfig { properties }
    }
}

// ============================================================================
// Spec Config
// ============================================================================

/// Accepted configuration properties, printed by `spec`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    pub properties: BTreeMap<String, PropertyConfig>,
}

/// Configuration property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    /// Property description
    pub description: String,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Enum of allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<serde_json::Value>>,
}

impl PropertyConfig {
    fn new(property_type: PropertyType, description: &str) -> Self {
        Self {
            property_type,
            description: description.to_string(),
            secret: false,
            required: false,
            default: None,
            allowed_values: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| (*v).into()).collect());
        self
    }
}

// ============================================================================
// Lenient number parsing
// ============================================================================

mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Unsigned(u64),
        Signed(i64),
        Text(String),
    }

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Unsigned(n) => Ok(n),
            Raw::Signed(n) => Err(D::Error::custom(format!("{n} must not be negative"))),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("'{s}' is not a non-negative integer"))),
        }
    }

    pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = u64(deserializer)?;
        u32::try_from(n).map_err(|_| D::Error::custom(format!("{n} is too large")))
    }
}
