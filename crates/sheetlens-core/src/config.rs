//! Analyzer configuration
//!
//! Defaults match the harvesting limits of the hosted analyzer. Values are
//! layered: built-in defaults, then an optional TOML file, then the
//! `SHEETLENS_*` environment variables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use sheetlens_harvest::google::{DEFAULT_ENDPOINT, DEFAULT_MAX_PAYLOAD_BYTES};
use sheetlens_harvest::{GoogleSheetsSource, HarvestSettings};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "SHEETLENS_API_KEY";
/// Environment variable holding the OAuth access token
pub const ENV_ACCESS_TOKEN: &str = "SHEETLENS_ACCESS_TOKEN";
/// Environment variable overriding the API endpoint
pub const ENV_ENDPOINT: &str = "SHEETLENS_ENDPOINT";

/// Top-level analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Sampling caps for oversized sheets
    pub sampling: SamplingConfig,
    /// Batch sizing and pacing
    pub batch: BatchConfig,
    /// Result cache
    pub cache: CacheConfig,
    /// Spreadsheet source
    pub source: SourceConfig,
}

/// Sampling caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Rows read from a sheet at most
    pub max_rows: u32,
    /// Columns read from a sheet at most
    pub max_columns: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_rows: 200,
            max_columns: 13,
        }
    }
}

/// Batch sizing and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Rows per range request
    pub rows_per_batch: u32,
    /// Concurrent range requests per sheet
    pub max_in_flight: usize,
    /// Pause after each request slot, in milliseconds
    pub group_delay_ms: u64,
    /// Sheets harvested concurrently
    pub sheet_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rows_per_batch: 10,
            max_in_flight: 3,
            group_delay_ms: 150,
            sheet_concurrency: 2,
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether results are cached at all
    pub enabled: bool,
    /// Time-to-live in seconds
    pub ttl_secs: u64,
    /// Maximum cached results
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

impl CacheConfig {
    /// TTL as a duration
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Spreadsheet source settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// API root URL
    pub endpoint: String,
    /// API key
    pub api_key: Option<String>,
    /// OAuth bearer token, preferred over the API key
    pub access_token: Option<String>,
    /// Largest accepted response body
    pub max_payload_bytes: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            access_token: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("SourceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("access_token", &redact(&self.access_token))
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SourceConfig {
    /// Whether any credential is set
    #[inline]
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() || self.access_token.is_some()
    }
}

impl AnalyzerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.source.api_key = Some(key.into());
        self
    }

    /// With OAuth access token
    #[inline]
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.source.access_token = Some(token.into());
        self
    }

    /// With API endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.source.endpoint = endpoint.into();
        self
    }

    /// With sampling caps
    #[inline]
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// With batch settings
    #[inline]
    #[must_use]
    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    /// With result caching switched on or off
    #[inline]
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown value types
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` on malformed TOML
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overlay the `SHEETLENS_*` process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; empty values are ignored
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_API_KEY) {
            self.source.api_key = Some(key);
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.source.access_token = Some(token);
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.source.endpoint = endpoint;
        }
        self
    }

    /// Defaults, then `path` if given, then the environment, then validation
    ///
    /// # Errors
    /// - Any error of [`Self::from_toml_file`] or [`Self::validate`]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        tracing::debug!(config = ?config, "configuration loaded");
        Ok(config)
    }

    /// Reject values that would stall or misconfigure a run
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field: &'static str| ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        };
        if self.sampling.max_rows == 0 {
            return Err(zero("sampling.max_rows"));
        }
        if self.sampling.max_columns == 0 {
            return Err(zero("sampling.max_columns"));
        }
        if self.batch.rows_per_batch == 0 {
            return Err(zero("batch.rows_per_batch"));
        }
        if self.batch.max_in_flight == 0 {
            return Err(zero("batch.max_in_flight"));
        }
        if self.batch.sheet_concurrency == 0 {
            return Err(zero("batch.sheet_concurrency"));
        }
        if self.source.max_payload_bytes == 0 {
            return Err(zero("source.max_payload_bytes"));
        }
        if self.source.timeout_secs == 0 {
            return Err(zero("source.timeout_secs"));
        }
        if self.cache.enabled && (self.cache.ttl_secs == 0 || self.cache.max_entries == 0) {
            return Err(ConfigError::InvalidValue {
                field: "cache",
                reason: "ttl_secs and max_entries must be non-zero when enabled".to_string(),
            });
        }
        Ok(())
    }

    /// Require a credential before contacting the live source
    ///
    /// # Errors
    /// - `ConfigError::MissingCredentials` when neither credential is set
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.source.has_credentials() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials)
        }
    }

    /// Harvester settings derived from this configuration
    #[must_use]
    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            max_rows: self.sampling.max_rows,
            max_columns: self.sampling.max_columns,
            rows_per_batch: self.batch.rows_per_batch,
            max_in_flight: self.batch.max_in_flight,
            group_delay: Duration::from_millis(self.batch.group_delay_ms),
            sheet_concurrency: self.batch.sheet_concurrency,
        }
    }

    /// Live source built from the source settings
    ///
    /// # Errors
    /// - `ConfigError::MissingCredentials` when no credential is set
    /// - `ConfigError::InvalidValue` if the endpoint is not a usable URL
    pub fn sheet_source(&self) -> Result<GoogleSheetsSource, ConfigError> {
        self.require_credentials()?;
        let source = &self.source;
        let mut built =
            GoogleSheetsSource::new(&source.endpoint, Duration::from_secs(source.timeout_secs))
                .map_err(|e| ConfigError::InvalidValue {
                    field: "source.endpoint",
                    reason: e.to_string(),
                })?
                .with_max_payload_bytes(source.max_payload_bytes);
        if let Some(key) = &source.api_key {
            built = built.with_api_key(key.clone());
        }
        if let Some(token) = &source.access_token {
            built = built.with_access_token(token.clone());
        }
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_harvester() {
        let config = AnalyzerConfig::new();
        assert_eq!(config.harvest_settings(), HarvestSettings::default());
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[batch]\nrows_per_batch = 25\n\n[source]\napi_key = \"from-file\"\n"
        )
        .unwrap();

        let config = AnalyzerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.batch.rows_per_batch, 25);
        assert_eq!(config.batch.max_in_flight, 3);
        assert_eq!(config.sampling, SamplingConfig::default());
        assert_eq!(config.source.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AnalyzerConfig::from_toml_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AnalyzerConfig::from_toml_str("[batch]\nrows_per_batch = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { what: "configuration", .. }));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_ACCESS_TOKEN, "  "),
            (ENV_ENDPOINT, "http://localhost:9000"),
        ]
        .into_iter()
        .collect();
        let config = AnalyzerConfig::new()
            .with_api_key("from-file")
            .with_overrides_from(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.source.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.source.access_token, None);
        assert_eq!(config.source.endpoint, "http://localhost:9000");
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = AnalyzerConfig::new().with_batch(BatchConfig {
            max_in_flight: 0,
            ..BatchConfig::default()
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "batch.max_in_flight", .. }
        ));

        let disabled = AnalyzerConfig {
            cache: CacheConfig {
                enabled: false,
                ttl_secs: 0,
                max_entries: 0,
            },
            ..AnalyzerConfig::default()
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn live_source_needs_credentials() {
        let err = AnalyzerConfig::new().sheet_source().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
        assert!(AnalyzerConfig::new().with_access_token("t").sheet_source().is_ok());
    }

    #[test]
    fn bad_endpoint_is_invalid_value() {
        let err = AnalyzerConfig::new()
            .with_api_key("k")
            .with_endpoint("not a url")
            .sheet_source()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "source.endpoint", .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AnalyzerConfig::new().with_api_key("very-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
