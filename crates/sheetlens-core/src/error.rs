//! Error types for the analysis pipeline
//!
//! Run-level failures fall into three caller-visible groups:
//! - configuration problems, caught before any request is sent
//! - access problems reported by the source (credentials or sharing)
//! - everything else, reported as a processing failure

use sheetlens_harvest::SourceError;
use std::path::PathBuf;

/// Invalid or incomplete configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither an API key nor an access token is set
    #[error("no credentials configured (set an API key or access token)")]
    MissingCredentials,

    /// Locator is neither a spreadsheet URL nor a bare id
    #[error("invalid spreadsheet locator: {0:?}")]
    InvalidLocator(String),

    /// A setting is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted setting name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config or snapshot text could not be parsed
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// Kind of document
        what: &'static str,
        /// Parser message
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            what: "configuration",
            message: err.to_string(),
        }
    }
}

/// Caller-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Settings or input must be fixed locally
    Configuration,
    /// Credentials were rejected
    Unauthorized,
    /// Spreadsheet is not shared with the service identity
    AccessDenied,
    /// Anything else
    Processing,
}

/// Run-level failure
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Source rejected the credentials
    #[error("authorization failed: {0}")]
    Unauthorized(String),

    /// Source refused access to the spreadsheet
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Best-effort description of any other failure
    #[error("analysis failed: {0}")]
    Processing(String),
}

impl AnalysisError {
    /// Category of this error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::Processing(_) => ErrorKind::Processing,
        }
    }

    /// Whether the caller has to fix credentials or sharing
    #[inline]
    #[must_use]
    pub fn is_access(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unauthorized | ErrorKind::AccessDenied)
    }

    /// What the caller can do about it
    #[must_use]
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            Self::Configuration(ConfigError::MissingCredentials) => {
                "set SHEETLENS_API_KEY or SHEETLENS_ACCESS_TOKEN, or add credentials to the config file"
            }
            Self::Configuration(ConfigError::InvalidLocator(_)) => {
                "pass a spreadsheet URL containing /spreadsheets/d/<id> or the bare id"
            }
            Self::Configuration(_) => "check the configuration file and command-line options",
            Self::Unauthorized(_) => {
                "the credentials were rejected; check that the API key or token is valid and not expired"
            }
            Self::AccessDenied(_) => {
                "share the spreadsheet with the service account, or make it viewable by link"
            }
            Self::Processing(_) => "retry later; rerun with RUST_LOG=debug for details",
        }
    }
}

impl From<SourceError> for AnalysisError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unauthorized(detail) => Self::Unauthorized(detail),
            SourceError::AccessDenied(detail) => Self::AccessDenied(detail),
            other => Self::Processing(other.to_string()),
        }
    }
}
