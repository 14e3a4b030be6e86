//! Error types for spreadsheet sources
//!
//! Batch-level failures are absorbed by the harvester; metadata failures
//! abort a run before any sheet is processed.

/// Failure reported by a [`SheetSource`](crate::SheetSource)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Credentials were rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but the spreadsheet is not shared with them
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Spreadsheet or range does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Response exceeded the configured size limit
    #[error("payload too large (limit {limit} bytes, observed {observed} bytes)")]
    PayloadTooLarge {
        /// Configured limit
        limit: usize,
        /// Advertised or received size
        observed: u64,
    },

    /// Source asked us to slow down
    #[error("rate limited")]
    RateLimited,

    /// Network or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether the error concerns credentials or sharing
    #[inline]
    #[must_use]
    pub fn is_access(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::AccessDenied(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors() {
        assert!(SourceError::Unauthorized("bad key".into()).is_access());
        assert!(SourceError::AccessDenied("not shared".into()).is_access());
        assert!(!SourceError::RateLimited.is_access());
    }

    #[test]
    fn payload_message_names_both_sizes() {
        let err = SourceError::PayloadTooLarge { limit: 10, observed: 11 };
        assert_eq!(
            err.to_string(),
            "payload too large (limit 10 bytes, observed 11 bytes)"
        );
    }
}
