//! Spreadsheet locator parsing
//!
//! Accepts either a spreadsheet URL (`.../spreadsheets/d/<id>/edit`) or a
//! bare id of at least 20 URL-safe characters.

use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use sheetlens_model::SpreadsheetId;
use std::str::FromStr;

static URL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

static BARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").expect("valid regex"));

/// Where a spreadsheet id came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetLocator {
    id: SpreadsheetId,
    from_url: bool,
}

impl SpreadsheetLocator {
    /// Extract the spreadsheet id from a URL or bare id
    ///
    /// # Errors
    /// - `ConfigError::InvalidLocator` when neither form matches
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        if let Some(caps) = URL_ID.captures(trimmed) {
            return Ok(Self {
                id: SpreadsheetId::new(&caps[1]),
                from_url: true,
            });
        }
        if BARE_ID.is_match(trimmed) {
            return Ok(Self {
                id: SpreadsheetId::new(trimmed),
                from_url: false,
            });
        }
        Err(ConfigError::InvalidLocator(input.to_string()))
    }

    /// Extracted id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SpreadsheetId {
        &self.id
    }

    /// Take the id
    #[inline]
    #[must_use]
    pub fn into_id(self) -> SpreadsheetId {
        self.id
    }

    /// Whether the id was taken from a URL
    #[inline]
    #[must_use]
    pub fn is_url(&self) -> bool {
        self.from_url
    }
}

impl FromStr for SpreadsheetLocator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

    #[test]
    fn id_from_edit_url() {
        let url = format!("https://docs.google.com/spreadsheets/d/{ID}/edit#gid=0");
        let locator = SpreadsheetLocator::parse(&url).unwrap();
        assert_eq!(locator.id().as_str(), ID);
        assert!(locator.is_url());
    }

    #[test]
    fn bare_id_is_accepted() {
        let locator: SpreadsheetLocator = format!("  {ID}\n").parse().unwrap();
        assert_eq!(locator.into_id(), SpreadsheetId::new(ID));
    }

    #[test]
    fn short_or_foreign_input_is_rejected() {
        for input in ["", "abc", "https://example.com/doc/123", "has spaces in it but is long"] {
            assert!(
                matches!(
                    SpreadsheetLocator::parse(input),
                    Err(ConfigError::InvalidLocator(_))
                ),
                "{input:?}"
            );
        }
    }

    #[test]
    fn bare_id_boundary_is_twenty() {
        assert!(SpreadsheetLocator::parse(&"a".repeat(19)).is_err());
        assert!(SpreadsheetLocator::parse(&"a".repeat(20)).is_ok());
    }
}
