//! Configuration module for the replace engine
//!
//! Options are plain data handed in by the caller. They can also be
//! loaded from a JSON document, with every field optional.

use serde::{Deserialize, Serialize};

/// Upper bound for needle and replacement lengths
pub const MAX_PATTERN_LEN: usize = i32::MAX as usize;

/// Options recognized by a search-and-replace pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplaceOptions {
    /// Fold ASCII `a`..`z` to `A`..`Z` when comparing
    pub case_insensitive: bool,

    /// Stop matching after the first occurrence, pass the rest through
    pub replace_once: bool,

    /// Count occurrences but never write the replacement
    pub dry_run: bool,

    /// Collapse CRLF / LFCR / CR / LF into a single LF before matching
    pub normalize_linebreaks: bool,

    /// Let wildcard positions match CR and LF too
    pub wildcard_matches_linebreaks: bool,

    /// Report every match offset and the final count through the logger
    pub verbose: bool,

    /// Ask the sink to force every physical write through to storage
    pub force_sync: bool,
}

impl ReplaceOptions {
    /// Parse options from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config_str =
            std::str::from_utf8(bytes).map_err(|e| ConfigError::InvalidUtf8(e.to_string()))?;

        serde_json::from_str(config_str).map_err(|e| ConfigError::InvalidJson(e.to_string()))
    }

    /// Whether per-match offsets should be reported
    pub fn reports_matches(&self) -> bool {
        self.verbose || self.dry_run
    }
}

/// Configuration parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}
