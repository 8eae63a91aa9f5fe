//! Error types for a search-and-replace pass

use std::io;

use crate::streaming::NeedleError;

/// Errors that end a search-and-replace pass
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// Needle, replacement or options rejected before any byte was read
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The needle could not be constructed
    #[error(transparent)]
    Needle(#[from] NeedleError),

    /// Scratch memory (prefix table, held-byte buffer) could not be reserved
    #[error("memory allocation failed: {what} ({requested} elements)")]
    Allocation { what: &'static str, requested: usize },

    /// The sink rejected a byte; output is probably incomplete
    #[error("write operation failed at input offset {position}: {source}")]
    Write {
        position: u64,
        #[source]
        source: io::Error,
    },

    /// The source failed (not plain end-of-stream); held bytes were flushed first
    #[error("read operation failed at input offset {position}: {source}")]
    Read {
        position: u64,
        #[source]
        source: io::Error,
    },

    /// Cancelled through the abort flag
    #[error("process cancelled after {position} input bytes ({replacements} replacements)")]
    Aborted { position: u64, replacements: u64 },
}

impl ReplaceError {
    /// Whether this is a cooperative cancellation rather than a failure
    pub fn is_aborted(&self) -> bool {
        matches!(self, ReplaceError::Aborted { .. })
    }

    /// Whether the output written so far should be considered incomplete
    pub fn output_incomplete(&self) -> bool {
        matches!(
            self,
            ReplaceError::Write { .. } | ReplaceError::Read { .. } | ReplaceError::Aborted { .. }
        )
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ReplaceError>;
