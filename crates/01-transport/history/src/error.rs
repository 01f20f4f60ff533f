//! Error handling helpers for the history crate.
//!
//! The ring keeps its error surface to construction-time validation; runtime
//! operations express absence through `Option` instead of propagating errors.

use std::fmt;

/// Convenience result alias for fallible history operations.
pub type HistoryResult<T, E = HistoryError> = Result<T, E>;

#[derive(Debug, PartialEq, Eq)]
/// Errors surfaced when constructing a history ring.
pub enum HistoryError {
    /// A ring needs at least one slot to hold history.
    ZeroCapacity,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::ZeroCapacity => {
                write!(f, "history ring capacity must be at least 1 entry")
            }
        }
    }
}

impl std::error::Error for HistoryError {}
