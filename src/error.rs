//! Error types for the pair extraction and congruent set core.

use thiserror::Error;

/// Errors that can occur while building spatial indices or extracting pairs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A tolerance, grid size or resolution cannot be used to build a structure.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An index refers outside of the point or pair set it addresses.
    #[error("index {index} out of range for a set of {len} elements")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// Size of the addressed set.
        len: usize,
    },

    /// A state that the algorithms assume can never happen was reached.
    #[error("internal error: {0}")]
    Unreachable(&'static str),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Returns `OutOfRange` unless `index < len`.
pub(crate) fn check_index(index: usize, len: usize) -> CoreResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(CoreError::OutOfRange { index, len })
    }
}
