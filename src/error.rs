//! Error type shared by all coverage computations.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// An argument is outside of the domain of the operation (e.g. `t == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input data is inconsistent: mismatched widths, out-of-range or
    /// filtered variables, malformed interactions.
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    /// A count does not fit into the requested integer type.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    /// A worker thread panicked, so no result is available.
    #[error("coverage worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, CoverageError>;
