//! Error types for structure detection and sub-model construction.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can abort a decomposition attempt.
///
/// Every variant is fatal to the attempt that produced it. Nothing in this
/// crate retries; callers may start a fresh attempt with other parameters.
#[derive(Error, Debug)]
pub enum DecompError {
    /// Degenerate or malformed input matrix
    #[error("Structure error: {0}")]
    Structure(String),

    /// No partitioning backend was configured
    #[error("No partitioning oracle configured")]
    OracleUnavailable,

    /// The partitioning backend reported an error
    #[error("Partitioning oracle failed (code {code}): {message}")]
    OracleFailure { code: i32, message: String },

    /// Internal consistency check failed
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A sub-matrix allocation could not be satisfied
    #[error("Out of memory while building {context}")]
    OutOfMemory {
        context: String,
        #[source]
        source: TryReserveError,
    },

    /// Configuration rejected before any work started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// User-supplied block definition could not be read
    #[error("Invalid block file (line {line}): {message}")]
    InvalidBlockFile { line: usize, message: String },

    /// Initial solution text could not be read
    #[error("Invalid solution file (line {line}): {message}")]
    InvalidSolutionFile { line: usize, message: String },
}

impl DecompError {
    /// Short machine-readable tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DecompError::Structure(_) => "structure",
            DecompError::OracleUnavailable => "oracle_unavailable",
            DecompError::OracleFailure { .. } => "oracle_failure",
            DecompError::InvariantViolation(_) => "invariant_violation",
            DecompError::OutOfMemory { .. } => "out_of_memory",
            DecompError::InvalidConfig(_) => "invalid_config",
            DecompError::InvalidBlockFile { .. } => "invalid_block_file",
            DecompError::InvalidSolutionFile { .. } => "invalid_solution_file",
        }
    }

    pub(crate) fn oom(context: impl Into<String>, source: TryReserveError) -> Self {
        DecompError::OutOfMemory {
            context: context.into(),
            source,
        }
    }
}

/// Result type for decomposition operations.
pub type DecompResult<T> = Result<T, DecompError>;
