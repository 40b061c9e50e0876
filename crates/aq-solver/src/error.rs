//! Error types for solver operations.

use aq_core::AqError;
use thiserror::Error;

/// Errors that can occur while solving for equilibrium pH.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] AqError),

    #[error("Cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
}

pub type SolverResult<T> = Result<T, SolverError>;
