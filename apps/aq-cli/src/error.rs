use aq_chem::ChemError;
use aq_solver::SolverError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application-level error covering data entry, files and the solve itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("species error: {0}")]
    Chem(#[from] ChemError),

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse the system file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("could not encode the report: {0}")]
    Encode(#[from] serde_json::Error),
}
