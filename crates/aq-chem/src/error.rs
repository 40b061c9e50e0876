//! Species model errors.

use thiserror::Error;

/// Result type for species operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors that can occur while building a species.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// Neither Ka nor pKa values were supplied.
    #[error("Species must define either Ka or pKa values")]
    MissingConstants,

    /// Non-physical values (non-positive Ka, negative concentration, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ChemError::MissingConstants;
        assert!(err.to_string().contains("Ka or pKa"));

        let err = ChemError::NonPhysical {
            what: "concentration",
        };
        assert!(err.to_string().contains("concentration"));
    }
}
