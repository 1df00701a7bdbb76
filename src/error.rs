use std::io;

/// Errors produced by fitting, predicting and exporting models.
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("matrix is singular or nearly singular (pivot column {column})")]
    SingularMatrix { column: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0} not fitted, call fit() first")]
    NotFitted(&'static str),

    #[error("invalid inference graph: {0}")]
    InvalidGraph(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RegressionError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegressionError>;
