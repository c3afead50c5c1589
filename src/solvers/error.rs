//! solver errors

use crate::model::{ModelError, ProblemKind};

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("{0} does not support the problem kind {1}")]
    UnsupportedProblem(String, ProblemKind),
    #[error(transparent)]
    Model(#[from] ModelError),
}
