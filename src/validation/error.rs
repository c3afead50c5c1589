//! validation errors

use crate::model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no cost is defined for action {0}")]
    MissingActionCost(String),
    #[error("validation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Model(#[from] ModelError),
}
