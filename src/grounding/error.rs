//! grounding errors

use crate::{
    capability::CompilationKind,
    model::{ActionInstance, Feature, ModelError},
};

#[derive(Debug, thiserror::Error)]
pub enum GroundingError {
    #[error("{engine} does not support the features {features:?}")]
    UnsupportedFeature {
        engine: String,
        features: Vec<Feature>,
    },
    #[error("{0} does not offer the compilation {1}")]
    UnsupportedCompilation(String, CompilationKind),
    #[error("{0} was not produced by this grounding")]
    UnknownInstance(ActionInstance),
    #[error("grounding {0} exceeds the limit of {1} ground actions")]
    TooManyGroundActions(String, usize),
    #[error("grounding was cancelled")]
    Cancelled,
    #[error(transparent)]
    Model(#[from] ModelError),
}
