pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Crate-level error wrapping the error of every module.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // sub-categories of errors
    #[error(transparent)]
    Model(#[from] crate::model::ModelError),
    #[error(transparent)]
    Grounding(#[from] crate::grounding::GroundingError),
    #[error(transparent)]
    Validation(#[from] crate::validation::ValidationError),
    #[error(transparent)]
    Solver(#[from] crate::solvers::SolverError),

    // configuration
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    // engine selection
    #[error("no engine named {0}")]
    UnknownEngine(String),
    #[error("no {0} supports the problem kind {1}")]
    NoSupportingEngine(String, crate::model::ProblemKind),
}

impl Error {
    pub fn unknown_engine(name: &str) -> Self {
        Self::UnknownEngine(name.to_string())
    }
    pub fn no_supporting_engine(role: &str, kind: &crate::model::ProblemKind) -> Self {
        Self::NoSupportingEngine(role.to_string(), kind.clone())
    }
}
