//! Grounding: compiling a lifted problem into an equivalent problem without parameters or
//! quantifiers, together with the mapping of ground actions back to lifted instances.

mod cache;
mod engine;
mod error;
mod mapper;
mod simplify;

pub use cache::GroundingCache;
pub use engine::Grounder;
pub use error::GroundingError;
pub use mapper::ActionInstanceMapper;

use crate::{
    capability::{Capabilities, CompilationKind},
    model::{ActionInstance, Problem, ProblemKind, SequentialPlan},
};

/// A problem-to-problem transformation.
pub trait Compiler: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    fn supports(&self, kind: &ProblemKind) -> bool {
        self.capabilities().supports(kind)
    }

    fn supports_compilation(&self, kind: CompilationKind) -> bool {
        self.capabilities().supports_compilation(kind)
    }

    fn compile(
        &self,
        problem: &Problem,
        kind: CompilationKind,
    ) -> Result<CompilerResult, GroundingError>;
}

/// Output of a compilation: the new problem and the way back to the original's actions.
#[derive(Debug)]
pub struct CompilerResult {
    pub problem: Problem,
    pub mapper: ActionInstanceMapper,
    pub engine_name: String,
}

impl CompilerResult {
    pub fn map_back_action_instance(
        &self,
        ai: &ActionInstance,
    ) -> Result<ActionInstance, GroundingError> {
        self.mapper.map_back(ai)
    }

    /// Maps every step of a plan for the compiled problem back to the original problem.
    pub fn map_back_plan(&self, plan: &SequentialPlan) -> Result<SequentialPlan, GroundingError> {
        plan.replace_action_instances(|ai| self.map_back_action_instance(ai))
    }
}
