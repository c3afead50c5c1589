//! One-shot planners.

mod bfs;
mod error;

use std::time::Duration;

use serde::Serialize;
use strum_macros::Display;

pub use bfs::BreadthFirstPlanner;
pub use error::SolverError;

use crate::{
    capability::Capabilities,
    model::{Problem, ProblemKind, SequentialPlan},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanGenerationResultStatus {
    SolvedSatisficing,
    /// The whole reachable state space was explored without reaching the goals.
    Unsolvable,
    SearchLimitReached,
    Cancelled,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    pub expansions: usize,
    pub generated: usize,
    pub solve_time: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanGenerationResult {
    pub status: PlanGenerationResultStatus,
    pub plan: Option<SequentialPlan>,
    pub engine_name: String,
    pub statistics: SearchStatistics,
}

pub trait Planner: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    fn supports(&self, kind: &ProblemKind) -> bool {
        self.capabilities().supports(kind)
    }

    fn solve(&self, problem: &Problem) -> Result<PlanGenerationResult, SolverError>;
}
