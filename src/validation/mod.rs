//! Plan validation by simulation.

mod error;
mod sequential;

use std::fmt;

use serde::Serialize;
use strum_macros::Display;

pub use error::ValidationError;
pub use sequential::SequentialPlanValidator;

use crate::{
    capability::Capabilities,
    model::{ActionInstance, Expr, Problem, ProblemKind, QualityMetric, SequentialPlan, Value},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationResultStatus {
    Valid,
    Invalid,
    /// The validator could not decide, see the reason.
    Unknown,
}

/// Why a plan was not found valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FailedCheck {
    InapplicablePrecondition {
        step: usize,
        action: ActionInstance,
        condition: Expr,
    },
    GoalNotReached {
        goal: Expr,
    },
    MetricUnsupported,
}

impl fmt::Display for FailedCheck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InapplicablePrecondition {
                step,
                action,
                condition,
            } => write!(
                f,
                "step {}: precondition {} of {} does not hold",
                step, condition, action
            ),
            Self::GoalNotReached { goal } => write!(f, "goal {} is not reached", goal),
            Self::MetricUnsupported => write!(f, "quality metrics are not supported"),
        }
    }
}

/// The value a quality metric takes on a valid plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetricEvaluation {
    pub metric: QualityMetric,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub status: ValidationResultStatus,
    pub engine_name: String,
    pub reason: Option<FailedCheck>,
    /// Number of plan steps that were applied.
    pub trace_length: usize,
    pub metric_evaluations: Vec<MetricEvaluation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationResultStatus::Valid
    }
}

pub trait PlanValidator: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    fn supports(&self, kind: &ProblemKind) -> bool {
        self.capabilities().supports(kind)
    }

    /// Checks `plan` against `problem`. Failed checks are reported in the result; structural
    /// problems (unknown actions, ill-typed arguments, ill-typed expressions) are errors.
    fn validate(
        &self,
        problem: &Problem,
        plan: &SequentialPlan,
    ) -> Result<ValidationResult, ValidationError>;
}
