use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use super::{Expr, Feature};

/// An objective a plan may be optimized against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum QualityMetric {
    MinimizeSequentialPlanLength,
    /// Sum of the cost of every applied action. Cost expressions may mention the action's
    /// parameters and are evaluated in the state the action is applied in.
    MinimizeActionCosts {
        costs: BTreeMap<String, Expr>,
        default: Option<Expr>,
    },
    MinimizeExpressionOnFinalState(Expr),
    MaximizeExpressionOnFinalState(Expr),
}

impl QualityMetric {
    pub fn action_costs<S: Into<String>>(
        costs: impl IntoIterator<Item = (S, Expr)>,
        default: Option<Expr>,
    ) -> Self {
        Self::MinimizeActionCosts {
            costs: costs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            default,
        }
    }

    /// Cost expression for `action`, falling back to the default.
    pub fn action_cost(&self, action: &str) -> Option<&Expr> {
        match self {
            Self::MinimizeActionCosts { costs, default } => {
                costs.get(action).or(default.as_ref())
            }
            _ => None,
        }
    }

    pub fn feature(&self) -> Feature {
        match self {
            Self::MinimizeSequentialPlanLength => Feature::PlanLength,
            Self::MinimizeActionCosts { .. } => Feature::ActionsCost,
            Self::MinimizeExpressionOnFinalState(_) | Self::MaximizeExpressionOnFinalState(_) => {
                Feature::FinalValue
            }
        }
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MinimizeSequentialPlanLength => write!(f, "minimize plan-length"),
            Self::MinimizeActionCosts { costs, default } => {
                write!(f, "minimize action-costs {{")?;
                for (i, (a, c)) in costs.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", a, c)?;
                }
                if let Some(d) = default {
                    write!(f, ", default: {}", d)?;
                }
                write!(f, "}}")
            }
            Self::MinimizeExpressionOnFinalState(e) => write!(f, "minimize {}", e),
            Self::MaximizeExpressionOnFinalState(e) => write!(f, "maximize {}", e),
        }
    }
}
