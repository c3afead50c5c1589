use log::{debug, trace};
use num::{BigRational, Zero};

use super::{
    FailedCheck, MetricEvaluation, PlanValidator, ValidationError, ValidationResult,
    ValidationResultStatus,
};
use crate::{
    cancel::CancellationToken,
    capability::Capabilities,
    model::{
        bind, Binding, Evaluator, Feature, ModelError, Problem, ProblemKind, QualityMetric,
        SequentialPlan, Value,
    },
    options::ValidatorOptions,
};

/// Validates sequential plans by simulating them from the initial state.
///
/// Without `evaluate_metrics`, problems carrying quality metrics are answered with
/// [`ValidationResultStatus::Unknown`] and [`FailedCheck::MetricUnsupported`].
#[derive(Clone, Debug)]
pub struct SequentialPlanValidator {
    options: ValidatorOptions,
    capabilities: Capabilities,
    cancel: Option<CancellationToken>,
}

impl Default for SequentialPlanValidator {
    fn default() -> Self {
        Self::new(ValidatorOptions::default())
    }
}

impl SequentialPlanValidator {
    pub const NAME: &'static str = "sequential-plan-validator";
    pub const NAME_WITH_METRICS: &'static str = "sequential-plan-validator-metrics";

    pub fn new(options: ValidatorOptions) -> Self {
        let kind = if options.evaluate_metrics {
            ProblemKind::all()
        } else {
            ProblemKind::all().without(&[
                Feature::PlanLength,
                Feature::ActionsCost,
                Feature::FinalValue,
            ])
        };
        Self {
            options,
            capabilities: Capabilities::new(kind),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn result(
        &self,
        status: ValidationResultStatus,
        reason: Option<FailedCheck>,
        trace_length: usize,
    ) -> ValidationResult {
        ValidationResult {
            status,
            engine_name: self.name().to_string(),
            reason,
            trace_length,
            metric_evaluations: Vec::new(),
        }
    }
}

impl PlanValidator for SequentialPlanValidator {
    fn name(&self) -> &str {
        if self.options.evaluate_metrics {
            Self::NAME_WITH_METRICS
        } else {
            Self::NAME
        }
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn validate(
        &self,
        problem: &Problem,
        plan: &SequentialPlan,
    ) -> Result<ValidationResult, ValidationError> {
        let metrics = problem.quality_metrics();
        if !metrics.is_empty() && !self.options.evaluate_metrics {
            debug!("{}: {} has quality metrics", self.name(), problem.name());
            return Ok(self.result(
                ValidationResultStatus::Unknown,
                Some(FailedCheck::MetricUnsupported),
                0,
            ));
        }

        let eval = Evaluator::new(problem);
        let mut state = problem.initial_state();
        // running sum per action-cost metric
        let mut costs = vec![BigRational::zero(); metrics.len()];

        for (step, ai) in plan.actions().iter().enumerate() {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(ValidationError::Cancelled);
            }
            let action = problem.action(&ai.action)?;
            problem.check_arguments(action, &ai.args)?;
            let binding = bind(&action.parameters, &ai.args);

            if let Some(condition) = eval.first_unsatisfied(action, &state, &binding)? {
                debug!("{}: step {} {} is not applicable", problem.name(), step, ai);
                return Ok(self.result(
                    ValidationResultStatus::Invalid,
                    Some(FailedCheck::InapplicablePrecondition {
                        step,
                        action: ai.clone(),
                        condition: condition.clone(),
                    }),
                    step,
                ));
            }
            for (acc, metric) in costs.iter_mut().zip(metrics) {
                if !matches!(metric, QualityMetric::MinimizeActionCosts { .. }) {
                    continue;
                }
                let cost = metric
                    .action_cost(&action.name)
                    .ok_or_else(|| ValidationError::MissingActionCost(action.name.clone()))?;
                match eval.evaluate(cost, &state, &binding)? {
                    Value::Number(n) => *acc += n,
                    _ => return Err(ModelError::NotNumeric(cost.to_string()).into()),
                }
            }
            state = eval.apply(action, &state, &binding)?;
            trace!("step {}: {} -> {}", step, ai, state);
        }

        if let Some(goal) = eval.first_unreached_goal(&state)? {
            debug!("{}: goal {} not reached", problem.name(), goal);
            return Ok(self.result(
                ValidationResultStatus::Invalid,
                Some(FailedCheck::GoalNotReached { goal: goal.clone() }),
                plan.len(),
            ));
        }

        let empty = Binding::new();
        let mut metric_evaluations = Vec::with_capacity(metrics.len());
        for (metric, cost) in metrics.iter().zip(costs) {
            let value = match metric {
                QualityMetric::MinimizeSequentialPlanLength => Value::int(plan.len() as i64),
                QualityMetric::MinimizeActionCosts { .. } => Value::Number(cost),
                QualityMetric::MinimizeExpressionOnFinalState(e)
                | QualityMetric::MaximizeExpressionOnFinalState(e) => {
                    eval.evaluate(e, &state, &empty)?
                }
            };
            metric_evaluations.push(MetricEvaluation {
                metric: metric.clone(),
                value,
            });
        }
        debug!(
            "{}: plan of {} steps is valid for {}",
            self.name(),
            plan.len(),
            problem.name()
        );
        Ok(ValidationResult {
            metric_evaluations,
            ..self.result(ValidationResultStatus::Valid, None, plan.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        examples,
        model::{ActionInstance, Expr, Fluent, FluentInstance},
    };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn step(action: &str, args: &[&str]) -> ActionInstance {
        ActionInstance::new(action, args.iter().copied())
    }

    fn plan(steps: Vec<ActionInstance>) -> SequentialPlan {
        SequentialPlan::new(steps)
    }

    #[test]
    fn test_empty_plan() {
        init_logger();
        let mut problem = Problem::new("trivial");
        problem.add_fluent(Fluent::boolean("p", vec![])).unwrap();
        problem
            .set_initial_value(FluentInstance::new("p", Vec::<String>::new()), true)
            .unwrap();
        problem.add_goal(Expr::fluent("p", vec![])).unwrap();
        let validator = SequentialPlanValidator::default();
        let result = validator.validate(&problem, &SequentialPlan::default()).unwrap();
        assert_eq!(result.status, ValidationResultStatus::Valid);
        assert_eq!(result.engine_name, SequentialPlanValidator::NAME);
        assert_eq!(result.trace_length, 0);

        let basic = examples::basic().unwrap();
        let result = validator.validate(&basic, &SequentialPlan::default()).unwrap();
        assert_eq!(result.status, ValidationResultStatus::Invalid);
        assert_eq!(
            result.reason,
            Some(FailedCheck::GoalNotReached {
                goal: Expr::fluent("x", vec![])
            })
        );
    }

    #[test]
    fn test_inapplicable_action_is_flagged() {
        let problem = examples::basic().unwrap();
        let validator = SequentialPlanValidator::default();
        assert!(validator
            .validate(&problem, &plan(vec![step("a", &[])]))
            .unwrap()
            .is_valid());
        let result = validator
            .validate(&problem, &plan(vec![step("a", &[]), step("a", &[])]))
            .unwrap();
        assert_eq!(result.status, ValidationResultStatus::Invalid);
        assert_eq!(result.trace_length, 1);
        match result.reason {
            Some(FailedCheck::InapplicablePrecondition {
                step,
                action,
                condition,
            }) => {
                assert_eq!(step, 1);
                assert_eq!(action, ActionInstance::ground("a"));
                assert_eq!(condition.to_string(), "(not (x))");
            }
            other => panic!("unexpected reason {:?}", other),
        }
    }

    #[test]
    fn test_quantified_preconditions() {
        let problem = examples::blocks_forall().unwrap();
        let validator = SequentialPlanValidator::default();
        let good = plan(vec![
            step("move", &["b", "a", "table"]),
            step("move", &["a", "table", "b"]),
        ]);
        assert!(validator.validate(&problem, &good).unwrap().is_valid());

        let bad = plan(vec![step("move", &["a", "table", "b"])]);
        let result = validator.validate(&problem, &bad).unwrap();
        assert_eq!(
            result.reason.map(|r| r.to_string()),
            Some(
                "step 0: precondition (forall (?z - thing) (not (on ?z ?x))) \
                 of move(a, table, b) does not hold"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let problem = examples::logistics().unwrap();
        let validator = SequentialPlanValidator::default();
        assert!(matches!(
            validator.validate(&problem, &plan(vec![step("fly", &["t1"])])),
            Err(ValidationError::Model(ModelError::UnknownAction(_)))
        ));
        assert!(matches!(
            validator.validate(&problem, &plan(vec![step("drive", &["p1", "l1", "l2"])])),
            Err(ValidationError::Model(ModelError::TypeMismatch { .. }))
        ));

        let token = CancellationToken::new();
        token.cancel();
        let cancelled = SequentialPlanValidator::default().with_cancellation(token);
        assert!(matches!(
            cancelled.validate(&problem, &plan(vec![step("drive", &["t1", "l1", "l2"])])),
            Err(ValidationError::Cancelled)
        ));
    }

    #[test]
    fn test_metrics_need_support() {
        init_logger();
        let problem = examples::basic_with_costs().unwrap();
        let steps = plan(vec![step("a", &[])]);

        let validator = SequentialPlanValidator::default();
        assert!(!validator.supports(&problem.kind()));
        let result = validator.validate(&problem, &steps).unwrap();
        assert_eq!(result.status, ValidationResultStatus::Unknown);
        assert_eq!(result.reason, Some(FailedCheck::MetricUnsupported));

        let mut stripped = problem.clone();
        stripped.clear_quality_metrics();
        assert!(validator.supports(&stripped.kind()));
        assert!(validator.validate(&stripped, &steps).unwrap().is_valid());

        let with_metrics = SequentialPlanValidator::new(ValidatorOptions {
            evaluate_metrics: true,
        });
        assert!(with_metrics.supports(&problem.kind()));
        let result = with_metrics.validate(&problem, &steps).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.engine_name, SequentialPlanValidator::NAME_WITH_METRICS);
        assert_eq!(result.metric_evaluations[0].value, Value::int(1));
    }

    #[test]
    fn test_numeric_plan_and_metrics() {
        init_logger();
        let problem = examples::farmland_with_metrics().unwrap();
        let validator = SequentialPlanValidator::new(ValidatorOptions {
            evaluate_metrics: true,
        });
        let steps = plan(vec![
            step("move_fast", &["f0", "f1"]),
            step("move_slow", &["f0", "f1"]),
            step("move_slow", &["f0", "f1"]),
            step("move_slow", &["f0", "f1"]),
        ]);
        let result = validator.validate(&problem, &steps).unwrap();
        assert_eq!(result.status, ValidationResultStatus::Valid);
        assert_eq!(
            result
                .metric_evaluations
                .iter()
                .map(|m| m.value.clone())
                .collect::<Vec<_>>(),
            // final cost, then 8 workers sent by move_fast plus three slow moves
            vec![Value::int(4), Value::int(11)]
        );

        let short = plan(vec![step("move_fast", &["f0", "f1"]), step("move_fast", &["f0", "f1"])]);
        let result = validator.validate(&problem, &short).unwrap();
        assert!(matches!(
            result.reason,
            Some(FailedCheck::GoalNotReached { .. })
        ));
        let result = validator
            .validate(&problem, &plan(vec![step("move_fast", &["f1", "f0"])]))
            .unwrap();
        assert_eq!(result.trace_length, 0);
        assert_eq!(result.status, ValidationResultStatus::Invalid);
    }
}
