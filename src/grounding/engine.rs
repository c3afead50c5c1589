//! The enumerative grounder.

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, trace, warn};

use super::{simplify::Simplifier, ActionInstanceMapper, Compiler, CompilerResult, GroundingError};
use crate::{
    cancel::CancellationToken,
    capability::{Capabilities, CompilationKind},
    model::{
        bind, Action, ActionInstance, Binding, Effect, Expr, Problem, ProblemKind, QualityMetric,
        Universe,
    },
    options::GroundingOptions,
};

/// Grounds every action schema over the Cartesian product of the objects compatible with its
/// parameters and eliminates quantifiers by enumeration.
#[derive(Clone, Debug)]
pub struct Grounder {
    options: GroundingOptions,
    capabilities: Capabilities,
    cancel: Option<CancellationToken>,
}

impl Default for Grounder {
    fn default() -> Self {
        Self::new(GroundingOptions::default())
    }
}

/// Per-call state shared by the schemas of one problem.
struct Grounding<'a> {
    universe: Universe<'a>,
    simplifier: Option<Simplifier<'a>>,
    used_names: HashSet<String>,
    emitted: usize,
}

impl<'a> Grounding<'a> {
    /// Substitutes `binding`, removes quantifiers and, when pruning, folds constants.
    fn ground_expr(&self, expr: &Expr, binding: &Binding) -> Result<Expr, GroundingError> {
        let e = self.universe.expand_quantifiers(&expr.substitute(binding))?;
        Ok(match &self.simplifier {
            Some(s) => s.simplify(&e),
            None => e,
        })
    }

    fn fresh_name(&mut self, action: &str, args: &[&str]) -> String {
        let base = std::iter::once(action).chain(args.iter().copied()).join("_");
        let mut name = base.clone();
        let mut i = 1;
        while self.used_names.contains(&name) {
            name = format!("{}_{}", base, i);
            i += 1;
        }
        self.used_names.insert(name.clone());
        name
    }

    /// The ground action for one binding, or `None` when a precondition folds to false.
    fn ground_action(
        &self,
        action: &Action,
        binding: &Binding,
    ) -> Result<Option<(Vec<Expr>, Vec<Effect>)>, GroundingError> {
        let mut preconditions = Vec::with_capacity(action.preconditions.len());
        for p in &action.preconditions {
            match self.ground_expr(p, binding)? {
                Expr::Bool(false) if self.simplifier.is_some() => return Ok(None),
                Expr::Bool(true) if self.simplifier.is_some() => {}
                p => preconditions.push(p),
            }
        }
        let mut effects = Vec::with_capacity(action.effects.len());
        for e in &action.effects {
            let condition = self.ground_expr(&e.condition, binding)?;
            if self.simplifier.is_some() && condition == Expr::Bool(false) {
                trace!("{}: dropped effect {}", action.name, e);
                continue;
            }
            effects.push(Effect {
                fluent: e.fluent.clone(),
                args: e.args.iter().map(|a| a.substitute(binding)).collect(),
                kind: e.kind,
                value: self.ground_expr(&e.value, binding)?,
                condition,
            });
        }
        Ok(Some((preconditions, effects)))
    }
}

impl Grounder {
    pub const NAME: &'static str = "enumerative-grounder";

    pub fn new(options: GroundingOptions) -> Self {
        Self {
            options,
            capabilities: Capabilities::new(ProblemKind::all())
                .with_compilation(CompilationKind::Grounding),
            cancel: None,
        }
    }

    /// Restricts the features this grounder accepts.
    pub fn with_supported_kind(mut self, kind: ProblemKind) -> Self {
        self.capabilities.supported_kind = kind;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &GroundingOptions {
        &self.options
    }

    fn check_cancelled(&self) -> Result<(), GroundingError> {
        match &self.cancel {
            Some(t) if t.is_cancelled() => Err(GroundingError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Grounds `problem`. The result has no parameters, quantifiers or variables left.
    pub fn ground(&self, problem: &Problem) -> Result<CompilerResult, GroundingError> {
        let missing = self.capabilities.missing(&problem.kind());
        if !missing.is_empty() {
            return Err(GroundingError::UnsupportedFeature {
                engine: Self::NAME.to_string(),
                features: missing,
            });
        }

        let mut g = Grounding {
            universe: problem.universe(),
            simplifier: self.options.prune_static.then(|| Simplifier::new(problem)),
            used_names: HashSet::new(),
            emitted: 0,
        };
        let mut ground = problem.skeleton(format!("{}_grounded", problem.name()));
        let mut mapper = ActionInstanceMapper::new();
        let mut lifted_of = Vec::new();

        for action in problem.actions() {
            let total = g.universe.count_bindings(&action.parameters)?;
            let mut kept = 0;
            for objs in g.universe.bindings(&action.parameters)? {
                self.check_cancelled()?;
                let args = objs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>();
                let binding = bind(&action.parameters, &args);
                let Some((preconditions, effects)) = g.ground_action(action, &binding)? else {
                    trace!("{}({}) pruned", action.name, args.join(", "));
                    continue;
                };
                if let Some(max) = self.options.max_ground_actions {
                    if g.emitted >= max {
                        warn!(
                            "{}: stopped after {} ground actions, at {}({})",
                            problem.name(),
                            max,
                            action.name,
                            args.join(", ")
                        );
                        return Err(GroundingError::TooManyGroundActions(
                            problem.name().to_string(),
                            max,
                        ));
                    }
                }
                let name = g.fresh_name(&action.name, &args);
                ground.add_action(Action {
                    name: name.clone(),
                    parameters: Vec::new(),
                    preconditions,
                    effects,
                })?;
                mapper.insert(name.clone(), ActionInstance::new(&action.name, args));
                lifted_of.push((name, action, binding));
                g.emitted += 1;
                kept += 1;
            }
            debug!("{}: {} of {} bindings kept", action.name, kept, total);
        }

        let empty = Binding::new();
        for goal in problem.goals() {
            match g.ground_expr(goal, &empty)? {
                Expr::Bool(true) if g.simplifier.is_some() => {}
                goal => ground.add_goal(goal)?,
            }
        }

        for metric in problem.quality_metrics() {
            let metric = match metric {
                QualityMetric::MinimizeSequentialPlanLength => metric.clone(),
                QualityMetric::MinimizeActionCosts { .. } => {
                    let mut costs = Vec::with_capacity(lifted_of.len());
                    for (name, action, binding) in &lifted_of {
                        if let Some(cost) = metric.action_cost(&action.name) {
                            costs.push((name.clone(), g.ground_expr(cost, binding)?));
                        }
                    }
                    QualityMetric::action_costs(costs, None)
                }
                QualityMetric::MinimizeExpressionOnFinalState(e) => {
                    QualityMetric::MinimizeExpressionOnFinalState(g.ground_expr(e, &empty)?)
                }
                QualityMetric::MaximizeExpressionOnFinalState(e) => {
                    QualityMetric::MaximizeExpressionOnFinalState(g.ground_expr(e, &empty)?)
                }
            };
            ground.add_quality_metric(metric);
        }

        debug!(
            "grounded {} into {} actions and {} goals",
            problem.name(),
            ground.actions().len(),
            ground.goals().len()
        );
        Ok(CompilerResult {
            problem: ground,
            mapper,
            engine_name: Self::NAME.to_string(),
        })
    }
}

impl Compiler for Grounder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn compile(
        &self,
        problem: &Problem,
        kind: CompilationKind,
    ) -> Result<CompilerResult, GroundingError> {
        if !self.supports_compilation(kind) {
            return Err(GroundingError::UnsupportedCompilation(
                Self::NAME.to_string(),
                kind,
            ));
        }
        self.ground(problem)
    }
}
