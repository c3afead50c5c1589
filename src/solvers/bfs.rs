//! Blind breadth-first search over states.

use std::{
    collections::{HashSet, VecDeque},
    time::Instant,
};

use log::{debug, trace, warn};

use super::{
    PlanGenerationResult, PlanGenerationResultStatus, Planner, SearchStatistics, SolverError,
};
use crate::{
    cancel::CancellationToken,
    capability::Capabilities,
    model::{bind, Action, ActionInstance, Binding, Evaluator, Problem, ProblemKind, State},
    options::SearchOptions,
};

/// A candidate step: an action with one type-correct binding of its parameters.
struct Candidate<'a> {
    action: &'a Action,
    args: Vec<String>,
    binding: Binding,
}

struct Node {
    state: State,
    // (parent node, candidate index)
    parent: Option<(usize, usize)>,
}

/// Explores states in breadth-first order using the same transition function as the plan
/// validator, so the plans it returns are shortest and valid by construction. Lifted problems are
/// handled by enumerating every binding of every action up front. Quality metrics are ignored.
#[derive(Clone, Debug)]
pub struct BreadthFirstPlanner {
    options: SearchOptions,
    capabilities: Capabilities,
    cancel: Option<CancellationToken>,
}

impl Default for BreadthFirstPlanner {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

impl BreadthFirstPlanner {
    pub const NAME: &'static str = "breadth-first";

    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            capabilities: Capabilities::new(ProblemKind::all()),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn candidates<'a>(&self, problem: &'a Problem) -> Result<Vec<Candidate<'a>>, SolverError> {
        let universe = problem.universe();
        let mut out = Vec::new();
        for action in problem.actions() {
            for objs in universe.bindings(&action.parameters)? {
                let args = objs.iter().map(|o| o.name.clone()).collect::<Vec<_>>();
                let binding = bind(&action.parameters, &args);
                out.push(Candidate {
                    action,
                    args,
                    binding,
                });
            }
        }
        Ok(out)
    }

    fn result(
        &self,
        status: PlanGenerationResultStatus,
        plan: Option<crate::model::SequentialPlan>,
        statistics: SearchStatistics,
    ) -> PlanGenerationResult {
        PlanGenerationResult {
            status,
            plan,
            engine_name: Self::NAME.to_string(),
            statistics,
        }
    }
}

fn extract_plan(nodes: &[Node], candidates: &[Candidate], mut last: usize) -> Vec<ActionInstance> {
    let mut steps = Vec::new();
    while let Some((parent, c)) = nodes[last].parent {
        let c = &candidates[c];
        steps.push(ActionInstance::new(&c.action.name, c.args.iter().cloned()));
        last = parent;
    }
    steps.reverse();
    steps
}

impl Planner for BreadthFirstPlanner {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn solve(&self, problem: &Problem) -> Result<PlanGenerationResult, SolverError> {
        let kind = problem.kind();
        if !self.supports(&kind) {
            return Err(SolverError::UnsupportedProblem(Self::NAME.to_string(), kind));
        }
        let start = Instant::now();
        let eval = Evaluator::new(problem);
        let candidates = self.candidates(problem)?;
        debug!("{}: {} candidate steps", problem.name(), candidates.len());

        let mut stats = SearchStatistics::default();
        let initial = problem.initial_state();
        let mut nodes = vec![Node {
            state: initial.clone(),
            parent: None,
        }];
        if eval.first_unreached_goal(&initial)?.is_none() {
            stats.solve_time = start.elapsed();
            return Ok(self.result(
                PlanGenerationResultStatus::SolvedSatisficing,
                Some(Default::default()),
                stats,
            ));
        }
        let mut seen = HashSet::from([initial]);
        let mut frontier = VecDeque::from([0]);

        while let Some(current) = frontier.pop_front() {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                stats.solve_time = start.elapsed();
                return Ok(self.result(PlanGenerationResultStatus::Cancelled, None, stats));
            }
            if stats.expansions >= self.options.max_expansions {
                warn!(
                    "{}: search stopped after {} expansions",
                    problem.name(),
                    stats.expansions
                );
                stats.solve_time = start.elapsed();
                return Ok(self.result(
                    PlanGenerationResultStatus::SearchLimitReached,
                    None,
                    stats,
                ));
            }
            stats.expansions += 1;
            for (i, c) in candidates.iter().enumerate() {
                let state = &nodes[current].state;
                if eval.first_unsatisfied(c.action, state, &c.binding)?.is_some() {
                    continue;
                }
                let next = eval.apply(c.action, state, &c.binding)?;
                stats.generated += 1;
                if !seen.insert(next.clone()) {
                    continue;
                }
                let reached = eval.first_unreached_goal(&next)?.is_none();
                nodes.push(Node {
                    state: next,
                    parent: Some((current, i)),
                });
                if reached {
                    let plan = extract_plan(&nodes, &candidates, nodes.len() - 1);
                    stats.solve_time = start.elapsed();
                    debug!(
                        "{}: plan of {} steps after {} expansions",
                        problem.name(),
                        plan.len(),
                        stats.expansions
                    );
                    return Ok(self.result(
                        PlanGenerationResultStatus::SolvedSatisficing,
                        Some(plan.into_iter().collect()),
                        stats,
                    ));
                }
                trace!("{}: new state via {}", problem.name(), i);
                frontier.push_back(nodes.len() - 1);
            }
        }
        stats.solve_time = start.elapsed();
        debug!("{}: unsolvable after {} expansions", problem.name(), stats.expansions);
        Ok(self.result(PlanGenerationResultStatus::Unsolvable, None, stats))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        examples,
        model::{Expr, Fluent},
    };

    fn solve(problem: &Problem) -> PlanGenerationResult {
        let _ = env_logger::builder().is_test(true).try_init();
        BreadthFirstPlanner::default().solve(problem).unwrap()
    }

    #[test]
    fn test_shortest_plans() {
        let result = solve(&examples::basic().unwrap());
        assert_eq!(result.status, PlanGenerationResultStatus::SolvedSatisficing);
        assert_eq!(
            result.plan.unwrap().to_pairs(),
            vec![("a".to_string(), vec![])]
        );

        let result = solve(&examples::blocks_forall().unwrap());
        assert_eq!(
            result.plan.unwrap().to_string(),
            "SequentialPlan:\n    move(b, a, table)\n    move(a, table, b)\n"
        );

        let result = solve(&examples::farmland().unwrap());
        assert_eq!(result.plan.unwrap().len(), 4);
    }

    #[test]
    fn test_trivial_and_unsolvable_problems() {
        let mut problem = examples::basic().unwrap();
        problem
            .add_goal(Expr::not(Expr::fluent("x", vec![])))
            .unwrap();
        // x and not x
        assert_eq!(solve(&problem).status, PlanGenerationResultStatus::Unsolvable);

        let mut problem = Problem::new("nothing_to_do");
        problem.add_fluent(Fluent::boolean("p", vec![])).unwrap();
        problem
            .add_goal(Expr::not(Expr::fluent("p", vec![])))
            .unwrap();
        let result = solve(&problem);
        assert_eq!(result.status, PlanGenerationResultStatus::SolvedSatisficing);
        assert!(result.plan.unwrap().is_empty());
    }

    #[test]
    fn test_limits_and_cancellation() {
        let problem = examples::blocks_forall().unwrap();
        let limited = BreadthFirstPlanner::new(SearchOptions { max_expansions: 1 });
        let result = limited.solve(&problem).unwrap();
        assert_eq!(result.status, PlanGenerationResultStatus::SearchLimitReached);
        assert_eq!(result.statistics.expansions, 1);
        assert_eq!(result.plan, None);

        let token = CancellationToken::new();
        token.cancel();
        let cancelled = BreadthFirstPlanner::default().with_cancellation(token);
        assert_eq!(
            cancelled.solve(&problem).unwrap().status,
            PlanGenerationResultStatus::Cancelled
        );
    }
}
