//! End-to-end: ground, solve the ground problem, map the plan back and validate it against the
//! lifted problem.

use pretty_assertions::assert_eq;

use crate::{
    capability::CompilationKind,
    examples,
    factory::Factory,
    grounding::{Grounder, GroundingCache},
    model::{Action, Feature, ModelError, Problem},
    solvers::PlanGenerationResultStatus,
    validation::ValidationResultStatus,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn grounding_problems() -> Vec<(&'static str, Result<Problem, ModelError>)> {
    vec![
        ("basic", examples::basic()),
        ("conditional_effects", examples::conditional_effects()),
        ("cost_metric", examples::basic_with_costs()),
        ("length_metric", examples::basic_with_plan_length()),
        ("blocks_forall", examples::blocks_forall()),
        ("logistics", examples::logistics()),
        ("farmland_metrics", examples::farmland_with_metrics()),
    ]
}

#[test]
fn test_result_is_grounded() {
    init_logger();
    let factory = Factory::default();
    let cache = GroundingCache::new();
    let grounder = factory.compiler(Grounder::NAME).unwrap();
    assert!(grounder.supports_compilation(CompilationKind::Grounding));
    for (name, problem) in grounding_problems() {
        let problem = problem.unwrap();
        if !grounder.supports(&problem.kind()) {
            continue;
        }
        let result = cache.result(grounder.as_ref(), &problem).unwrap();
        let ground = &result.problem;
        assert!(ground.actions().iter().all(Action::is_ground), "{}", name);
        assert!(
            ground
                .goals()
                .iter()
                .all(|g| !g.is_quantified() && g.free_variables().is_empty()),
            "{}",
            name
        );
        let kind = ground.kind();
        assert!(!kind.has_named("UNIVERSAL_CONDITIONS"), "{}", name);
        assert!(!kind.has_named("EXISTENTIAL_CONDITIONS"), "{}", name);
        assert_eq!(
            kind.has_metrics(),
            problem.kind().has_metrics(),
            "{}",
            name
        );
    }
}

#[test]
fn test_plan_transfers() {
    init_logger();
    let factory = Factory::default();
    let cache = GroundingCache::new();
    let grounder = factory.compiler(Grounder::NAME).unwrap();
    for (name, problem) in grounding_problems() {
        let problem = problem.unwrap();
        if !grounder.supports(&problem.kind()) {
            continue;
        }
        let result = cache.result(grounder.as_ref(), &problem).unwrap();
        let ground = &result.problem;

        let planner = factory.oneshot_planner(&ground.kind()).unwrap();
        let solved = planner.solve(ground).unwrap();
        let Some(plan) = solved.plan else {
            continue;
        };
        let transferred = result.map_back_plan(&plan).unwrap();
        assert_eq!(transferred.len(), plan.len());

        // judged on the logic alone
        let mut validation_problem = problem.clone();
        validation_problem.clear_quality_metrics();
        let validator = factory
            .plan_validator(&validation_problem.kind())
            .unwrap();
        let check = validator
            .validate(&validation_problem, &transferred)
            .unwrap();
        assert_eq!(check.status, ValidationResultStatus::Valid, "{}", name);
    }
    // every problem was ground exactly once
    assert_eq!(cache.misses(), grounding_problems().len());
    assert_eq!(cache.hits(), 0);
}

#[test]
fn test_metrics_survive_grounding() {
    init_logger();
    let factory = Factory::default();
    let problem = examples::farmland_with_metrics().unwrap();
    let result = Grounder::default().ground(&problem).unwrap();

    let planner = factory.oneshot_planner(&result.problem.kind()).unwrap();
    let plan = planner.solve(&result.problem).unwrap().plan.unwrap();
    let validator = factory.plan_validator(&problem.kind()).unwrap();
    assert!(validator.supports(&problem.kind()));

    let on_ground = validator.validate(&result.problem, &plan).unwrap();
    let on_lifted = validator
        .validate(&problem, &result.map_back_plan(&plan).unwrap())
        .unwrap();
    assert!(on_ground.is_valid());
    assert!(on_lifted.is_valid());
    let values = |r: &crate::validation::ValidationResult| {
        r.metric_evaluations
            .iter()
            .map(|m| m.value.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(values(&on_ground), values(&on_lifted));
}

#[test]
fn test_oneshot_numeric_planning() {
    init_logger();
    let factory = Factory::default();
    let problem = examples::farmland().unwrap();
    assert!(problem.kind().has(Feature::NumericFluents));
    let mut planners_run = 0;
    for name in factory.planner_names() {
        let planner = factory.planner(name).unwrap();
        if !planner.supports(&problem.kind()) {
            continue;
        }
        let solved = planner.solve(&problem).unwrap();
        assert_eq!(solved.status, PlanGenerationResultStatus::SolvedSatisficing);
        let plan = solved.plan.unwrap();
        let validator = factory.plan_validator(&problem.kind()).unwrap();
        assert!(validator.validate(&problem, &plan).unwrap().is_valid());
        planners_run += 1;
    }
    assert_eq!(planners_run, 1);
}
