use crate::model::{
    Action, Effect, Expr, Fluent, FluentInstance, ModelError, Parameter, Problem, QualityMetric,
};

/// Workers spread over two adjacent farms.
///
/// `move_fast` sends four workers away but only two arrive; `move_slow` moves one. Every move
/// adds one to `cost`. Goal: at least five workers on `f1`.
pub fn farmland() -> Result<Problem, ModelError> {
    let mut problem = Problem::new("farmland");
    problem.add_type("farm", None)?;
    problem.add_objects(&["f0", "f1"], "farm")?;
    problem.add_fluent(Fluent::numeric("x", vec![Parameter::new("f", "farm")]))?;
    problem.add_fluent(Fluent::boolean(
        "adj",
        vec![Parameter::new("a", "farm"), Parameter::new("b", "farm")],
    ))?;
    problem.add_fluent(Fluent::numeric("cost", vec![]).with_default(0))?;

    let x = |f: &str| Expr::fluent("x", vec![Expr::var(f)]);
    let params = vec![Parameter::new("a", "farm"), Parameter::new("b", "farm")];
    let adjacent = Expr::fluent("adj", vec![Expr::var("a"), Expr::var("b")]);
    problem.add_action(
        Action::new("move_fast", params.clone())
            .precondition(adjacent.clone())
            .precondition(Expr::ge(x("a"), Expr::int(4)))
            .effect(Effect::decrease("x", vec![Expr::var("a")], 4))
            .effect(Effect::increase("x", vec![Expr::var("b")], 2))
            .effect(Effect::increase("cost", vec![], 1)),
    )?;
    problem.add_action(
        Action::new("move_slow", params)
            .precondition(adjacent)
            .precondition(Expr::ge(x("a"), Expr::int(1)))
            .effect(Effect::decrease("x", vec![Expr::var("a")], 1))
            .effect(Effect::increase("x", vec![Expr::var("b")], 1))
            .effect(Effect::increase("cost", vec![], 1)),
    )?;

    problem.set_initial_value(FluentInstance::new("x", ["f0"]), 8)?;
    problem.set_initial_value(FluentInstance::new("x", ["f1"]), 0)?;
    problem.set_true("adj", &["f0", "f1"])?;
    problem.set_true("adj", &["f1", "f0"])?;
    problem.add_goal(Expr::ge(
        Expr::fluent("x", vec![Expr::obj("f1")]),
        Expr::int(5),
    ))?;
    Ok(problem)
}

/// [`farmland`] minimizing the final value of `cost`, with `move_fast` priced by the workers it
/// sends away.
pub fn farmland_with_metrics() -> Result<Problem, ModelError> {
    let mut problem = farmland()?;
    problem.add_quality_metric(QualityMetric::MinimizeExpressionOnFinalState(
        Expr::fluent("cost", vec![]),
    ));
    problem.add_quality_metric(QualityMetric::action_costs(
        [("move_fast", Expr::fluent("x", vec![Expr::var("a")]))],
        Some(Expr::int(1)),
    ));
    Ok(problem)
}
