use crate::model::{
    Action, Effect, Expr, Fluent, ModelError, Parameter, Problem, QualityMetric,
};

fn v(name: &str) -> Expr {
    Expr::var(name)
}

fn o(name: &str) -> Expr {
    Expr::obj(name)
}

fn p(name: &str, ty: &str) -> Parameter {
    Parameter::new(name, ty)
}

/// One boolean fluent `x` and one action `a` that makes it true. Goal: `x`.
pub fn basic() -> Result<Problem, ModelError> {
    let mut problem = Problem::new("basic");
    problem.add_fluent(Fluent::boolean("x", vec![]))?;
    problem.add_action(
        Action::new("a", vec![])
            .precondition(Expr::not(Expr::fluent("x", vec![])))
            .effect(Effect::assign("x", vec![], true)),
    )?;
    problem.add_goal(Expr::fluent("x", vec![]))?;
    Ok(problem)
}

/// [`basic`] with a constant action cost of 1 for `a`.
pub fn basic_with_costs() -> Result<Problem, ModelError> {
    let mut problem = basic()?;
    problem.add_quality_metric(QualityMetric::action_costs([("a", Expr::int(1))], None));
    Ok(problem)
}

/// [`basic`] minimizing plan length.
pub fn basic_with_plan_length() -> Result<Problem, ModelError> {
    let mut problem = basic()?;
    problem.add_quality_metric(QualityMetric::MinimizeSequentialPlanLength);
    Ok(problem)
}

/// `z` only becomes true if `a_y` runs after `a_x`.
pub fn conditional_effects() -> Result<Problem, ModelError> {
    let mut problem = Problem::new("conditional_effects");
    for f in ["x", "y", "z"] {
        problem.add_fluent(Fluent::boolean(f, vec![]))?;
    }
    let x = Expr::fluent("x", vec![]);
    let y = Expr::fluent("y", vec![]);
    problem.add_action(
        Action::new("a_x", vec![])
            .precondition(Expr::not(x.clone()))
            .effect(Effect::assign("x", vec![], true)),
    )?;
    problem.add_action(
        Action::new("a_y", vec![])
            .precondition(Expr::not(y))
            .effect(Effect::assign("y", vec![], true))
            .effect(Effect::assign("z", vec![], true).when(x)),
    )?;
    problem.add_goal(Expr::fluent("z", vec![]))?;
    Ok(problem)
}

/// Two blocks and a table. `block` is a subtype of `thing`, so the three objects are `a`, `b`
/// (blocks) and `table` (a plain thing). A block can only be moved when nothing is on it, which is
/// stated with a `forall` over every thing.
///
/// Initially `b` is on `a` and `a` is on the table; the goal is `a` on `b`.
pub fn blocks_forall() -> Result<Problem, ModelError> {
    let mut problem = Problem::new("blocks_forall");
    problem.add_type("thing", None)?;
    problem.add_type("block", Some("thing"))?;
    problem.add_objects(&["a", "b"], "block")?;
    problem.add_object("table", "thing")?;
    problem.add_fluent(Fluent::boolean("on", vec![p("x", "thing"), p("y", "thing")]))?;

    let on = |a: Expr, b: Expr| Expr::fluent("on", vec![a, b]);
    let nothing_on = |target: Expr| {
        Expr::forall(vec![p("z", "thing")], Expr::not(on(v("z"), target)))
    };
    problem.add_action(
        Action::new(
            "move",
            vec![p("x", "block"), p("from", "thing"), p("to", "thing")],
        )
        .precondition(on(v("x"), v("from")))
        .precondition(nothing_on(v("x")))
        .precondition(Expr::or(vec![Expr::eq(v("to"), o("table")), nothing_on(v("to"))]))
        .precondition(Expr::not(Expr::eq(v("x"), v("to"))))
        .precondition(Expr::not(Expr::eq(v("from"), v("to"))))
        .effect(Effect::assign("on", vec![v("x"), v("from")], false))
        .effect(Effect::assign("on", vec![v("x"), v("to")], true)),
    )?;

    problem.set_true("on", &["a", "table"])?;
    problem.set_true("on", &["b", "a"])?;
    problem.add_goal(on(o("a"), o("b")))?;
    Ok(problem)
}

/// One truck carrying two packages over three locations connected in a line.
///
/// Goals: `p1` at `l3`, and `p2` inside some truck (an `exists` goal). `road` is static.
/// `unload` also asks, redundantly, that the truck be at some location.
pub fn logistics() -> Result<Problem, ModelError> {
    let mut problem = Problem::new("logistics");
    problem.add_type("locatable", None)?;
    problem.add_type("location", None)?;
    problem.add_type("truck", Some("locatable"))?;
    problem.add_type("package", Some("locatable"))?;
    problem.add_object("t1", "truck")?;
    problem.add_objects(&["p1", "p2"], "package")?;
    problem.add_objects(&["l1", "l2", "l3"], "location")?;

    problem.add_fluent(Fluent::boolean("at", vec![p("x", "locatable"), p("l", "location")]))?;
    problem.add_fluent(Fluent::boolean("in", vec![p("p", "package"), p("t", "truck")]))?;
    problem.add_fluent(Fluent::boolean("road", vec![p("from", "location"), p("to", "location")]))?;

    let at = |a: Expr, b: Expr| Expr::fluent("at", vec![a, b]);
    let inside = |a: Expr, b: Expr| Expr::fluent("in", vec![a, b]);
    let cargo = vec![p("p", "package"), p("t", "truck"), p("l", "location")];
    problem.add_action(
        Action::new("load", cargo.clone())
            .precondition(at(v("t"), v("l")))
            .precondition(at(v("p"), v("l")))
            .effect(Effect::assign("at", vec![v("p"), v("l")], false))
            .effect(Effect::assign("in", vec![v("p"), v("t")], true)),
    )?;
    problem.add_action(
        Action::new("unload", cargo)
            .precondition(at(v("t"), v("l")))
            .precondition(inside(v("p"), v("t")))
            .precondition(Expr::exists(vec![p("s", "location")], at(v("t"), v("s"))))
            .effect(Effect::assign("in", vec![v("p"), v("t")], false))
            .effect(Effect::assign("at", vec![v("p"), v("l")], true)),
    )?;
    problem.add_action(
        Action::new(
            "drive",
            vec![p("t", "truck"), p("from", "location"), p("to", "location")],
        )
        .precondition(at(v("t"), v("from")))
        .precondition(Expr::fluent("road", vec![v("from"), v("to")]))
        .effect(Effect::assign("at", vec![v("t"), v("from")], false))
        .effect(Effect::assign("at", vec![v("t"), v("to")], true)),
    )?;

    problem.set_true("at", &["t1", "l1"])?;
    problem.set_true("at", &["p1", "l1"])?;
    problem.set_true("at", &["p2", "l2"])?;
    for (a, b) in [("l1", "l2"), ("l2", "l1"), ("l2", "l3"), ("l3", "l2")] {
        problem.set_true("road", &[a, b])?;
    }
    problem.add_goal(at(o("p1"), o("l3")))?;
    problem.add_goal(Expr::exists(vec![p("t", "truck")], inside(o("p2"), v("t"))))?;
    Ok(problem)
}
