//! Constant folding over ground expressions, with static fluents read from the initial state.

use std::collections::HashSet;

use num::Zero;

use crate::model::{Expr, FluentInstance, Problem, State, Value};

pub(crate) struct Simplifier<'a> {
    problem: &'a Problem,
    statics: HashSet<String>,
    initial: State,
}

impl<'a> Simplifier<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            statics: problem.static_fluents(),
            initial: problem.initial_state(),
        }
    }

    fn static_value(&self, name: &str, args: &[Expr]) -> Option<Expr> {
        if !self.statics.contains(name) {
            return None;
        }
        let objects = args
            .iter()
            .map(|a| match a {
                Expr::Object(o) => Some(o.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        let fi = FluentInstance {
            fluent: name.to_string(),
            args: objects,
        };
        // ill-typed instances stay in place for the structural checks to reject
        self.problem.check_fluent_instance(&fi).ok()?;
        let value = match self.initial.get(&fi) {
            Some(v) => v.clone(),
            None => self.problem.fluent(name).ok()?.implicit_value()?,
        };
        Some(constant(value))
    }

    pub fn simplify(&self, expr: &Expr) -> Expr {
        let expr = expr
            .map_children(|c| Ok::<_, std::convert::Infallible>(self.simplify(c)))
            .unwrap_or_else(|e| match e {});
        match expr {
            Expr::Fluent(name, args) => match self.static_value(&name, &args) {
                Some(value) => value,
                None => Expr::Fluent(name, args),
            },
            Expr::Not(e) => match *e {
                Expr::Bool(b) => Expr::Bool(!b),
                e => Expr::not(e),
            },
            Expr::And(es) => fold_junction(es, true),
            Expr::Or(es) => fold_junction(es, false),
            Expr::Implies(a, b) => match (*a, *b) {
                (Expr::Bool(false), _) | (_, Expr::Bool(true)) => Expr::Bool(true),
                (Expr::Bool(true), b) => b,
                (a, Expr::Bool(false)) => self.simplify(&Expr::not(a)),
                (a, b) => Expr::implies(a, b),
            },
            Expr::Iff(a, b) => match (*a, *b) {
                (Expr::Bool(x), Expr::Bool(y)) => Expr::Bool(x == y),
                (a, b) => Expr::iff(a, b),
            },
            Expr::Equals(a, b) => match (*a, *b) {
                (Expr::Object(x), Expr::Object(y)) => Expr::Bool(x == y),
                (Expr::Number(x), Expr::Number(y)) => Expr::Bool(x == y),
                (Expr::Bool(x), Expr::Bool(y)) => Expr::Bool(x == y),
                (a, b) => Expr::eq(a, b),
            },
            Expr::Le(a, b) => match (*a, *b) {
                (Expr::Number(x), Expr::Number(y)) => Expr::Bool(x <= y),
                (a, b) => Expr::le(a, b),
            },
            Expr::Lt(a, b) => match (*a, *b) {
                (Expr::Number(x), Expr::Number(y)) => Expr::Bool(x < y),
                (a, b) => Expr::lt(a, b),
            },
            Expr::Plus(es) => fold_numbers(es, |x, y| x + y).unwrap_or_else(Expr::Plus),
            Expr::Times(es) => fold_numbers(es, |x, y| x * y).unwrap_or_else(Expr::Times),
            Expr::Minus(a, b) => match (*a, *b) {
                (Expr::Number(x), Expr::Number(y)) => Expr::Number(x - y),
                (a, b) => Expr::minus(a, b),
            },
            // division by zero is left for the evaluator to report
            Expr::Div(a, b) => match (*a, *b) {
                (Expr::Number(x), Expr::Number(y)) if !y.is_zero() => Expr::Number(x / y),
                (a, b) => Expr::div(a, b),
            },
            e => e,
        }
    }
}

fn constant(value: Value) -> Expr {
    match value {
        Value::Bool(b) => Expr::Bool(b),
        Value::Number(n) => Expr::Number(n),
        Value::Object(o) => Expr::Object(o),
    }
}

/// Folds a conjunction (`neutral = true`) or a disjunction (`neutral = false`).
fn fold_junction(es: Vec<Expr>, neutral: bool) -> Expr {
    let mut kept = Vec::with_capacity(es.len());
    for e in es {
        match e {
            Expr::Bool(b) if b == neutral => {}
            Expr::Bool(_) => return Expr::Bool(!neutral),
            Expr::And(inner) if neutral => kept.extend(inner),
            Expr::Or(inner) if !neutral => kept.extend(inner),
            e => kept.push(e),
        }
    }
    match kept.len() {
        0 => Expr::Bool(neutral),
        1 => kept.remove(0),
        _ if neutral => Expr::And(kept),
        _ => Expr::Or(kept),
    }
}

fn fold_numbers(
    es: Vec<Expr>,
    op: impl Fn(num::BigRational, num::BigRational) -> num::BigRational,
) -> Result<Expr, Vec<Expr>> {
    if !es.iter().all(|e| matches!(e, Expr::Number(_))) {
        return Err(es);
    }
    let mut numbers = es.into_iter().filter_map(|e| match e {
        Expr::Number(n) => Some(n),
        _ => None,
    });
    match numbers.next() {
        Some(first) => Ok(Expr::Number(numbers.fold(first, op))),
        None => Err(Vec::new()),
    }
}
