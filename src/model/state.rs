//! States and expression evaluation.

use std::{collections::BTreeMap, fmt};

use log::trace;
use num::{BigRational, Zero};

use super::{
    bind, Action, Binding, EffectKind, Expr, FluentInstance, ModelError, Problem, Universe, Value,
};

/// Values of fluent instances. Instances holding their fluent's implicit value are not stored, so
/// two states are equal exactly when they assign the same values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct State {
    values: BTreeMap<FluentInstance, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fi: &FluentInstance) -> Option<&Value> {
        self.values.get(fi)
    }

    pub(crate) fn put(&mut self, fi: FluentInstance, value: Value, implicit: Option<&Value>) {
        if implicit == Some(&value) {
            self.values.remove(&fi);
        } else {
            self.values.insert(fi, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FluentInstance, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (fi, v)) in self.values.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", fi, v)?;
        }
        write!(f, "}}")
    }
}

/// Evaluates expressions of a problem against states.
///
/// Quantifiers are evaluated directly by enumerating [`Universe::bindings`], short-circuiting on
/// the first witness (`exists`) or counterexample (`forall`).
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    problem: &'a Problem,
    universe: Universe<'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            universe: problem.universe(),
        }
    }

    /// Current value of `fi`, falling back to the fluent's implicit value.
    pub fn value(&self, state: &State, fi: &FluentInstance) -> Result<Value, ModelError> {
        if let Some(v) = state.get(fi) {
            return Ok(v.clone());
        }
        self.problem
            .fluent(&fi.fluent)?
            .implicit_value()
            .ok_or_else(|| ModelError::UndefinedValue(fi.to_string()))
    }

    pub fn holds(&self, expr: &Expr, state: &State, binding: &Binding) -> Result<bool, ModelError> {
        self.evaluate(expr, state, binding)?
            .as_bool()
            .ok_or_else(|| ModelError::NotBoolean(expr.to_string()))
    }

    fn number(
        &self,
        expr: &Expr,
        state: &State,
        binding: &Binding,
    ) -> Result<BigRational, ModelError> {
        match self.evaluate(expr, state, binding)? {
            Value::Number(n) => Ok(n),
            _ => Err(ModelError::NotNumeric(expr.to_string())),
        }
    }

    fn object(&self, expr: &Expr, state: &State, binding: &Binding) -> Result<String, ModelError> {
        match self.evaluate(expr, state, binding)? {
            Value::Object(o) => Ok(o),
            _ => Err(ModelError::NotObject(expr.to_string())),
        }
    }

    /// Resolves the fluent instance denoted by `name(args)`.
    pub fn instance(
        &self,
        name: &str,
        args: &[Expr],
        state: &State,
        binding: &Binding,
    ) -> Result<FluentInstance, ModelError> {
        let args = args
            .iter()
            .map(|a| self.object(a, state, binding))
            .collect::<Result<Vec<_>, _>>()?;
        let fi = FluentInstance {
            fluent: name.to_string(),
            args,
        };
        self.problem.check_fluent_instance(&fi)?;
        Ok(fi)
    }

    pub fn evaluate(
        &self,
        expr: &Expr,
        state: &State,
        binding: &Binding,
    ) -> Result<Value, ModelError> {
        Ok(match expr {
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Number(n) => Value::Number(n.clone()),
            Expr::Object(o) => Value::Object(o.clone()),
            Expr::Var(v) => match binding.get(v) {
                Some(o) => Value::Object(o.clone()),
                None => return Err(ModelError::UnboundVariable(v.clone())),
            },
            Expr::Fluent(name, args) => {
                let fi = self.instance(name, args, state, binding)?;
                self.value(state, &fi)?
            }
            Expr::Not(e) => Value::Bool(!self.holds(e, state, binding)?),
            Expr::And(es) => {
                for e in es {
                    if !self.holds(e, state, binding)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Value::Bool(true)
            }
            Expr::Or(es) => {
                for e in es {
                    if self.holds(e, state, binding)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Value::Bool(false)
            }
            Expr::Implies(a, b) => {
                Value::Bool(!self.holds(a, state, binding)? || self.holds(b, state, binding)?)
            }
            Expr::Iff(a, b) => {
                Value::Bool(self.holds(a, state, binding)? == self.holds(b, state, binding)?)
            }
            Expr::Equals(a, b) => {
                Value::Bool(self.evaluate(a, state, binding)? == self.evaluate(b, state, binding)?)
            }
            Expr::Le(a, b) => {
                Value::Bool(self.number(a, state, binding)? <= self.number(b, state, binding)?)
            }
            Expr::Lt(a, b) => {
                Value::Bool(self.number(a, state, binding)? < self.number(b, state, binding)?)
            }
            Expr::Plus(es) => {
                let mut acc = BigRational::zero();
                for e in es {
                    acc += self.number(e, state, binding)?;
                }
                Value::Number(acc)
            }
            Expr::Times(es) => {
                let mut acc = BigRational::from_integer(1.into());
                for e in es {
                    acc *= self.number(e, state, binding)?;
                }
                Value::Number(acc)
            }
            Expr::Minus(a, b) => {
                Value::Number(self.number(a, state, binding)? - self.number(b, state, binding)?)
            }
            Expr::Div(a, b) => {
                let d = self.number(b, state, binding)?;
                if d.is_zero() {
                    return Err(ModelError::DivisionByZero(expr.to_string()));
                }
                Value::Number(self.number(a, state, binding)? / d)
            }
            Expr::Forall(vars, body) | Expr::Exists(vars, body) => {
                let universal = matches!(expr, Expr::Forall(..));
                for objs in self.universe.bindings(vars)? {
                    let mut inner = binding.clone();
                    for (p, o) in vars.iter().zip(objs) {
                        inner.insert(p.name.clone(), o.name.clone());
                    }
                    if self.holds(body, state, &inner)? != universal {
                        return Ok(Value::Bool(!universal));
                    }
                }
                Value::Bool(universal)
            }
        })
    }

    /// Returns the first precondition of `action` that does not hold.
    pub fn first_unsatisfied<'e>(
        &self,
        action: &'e Action,
        state: &State,
        binding: &Binding,
    ) -> Result<Option<&'e Expr>, ModelError> {
        for p in &action.preconditions {
            if !self.holds(p, state, binding)? {
                return Ok(Some(p));
            }
        }
        Ok(None)
    }

    /// Applies the effects of `action` to `state`.
    ///
    /// Conditions, targets and values are evaluated in `state`. Effects then apply in declaration
    /// order: assignments overwrite (the last one wins), increases and decreases adjust the value
    /// left by the previous effects on the same instance.
    pub fn apply(
        &self,
        action: &Action,
        state: &State,
        binding: &Binding,
    ) -> Result<State, ModelError> {
        let mut updates = Vec::with_capacity(action.effects.len());
        for e in &action.effects {
            if !self.holds(&e.condition, state, binding)? {
                trace!("{}: effect {} skipped", action.name, e);
                continue;
            }
            let fi = self.instance(&e.fluent, &e.args, state, binding)?;
            let value = self.evaluate(&e.value, state, binding)?;
            updates.push((fi, e.kind, value));
        }
        let mut next = state.clone();
        for (fi, kind, value) in updates {
            let fluent = self.problem.fluent(&fi.fluent)?;
            if !fluent.accepts(&value) {
                return Err(ModelError::TypeMismatch {
                    item: fi.to_string(),
                    arg: "value".to_string(),
                    expected: format!("{:?}", fluent.value_type),
                    found: value.to_string(),
                });
            }
            let value = match kind {
                EffectKind::Assign => value,
                EffectKind::Increase | EffectKind::Decrease => {
                    let (Value::Number(current), Value::Number(delta)) =
                        (self.value(&next, &fi)?, value)
                    else {
                        return Err(ModelError::NotNumeric(fi.to_string()));
                    };
                    if kind == EffectKind::Increase {
                        Value::Number(current + delta)
                    } else {
                        Value::Number(current - delta)
                    }
                }
            };
            trace!("{}: {} := {}", action.name, fi, value);
            next.put(fi, value, fluent.implicit_value().as_ref());
        }
        Ok(next)
    }

    /// Applies the lifted action `name(args)`, checking arity and argument types first.
    /// Returns `Ok(None)` when a precondition does not hold.
    pub fn successor(
        &self,
        name: &str,
        args: &[String],
        state: &State,
    ) -> Result<Option<State>, ModelError> {
        let action = self.problem.action(name)?;
        self.problem.check_arguments(action, args)?;
        let binding = bind(&action.parameters, args);
        if self.first_unsatisfied(action, state, &binding)?.is_some() {
            return Ok(None);
        }
        self.apply(action, state, &binding).map(Some)
    }

    /// Returns the first goal that does not hold in `state`.
    pub fn first_unreached_goal(&self, state: &State) -> Result<Option<&'a Expr>, ModelError> {
        let empty = Binding::new();
        for g in self.problem.goals() {
            if !self.holds(g, state, &empty)? {
                return Ok(Some(g));
            }
        }
        Ok(None)
    }
}
