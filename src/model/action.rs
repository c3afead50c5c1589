use std::fmt;

use serde::Serialize;

use super::{Expr, Parameter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EffectKind {
    Assign,
    Increase,
    Decrease,
}

/// `condition → fluent(args) op value`. Unconditional effects carry the condition `true`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Effect {
    pub fluent: String,
    pub args: Vec<Expr>,
    pub kind: EffectKind,
    pub value: Expr,
    pub condition: Expr,
}

impl Effect {
    pub fn new(
        fluent: impl Into<String>,
        args: Vec<Expr>,
        kind: EffectKind,
        value: impl Into<Expr>,
    ) -> Self {
        Self {
            fluent: fluent.into(),
            args,
            kind,
            value: value.into(),
            condition: Expr::Bool(true),
        }
    }

    pub fn assign(fluent: impl Into<String>, args: Vec<Expr>, value: impl Into<Expr>) -> Self {
        Self::new(fluent, args, EffectKind::Assign, value)
    }

    pub fn increase(fluent: impl Into<String>, args: Vec<Expr>, value: impl Into<Expr>) -> Self {
        Self::new(fluent, args, EffectKind::Increase, value)
    }

    pub fn decrease(fluent: impl Into<String>, args: Vec<Expr>, value: impl Into<Expr>) -> Self {
        Self::new(fluent, args, EffectKind::Decrease, value)
    }

    pub fn when(mut self, condition: Expr) -> Self {
        self.condition = condition;
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.condition != Expr::Bool(true)
    }

    /// The target as an expression, handy for display and evaluation.
    pub fn target(&self) -> Expr {
        Expr::Fluent(self.fluent.clone(), self.args.clone())
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self.kind {
            EffectKind::Assign => "assign",
            EffectKind::Increase => "increase",
            EffectKind::Decrease => "decrease",
        };
        if self.is_conditional() {
            write!(f, "(when {} ({} {} {}))", self.condition, op, self.target(), self.value)
        } else {
            write!(f, "({} {} {})", op, self.target(), self.value)
        }
    }
}

/// An action schema. Preconditions are implicitly conjoined; effects apply in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub preconditions: Vec<Expr>,
    pub effects: Vec<Effect>,
}

impl Action {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            parameters,
            preconditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn precondition(mut self, e: Expr) -> Self {
        self.preconditions.push(e);
        self
    }

    pub fn effect(mut self, e: Effect) -> Self {
        self.effects.push(e);
        self
    }

    /// Every expression of the action: preconditions, then each effect's arguments, value and
    /// condition.
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.preconditions.iter().chain(
            self.effects
                .iter()
                .flat_map(|e| e.args.iter().chain([&e.value, &e.condition])),
        )
    }

    /// No parameters, and no variable or quantifier left in any expression.
    pub fn is_ground(&self) -> bool {
        self.parameters.is_empty()
            && self
                .expressions()
                .all(|e| !e.is_quantified() && e.free_variables().is_empty())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(:action {} :parameters (", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", p)?;
        }
        writeln!(f, ")")?;
        writeln!(f, "  :precondition (and")?;
        for p in &self.preconditions {
            writeln!(f, "    {}", p)?;
        }
        writeln!(f, "  )")?;
        writeln!(f, "  :effect (and")?;
        for e in &self.effects {
            writeln!(f, "    {}", e)?;
        }
        write!(f, "  ))")
    }
}
