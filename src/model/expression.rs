//! Condition and numeric expressions over fluents.

use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap},
    fmt,
};

use num::{BigInt, BigRational};
use serde::Serialize;

use super::Parameter;

/// Assignment of object names to variable names (action parameters or quantified variables).
pub type Binding = HashMap<String, String>;

/// Builds the binding of `params` to `args`, position by position.
pub fn bind<S: AsRef<str>>(params: &[Parameter], args: &[S]) -> Binding {
    params
        .iter()
        .zip(args)
        .map(|(p, a)| (p.name.clone(), a.as_ref().to_string()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Expr {
    Bool(bool),
    Number(BigRational),
    Object(String),
    /// An action parameter or a quantified variable.
    Var(String),
    Fluent(String, Vec<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Iff(Box<Expr>, Box<Expr>),
    Equals(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Plus(Vec<Expr>),
    Minus(Box<Expr>, Box<Expr>),
    Times(Vec<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Forall(Vec<Parameter>, Box<Expr>),
    Exists(Vec<Parameter>, Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Self::Number(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn obj(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    pub fn fluent(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Fluent(name.into(), args)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(e: Expr) -> Self {
        Self::Not(Box::new(e))
    }

    pub fn and(es: Vec<Expr>) -> Self {
        Self::And(es)
    }

    pub fn or(es: Vec<Expr>) -> Self {
        Self::Or(es)
    }

    pub fn implies(a: Expr, b: Expr) -> Self {
        Self::Implies(Box::new(a), Box::new(b))
    }

    pub fn iff(a: Expr, b: Expr) -> Self {
        Self::Iff(Box::new(a), Box::new(b))
    }

    pub fn eq(a: Expr, b: Expr) -> Self {
        Self::Equals(Box::new(a), Box::new(b))
    }

    pub fn le(a: Expr, b: Expr) -> Self {
        Self::Le(Box::new(a), Box::new(b))
    }

    pub fn lt(a: Expr, b: Expr) -> Self {
        Self::Lt(Box::new(a), Box::new(b))
    }

    pub fn ge(a: Expr, b: Expr) -> Self {
        Self::le(b, a)
    }

    pub fn gt(a: Expr, b: Expr) -> Self {
        Self::lt(b, a)
    }

    pub fn plus(es: Vec<Expr>) -> Self {
        Self::Plus(es)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn minus(a: Expr, b: Expr) -> Self {
        Self::Minus(Box::new(a), Box::new(b))
    }

    pub fn times(es: Vec<Expr>) -> Self {
        Self::Times(es)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(a: Expr, b: Expr) -> Self {
        Self::Div(Box::new(a), Box::new(b))
    }

    pub fn forall(vars: Vec<Parameter>, body: Expr) -> Self {
        Self::Forall(vars, Box::new(body))
    }

    pub fn exists(vars: Vec<Parameter>, body: Expr) -> Self {
        Self::Exists(vars, Box::new(body))
    }

    /// Direct sub-expressions, in order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Bool(_) | Self::Number(_) | Self::Object(_) | Self::Var(_) => vec![],
            Self::Fluent(_, args) => args.iter().collect(),
            Self::And(es) | Self::Or(es) | Self::Plus(es) | Self::Times(es) => es.iter().collect(),
            Self::Not(e) | Self::Forall(_, e) | Self::Exists(_, e) => vec![e],
            Self::Implies(a, b)
            | Self::Iff(a, b)
            | Self::Equals(a, b)
            | Self::Le(a, b)
            | Self::Lt(a, b)
            | Self::Minus(a, b)
            | Self::Div(a, b) => vec![a, b],
        }
    }

    /// Returns true if `pred` holds for this expression or any sub-expression.
    pub fn any(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|c| c.any(pred))
    }

    pub fn is_quantified(&self) -> bool {
        self.any(&|e| matches!(e, Self::Forall(..) | Self::Exists(..)))
    }

    /// Rebuilds the expression, replacing each direct child with `f(child)`.
    pub(crate) fn map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let mut boxed = |e: &Expr| f(e).map(Box::new);
        Ok(match self {
            Self::Bool(_) | Self::Number(_) | Self::Object(_) | Self::Var(_) => self.clone(),
            Self::Fluent(name, args) => {
                let args = args.iter().map(|a| boxed(a).map(|b| *b)).collect::<Result<_, _>>()?;
                Self::Fluent(name.clone(), args)
            }
            Self::Not(e) => Self::Not(boxed(e)?),
            Self::And(es) => Self::And(
                es.iter()
                    .map(|e| boxed(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Or(es) => Self::Or(
                es.iter()
                    .map(|e| boxed(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Plus(es) => Self::Plus(
                es.iter()
                    .map(|e| boxed(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Times(es) => Self::Times(
                es.iter()
                    .map(|e| boxed(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Implies(a, b) => Self::Implies(boxed(a)?, boxed(b)?),
            Self::Iff(a, b) => Self::Iff(boxed(a)?, boxed(b)?),
            Self::Equals(a, b) => Self::Equals(boxed(a)?, boxed(b)?),
            Self::Le(a, b) => Self::Le(boxed(a)?, boxed(b)?),
            Self::Lt(a, b) => Self::Lt(boxed(a)?, boxed(b)?),
            Self::Minus(a, b) => Self::Minus(boxed(a)?, boxed(b)?),
            Self::Div(a, b) => Self::Div(boxed(a)?, boxed(b)?),
            Self::Forall(vars, e) => Self::Forall(vars.clone(), boxed(e)?),
            Self::Exists(vars, e) => Self::Exists(vars.clone(), boxed(e)?),
        })
    }

    /// Replaces every free variable bound in `binding` with its object. Quantifiers shadow the
    /// variables they bind.
    pub fn substitute(&self, binding: &Binding) -> Expr {
        if binding.is_empty() {
            return self.clone();
        }
        match self {
            Self::Var(v) => match binding.get(v) {
                Some(o) => Self::Object(o.clone()),
                None => self.clone(),
            },
            Self::Forall(vars, body) | Self::Exists(vars, body) => {
                let inner = if vars.iter().any(|p| binding.contains_key(&p.name)) {
                    let mut b = binding.clone();
                    for p in vars {
                        b.remove(&p.name);
                    }
                    Cow::Owned(b)
                } else {
                    Cow::Borrowed(binding)
                };
                let body = Box::new(body.substitute(&inner));
                match self {
                    Self::Forall(..) => Self::Forall(vars.clone(), body),
                    _ => Self::Exists(vars.clone(), body),
                }
            }
            _ => self
                .map_children(|c| Ok::<_, std::convert::Infallible>(c.substitute(binding)))
                .unwrap_or_else(|e| match e {}),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free<'a>(&'a self, scope: &mut Vec<&'a str>, out: &mut BTreeSet<String>) {
        match self {
            Self::Var(v) if !scope.contains(&v.as_str()) => {
                out.insert(v.clone());
            }
            Self::Forall(vars, body) | Self::Exists(vars, body) => {
                let n = scope.len();
                scope.extend(vars.iter().map(|p| p.name.as_str()));
                body.collect_free(scope, out);
                scope.truncate(n);
            }
            _ => {
                for c in self.children() {
                    c.collect_free(scope, out);
                }
            }
        }
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::int(n)
    }
}

fn write_list(f: &mut fmt::Formatter, op: &str, es: &[&Expr]) -> fmt::Result {
    write!(f, "({}", op)?;
    for e in es {
        write!(f, " {}", e)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) if n.is_integer() => write!(f, "{}", n.numer()),
            Self::Number(n) => write!(f, "{}/{}", n.numer(), n.denom()),
            Self::Object(o) => write!(f, "{}", o),
            Self::Var(v) => write!(f, "?{}", v),
            Self::Fluent(name, _) => write_list(f, name, &self.children()),
            Self::Not(_) => write_list(f, "not", &self.children()),
            Self::And(_) => write_list(f, "and", &self.children()),
            Self::Or(_) => write_list(f, "or", &self.children()),
            Self::Implies(..) => write_list(f, "imply", &self.children()),
            Self::Iff(..) => write_list(f, "iff", &self.children()),
            Self::Equals(..) => write_list(f, "=", &self.children()),
            Self::Le(..) => write_list(f, "<=", &self.children()),
            Self::Lt(..) => write_list(f, "<", &self.children()),
            Self::Plus(_) => write_list(f, "+", &self.children()),
            Self::Minus(..) => write_list(f, "-", &self.children()),
            Self::Times(_) => write_list(f, "*", &self.children()),
            Self::Div(..) => write_list(f, "/", &self.children()),
            Self::Forall(vars, body) | Self::Exists(vars, body) => {
                let q = if matches!(self, Self::Forall(..)) {
                    "forall"
                } else {
                    "exists"
                };
                write!(f, "({} (", q)?;
                for (i, p) in vars.iter().enumerate() {
                    if i != 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") {})", body)
            }
        }
    }
}
