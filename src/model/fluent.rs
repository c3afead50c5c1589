use std::fmt;

use num::{BigInt, BigRational, One, Zero};
use serde::Serialize;

use super::Parameter;

/// A fluent value: a truth value, an exact rational number or an object name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Value {
    Bool(bool),
    Number(BigRational),
    Object(String),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Self::Number(BigRational::from_integer(BigInt::from(n)))
    }

    /// Builds the rational `numer / denom`. Panics if `denom` is zero.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        Self::Number(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn zero() -> Self {
        Self::Number(BigRational::zero())
    }

    pub fn one() -> Self {
        Self::Number(BigRational::one())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&str> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::int(n)
    }
}

impl From<BigRational> for Value {
    fn from(n: BigRational) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) if n.is_integer() => write!(f, "{}", n.numer()),
            Self::Number(n) => write!(f, "{}/{}", n.numer(), n.denom()),
            Self::Object(o) => write!(f, "{}", o),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FluentType {
    Bool,
    Numeric,
}

/// A predicate or numeric function symbol with a fixed typed signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fluent {
    pub name: String,
    pub value_type: FluentType,
    pub signature: Vec<Parameter>,
    /// Value of every instance not explicitly initialised. Boolean fluents without a default are
    /// false (closed world); numeric ones have no value until assigned.
    pub default: Option<Value>,
}

impl Fluent {
    pub fn boolean(name: impl Into<String>, signature: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            value_type: FluentType::Bool,
            signature,
            default: None,
        }
    }

    pub fn numeric(name: impl Into<String>, signature: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            value_type: FluentType::Numeric,
            signature,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn arity(&self) -> usize {
        self.signature.len()
    }

    /// The value an instance takes when nothing else was set.
    pub fn implicit_value(&self) -> Option<Value> {
        match (&self.default, self.value_type) {
            (Some(v), _) => Some(v.clone()),
            (None, FluentType::Bool) => Some(Value::Bool(false)),
            (None, FluentType::Numeric) => None,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self.value_type, value),
            (FluentType::Bool, Value::Bool(_)) | (FluentType::Numeric, Value::Number(_))
        )
    }
}

/// A fluent applied to concrete objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FluentInstance {
    pub fluent: String,
    pub args: Vec<String>,
}

impl FluentInstance {
    pub fn new<S: Into<String>>(
        fluent: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            fluent: fluent.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for FluentInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.fluent)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        write!(f, ")")
    }
}
