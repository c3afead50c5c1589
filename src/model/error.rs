//! model errors

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown type {0}")]
    UnknownType(String),
    #[error("type {0} is already declared")]
    DuplicateType(String),
    #[error("object {0} is already declared")]
    DuplicateObject(String),
    #[error("unknown object {0}")]
    UnknownObject(String),
    #[error("fluent {0} is already declared")]
    DuplicateFluent(String),
    #[error("unknown fluent {0}")]
    UnknownFluent(String),
    #[error("action {0} is already declared")]
    DuplicateAction(String),
    #[error("unknown action {0}")]
    UnknownAction(String),
    #[error("{0} expects {1} arguments, found {2}")]
    ArityMismatch(String, usize, usize),
    #[error("argument {arg} of {item} has type {found}, expected {expected}")]
    TypeMismatch {
        item: String,
        arg: String,
        expected: String,
        found: String,
    },
    #[error("variable ?{0} is not bound")]
    UnboundVariable(String),
    #[error("value of {0} is undefined")]
    UndefinedValue(String),
    #[error("expression {0} is not boolean")]
    NotBoolean(String),
    #[error("expression {0} is not numeric")]
    NotNumeric(String),
    #[error("expression {0} does not denote an object")]
    NotObject(String),
    #[error("division by zero in {0}")]
    DivisionByZero(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
