//! The planning model: types, objects, fluents, expressions, actions and problems, together with
//! the state representation and the evaluator used to simulate them.

mod action;
mod error;
mod expression;
mod fluent;
mod kind;
mod metric;
mod plan;
mod problem;
mod state;
mod types;
mod universe;

pub use action::*;
pub use error::ModelError;
pub use expression::*;
pub use fluent::*;
pub use kind::*;
pub use metric::*;
pub use plan::*;
pub use problem::*;
pub use state::*;
pub use types::*;
pub use universe::*;
