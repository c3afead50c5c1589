//! Grounding compiler, action-instance mapping and plan validation for lifted planning problems.
//!
//! A lifted [`model::Problem`] goes through [`grounding::Grounder`] to become a ground problem
//! plus an [`grounding::ActionInstanceMapper`]. Plans found on the ground problem are mapped back
//! and checked against the original with a [`validation::PlanValidator`].

pub mod cancel;
pub mod capability;
mod error;
pub use error::{Error, Result};
pub mod examples;
pub mod factory;
pub mod grounding;
pub mod model;
pub mod options;
pub mod solvers;
pub mod validation;

#[cfg(test)]
mod tests;
