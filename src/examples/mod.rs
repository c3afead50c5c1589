//! Small planning problems used by the tests and as usage examples.

mod classical;
mod numeric;

pub use classical::*;
pub use numeric::*;
