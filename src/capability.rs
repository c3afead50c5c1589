//! Capability descriptors consulted before an engine is used.

use std::collections::BTreeSet;

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::model::{Feature, ProblemKind};

/// Problem transformations a compiler may offer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompilationKind {
    Grounding,
    QuantifiersRemoving,
}

/// What an engine can handle: the problem features it understands and, for compilers, the
/// compilations it offers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub supported_kind: ProblemKind,
    pub compilations: BTreeSet<CompilationKind>,
}

impl Capabilities {
    pub fn new(supported_kind: ProblemKind) -> Self {
        Self {
            supported_kind,
            compilations: BTreeSet::new(),
        }
    }

    pub fn with_compilation(mut self, kind: CompilationKind) -> Self {
        self.compilations.insert(kind);
        self
    }

    pub fn supports(&self, kind: &ProblemKind) -> bool {
        kind.is_subset_of(&self.supported_kind)
    }

    pub fn supports_compilation(&self, kind: CompilationKind) -> bool {
        self.compilations.contains(&kind)
    }

    /// Features of `kind` this engine does not understand.
    pub fn missing(&self, kind: &ProblemKind) -> Vec<Feature> {
        kind.unsupported_by(&self.supported_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_checks_every_feature() {
        let caps = Capabilities::new(
            ProblemKind::all().without(&[Feature::UniversalConditions, Feature::PlanLength]),
        )
        .with_compilation(CompilationKind::Grounding);
        let kind: ProblemKind = [Feature::ActionBased, Feature::FlatTyping].into_iter().collect();
        assert!(caps.supports(&kind));
        let mut quantified = kind.clone();
        quantified.set(Feature::UniversalConditions);
        assert!(!caps.supports(&quantified));
        assert_eq!(caps.missing(&quantified), vec![Feature::UniversalConditions]);
        assert!(caps.supports_compilation(CompilationKind::Grounding));
        assert!(!caps.supports_compilation(CompilationKind::QuantifiersRemoving));
    }
}
