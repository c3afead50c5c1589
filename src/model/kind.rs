use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

/// A feature flag describing which constructs a problem uses.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    ActionBased,
    FlatTyping,
    HierarchicalTyping,
    NumericFluents,
    NegativeConditions,
    DisjunctiveConditions,
    Equalities,
    ExistentialConditions,
    UniversalConditions,
    ConditionalEffects,
    IncreaseEffects,
    DecreaseEffects,
    PlanLength,
    ActionsCost,
    FinalValue,
}

impl Feature {
    pub fn is_metric(&self) -> bool {
        matches!(self, Self::PlanLength | Self::ActionsCost | Self::FinalValue)
    }
}

/// The set of features a problem uses, or that an engine supports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProblemKind {
    features: BTreeSet<Feature>,
}

impl ProblemKind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every feature of the vocabulary.
    pub fn all() -> Self {
        <Feature as strum::IntoEnumIterator>::iter().collect()
    }

    pub fn set(&mut self, f: Feature) {
        self.features.insert(f);
    }

    pub fn unset(&mut self, f: Feature) {
        self.features.remove(&f);
    }

    pub fn without(mut self, fs: &[Feature]) -> Self {
        for f in fs {
            self.unset(*f);
        }
        self
    }

    pub fn has(&self, f: Feature) -> bool {
        self.features.contains(&f)
    }

    /// Looks a feature up by its vocabulary name, e.g. `UNIVERSAL_CONDITIONS`.
    pub fn has_named(&self, name: &str) -> bool {
        Feature::from_str(name).is_ok_and(|f| self.has(f))
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.to_string()).collect()
    }

    pub fn is_subset_of(&self, other: &ProblemKind) -> bool {
        self.features.is_subset(&other.features)
    }

    /// Features of `self` missing from `supported`.
    pub fn unsupported_by(&self, supported: &ProblemKind) -> Vec<Feature> {
        self.features.difference(&supported.features).copied().collect()
    }

    pub fn has_metrics(&self) -> bool {
        self.features.iter().any(Feature::is_metric)
    }
}

impl FromIterator<Feature> for ProblemKind {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.feature_names().join(", "))
    }
}
