//! Engine configuration. Every struct has a `Default` and can be read from JSON.

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingOptions {
    /// Replace static fluents by their initial value and drop what folds to false.
    pub prune_static: bool,
    // abort when more ground actions than this would be emitted
    pub max_ground_actions: Option<usize>,
}

impl Default for GroundingOptions {
    fn default() -> Self {
        Self {
            prune_static: true,
            max_ground_actions: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Simulate problems with quality metrics and report the metric values instead of answering
    /// `Unknown`.
    pub evaluate_metrics: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub max_expansions: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
        }
    }
}

/// Reads options from JSON. Missing fields take their default.
pub fn from_json<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
