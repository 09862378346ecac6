//! Growth model: maps accumulated water onto a tree's growth stage.
//!
//! A tree's growth is described by a table of cumulative water thresholds.
//! Stage `n` is reached once the tree holds at least `thresholds[n - 1]`
//! water; stage 0 is the seed. The stage is never stored, it is always derived
//! from the water a tree currently holds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Largest threshold table [`Thresholds::escalating`] will build.
pub const MAX_STAGES: u32 = 100;

/// Returns the stage for `water` given strictly increasing `thresholds`.
///
/// The stage is the number of thresholds less than or equal to `water`, so it
/// clamps at `thresholds.len()` once the final threshold is passed.
pub fn stage_for(water: f64, thresholds: &[f64]) -> u32 {
    thresholds.iter().take_while(|&&t| t <= water).count() as u32
}

/// Percentage of progress toward the next stage, or toward the final
/// threshold once the tree is fully grown. Never exceeds 100.
pub fn progress_percent(water: f64, thresholds: &[f64]) -> f64 {
    let Some(target) = next_threshold(water, thresholds) else {
        return 100.0;
    };
    (water / target * 100.0).clamp(0.0, 100.0)
}

/// The threshold of the next stage, or the final threshold for a fully grown
/// tree. `None` only for an empty table.
pub fn next_threshold(water: f64, thresholds: &[f64]) -> Option<f64> {
    thresholds
        .iter()
        .copied()
        .find(|&t| t > water)
        .or_else(|| thresholds.last().copied())
}

/// A validated, strictly increasing stage threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(TrackerError::validation(
                "Threshold table must have at least one stage",
            ));
        }
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(TrackerError::validation(
                "Thresholds must be positive finite numbers",
            ));
        }
        if values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TrackerError::validation(
                "Thresholds must be strictly increasing",
            ));
        }
        Ok(Self(values))
    }

    /// Builds a cumulative table where the first stage needs `base` water and
    /// each following stage needs `increase_percent` more than the previous
    /// one, rounded to the nearest ten with ties going to the even ten.
    pub fn escalating(base: f64, increase_percent: f64, stages: u32) -> Result<Self> {
        if stages > MAX_STAGES {
            return Err(TrackerError::validation(format!(
                "A tree can have at most {} stages, got {}",
                MAX_STAGES, stages
            )));
        }
        let mut values = Vec::with_capacity(stages as usize);
        let mut required = base;
        let mut total = 0.0;
        for _ in 0..stages {
            total += required;
            values.push(total);
            required += round_to_tens(required / 100.0 * increase_percent);
        }
        Self::new(values)
    }

    pub fn stage_for(&self, water: f64) -> u32 {
        stage_for(water, &self.0)
    }

    pub fn progress_percent(&self, water: f64) -> f64 {
        progress_percent(water, &self.0)
    }

    pub fn water_required(&self, water: f64) -> f64 {
        // Non-empty by construction.
        next_threshold(water, &self.0).unwrap_or_default()
    }

    pub fn max_stage(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = TrackerError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(thresholds: Thresholds) -> Self {
        thresholds.0
    }
}

fn round_to_tens(value: f64) -> f64 {
    (value / 10.0).round_ties_even() * 10.0
}
