use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::growth::Thresholds;

/// A tree that grows as it accumulates water.
///
/// `stage`, `water_required` and `progress` are derived from `water` and the
/// tree's threshold table whenever a tree is loaded; only `water` is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Zero-based planting order. Stable for the life of the tree.
    pub index: u32,
    pub name: String,
    pub water: f64,
    pub stage: u32,
    pub max_stage: u32,
    /// Threshold of the next stage, or of the final stage once fully grown.
    pub water_required: f64,
    /// Progress toward `water_required`, as a percentage capped at 100.
    pub progress: f64,
    pub thresholds: Thresholds,
    pub created_at: DateTime<Utc>,
    pub last_watered: Option<DateTime<Utc>>,
}

impl Tree {
    pub fn new(
        index: u32,
        name: String,
        water: f64,
        thresholds: Thresholds,
        created_at: DateTime<Utc>,
        last_watered: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            index,
            name,
            water,
            stage: thresholds.stage_for(water),
            max_stage: thresholds.max_stage(),
            water_required: thresholds.water_required(water),
            progress: thresholds.progress_percent(water),
            thresholds,
            created_at,
            last_watered,
        }
    }

    pub fn is_fully_grown(&self) -> bool {
        self.stage == self.max_stage
    }
}

/// Input for planting a tree. The name falls back to the configured default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantTreeInput {
    pub name: Option<String>,
}

/// One of the garden's tree slots, planted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSlot {
    pub slot: u32,
    /// Garden level that unlocks this slot.
    pub required_level: u32,
    pub unlocked: bool,
    pub tree: Option<Tree>,
}
