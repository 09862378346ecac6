//! Domain models for Habit Tree.
//!
//! # Core Concepts
//!
//! - [`Tree`]: grows through stages as it accumulates water. Trees are never
//!   deleted; their index is their planting order.
//! - [`Habit`]: a named task due on certain weekdays, completable once per day.
//! - [`Garden`]: levels up with experience from completed habits and unlocks
//!   tree slots.
//!
//! Completing a habit ties them together: see [`CompletionResult`].

mod garden;
mod habit;
mod tree;

pub use garden::*;
pub use habit::*;
pub use tree::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything that changed when a habit was completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub habit: Habit,
    /// The watered tree, if the garden had one to water.
    pub tree: Option<Tree>,
    pub water_awarded: f64,
    pub garden: Garden,
    pub levels_gained: u32,
}

/// Full tracker state, as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerState {
    pub day: NaiveDate,
    pub weekday: String,
    /// Seconds left until the current tracker day ends.
    pub seconds_until_day_ends: i64,
    pub garden: Garden,
    pub trees: Vec<TreeSlot>,
    pub active_habits: Vec<Habit>,
    pub scheduled_habits: Vec<Habit>,
}
