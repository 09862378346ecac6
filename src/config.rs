//! Tracker configuration.
//!
//! Configuration is read from `config.json` in the user's config directory
//! (or the file named by `HABIT_TREE_CONFIG`), then overridden by environment
//! variables:
//!
//! - `HABIT_TREE_DB` - database file path
//! - `HABIT_TREE_UTC_OFFSET_MINUTES` - offset of the tracker's calendar day
//! - `HABIT_TREE_WATER_PER_COMPLETION` - flat water awarded per completion
//! - `HABIT_TREE_CORS_ORIGINS` - allowed CORS origins, comma-separated

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::FixedOffset;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::growth::Thresholds;

const APP_NAME: &str = "habit-tree";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// SQLite file. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Offset from UTC, in minutes, of the timezone whose midnight ends a day.
    pub utc_offset_minutes: i32,
    pub growth: GrowthConfig,
    /// Upper bound on the water a single tree can hold.
    pub max_water: f64,
    /// Water granted to a tree when a habit is completed.
    pub watering: WateringPolicy,
    /// Garden experience granted per completed habit.
    pub experience_per_completion: u64,
    pub garden: GardenConfig,
    /// Garden level needed to plant each tree slot. Its length caps the
    /// number of trees.
    pub tree_slot_levels: Vec<u32>,
    pub default_tree_name: String,
    pub cors_origins: Option<Vec<String>>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            utc_offset_minutes: 0,
            growth: GrowthConfig::default(),
            max_water: 1_000_000_000.0,
            watering: WateringPolicy::default(),
            experience_per_completion: 200,
            garden: GardenConfig::default(),
            tree_slot_levels: (1..=10).collect(),
            default_tree_name: "My Tree".to_string(),
            cors_origins: None,
        }
    }
}

/// Shape of every newly planted tree's threshold table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Water needed to leave the seed stage.
    pub base_water: f64,
    /// How much more water each stage needs than the previous one.
    pub increase_percent: f64,
    pub stages: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_water: 50.0,
            increase_percent: 50.0,
            stages: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Experience needed to go from level 1 to level 2.
    pub base_experience: u64,
    /// How much more experience each level needs than the previous one.
    pub increase_percent: u64,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            base_experience: 100,
            increase_percent: 50,
        }
    }
}

/// How much water completing a habit is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WateringPolicy {
    /// The same amount for every habit.
    Flat { amount: f64 },
    /// `base + priority * per_priority`.
    PriorityScaled { base: f64, per_priority: f64 },
}

impl Default for WateringPolicy {
    fn default() -> Self {
        Self::Flat { amount: 10.0 }
    }
}

impl WateringPolicy {
    pub fn amount_for(&self, priority: u8) -> f64 {
        let amount = match self {
            Self::Flat { amount } => *amount,
            Self::PriorityScaled { base, per_priority } => base + per_priority * priority as f64,
        };
        if amount.is_finite() {
            amount.max(0.0)
        } else {
            0.0
        }
    }
}

impl TrackerConfig {
    /// Load configuration from disk and the environment.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let mut config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn try_load() -> Result<Self> {
        let config_path = match std::env::var("HABIT_TREE_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => get_config_path()?,
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Apply environment-style overrides. `lookup` returns the value for a key.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("HABIT_TREE_DB") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("HABIT_TREE_UTC_OFFSET_MINUTES") {
            match raw.trim().parse() {
                Ok(minutes) => self.utc_offset_minutes = minutes,
                Err(_) => tracing::warn!("Ignoring invalid HABIT_TREE_UTC_OFFSET_MINUTES: {}", raw),
            }
        }

        if let Some(raw) = lookup("HABIT_TREE_WATER_PER_COMPLETION") {
            match raw.trim().parse() {
                Ok(amount) => self.watering = WateringPolicy::Flat { amount },
                Err(_) => {
                    tracing::warn!("Ignoring invalid HABIT_TREE_WATER_PER_COMPLETION: {}", raw)
                }
            }
        }

        if let Some(raw) = lookup("HABIT_TREE_CORS_ORIGINS") {
            self.cors_origins = Some(raw.split(',').map(|s| s.trim().to_string()).collect());
        }
    }

    /// The timezone whose midnight separates tracker days.
    pub fn timezone(&self) -> crate::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            crate::TrackerError::validation(format!(
                "UTC offset of {} minutes is out of range",
                self.utc_offset_minutes
            ))
        })
    }

    /// Threshold table given to newly planted trees.
    pub fn thresholds(&self) -> crate::Result<Thresholds> {
        Thresholds::escalating(
            self.growth.base_water,
            self.growth.increase_percent,
            self.growth.stages,
        )
    }

    /// Check that the configuration can drive the stores.
    pub fn validate(&self) -> crate::Result<()> {
        self.timezone()?;
        self.thresholds()?;
        if !self.max_water.is_finite() || self.max_water <= 0.0 {
            return Err(crate::TrackerError::validation(
                "max_water must be a positive number",
            ));
        }
        if self.garden.base_experience == 0 {
            return Err(crate::TrackerError::validation(
                "garden.base_experience must be positive",
            ));
        }
        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.watering, WateringPolicy::Flat { amount: 10.0 });
        assert_eq!(config.tree_slot_levels.len(), 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "utc_offset_minutes": 120, "watering": {{ "kind": "priority_scaled", "base": 5, "per_priority": 2 }} }}"#
        )
        .unwrap();

        let config = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.utc_offset_minutes, 120);
        assert_eq!(
            config.watering,
            WateringPolicy::PriorityScaled {
                base: 5.0,
                per_priority: 2.0
            }
        );
        assert_eq!(config.growth.base_water, 50.0);
        assert_eq!(config.default_tree_name, "My Tree");
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("HABIT_TREE_DB", "/tmp/habits.db"),
            ("HABIT_TREE_UTC_OFFSET_MINUTES", "-300"),
            ("HABIT_TREE_WATER_PER_COMPLETION", "25"),
            ("HABIT_TREE_CORS_ORIGINS", "http://a.test, http://b.test"),
        ]);
        let mut config = TrackerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/habits.db")));
        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.watering, WateringPolicy::Flat { amount: 25.0 });
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }

    #[test]
    fn invalid_override_is_ignored() {
        let mut config = TrackerConfig::default();
        config.apply_overrides(|key| {
            (key == "HABIT_TREE_UTC_OFFSET_MINUTES").then(|| "soon".to_string())
        });
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn priority_scaled_policy_uses_priority() {
        let policy = WateringPolicy::PriorityScaled {
            base: 4.0,
            per_priority: 1.5,
        };
        assert_eq!(policy.amount_for(0), 4.0);
        assert_eq!(policy.amount_for(2), 7.0);
        assert_eq!(WateringPolicy::Flat { amount: -3.0 }.amount_for(5), 0.0);
    }

    #[test]
    fn oversized_growth_table_fails_validation() {
        let mut config = TrackerConfig::default();
        config.growth.stages = u32::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_offset_fails_validation() {
        let config = TrackerConfig {
            utc_offset_minutes: 60 * 30,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
