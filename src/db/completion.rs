use super::{day, garden, habits, trees, Database};
use crate::error::{Result, TrackerError};
use crate::models::CompletionResult;

impl Database {
    /// Mark a habit completed for today and reward the garden.
    ///
    /// Completion is idempotent per day: a second call on the same day fails
    /// with [`TrackerError::AlreadyCompleted`] and waters nothing. On success
    /// the tree at `tree_index` (or the first tree when `None`) receives the
    /// water the configured policy grants for the habit's priority, and the
    /// garden gains experience. Habit, tree and garden change in one
    /// transaction.
    pub fn complete_habit(&self, name: &str, tree_index: Option<u32>) -> Result<CompletionResult> {
        let now = self.clock.now();
        let today = self.today_at(now)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;

        let mut habit = habits::find_habit(&tx, name.trim(), today)?
            .ok_or_else(|| habits::habit_not_found(name))?;
        if habit.completed_today {
            tracing::debug!("Habit '{}' already completed on {}", habit.name, today);
            return Err(TrackerError::AlreadyCompleted(habit.name));
        }

        let target = match tree_index {
            Some(index) => Some(
                trees::fetch_tree(&tx, index)?
                    .ok_or_else(|| TrackerError::not_found(format!("Tree {} not found", index)))?,
            ),
            None => trees::fetch_tree(&tx, 0)?,
        };

        tx.execute(
            "UPDATE habits SET completed_on = ? WHERE id = ?",
            (today.to_string(), habit.id.to_string()),
        )?;
        habit.completed_today = true;
        habit.last_completed_on = Some(today);

        let amount = self.config.watering.amount_for(habit.priority);
        let (tree, water_awarded) = match target {
            Some(tree) => {
                let before = tree.water;
                let watered = trees::apply_water(&tx, tree, amount, self.config.max_water, now)?;
                let awarded = watered.water - before;
                (Some(watered), awarded)
            }
            None => {
                tracing::warn!("Habit '{}' completed with no tree to water", habit.name);
                (None, 0.0)
            }
        };

        let mut garden = garden::load_garden(&tx)?;
        let levels_gained = garden.add_experience(
            self.config.experience_per_completion,
            self.config.garden.increase_percent,
        );
        garden::save_garden(&tx, &garden)?;

        tx.commit()?;

        tracing::info!(
            "Completed habit '{}': {} water awarded",
            habit.name,
            water_awarded
        );
        if levels_gained > 0 {
            tracing::info!("Garden reached level {}", garden.level);
        }

        Ok(CompletionResult {
            habit,
            tree,
            water_awarded,
            garden,
            levels_gained,
        })
    }
}
