use chrono::{DateTime, Datelike, Utc};
use rusqlite::{Connection, OptionalExtension};

use super::{day, habits, trees, Database};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::models::{weekday_name, Garden, TrackerState};

impl Database {
    pub fn get_garden(&self) -> Result<Garden> {
        let conn = self.lock()?;
        load_garden(&conn)
    }

    /// Snapshot of everything the dashboard shows.
    pub fn tracker_state(&self) -> Result<TrackerState> {
        let now = self.clock.now();
        let tz = self.config.timezone()?;
        let local = now.with_timezone(&tz);
        let today = local.date_naive();

        let seconds_until_day_ends = today
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_local_timezone(tz).single())
            .map(|midnight| (midnight - local).num_seconds())
            .unwrap_or_default();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;
        let garden = load_garden(&tx)?;
        let agenda = habits::agenda(&tx, today)?;
        let slots = trees::tree_slots(&tx, &garden, &self.config.tree_slot_levels)?;
        tx.commit()?;

        Ok(TrackerState {
            day: today,
            weekday: weekday_name(today.weekday()).to_string(),
            seconds_until_day_ends,
            garden,
            trees: slots,
            active_habits: agenda.active,
            scheduled_habits: agenda.scheduled,
        })
    }
}

pub(super) fn ensure_garden(
    conn: &Connection,
    config: &TrackerConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO garden (id, level, experience, experience_required, created_at)
         VALUES (1, 1, 0, ?, ?)",
        (config.garden.base_experience, now.to_rfc3339()),
    )?;
    Ok(())
}

pub(super) fn load_garden(conn: &Connection) -> Result<Garden> {
    let garden = conn
        .query_row(
            "SELECT level, experience, experience_required FROM garden WHERE id = 1",
            [],
            |row| {
                Ok(Garden {
                    level: row.get(0)?,
                    experience: row.get(1)?,
                    experience_required: row.get(2)?,
                })
            },
        )
        .optional()?;
    garden.ok_or_else(|| TrackerError::Corrupt("garden has not been initialized".to_string()))
}

pub(super) fn save_garden(conn: &Connection, garden: &Garden) -> Result<()> {
    conn.execute(
        "UPDATE garden SET level = ?, experience = ?, experience_required = ? WHERE id = 1",
        (garden.level, garden.experience, garden.experience_required),
    )?;
    Ok(())
}
