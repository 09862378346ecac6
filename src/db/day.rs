use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use super::{parse_date, Database};
use crate::error::Result;
use crate::models::DayRollover;

const LAST_RESET_KEY: &str = "last_reset_day";

impl Database {
    /// Start a new tracker day: every habit's completion is cleared.
    ///
    /// Meant to be called by an external scheduler once per day. Stores also
    /// apply it lazily on first access after midnight, so calling it late or
    /// not at all never leaves a habit looking completed on the wrong day.
    pub fn day_boundary_reset(&self) -> Result<DayRollover> {
        let today = self.today()?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let habits_reset = tx.execute(
            "UPDATE habits SET completed_on = NULL WHERE completed_on IS NOT NULL",
            [],
        )?;
        set_meta(&tx, LAST_RESET_KEY, &today.to_string())?;
        tx.commit()?;

        tracing::info!(
            "Day boundary reset for {}: {} habit(s) cleared",
            today,
            habits_reset
        );
        Ok(DayRollover { day: today, habits_reset })
    }

    /// The day the last boundary reset ran for, if any.
    pub fn last_reset_day(&self) -> Result<Option<NaiveDate>> {
        let conn = self.lock()?;
        get_meta(&conn, LAST_RESET_KEY)?
            .map(|s| parse_date(&s))
            .transpose()
    }
}

/// Apply the day boundary reset if the calendar day moved on since the last
/// one. Completions recorded before `today` are cleared.
pub(super) fn roll_over_if_needed(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Option<DayRollover>> {
    let last = get_meta(conn, LAST_RESET_KEY)?
        .map(|s| parse_date(&s))
        .transpose()?;

    match last {
        Some(last) if last >= today => Ok(None),
        Some(last) => {
            let habits_reset = conn.execute(
                "UPDATE habits SET completed_on = NULL WHERE completed_on < ?",
                [today.to_string()],
            )?;
            set_meta(conn, LAST_RESET_KEY, &today.to_string())?;
            tracing::info!(
                "New day {} ({} day(s) since {}): {} habit(s) reset",
                today,
                (today - last).num_days(),
                last,
                habits_reset
            );
            Ok(Some(DayRollover { day: today, habits_reset }))
        }
        None => {
            set_meta(conn, LAST_RESET_KEY, &today.to_string())?;
            Ok(None)
        }
    }
}

fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM meta WHERE key = ?", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}
