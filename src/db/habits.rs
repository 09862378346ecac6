use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::{clean_name, day, parse_date, parse_datetime, parse_uuid, Database};
use crate::error::{Result, TrackerError};
use crate::models::{
    parse_priority, weekday_name, CreateHabitInput, DaysOfWeek, Habit, HabitAgenda, UpdateHabitInput,
};

struct HabitRow {
    id: String,
    name: String,
    priority: i64,
    days_of_week: String,
    completed_on: Option<String>,
    created_at: String,
}

impl HabitRow {
    fn into_habit(self, today: NaiveDate) -> Result<Habit> {
        let last_completed_on = self.completed_on.as_deref().map(parse_date).transpose()?;
        let priority = u8::try_from(self.priority)
            .map_err(|_| TrackerError::Corrupt(format!("invalid priority {}", self.priority)))?;
        let days_of_week = self
            .days_of_week
            .parse::<DaysOfWeek>()
            .map_err(|_| TrackerError::Corrupt(format!("invalid schedule '{}'", self.days_of_week)))?;

        Ok(Habit {
            id: parse_uuid(&self.id)?,
            name: self.name,
            priority,
            days_of_week,
            completed_today: last_completed_on == Some(today),
            last_completed_on,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

const HABIT_COLUMNS: &str = "id, name, priority, days_of_week, completed_on, created_at";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok(HabitRow {
        id: row.get(0)?,
        name: row.get(1)?,
        priority: row.get(2)?,
        days_of_week: row.get(3)?,
        completed_on: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    pub fn add_habit(&self, input: CreateHabitInput) -> Result<Habit> {
        let name = clean_name(&input.name, "Habit")?;
        let priority = parse_priority(input.priority)?;

        let now = self.clock.now();
        let today = self.today_at(now)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;

        if find_habit(&tx, name, today)?.is_some() {
            return Err(TrackerError::conflict(format!(
                "A habit named '{}' already exists",
                name
            )));
        }

        let habit = Habit {
            id: Uuid::new_v4(),
            name: name.to_string(),
            priority,
            days_of_week: input.days_of_week,
            completed_today: false,
            last_completed_on: None,
            created_at: now,
        };

        tx.execute(
            "INSERT INTO habits (id, name, priority, days_of_week, completed_on, created_at)
             VALUES (?, ?, ?, ?, NULL, ?)",
            (
                habit.id.to_string(),
                &habit.name,
                habit.priority,
                habit.days_of_week.to_string(),
                now.to_rfc3339(),
            ),
        )?;
        tx.commit()?;

        tracing::info!("Added habit '{}' ({})", habit.name, habit.days_of_week);
        Ok(habit)
    }

    /// Rename and reschedule a habit. Its completion state follows it.
    pub fn edit_habit(&self, existing_name: &str, input: UpdateHabitInput) -> Result<Habit> {
        let new_name = clean_name(&input.new_name, "Habit")?;
        let priority = parse_priority(input.priority)?;

        let today = self.today()?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;

        let mut habit = find_habit(&tx, existing_name.trim(), today)?
            .ok_or_else(|| habit_not_found(existing_name))?;

        if let Some(other) = find_habit(&tx, new_name, today)? {
            if other.id != habit.id {
                return Err(TrackerError::conflict(format!(
                    "A habit named '{}' already exists",
                    new_name
                )));
            }
        }

        tx.execute(
            "UPDATE habits SET name = ?, priority = ?, days_of_week = ? WHERE id = ?",
            (
                new_name,
                priority,
                input.days_of_week.to_string(),
                habit.id.to_string(),
            ),
        )?;
        tx.commit()?;

        if habit.name != new_name {
            tracing::info!("Renamed habit '{}' to '{}'", habit.name, new_name);
        }
        habit.name = new_name.to_string();
        habit.priority = priority;
        habit.days_of_week = input.days_of_week;
        Ok(habit)
    }

    /// Remove a habit and its completion state.
    pub fn delete_habit(&self, name: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let rows = tx.execute("DELETE FROM habits WHERE name = ?", [name.trim()])?;
        if rows == 0 {
            return Err(habit_not_found(name));
        }
        tx.commit()?;

        tracing::info!("Deleted habit '{}'", name.trim());
        Ok(())
    }

    pub fn get_habit(&self, name: &str) -> Result<Habit> {
        let today = self.today()?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;
        let habit = find_habit(&tx, name.trim(), today)?;
        tx.commit()?;
        habit.ok_or_else(|| habit_not_found(name))
    }

    /// All habits, highest priority first, then by name.
    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let today = self.today()?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;
        let habits = list_habits(&tx, today)?;
        tx.commit()?;
        Ok(habits)
    }

    /// Habits split into those due today and those due on other days.
    pub fn habit_agenda(&self) -> Result<HabitAgenda> {
        let today = self.today()?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        day::roll_over_if_needed(&tx, today)?;
        let agenda = agenda(&tx, today)?;
        tx.commit()?;
        Ok(agenda)
    }
}

pub(super) fn habit_not_found(name: &str) -> TrackerError {
    TrackerError::not_found(format!("No habit found with the name '{}'", name.trim()))
}

pub(super) fn find_habit(conn: &Connection, name: &str, today: NaiveDate) -> Result<Option<Habit>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM habits WHERE name = ?", HABIT_COLUMNS),
            [name],
            read_row,
        )
        .optional()?;
    row.map(|r| r.into_habit(today)).transpose()
}

pub(super) fn list_habits(conn: &Connection, today: NaiveDate) -> Result<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habits ORDER BY priority DESC, name",
        HABIT_COLUMNS
    ))?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|r| r.into_habit(today)).collect()
}

pub(super) fn agenda(conn: &Connection, today: NaiveDate) -> Result<HabitAgenda> {
    let weekday = today.weekday();
    let (active, scheduled): (Vec<Habit>, Vec<Habit>) = list_habits(conn, today)?
        .into_iter()
        .partition(|habit| habit.is_scheduled_on(weekday));

    Ok(HabitAgenda {
        day: today,
        weekday: weekday_name(weekday).to_string(),
        active,
        scheduled,
    })
}
