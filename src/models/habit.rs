use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrackerError;

/// Highest priority a habit may carry. Priorities run from 0 to this value.
pub const MAX_PRIORITY: u8 = 5;

/// A recurring task scheduled on a subset of weekdays.
///
/// Habits are addressed by `name` on the wire, but their completion state is
/// keyed by the immutable `id`, so renaming a habit never loses the fact that
/// it was completed today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub priority: u8,
    pub days_of_week: DaysOfWeek,
    /// True only if the habit was completed during the current tracker day.
    pub completed_today: bool,
    pub last_completed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn completion(&self) -> CompletionState {
        if self.completed_today {
            CompletionState::CompletedToday
        } else {
            CompletionState::Pending
        }
    }

    pub fn is_scheduled_on(&self, day: Weekday) -> bool {
        self.days_of_week.contains(day)
    }
}

/// Daily completion state of a habit.
///
/// - `Pending`: not completed since the last day boundary
/// - `CompletedToday`: completed; only the day boundary reset leaves this state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Pending,
    CompletedToday,
}

/// Input for creating a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitInput {
    pub name: String,
    pub priority: i64,
    pub days_of_week: DaysOfWeek,
}

/// Input for editing a habit. Priority and schedule are replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHabitInput {
    pub new_name: String,
    pub priority: i64,
    pub days_of_week: DaysOfWeek,
}

/// Habits split by whether they are due today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitAgenda {
    pub day: NaiveDate,
    pub weekday: String,
    /// Scheduled for today, highest priority first.
    pub active: Vec<Habit>,
    /// Scheduled only on other days.
    pub scheduled: Vec<Habit>,
}

/// Outcome of a day boundary reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRollover {
    pub day: NaiveDate,
    /// Number of habits whose completion was cleared.
    pub habits_reset: usize,
}

/// Validate a user supplied priority.
pub fn parse_priority(priority: i64) -> Result<u8, TrackerError> {
    u8::try_from(priority)
        .ok()
        .filter(|p| *p <= MAX_PRIORITY)
        .ok_or_else(|| {
            TrackerError::validation(format!(
                "Priority must be between 0 and {}, got {}",
                MAX_PRIORITY, priority
            ))
        })
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday as used on the wire.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn parse_weekday(label: &str) -> Option<Weekday> {
    WEEKDAYS.into_iter().find(|d| weekday_name(*d) == label)
}

/// A weekly schedule: the set of weekdays a habit is due on.
///
/// Serialized as a comma-separated list of capitalized English day names in
/// Monday-first order, e.g. `"Monday,Wednesday"`. The empty string is the
/// empty schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn every_day() -> Self {
        Self(0b111_1111)
    }

    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter()
            .fold(Self::empty(), |acc, day| acc.with(day))
    }

    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | (1 << day.num_days_from_monday()))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEKDAYS.into_iter().filter(|d| self.contains(*d))
    }
}

impl FromStr for DaysOfWeek {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        s.split(',')
            .map(str::trim)
            .try_fold(Self::empty(), |acc, label| {
                parse_weekday(label).map(|day| acc.with(day)).ok_or_else(|| {
                    TrackerError::validation(format!("Invalid day of the week: '{}'", label))
                })
            })
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.days().map(weekday_name).collect();
        f.write_str(&names.join(","))
    }
}

impl TryFrom<String> for DaysOfWeek {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DaysOfWeek> for String {
    fn from(days: DaysOfWeek) -> Self {
        days.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_names() {
        let days: DaysOfWeek = "Monday,Wednesday".parse().unwrap();
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Wed));
        assert!(!days.contains(Weekday::Tue));
    }

    #[test]
    fn tolerates_whitespace_around_names() {
        let days: DaysOfWeek = " Friday , Sunday ".parse().unwrap();
        assert_eq!(days, DaysOfWeek::from_days([Weekday::Fri, Weekday::Sun]));
    }

    #[test]
    fn empty_string_is_empty_schedule() {
        let days: DaysOfWeek = "".parse().unwrap();
        assert!(days.is_empty());
        assert_eq!(days.to_string(), "");
    }

    #[test]
    fn rejects_unknown_or_lowercase_labels() {
        assert!("Mon".parse::<DaysOfWeek>().is_err());
        assert!("monday".parse::<DaysOfWeek>().is_err());
        assert!("Monday,,Tuesday".parse::<DaysOfWeek>().is_err());
    }

    #[test]
    fn displays_in_monday_first_order() {
        let days: DaysOfWeek = "Sunday,Monday,Thursday".parse().unwrap();
        assert_eq!(days.to_string(), "Monday,Thursday,Sunday");
        assert_eq!(DaysOfWeek::every_day().days().count(), 7);
    }

    #[test]
    fn serializes_as_wire_string() {
        let days = DaysOfWeek::from_days([Weekday::Tue]);
        assert_eq!(serde_json::to_string(&days).unwrap(), "\"Tuesday\"");
        let back: DaysOfWeek = serde_json::from_str("\"Tuesday,Saturday\"").unwrap();
        assert!(back.contains(Weekday::Sat));
    }

    #[test]
    fn priority_range_is_enforced() {
        assert_eq!(parse_priority(0).unwrap(), 0);
        assert_eq!(parse_priority(5).unwrap(), 5);
        assert!(parse_priority(6).is_err());
        assert!(parse_priority(-1).is_err());
    }
}
