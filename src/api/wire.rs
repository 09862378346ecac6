//! Request and response bodies of the JSON API.
//!
//! Field names follow the browser client's form fields. Numeric fields accept
//! either JSON numbers or numeric strings, since form values arrive as text.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{CompletionResult, DayRollover, Habit, Tree};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditTreeRequest {
    pub name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterTreeRequest {
    #[serde(deserialize_with = "lenient_f64")]
    pub water_amount: f64,
    #[serde(deserialize_with = "lenient_i64")]
    pub index: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantTreeRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHabitRequest {
    pub habit_name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub habit_priority: i64,
    /// Comma-separated weekday names. Empty means no scheduled day.
    #[serde(default)]
    pub days_of_the_week: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditHabitRequest {
    pub existing_habit_name: String,
    pub new_habit_name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub habit_priority: i64,
    #[serde(default)]
    pub days_of_the_week: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitNameRequest {
    pub habit_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteHabitRequest {
    pub habit_name: String,
    /// Tree to water. Defaults to the first tree.
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub index: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub success: bool,
    pub tree: Tree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitResponse {
    pub success: bool,
    pub habit: Habit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: CompletionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloverResponse {
    pub success: bool,
    pub rollover: DayRollover,
}

/// Body of every rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Body returned when a habit was already completed today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlreadyCompletedResponse {
    pub success: bool,
    pub already_completed: bool,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(n) => Ok(n as f64),
        NumberOrText::Float(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s))),
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(n) => Ok(n),
        NumberOrText::Float(n) if n.fract() == 0.0 && n.is_finite() => Ok(n as i64),
        NumberOrText::Float(n) => Err(serde::de::Error::custom(format!(
            "{} is not a whole number",
            n
        ))),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a whole number", s))),
    }
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "lenient_i64")] i64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(n)| n))
}
