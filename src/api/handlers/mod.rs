use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::error::ApiError;
use super::wire::*;
use crate::db::Database;
use crate::error::TrackerError;
use crate::models::*;

type ApiResult<T> = Result<T, ApiError>;

/// Tree indices arrive as signed numbers; negative ones name no tree.
fn tree_index(raw: i64) -> Result<u32, TrackerError> {
    u32::try_from(raw).map_err(|_| TrackerError::not_found(format!("Tree {} not found", raw)))
}

fn parse_days(raw: &str, habit_name: &str) -> Result<DaysOfWeek, TrackerError> {
    let days: DaysOfWeek = raw.parse()?;
    if days.is_empty() {
        tracing::warn!("Habit '{}' has no scheduled days", habit_name.trim());
    }
    Ok(days)
}

// ============================================================
// Health and state
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_state(State(db): State<Database>) -> ApiResult<Json<TrackerState>> {
    Ok(Json(db.tracker_state()?))
}

pub async fn reset_day(State(db): State<Database>) -> ApiResult<Json<RolloverResponse>> {
    let rollover = db.day_boundary_reset()?;
    Ok(Json(RolloverResponse {
        success: true,
        rollover,
    }))
}

// ============================================================
// Trees
// ============================================================

pub async fn list_trees(State(db): State<Database>) -> ApiResult<Json<Vec<Tree>>> {
    Ok(Json(db.list_trees()?))
}

pub async fn get_tree(
    State(db): State<Database>,
    Path(index): Path<i64>,
) -> ApiResult<Json<Tree>> {
    Ok(Json(db.get_tree(tree_index(index)?)?))
}

pub async fn edit_tree(
    State(db): State<Database>,
    Json(input): Json<EditTreeRequest>,
) -> ApiResult<Json<TreeResponse>> {
    let tree = db.rename_tree(tree_index(input.index)?, &input.name)?;
    Ok(Json(TreeResponse {
        success: true,
        tree,
    }))
}

pub async fn water_tree(
    State(db): State<Database>,
    Json(input): Json<WaterTreeRequest>,
) -> ApiResult<Json<TreeResponse>> {
    let tree = db.water_tree(tree_index(input.index)?, input.water_amount)?;
    Ok(Json(TreeResponse {
        success: true,
        tree,
    }))
}

/// Plant a tree. The body is optional; without one the default name is used.
pub async fn plant_tree(
    State(db): State<Database>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TreeResponse>)> {
    let input: PlantTreeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        PlantTreeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| TrackerError::validation(format!("Invalid request body: {}", e)))?
    };

    let tree = db.plant_tree(PlantTreeInput { name: input.name })?;
    Ok((
        StatusCode::CREATED,
        Json(TreeResponse {
            success: true,
            tree,
        }),
    ))
}

// ============================================================
// Habits
// ============================================================

pub async fn list_habits(State(db): State<Database>) -> ApiResult<Json<Vec<Habit>>> {
    Ok(Json(db.list_habits()?))
}

pub async fn add_habit(
    State(db): State<Database>,
    Json(input): Json<AddHabitRequest>,
) -> ApiResult<Json<HabitResponse>> {
    let days_of_week = parse_days(&input.days_of_the_week, &input.habit_name)?;
    let habit = db.add_habit(CreateHabitInput {
        name: input.habit_name,
        priority: input.habit_priority,
        days_of_week,
    })?;
    Ok(Json(HabitResponse {
        success: true,
        habit,
    }))
}

pub async fn edit_habit(
    State(db): State<Database>,
    Json(input): Json<EditHabitRequest>,
) -> ApiResult<Json<HabitResponse>> {
    let days_of_week = parse_days(&input.days_of_the_week, &input.new_habit_name)?;
    let habit = db.edit_habit(
        &input.existing_habit_name,
        UpdateHabitInput {
            new_name: input.new_habit_name,
            priority: input.habit_priority,
            days_of_week,
        },
    )?;
    Ok(Json(HabitResponse {
        success: true,
        habit,
    }))
}

pub async fn delete_habit(
    State(db): State<Database>,
    Json(input): Json<HabitNameRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    db.delete_habit(&input.habit_name)?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn complete_habit(
    State(db): State<Database>,
    Json(input): Json<CompleteHabitRequest>,
) -> ApiResult<Json<CompletionResponse>> {
    let index = input.index.map(tree_index).transpose()?;
    let result = db.complete_habit(&input.habit_name, index)?;
    Ok(Json(CompletionResponse {
        success: true,
        result,
    }))
}
