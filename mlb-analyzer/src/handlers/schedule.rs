use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::DateQuery;
use crate::models::Schedule;
use crate::services::dates::parse_date;
use crate::services::providers::observe;
use crate::AppState;

/// Games on a date with probable starters
#[utoipa::path(
    get,
    path = "/mlb/schedule",
    params(DateQuery),
    responses(
        (status = 200, description = "Schedule for the date", body = Schedule),
        (status = 400, description = "Invalid date"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Schedule"
)]
pub async fn schedule(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Schedule>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let schedule = observe(provider.name(), "schedule", provider.schedule(date).await)?;
    Ok(Json(schedule))
}
