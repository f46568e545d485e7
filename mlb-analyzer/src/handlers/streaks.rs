//! Single-bucket streak endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::{
    ColdHittersQuery, ColdPitchersQuery, HitterStreakResult, HotHittersQuery, PitcherStreakResult,
    PitcherStreaksQuery,
};
use crate::services::dates::parse_date;
use crate::services::filters::{
    find_cold_hitters, find_cold_pitchers, find_hot_hitters, find_hot_pitchers,
};
use crate::services::providers::observe;
use crate::AppState;

/// Hitters on a hot streak
#[utoipa::path(
    get,
    path = "/hot_streak_hitters",
    params(HotHittersQuery),
    responses(
        (status = 200, description = "Hitters passing the hot filters", body = HitterStreakResult),
        (status = 400, description = "Invalid date or threshold"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn hot_streak_hitters(
    State(state): State<AppState>,
    Query(query): Query<HotHittersQuery>,
) -> Result<Json<HitterStreakResult>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let hitters = observe(provider.name(), "hitters", provider.hitters(date).await)?;
    let (results, debug) = find_hot_hitters(&hitters, &query.criteria(), query.debug != 0);

    Ok(Json(HitterStreakResult { debug, results }))
}

/// Good hitters in a hitless stretch
#[utoipa::path(
    get,
    path = "/cold_streak_hitters",
    params(ColdHittersQuery),
    responses(
        (status = 200, description = "Hitters passing the cold filters", body = HitterStreakResult),
        (status = 400, description = "Invalid date or threshold"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn cold_streak_hitters(
    State(state): State<AppState>,
    Query(query): Query<ColdHittersQuery>,
) -> Result<Json<HitterStreakResult>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let hitters = observe(provider.name(), "hitters", provider.hitters(date).await)?;
    let (results, debug) = find_cold_hitters(&hitters, &query.criteria(), query.debug != 0);

    Ok(Json(HitterStreakResult { debug, results }))
}

/// Pitchers on a strikeout streak
#[utoipa::path(
    get,
    path = "/pitcher_streaks",
    params(PitcherStreaksQuery),
    responses(
        (status = 200, description = "Pitchers passing the hot filters", body = PitcherStreakResult),
        (status = 400, description = "Invalid date or threshold"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn pitcher_streaks(
    State(state): State<AppState>,
    Query(query): Query<PitcherStreaksQuery>,
) -> Result<Json<PitcherStreakResult>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let pitchers = observe(provider.name(), "pitchers", provider.pitchers(date).await)?;
    let (results, debug) = find_hot_pitchers(&pitchers, &query.criteria(), query.debug != 0);

    Ok(Json(PitcherStreakResult { debug, results }))
}

/// Pitchers giving up runs every start
#[utoipa::path(
    get,
    path = "/cold_pitchers",
    params(ColdPitchersQuery),
    responses(
        (status = 200, description = "Pitchers passing the cold filters", body = PitcherStreakResult),
        (status = 400, description = "Invalid date or threshold"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn cold_pitchers(
    State(state): State<AppState>,
    Query(query): Query<ColdPitchersQuery>,
) -> Result<Json<PitcherStreakResult>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let pitchers = observe(provider.name(), "pitchers", provider.pitchers(date).await)?;
    let (results, debug) = find_cold_pitchers(&pitchers, &query.criteria(), query.debug != 0);

    Ok(Json(PitcherStreakResult { debug, results }))
}
