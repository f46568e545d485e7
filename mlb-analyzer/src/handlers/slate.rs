use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;
use std::collections::BTreeMap;

use crate::dtos::{SlateScanQuery, SlateScanResponse};
use crate::services::dates::parse_date;
use crate::services::filters::{
    find_cold_hitters, find_cold_pitchers, find_hot_hitters, find_hot_pitchers,
};
use crate::services::matchups::build_matchups;
use crate::services::providers::{observe, probables_by_team};
use crate::AppState;

/// Scan a slate for all four buckets and pair them up
///
/// Hot hitters are matched against cold opposing starters, and hot starters
/// against cold opposing hitters.
#[utoipa::path(
    get,
    path = "/slate_scan",
    params(SlateScanQuery),
    responses(
        (status = 200, description = "Hot/cold buckets and matchups", body = SlateScanResponse),
        (status = 400, description = "Invalid date or threshold"),
        (status = 502, description = "Upstream data source failed"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Slate"
)]
#[tracing::instrument(skip(state))]
pub async fn slate_scan(
    State(state): State<AppState>,
    Query(query): Query<SlateScanQuery>,
) -> Result<Json<SlateScanResponse>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;
    let name = provider.name();
    let debug = query.debug != 0;

    let (hitters, pitchers) = observe(name, "slate_players", provider.slate_players(date).await)?;
    let probables = probables_by_team(&pitchers);

    let (hot_hitters, hot_hitter_counts) = find_hot_hitters(&hitters, &query.hot_hitters(), debug);
    let (cold_hitters, cold_hitter_counts) =
        find_cold_hitters(&hitters, &query.cold_hitters(), debug);
    let (hot_pitchers, hot_pitcher_counts) =
        find_hot_pitchers(&pitchers, &query.hot_pitchers(), debug);
    let (cold_pitchers, cold_pitcher_counts) =
        find_cold_pitchers(&pitchers, &query.cold_pitchers(), debug);

    let matchups = build_matchups(
        &hot_hitters,
        &cold_hitters,
        &hot_pitchers,
        &cold_pitchers,
        &probables,
    );

    let mut counts = BTreeMap::new();
    if debug {
        counts.insert("hot_hitters".to_string(), hot_hitter_counts);
        counts.insert("cold_hitters".to_string(), cold_hitter_counts);
        counts.insert("hot_pitchers".to_string(), hot_pitcher_counts);
        counts.insert("cold_pitchers".to_string(), cold_pitcher_counts);
    }

    tracing::info!(
        %date,
        hot_hitters = hot_hitters.len(),
        cold_hitters = cold_hitters.len(),
        hot_pitchers = hot_pitchers.len(),
        cold_pitchers = cold_pitchers.len(),
        "Slate scanned"
    );

    Ok(Json(SlateScanResponse {
        date: date.to_string(),
        debug: counts,
        hot_hitters,
        cold_hitters,
        hot_pitchers,
        cold_pitchers,
        matchups,
    }))
}
