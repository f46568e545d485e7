use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

use crate::dtos::{ProviderRawQuery, ProviderRawResponse, RawCounts};
use crate::services::dates::parse_date;
use crate::services::providers::{observe, RawQuery};
use crate::AppState;

/// Dump the provider's hitter and pitcher rows for a date
#[utoipa::path(
    get,
    path = "/provider_raw",
    params(ProviderRawQuery),
    responses(
        (status = 200, description = "Raw provider rows", body = ProviderRawResponse),
        (status = 400, description = "Invalid date"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Provider"
)]
#[tracing::instrument(skip(state))]
pub async fn provider_raw(
    State(state): State<AppState>,
    Query(query): Query<ProviderRawQuery>,
) -> Result<Json<ProviderRawResponse>, AppError> {
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let raw_query = RawQuery {
        limit: query.limit,
        team: query.team.clone(),
    };
    let rows = observe(
        provider.name(),
        "raw_rows",
        provider.raw_rows(date, &raw_query).await,
    )?;

    let debug = (query.debug != 0).then(|| {
        json!({
            "selector": state.provider.selector,
            "timezone": state.config.timezone.name(),
            "limit": query.limit,
            "team": query.team,
        })
    });

    Ok(Json(ProviderRawResponse {
        date: date.to_string(),
        provider: provider.name().to_string(),
        counts: RawCounts {
            hitters: rows.hitters.len(),
            pitchers: rows.pitchers.len(),
        },
        hitters: rows.hitters,
        pitchers: rows.pitchers,
        debug,
    }))
}
