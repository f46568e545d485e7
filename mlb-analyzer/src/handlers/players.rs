//! League-wide hitter lists and per-player hitless streak lookups.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Datelike;
use serde_json::json;
use service_core::error::AppError;
use std::fmt::Display;

use crate::dtos::{
    CandidateNote, ColdCandidate, ColdCandidatesQuery, ColdCandidatesResponse,
    HitlessStreakQuery, HitlessStreakResponse, LeagueHittersQuery, LeagueHittersResponse,
};
use crate::services::dates::parse_date;
use crate::services::filters::{rank_cold_hitters, rank_hot_hitters};
use crate::services::providers::observe;
use crate::AppState;

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<(), AppError>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "{} must be between {} and {}",
            name,
            min,
            max
        )));
    }
    Ok(())
}

/// League-wide hot hitters
///
/// Ranked by hits per recent game, then season AVG.
#[utoipa::path(
    get,
    path = "/mlb/hot_hitters",
    params(LeagueHittersQuery),
    responses(
        (status = 200, description = "Top hot hitters", body = LeagueHittersResponse),
        (status = 400, description = "Invalid date or top_n"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn league_hot_hitters(
    State(state): State<AppState>,
    Query(query): Query<LeagueHittersQuery>,
) -> Result<Json<LeagueHittersResponse>, AppError> {
    check_range("top_n", query.top_n, 1, 200)?;
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let hitters = observe(provider.name(), "hitters", provider.hitters(date).await)?;
    let (results, debug) = rank_hot_hitters(&hitters, query.top_n, query.debug != 0);

    Ok(Json(LeagueHittersResponse {
        date: date.to_string(),
        debug,
        results,
    }))
}

/// League-wide cold hitters
///
/// Longest current hitless stretches first; ties go to the better season
/// hitter.
#[utoipa::path(
    get,
    path = "/mlb/cold_hitters",
    params(LeagueHittersQuery),
    responses(
        (status = 200, description = "Top cold hitters", body = LeagueHittersResponse),
        (status = 400, description = "Invalid date or top_n"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn league_cold_hitters(
    State(state): State<AppState>,
    Query(query): Query<LeagueHittersQuery>,
) -> Result<Json<LeagueHittersResponse>, AppError> {
    check_range("top_n", query.top_n, 1, 200)?;
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let hitters = observe(provider.name(), "hitters", provider.hitters(date).await)?;
    let (results, debug) = rank_cold_hitters(&hitters, query.top_n, query.debug != 0);

    Ok(Json(LeagueHittersResponse {
        date: date.to_string(),
        debug,
        results,
    }))
}

/// Current hitless streak for one player
///
/// Counts consecutive hitless games through `date`, skipping games without an
/// at-bat.
#[utoipa::path(
    get,
    path = "/mlb/verify_hitless_streak",
    params(HitlessStreakQuery),
    responses(
        (status = 200, description = "Hitless streak", body = HitlessStreakResponse),
        (status = 400, description = "Invalid date or lookback"),
        (status = 404, description = "Player not found"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn verify_hitless_streak(
    State(state): State<AppState>,
    Query(query): Query<HitlessStreakQuery>,
) -> Result<Json<HitlessStreakResponse>, AppError> {
    if query.player.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("player is required")));
    }
    check_range("max_lookback", query.max_lookback, 1, 600)?;
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let found = observe(
        provider.name(),
        "find_hitter",
        provider
            .find_hitter(&query.player, query.team.as_deref(), date, query.max_lookback)
            .await,
    )?
    .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Player not found: {}", query.player)))?;

    let debug = (query.debug != 0).then(|| {
        json!({
            "player_id": found.player_id,
            "matched_name": found.name,
            "matched_team": found.team,
            "provider": provider.name(),
        })
    });

    Ok(Json(HitlessStreakResponse {
        player: query.player,
        team: query.team,
        end_date: date.to_string(),
        hitless_streak_ab_gt_0: found.hitless_streak,
        debug,
    }))
}

/// Cold candidates from a list of names
///
/// Keeps players whose season AVG is at least `min_season_avg` and whose
/// current hitless streak, looking back at most `last_n` games, reaches
/// `min_hitless_games`.
#[utoipa::path(
    get,
    path = "/cold_candidates",
    params(ColdCandidatesQuery),
    responses(
        (status = 200, description = "Matching candidates", body = ColdCandidatesResponse),
        (status = 400, description = "Invalid date or threshold"),
        (status = 503, description = "Provider not loaded")
    ),
    tag = "Streaks"
)]
#[tracing::instrument(skip(state))]
pub async fn cold_candidates(
    State(state): State<AppState>,
    Query(query): Query<ColdCandidatesQuery>,
) -> Result<Json<ColdCandidatesResponse>, AppError> {
    check_range("min_season_avg", query.min_season_avg, 0.0, 1.0)?;
    check_range("min_hitless_games", query.min_hitless_games, 1, 30)?;
    check_range("last_n", query.last_n, 1, 30)?;
    check_range("limit", query.limit, 1, 200)?;
    let date = parse_date(query.date.as_deref(), state.config.timezone)?;
    let provider = state.provider.require()?;

    let names: Vec<&str> = query
        .names
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();

    let mut items = Vec::new();
    let mut notes = Vec::new();

    if names.is_empty() {
        notes.push(CandidateNote::new(None, "no names provided"));
    }

    for name in names {
        let lookup = observe(
            provider.name(),
            "find_hitter",
            provider.find_hitter(name, None, date, query.last_n).await,
        );
        let found = match lookup {
            Ok(Some(found)) => found,
            Ok(None) => {
                notes.push(CandidateNote::new(Some(name), "not found in people search"));
                continue;
            }
            Err(e) => {
                notes.push(CandidateNote::new(Some(name), e.to_string()));
                continue;
            }
        };

        let Some(avg) = found.season_avg else {
            notes.push(CandidateNote::new(Some(name), "season average unavailable"));
            continue;
        };
        if avg < query.min_season_avg {
            notes.push(CandidateNote::new(
                Some(name),
                format!("season_avg {:.3} < min {:.3}", avg, query.min_season_avg),
            ));
            continue;
        }
        if found.hitless_streak < query.min_hitless_games {
            notes.push(CandidateNote::new(
                Some(name),
                format!(
                    "hitless_streak {} < min {}",
                    found.hitless_streak, query.min_hitless_games
                ),
            ));
            continue;
        }

        items.push(ColdCandidate {
            name: name.to_string(),
            team: found.team,
            season_avg: (avg * 1000.0).round() / 1000.0,
            hitless_streak: found.hitless_streak,
        });
        if items.len() >= query.limit {
            break;
        }
    }

    tracing::info!(%date, kept = items.len(), dropped = notes.len(), "Cold candidates checked");

    let debug = (query.debug != 0 || !notes.is_empty()).then_some(notes);

    Ok(Json(ColdCandidatesResponse {
        date: date.to_string(),
        season: date.year(),
        items,
        debug,
    }))
}
