//! One-call smoke test of the loaded provider.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::collections::BTreeMap;

use crate::dtos::{CheckResult, SelfTestProvider, SelfTestQuery, SelfTestResponse, SlateScanQuery};
use crate::models::{Hitter, Pitcher};
use crate::services::dates::parse_date;
use crate::services::filters::{
    find_cold_hitters, find_cold_pitchers, find_hot_hitters, find_hot_pitchers,
};
use crate::services::matchups::build_matchups;
use crate::services::providers::{observe, DataProvider};
use crate::AppState;

const MAX_LIMIT: usize = 200;
const UTF8_SAMPLE_COUNT: usize = 5;

fn to_check<T: Serialize>(result: Result<T, impl ToString>) -> CheckResult {
    match result.map(|v| serde_json::to_value(v)) {
        Ok(Ok(value)) => CheckResult::passed(value),
        Ok(Err(e)) => CheckResult::failed(e),
        Err(e) => CheckResult::failed(e),
    }
}

fn first<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    items.iter().take(limit).cloned().collect()
}

/// Checks run against a loaded provider.
async fn run_checks(
    provider: &dyn DataProvider,
    date: chrono::NaiveDate,
    limit: usize,
) -> (BTreeMap<String, CheckResult>, Vec<String>) {
    let name = provider.name();
    let mut checks = BTreeMap::new();

    let hitters = observe(name, "hitters", provider.hitters(date).await);
    let pitchers = observe(name, "pitchers", provider.pitchers(date).await);
    let probables = observe(
        name,
        "probable_pitchers_by_team",
        provider.probable_pitchers_by_team(date).await,
    );
    let schedule = observe(name, "schedule", provider.schedule(date).await);

    checks.insert(
        "hitters".to_string(),
        to_check(hitters.as_ref().map(|h| json!({"count": h.len(), "sample": first(h, limit)}))),
    );
    checks.insert(
        "pitchers".to_string(),
        to_check(pitchers.as_ref().map(|p| json!({"count": p.len(), "sample": first(p, limit)}))),
    );
    checks.insert(
        "probable_pitchers".to_string(),
        to_check(probables.as_ref().map(|by_team| {
            let teams: BTreeMap<&String, &String> =
                by_team.iter().map(|(team, p)| (team, &p.name)).collect();
            json!({"count": by_team.len(), "by_team": teams})
        })),
    );
    checks.insert(
        "schedule".to_string(),
        to_check(schedule.as_ref().map(|s| {
            json!({
                "games": s.games.len(),
                "not_started_teams": s.not_started_team_names(),
                "sample": first(&s.games, limit),
            })
        })),
    );

    let criteria = SlateScanQuery::default();
    let summary = match (&hitters, &pitchers, &probables) {
        (Ok(hitters), Ok(pitchers), Ok(probables)) => {
            let (hot_h, _) = find_hot_hitters(hitters, &criteria.hot_hitters(), false);
            let (cold_h, _) = find_cold_hitters(hitters, &criteria.cold_hitters(), false);
            let (hot_p, _) = find_hot_pitchers(pitchers, &criteria.hot_pitchers(), false);
            let (cold_p, _) = find_cold_pitchers(pitchers, &criteria.cold_pitchers(), false);
            let matchups = build_matchups(&hot_h, &cold_h, &hot_p, &cold_p, probables);

            CheckResult::passed(json!({
                "counts": {
                    "hot_hitters": hot_h.len(),
                    "cold_hitters": cold_h.len(),
                    "hot_pitchers": hot_p.len(),
                    "cold_pitchers": cold_p.len(),
                    "hot_hitters_vs_cold_pitchers": matchups.hot_hitters_vs_cold_pitchers.len(),
                    "hot_pitchers_vs_cold_hitters": matchups.hot_pitchers_vs_cold_hitters.len(),
                },
                "top": {
                    "hot_hitters": first(&hot_h, limit),
                    "cold_hitters": first(&cold_h, limit),
                },
            }))
        }
        _ => CheckResult::failed("skipped: player data unavailable"),
    };
    checks.insert("slate_summary".to_string(), summary);

    let samples = utf8_samples(
        hitters.as_deref().unwrap_or_default(),
        pitchers.as_deref().unwrap_or_default(),
    );
    (checks, samples)
}

fn utf8_samples(hitters: &[Hitter], pitchers: &[Pitcher]) -> Vec<String> {
    let mut samples: Vec<String> = Vec::new();
    let names = hitters
        .iter()
        .map(|h| &h.name)
        .chain(pitchers.iter().map(|p| &p.name));

    for name in names {
        if samples.len() >= UTF8_SAMPLE_COUNT {
            break;
        }
        if !samples.contains(name) {
            samples.push(name.clone());
        }
    }
    samples
}

/// One-call smoke test
///
/// Exercises every provider operation for the date and reports each outcome.
/// Always answers 200; `status` is `DEGRADED` when any check failed.
#[utoipa::path(
    get,
    path = "/self_test",
    params(SelfTestQuery),
    responses(
        (status = 200, description = "Check results", body = SelfTestResponse),
        (status = 400, description = "Invalid date")
    ),
    tag = "Observability"
)]
#[tracing::instrument(skip(state))]
pub async fn self_test(
    State(state): State<AppState>,
    Query(query): Query<SelfTestQuery>,
) -> Result<Json<SelfTestResponse>, AppError> {
    let tz = state.config.timezone;
    let date = parse_date(query.date.as_deref(), tz)?;
    let limit = query.limit.clamp(1, MAX_LIMIT);
    let slot = &state.provider;

    let (checks, utf8_samples) = match &slot.provider {
        Some(provider) => run_checks(provider.as_ref(), date, limit).await,
        None => {
            let mut checks = BTreeMap::new();
            checks.insert(
                "provider".to_string(),
                CheckResult::failed(slot.last_error.as_deref().unwrap_or("not loaded")),
            );
            (checks, Vec::new())
        }
    };

    let all_ok = slot.is_loaded() && checks.values().all(|c| c.ok);
    if !all_ok {
        tracing::warn!(%date, "Self test degraded");
    }

    let debug: Option<Value> = (query.debug != 0).then(|| {
        json!({
            "selector": slot.selector,
            "timezone": tz.name(),
            "limit": limit,
        })
    });

    Ok(Json(SelfTestResponse {
        app: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
        date: date.to_string(),
        now_local: Utc::now()
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        provider: SelfTestProvider {
            loaded: slot.is_loaded(),
            name: slot.provider.as_ref().map(|p| p.name().to_string()),
            selector: slot.selector.clone(),
            last_error: slot.last_error.clone(),
        },
        status: if all_ok { "OK" } else { "DEGRADED" }.to_string(),
        checks,
        utf8_samples,
        debug,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{SimpleProvider, StubProvider};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn simple_provider_passes_every_check() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (checks, samples) = run_checks(&SimpleProvider::new(), date, 2).await;

        assert!(checks.values().all(|c| c.ok));
        let summary = checks["slate_summary"].result.as_ref().unwrap();
        assert_eq!(summary["counts"]["hot_hitters"], 2);
        assert_eq!(summary["counts"]["hot_hitters_vs_cold_pitchers"], 1);
        assert_eq!(
            checks["hitters"].result.as_ref().unwrap()["sample"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(samples.len(), 5);
    }

    #[tokio::test]
    async fn stub_provider_reports_empty_but_ok() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (checks, samples) = run_checks(&StubProvider, date, 10).await;

        assert!(checks.values().all(|c| c.ok));
        assert_eq!(checks["hitters"].result.as_ref().unwrap()["count"], 0);
        assert!(samples.is_empty());
    }
}
