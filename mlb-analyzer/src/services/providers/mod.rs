//! Data provider abstraction and startup registry.
//!
//! Handlers only see `Arc<dyn DataProvider>`. Which implementation backs it is
//! decided once at startup from the `MLB_PROVIDER` selector
//! (`module.path:ClassName`).

pub mod simple;
pub mod statsapi;
pub mod stub;

use crate::config::AnalyzerConfig;
use crate::models::{Hitter, HitterLookup, Pitcher, Schedule};
use crate::services::metrics::record_provider_call;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub use simple::SimpleProvider;
pub use statsapi::StatsApiProvider;
pub use stub::StubProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if err.is_status() {
            ProviderError::Upstream(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Row filter for the raw provider dump.
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    pub limit: Option<usize>,
    /// Case-insensitive substring of the team.
    pub team: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRows {
    pub hitters: Vec<Value>,
    pub pitchers: Vec<Value>,
}

#[async_trait]
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn hitters(&self, date: NaiveDate) -> Result<Vec<Hitter>, ProviderError>;

    async fn pitchers(&self, date: NaiveDate) -> Result<Vec<Pitcher>, ProviderError>;

    /// Hitters and pitchers for `date` in one pass over the slate.
    async fn slate_players(
        &self,
        date: NaiveDate,
    ) -> Result<(Vec<Hitter>, Vec<Pitcher>), ProviderError> {
        futures::try_join!(self.hitters(date), self.pitchers(date))
    }

    /// Probable starters for `date`, keyed by team.
    async fn probable_pitchers_by_team(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<String, Pitcher>, ProviderError> {
        Ok(probables_by_team(&self.pitchers(date).await?))
    }

    /// Season AVG and current hitless streak for one hitter, looked up by
    /// name. `team` narrows ambiguous names; the streak counts games through
    /// `date` and stops at `lookback`.
    async fn find_hitter(
        &self,
        name: &str,
        team: Option<&str>,
        date: NaiveDate,
        lookback: u32,
    ) -> Result<Option<HitterLookup>, ProviderError> {
        let hitters = self.hitters(date).await?;
        let team = team.map(str::to_lowercase);

        Ok(hitters
            .into_iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name.trim()))
            .find(|h| match &team {
                Some(t) => h.team.to_lowercase().contains(t.as_str()),
                None => true,
            })
            .map(|h| HitterLookup {
                player_id: h.player_id,
                name: h.name,
                team: h.team,
                season_avg: Some(h.avg),
                hitless_streak: h.last_n_hitless_games.min(lookback),
            }))
    }

    async fn schedule(&self, date: NaiveDate) -> Result<Schedule, ProviderError> {
        Ok(Schedule::empty(date.to_string()))
    }

    async fn raw_rows(&self, date: NaiveDate, query: &RawQuery) -> Result<RawRows, ProviderError> {
        let hitters = self.hitters(date).await?;
        let pitchers = self.pitchers(date).await?;

        Ok(RawRows {
            hitters: select_rows(&hitters, |h| &h.team, query)?,
            pitchers: select_rows(&pitchers, |p| &p.team, query)?,
        })
    }
}

fn select_rows<T: Serialize>(
    rows: &[T],
    team_of: impl Fn(&T) -> &str,
    query: &RawQuery,
) -> Result<Vec<Value>, ProviderError> {
    let needle = query
        .team
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    rows.iter()
        .filter(|row| match &needle {
            Some(n) => team_of(row).to_lowercase().contains(n.as_str()),
            None => true,
        })
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|row| serde_json::to_value(row).map_err(ProviderError::from))
        .collect()
}

/// Probable pitchers keyed by team. A later entry for the same team wins.
pub fn probables_by_team(pitchers: &[Pitcher]) -> HashMap<String, Pitcher> {
    pitchers
        .iter()
        .filter(|p| p.is_probable)
        .map(|p| (p.team.clone(), p.clone()))
        .collect()
}

/// Records the outcome of a provider call and logs failures.
pub fn observe<T>(
    provider: &str,
    operation: &'static str,
    result: Result<T, ProviderError>,
) -> Result<T, ProviderError> {
    record_provider_call(provider, operation, result.is_ok());
    if let Err(e) = &result {
        tracing::warn!(provider, operation, error = %e, "Provider call failed");
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Stub,
    Simple,
    StatsApi,
}

impl ProviderKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "stub" | "dataprovider" | "default" => Some(ProviderKind::Stub),
            "simple" => Some(ProviderKind::Simple),
            "statsapi" | "utf8_wrapper" => Some(ProviderKind::StatsApi),
            _ => None,
        }
    }
}

/// Resolves a `module.path:ClassName` selector.
///
/// The class name is tried first, with and without a `Provider` suffix, then
/// the last module segment, with and without a `_provider` suffix.
pub fn resolve_kind(selector: &str) -> Result<ProviderKind, ProviderError> {
    let selector = selector.trim();
    let (module, class) = match selector.split_once(':') {
        Some((module, class)) => (module.trim(), class.trim()),
        None => (selector, ""),
    };

    let class = class.to_lowercase();
    let segment = module.rsplit('.').next().unwrap_or_default().to_lowercase();

    let candidates = [
        class.as_str(),
        class.strip_suffix("provider").unwrap_or_default(),
        segment.as_str(),
        segment.strip_suffix("_provider").unwrap_or_default(),
    ];

    candidates
        .iter()
        .filter(|c| !c.is_empty())
        .find_map(|c| ProviderKind::from_token(c))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider '{}' (expected stub, simple or statsapi)",
                selector
            ))
        })
}

/// The provider chosen at startup, or why none could be loaded.
#[derive(Clone)]
pub struct ProviderSlot {
    pub provider: Option<Arc<dyn DataProvider>>,
    pub selector: Option<String>,
    pub last_error: Option<String>,
}

impl ProviderSlot {
    pub fn loaded(provider: Arc<dyn DataProvider>, selector: Option<String>) -> Self {
        Self {
            provider: Some(provider),
            selector,
            last_error: None,
        }
    }

    pub fn failed(selector: Option<String>, error: String) -> Self {
        Self {
            provider: None,
            selector,
            last_error: Some(error),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.provider.is_some()
    }

    /// The active provider, or 503 with the load error.
    pub fn require(&self) -> Result<Arc<dyn DataProvider>, AppError> {
        self.provider.clone().ok_or_else(|| {
            AppError::ServiceUnavailable(format!(
                "Provider not loaded: {}",
                self.last_error.as_deref().unwrap_or("unknown error")
            ))
        })
    }
}

fn build_provider(
    kind: ProviderKind,
    config: &AnalyzerConfig,
) -> Result<Arc<dyn DataProvider>, ProviderError> {
    Ok(match kind {
        ProviderKind::Stub => Arc::new(StubProvider),
        ProviderKind::Simple => Arc::new(SimpleProvider::new()),
        ProviderKind::StatsApi => Arc::new(StatsApiProvider::new(config.stats_api.clone())?),
    })
}

/// Loads the configured provider. Never fails: a bad selector leaves the
/// slot empty with the error recorded.
pub fn load_provider(config: &AnalyzerConfig) -> ProviderSlot {
    let selector = config.provider.clone();

    let result = match selector.as_deref() {
        None => Ok(ProviderKind::Stub),
        Some(s) => resolve_kind(s),
    }
    .and_then(|kind| build_provider(kind, config));

    match result {
        Ok(provider) => {
            tracing::info!(provider = provider.name(), "Data provider loaded");
            ProviderSlot::loaded(provider, selector)
        }
        Err(e) => {
            tracing::error!(selector = ?selector, error = %e, "Failed to load data provider");
            ProviderSlot::failed(selector, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_class_and_module_names() {
        let cases = [
            ("stub", ProviderKind::Stub),
            ("providers.base:DataProvider", ProviderKind::Stub),
            ("app.providers:default", ProviderKind::Stub),
            ("providers.simple_provider:SimpleProvider", ProviderKind::Simple),
            ("providers.simple_provider", ProviderKind::Simple),
            ("providers.statsapi_provider:StatsApiProvider", ProviderKind::StatsApi),
            ("providers.utf8_wrapper:Wrapper", ProviderKind::StatsApi),
            ("  providers.mlb:STATSAPI  ", ProviderKind::StatsApi),
        ];

        for (selector, expected) in cases {
            assert_eq!(resolve_kind(selector).unwrap(), expected, "{selector}");
        }
    }

    #[test]
    fn unknown_selector_is_not_configured() {
        let err = resolve_kind("providers.odds:OddsProvider").unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("providers.odds:OddsProvider"));
    }

    #[test]
    fn provider_errors_map_to_http_errors() {
        assert!(matches!(
            AppError::from(ProviderError::NotConfigured("x".into())),
            AppError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(ProviderError::Upstream("x".into())),
            AppError::BadGateway(_)
        ));
        assert!(matches!(
            AppError::from(ProviderError::Network("x".into())),
            AppError::BadGateway(_)
        ));
    }

    #[test]
    fn empty_slot_requires_with_load_error() {
        let slot = ProviderSlot::failed(Some("bogus".into()), "unknown provider".into());
        assert!(!slot.is_loaded());
        match slot.require() {
            Err(AppError::ServiceUnavailable(msg)) => {
                assert_eq!(msg, "Provider not loaded: unknown provider");
            }
            _ => panic!("expected service unavailable"),
        }
    }

    #[tokio::test]
    async fn find_hitter_matches_name_and_team() {
        let provider = SimpleProvider::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let found = provider
            .find_hitter("mike freeze", Some("bos"), date, 7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.player_id, "hit-bos-12");
        assert_eq!(found.season_avg, Some(0.280));
        assert_eq!(found.hitless_streak, 2);

        let capped = provider
            .find_hitter("Mike Freeze", None, date, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(capped.hitless_streak, 1);

        assert!(provider
            .find_hitter("Mike Freeze", Some("LAD"), date, 7)
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn probables_keep_the_last_starter_per_team() {
        let starter = |id: &str| Pitcher {
            player_id: id.to_string(),
            name: id.to_string(),
            team: "NYY".to_string(),
            opponent_team: None,
            era: 5.0,
            kbb: None,
            k_per_start_last_n: vec![],
            runs_allowed_last_n: vec![],
            is_probable: true,
        };

        let probables = probables_by_team(&[starter("first"), starter("second")]);
        assert_eq!(probables.len(), 1);
        assert_eq!(probables["NYY"].player_id, "second");
    }

    #[tokio::test]
    async fn raw_rows_filter_by_team_and_limit() {
        let provider = SimpleProvider::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let rows = provider
            .raw_rows(
                date,
                &RawQuery {
                    limit: Some(1),
                    team: Some("ny".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(rows.hitters.len(), 1);
        assert_eq!(rows.hitters[0]["team"], "NYY");
        assert_eq!(rows.pitchers.len(), 1);
        assert_eq!(rows.pitchers[0]["team"], "NYY");
    }
}
