use crate::models::Hitter;
use crate::services::filters::StageCounts;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

fn default_top_n() -> usize {
    15
}

fn default_max_lookback() -> u32 {
    300
}

fn default_min_season_avg() -> f64 {
    0.270
}

fn default_min_hitless_games() -> u32 {
    1
}

fn default_candidate_last_n() -> u32 {
    7
}

fn default_candidate_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeagueHittersQuery {
    pub date: Option<String>,
    /// 1 to 200.
    #[serde(default = "default_top_n")]
    #[param(default = 15, minimum = 1, maximum = 200)]
    pub top_n: usize,
    #[serde(default)]
    pub debug: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeagueHittersResponse {
    pub date: String,
    #[schema(value_type = Object)]
    pub debug: StageCounts,
    pub results: Vec<Hitter>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HitlessStreakQuery {
    /// Full player name.
    pub player: String,
    /// Narrows the name search to a team.
    pub team: Option<String>,
    /// Last day counted; defaults to today.
    pub date: Option<String>,
    /// Most games counted, 1 to 600.
    #[serde(default = "default_max_lookback")]
    #[param(default = 300, minimum = 1, maximum = 600)]
    pub max_lookback: u32,
    #[serde(default)]
    pub debug: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HitlessStreakResponse {
    pub player: String,
    pub team: Option<String>,
    pub end_date: String,
    /// Consecutive hitless games with at least one at-bat.
    pub hitless_streak_ab_gt_0: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub debug: Option<Value>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ColdCandidatesQuery {
    pub date: Option<String>,
    /// Comma-separated full names.
    pub names: Option<String>,
    #[serde(default = "default_min_season_avg")]
    #[param(default = 0.270, minimum = 0.0, maximum = 1.0)]
    pub min_season_avg: f64,
    #[serde(default = "default_min_hitless_games")]
    #[param(default = 1, minimum = 1, maximum = 30)]
    pub min_hitless_games: u32,
    /// Most recent games considered per player.
    #[serde(default = "default_candidate_last_n")]
    #[param(default = 7, minimum = 1, maximum = 30)]
    pub last_n: u32,
    #[serde(default = "default_candidate_limit")]
    #[param(default = 50, minimum = 1, maximum = 200)]
    pub limit: usize,
    #[serde(default)]
    pub debug: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ColdCandidate {
    pub name: String,
    pub team: String,
    pub season_avg: f64,
    pub hitless_streak: u32,
}

/// Why a requested name is not in `items`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CandidateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub reason: String,
}

impl CandidateNote {
    pub fn new(name: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            name: name.map(String::from),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ColdCandidatesResponse {
    pub date: String,
    pub season: i32,
    pub items: Vec<ColdCandidate>,
    /// Present when asked for, or when any name was dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<CandidateNote>>,
}
