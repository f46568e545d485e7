use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A batter as seen by the streak filters.
///
/// Per-game lists are ordered most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hitter {
    pub player_id: String,
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub opponent_team: Option<String>,
    /// Opposing probable starter, when known pregame.
    #[serde(default)]
    pub probable_pitcher_id: Option<String>,
    pub avg: f64,
    #[serde(default)]
    pub obp: Option<f64>,
    #[serde(default)]
    pub slg: Option<f64>,
    #[serde(default)]
    pub last_n_games: u32,
    /// Hits in each of the most recent games.
    #[serde(default)]
    pub last_n_hits_each_game: Vec<u32>,
    /// Consecutive most-recent games without a hit.
    #[serde(default)]
    pub last_n_hitless_games: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pitcher {
    pub player_id: String,
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub opponent_team: Option<String>,
    pub era: f64,
    /// Strikeout-to-walk ratio.
    #[serde(default)]
    pub kbb: Option<f64>,
    /// Strikeouts in each of the most recent starts.
    #[serde(default)]
    pub k_per_start_last_n: Vec<u32>,
    /// Earned runs in each of the most recent starts.
    #[serde(default)]
    pub runs_allowed_last_n: Vec<u32>,
    #[serde(default)]
    pub is_probable: bool,
}

/// One hitter resolved by name, with the streak counted through a given day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HitterLookup {
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub season_avg: Option<f64>,
    /// Consecutive hitless games, ignoring games without an at-bat.
    pub hitless_streak: u32,
}
