//! Daily schedule model and game-state classification.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// StatsAPI `statusCode` values for games that have not started yet
/// (Scheduled, Pre-Game).
const NOT_STARTED_CODES: &[&str] = &["S", "P"];

/// In Progress, Warmup, Pre-Resume, Final, Other finished.
const STARTED_CODES: &[&str] = &["I", "PW", "PR", "F", "O"];

const NOT_STARTED_TOKENS: &[&str] = &["scheduled", "preview", "pre-game", "pregame", "pre game"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub games: Vec<Game>,
}

impl Schedule {
    pub fn empty(date: String) -> Self {
        Self {
            date,
            games: Vec::new(),
        }
    }

    /// Names of teams whose game on this date has not started.
    pub fn not_started_team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .games
            .iter()
            .filter(|g| g.not_started)
            .flat_map(|g| [g.home.team_name.clone(), g.away.team_name.clone()])
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub game_pk: u64,
    #[serde(default)]
    pub game_date: Option<String>,
    pub status: GameStatus,
    pub home: GameSide,
    pub away: GameSide,
    pub not_started: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameStatus {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub detailed_state: Option<String>,
    #[serde(default)]
    pub abstract_game_state: Option<String>,
}

impl GameStatus {
    /// True only when the status positively says the game has not begun.
    ///
    /// The status code wins when it is recognized; otherwise the textual
    /// states are consulted. Unknown states count as started.
    pub fn is_not_started(&self) -> bool {
        if let Some(code) = self.status_code.as_deref() {
            if NOT_STARTED_CODES.contains(&code) {
                return true;
            }
            if STARTED_CODES.contains(&code) {
                return false;
            }
        }

        let detailed = self
            .detailed_state
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let abstract_state = self
            .abstract_game_state
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        NOT_STARTED_TOKENS
            .iter()
            .any(|t| detailed.contains(t) || abstract_state.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameSide {
    pub team_id: u64,
    pub team_name: String,
    #[serde(default)]
    pub probable_pitcher: Option<ProbablePitcher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProbablePitcher {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: Option<&str>, detailed: Option<&str>, abstract_state: Option<&str>) -> GameStatus {
        GameStatus {
            status_code: code.map(String::from),
            detailed_state: detailed.map(String::from),
            abstract_game_state: abstract_state.map(String::from),
        }
    }

    #[test]
    fn status_code_takes_precedence() {
        assert!(status(Some("S"), Some("Final"), None).is_not_started());
        assert!(status(Some("P"), None, None).is_not_started());
        assert!(!status(Some("F"), Some("Scheduled"), None).is_not_started());
        assert!(!status(Some("PW"), None, None).is_not_started());
    }

    #[test]
    fn falls_back_to_text_for_unknown_codes() {
        assert!(status(Some("X"), Some("Pre-Game"), None).is_not_started());
        assert!(status(None, None, Some("Preview")).is_not_started());
        assert!(!status(None, Some("In Progress"), None).is_not_started());
        assert!(!status(None, None, Some("Live")).is_not_started());
    }

    #[test]
    fn unknown_status_counts_as_started() {
        assert!(!status(None, None, None).is_not_started());
        assert!(!status(Some("Z"), Some("Suspended"), None).is_not_started());
    }

    #[test]
    fn not_started_team_names_are_sorted_and_unique() {
        let side = |id: u64, name: &str| GameSide {
            team_id: id,
            team_name: name.to_string(),
            probable_pitcher: None,
        };
        let game = |pk: u64, home: GameSide, away: GameSide, not_started: bool| Game {
            game_pk: pk,
            game_date: None,
            status: GameStatus::default(),
            home,
            away,
            not_started,
        };

        let schedule = Schedule {
            date: "2024-06-01".into(),
            games: vec![
                game(1, side(111, "Boston Red Sox"), side(147, "New York Yankees"), true),
                game(2, side(119, "Los Angeles Dodgers"), side(137, "San Francisco Giants"), false),
                game(3, side(147, "New York Yankees"), side(111, "Boston Red Sox"), true),
            ],
        };

        assert_eq!(
            schedule.not_started_team_names(),
            vec!["Boston Red Sox".to_string(), "New York Yankees".to_string()]
        );
    }
}
