//! Deterministic synthetic slate for demos and tests.
//!
//! Two series (NYY at BOS, SFG at LAD) with one hot and one cold probable
//! starter and one hot and one cold hitter on each side of the slate. The
//! slate is rebuilt on every call; nothing is retained between requests.

use super::{DataProvider, ProviderError};
use crate::models::{Game, GameSide, GameStatus, Hitter, Pitcher, ProbablePitcher, Schedule};
use async_trait::async_trait;
use chrono::NaiveDate;

struct Slate {
    hitters: Vec<Hitter>,
    pitchers: Vec<Pitcher>,
    schedule: Schedule,
}

#[derive(Debug, Default)]
pub struct SimpleProvider;

impl SimpleProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataProvider for SimpleProvider {
    fn name(&self) -> &str {
        "simple"
    }

    async fn hitters(&self, date: NaiveDate) -> Result<Vec<Hitter>, ProviderError> {
        Ok(seed(date).hitters)
    }

    async fn pitchers(&self, date: NaiveDate) -> Result<Vec<Pitcher>, ProviderError> {
        Ok(seed(date).pitchers)
    }

    async fn schedule(&self, date: NaiveDate) -> Result<Schedule, ProviderError> {
        Ok(seed(date).schedule)
    }
}

#[allow(clippy::too_many_arguments)]
fn pitcher(
    id: &str,
    name: &str,
    team: &str,
    opponent: &str,
    era: f64,
    kbb: f64,
    ks: [u32; 3],
    runs: [u32; 3],
) -> Pitcher {
    Pitcher {
        player_id: id.to_string(),
        name: name.to_string(),
        team: team.to_string(),
        opponent_team: Some(opponent.to_string()),
        era,
        kbb: Some(kbb),
        k_per_start_last_n: ks.to_vec(),
        runs_allowed_last_n: runs.to_vec(),
        is_probable: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn hitter(
    id: &str,
    name: &str,
    team: &str,
    opponent: &str,
    probable: Option<&str>,
    (avg, obp, slg): (f64, f64, f64),
    last_n_games: u32,
    hits: [u32; 3],
    hitless: u32,
) -> Hitter {
    Hitter {
        player_id: id.to_string(),
        name: name.to_string(),
        team: team.to_string(),
        opponent_team: Some(opponent.to_string()),
        probable_pitcher_id: probable.map(String::from),
        avg,
        obp: Some(obp),
        slg: Some(slg),
        last_n_games,
        last_n_hits_each_game: hits.to_vec(),
        last_n_hitless_games: hitless,
    }
}

fn side(team_id: u64, team: &str, probable: &Pitcher) -> GameSide {
    GameSide {
        team_id,
        team_name: team.to_string(),
        probable_pitcher: Some(ProbablePitcher {
            id: probable.player_id.clone(),
            name: probable.name.clone(),
        }),
    }
}

fn seed(date: NaiveDate) -> Slate {
    let pitchers = vec![
        pitcher("pit-bos-01", "Carl Flame", "BOS", "NYY", 3.20, 4.5, [7, 8, 6], [2, 1, 2]),
        pitcher("pit-nyy-02", "Nate Ice", "NYY", "BOS", 5.05, 1.9, [5, 4, 3], [4, 3, 5]),
        pitcher("pit-lad-03", "Leo Heat", "LAD", "SFG", 2.95, 5.2, [9, 7, 8], [1, 2, 0]),
        pitcher("pit-sfg-04", "Sam Slump", "SFG", "LAD", 4.90, 2.1, [4, 5, 5], [3, 4, 3]),
    ];

    let hitters = vec![
        hitter(
            "hit-nyy-11",
            "Johnny Rake",
            "NYY",
            "BOS",
            None,
            (0.305, 0.370, 0.510),
            5,
            [2, 1, 3],
            0,
        ),
        hitter(
            "hit-bos-12",
            "Mike Freeze",
            "BOS",
            "NYY",
            Some("pit-nyy-02"),
            (0.280, 0.320, 0.390),
            3,
            [0, 0, 1],
            2,
        ),
        hitter(
            "hit-lad-13",
            "Alonzo Torch",
            "LAD",
            "SFG",
            None,
            (0.315, 0.380, 0.560),
            4,
            [1, 2, 1],
            0,
        ),
        hitter(
            "hit-sfg-14",
            "Rick Quiet",
            "SFG",
            "LAD",
            Some("pit-lad-03"),
            (0.276, 0.310, 0.360),
            3,
            [0, 0, 1],
            2,
        ),
    ];

    let scheduled = GameStatus {
        status_code: Some("S".to_string()),
        detailed_state: Some("Scheduled".to_string()),
        abstract_game_state: Some("Preview".to_string()),
    };
    let games = vec![
        Game {
            game_pk: 900_001,
            game_date: Some(format!("{}T23:10:00Z", date)),
            status: scheduled.clone(),
            home: side(111, "BOS", &pitchers[0]),
            away: side(147, "NYY", &pitchers[1]),
            not_started: true,
        },
        Game {
            game_pk: 900_002,
            game_date: Some(format!("{}T02:10:00Z", date.succ_opt().unwrap_or(date))),
            status: scheduled,
            home: side(119, "LAD", &pitchers[2]),
            away: side(137, "SFG", &pitchers[3]),
            not_started: true,
        },
    ];

    Slate {
        hitters,
        pitchers,
        schedule: Schedule {
            date: date.to_string(),
            games,
        },
    }
}
