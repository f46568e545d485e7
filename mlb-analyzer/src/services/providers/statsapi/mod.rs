//! Provider backed by the public MLB StatsAPI.
//!
//! A slate is built from the day's schedule: every team playing contributes
//! its active roster, and each player gets season stats plus a recent game
//! log. Player lookups fan out with bounded concurrency.

pub mod client;

use super::{DataProvider, ProviderError};
use crate::config::StatsApiConfig;
use crate::models::{
    Game, GameSide, GameStatus, Hitter, HitterLookup, Pitcher, ProbablePitcher, Schedule,
};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;

pub use client::{StatsApiClient, TtlCache};

const PITCHER_POSITION: &str = "P";

// ---- Wire types -----------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ApiGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGame {
    game_pk: u64,
    #[serde(default)]
    game_date: Option<String>,
    #[serde(default)]
    status: ApiStatus,
    teams: ApiTeams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStatus {
    status_code: Option<String>,
    detailed_state: Option<String>,
    abstract_game_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTeams {
    home: ApiTeamSide,
    away: ApiTeamSide,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeamSide {
    team: ApiTeam,
    #[serde(default)]
    probable_pitcher: Option<ApiPerson>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPerson {
    id: u64,
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RosterResponse {
    #[serde(default)]
    roster: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    person: ApiPerson,
    #[serde(default)]
    position: Option<ApiPosition>,
}

#[derive(Debug, Deserialize)]
struct ApiPosition {
    #[serde(default)]
    abbreviation: String,
}

#[derive(Debug, Default, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: Vec<StatGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct StatGroup {
    #[serde(default)]
    splits: Vec<Split>,
}

#[derive(Debug, Deserialize)]
struct Split {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    stat: Value,
}

#[derive(Debug, Default, Deserialize)]
struct PeopleResponse {
    #[serde(default)]
    people: Vec<SearchedPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchedPerson {
    id: u64,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    current_team: Option<ApiTeam>,
}

impl StatsResponse {
    fn into_splits(self) -> Vec<Split> {
        self.stats.into_iter().next().map(|g| g.splits).unwrap_or_default()
    }
}

/// StatsAPI sends rate stats as strings (`".273"`, `"-.--"`) and counts as
/// numbers.
fn stat_f64(stat: &Value, key: &str) -> Option<f64> {
    match stat.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn stat_u32(stat: &Value, key: &str) -> u32 {
    stat_f64(stat, key).map(|v| v.max(0.0) as u32).unwrap_or(0)
}

// ---- Game-log derivations -------------------------------------------------

/// Per-game stat lines before `before`, most recent first.
fn recent_lines(splits: Vec<Split>, before: NaiveDate) -> Vec<Value> {
    let mut dated: Vec<(NaiveDate, Value)> = splits
        .into_iter()
        .filter_map(|s| {
            let date = NaiveDate::parse_from_str(s.date.as_deref()?, "%Y-%m-%d").ok()?;
            (date < before).then_some((date, s.stat))
        })
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().map(|(_, stat)| stat).collect()
}

#[derive(Debug, Default, PartialEq)]
struct HittingForm {
    hits_each_game: Vec<u32>,
    hitless_streak: u32,
}

/// Only games with at least one at-bat count.
fn hitting_form(lines: &[Value], depth: usize) -> HittingForm {
    let hits: Vec<u32> = lines
        .iter()
        .filter(|s| stat_u32(s, "atBats") > 0)
        .map(|s| stat_u32(s, "hits"))
        .collect();

    HittingForm {
        hitless_streak: hits.iter().take_while(|&&h| h == 0).count() as u32,
        hits_each_game: hits.into_iter().take(depth).collect(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct PitchingForm {
    strikeouts_each_start: Vec<u32>,
    earned_runs_each_start: Vec<u32>,
}

fn pitching_form(lines: &[Value], depth: usize) -> PitchingForm {
    let starts: Vec<&Value> = lines
        .iter()
        .filter(|s| stat_u32(s, "gamesStarted") > 0)
        .take(depth)
        .collect();

    PitchingForm {
        strikeouts_each_start: starts.iter().map(|s| stat_u32(s, "strikeOuts")).collect(),
        earned_runs_each_start: starts.iter().map(|s| stat_u32(s, "earnedRuns")).collect(),
    }
}

fn strikeout_walk_ratio(stat: &Value) -> Option<f64> {
    let strikeouts = stat_f64(stat, "strikeOuts")?;
    let walks = stat_f64(stat, "baseOnBalls")?;
    (walks > 0.0).then(|| strikeouts / walks)
}

// ---- Provider -------------------------------------------------------------

/// One side of a scheduled game, seen from the team taking the field.
#[derive(Debug, Clone)]
struct TeamSlot {
    team_id: u64,
    team: String,
    opponent: String,
    own_probable: Option<ApiPerson>,
    opposing_probable: Option<ApiPerson>,
}

type RosterPick = (TeamSlot, ApiPerson);

#[derive(Debug, Clone, Copy)]
enum Group {
    Hitting,
    Pitching,
}

impl Group {
    fn as_str(self) -> &'static str {
        match self {
            Group::Hitting => "hitting",
            Group::Pitching => "pitching",
        }
    }
}

pub struct StatsApiProvider {
    client: StatsApiClient,
    concurrency: usize,
    game_log_depth: usize,
}

impl StatsApiProvider {
    pub fn new(config: StatsApiConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_client(
            StatsApiClient::new(&config)?,
            config.concurrency,
            config.game_log_depth,
        ))
    }

    pub fn with_client(client: StatsApiClient, concurrency: usize, game_log_depth: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            game_log_depth,
        }
    }

    async fn api_schedule(&self, date: NaiveDate) -> Result<Vec<ApiGame>, ProviderError> {
        let response: ScheduleResponse = self
            .client
            .get(
                "/api/v1/schedule",
                &[
                    ("sportId", "1".to_string()),
                    ("date", date.to_string()),
                    ("hydrate", "probablePitcher".to_string()),
                ],
            )
            .await?;

        Ok(response.dates.into_iter().flat_map(|d| d.games).collect())
    }

    async fn team_slots(&self, date: NaiveDate) -> Result<Vec<TeamSlot>, ProviderError> {
        let games = self.api_schedule(date).await?;
        let mut slots: Vec<TeamSlot> = Vec::with_capacity(games.len() * 2);

        for game in games {
            let ApiTeams { home, away } = game.teams;
            for (side, other) in [(&home, &away), (&away, &home)] {
                if slots.iter().any(|s| s.team_id == side.team.id) {
                    continue;
                }
                slots.push(TeamSlot {
                    team_id: side.team.id,
                    team: side.team.name.clone(),
                    opponent: other.team.name.clone(),
                    own_probable: side.probable_pitcher.clone(),
                    opposing_probable: other.probable_pitcher.clone(),
                });
            }
        }

        Ok(slots)
    }

    async fn roster(&self, team_id: u64) -> Result<Vec<RosterEntry>, ProviderError> {
        let response: RosterResponse = self
            .client
            .get(
                &format!("/api/v1/teams/{}/roster", team_id),
                &[("rosterType", "active".to_string())],
            )
            .await?;
        Ok(response.roster)
    }

    /// Active roster entries for every slot, split into position players
    /// and pitchers.
    async fn roster_entries(&self, slots: &[TeamSlot]) -> (Vec<RosterPick>, Vec<RosterPick>) {
        let rosters: Vec<(TeamSlot, Result<Vec<RosterEntry>, ProviderError>)> =
            stream::iter(slots.iter().cloned())
                .map(|slot| async move {
                    let roster = self.roster(slot.team_id).await;
                    (slot, roster)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut batters = Vec::new();
        let mut arms = Vec::new();
        for (slot, roster) in rosters {
            let roster = match roster {
                Ok(roster) => roster,
                Err(e) => {
                    tracing::warn!(team = %slot.team, error = %e, "Skipping team roster");
                    continue;
                }
            };
            for entry in roster {
                let is_pitcher = entry
                    .position
                    .as_ref()
                    .is_some_and(|p| p.abbreviation == PITCHER_POSITION);
                if is_pitcher {
                    arms.push((slot.clone(), entry.person));
                } else {
                    batters.push((slot.clone(), entry.person));
                }
            }
        }
        (batters, arms)
    }

    async fn player_stats(
        &self,
        player_id: u64,
        kind: &str,
        group: Group,
        season: i32,
    ) -> Result<Vec<Split>, ProviderError> {
        let response: StatsResponse = self
            .client
            .get(
                &format!("/api/v1/people/{}/stats", player_id),
                &[
                    ("stats", kind.to_string()),
                    ("group", group.as_str().to_string()),
                    ("season", season.to_string()),
                ],
            )
            .await?;
        Ok(response.into_splits())
    }

    /// Season line plus game-log lines dated before `before`.
    async fn player_lines(
        &self,
        player_id: u64,
        group: Group,
        season: i32,
        before: NaiveDate,
    ) -> Result<(Value, Vec<Value>), ProviderError> {
        let (season_splits, log_splits) = futures::try_join!(
            self.player_stats(player_id, "season", group, season),
            self.player_stats(player_id, "gameLog", group, season),
        )?;

        let season_line = season_splits
            .into_iter()
            .next()
            .map(|s| s.stat)
            .unwrap_or(Value::Null);
        Ok((season_line, recent_lines(log_splits, before)))
    }

    async fn build_hitter(
        &self,
        slot: TeamSlot,
        person: ApiPerson,
        date: NaiveDate,
    ) -> Result<Option<Hitter>, ProviderError> {
        let (season, lines) = self
            .player_lines(person.id, Group::Hitting, date.year(), date)
            .await?;
        let Some(avg) = stat_f64(&season, "avg") else {
            return Ok(None);
        };
        let form = hitting_form(&lines, self.game_log_depth);

        Ok(Some(Hitter {
            player_id: person.id.to_string(),
            name: person.full_name,
            team: slot.team,
            opponent_team: Some(slot.opponent),
            probable_pitcher_id: slot.opposing_probable.map(|p| p.id.to_string()),
            avg,
            obp: stat_f64(&season, "obp"),
            slg: stat_f64(&season, "slg"),
            last_n_games: form.hits_each_game.len() as u32,
            last_n_hits_each_game: form.hits_each_game,
            last_n_hitless_games: form.hitless_streak,
        }))
    }

    async fn build_pitcher(
        &self,
        slot: TeamSlot,
        person: ApiPerson,
        date: NaiveDate,
    ) -> Result<Option<Pitcher>, ProviderError> {
        let (season, lines) = self
            .player_lines(person.id, Group::Pitching, date.year(), date)
            .await?;
        let Some(era) = stat_f64(&season, "era") else {
            return Ok(None);
        };
        let form = pitching_form(&lines, self.game_log_depth);
        let is_probable = slot
            .own_probable
            .as_ref()
            .is_some_and(|p| p.id == person.id);

        Ok(Some(Pitcher {
            player_id: person.id.to_string(),
            name: person.full_name,
            team: slot.team,
            opponent_team: Some(slot.opponent),
            era,
            kbb: strikeout_walk_ratio(&season),
            k_per_start_last_n: form.strikeouts_each_start,
            runs_allowed_last_n: form.earned_runs_each_start,
            is_probable,
        }))
    }

    async fn collect_hitters(&self, picks: Vec<RosterPick>, date: NaiveDate) -> Vec<Hitter> {
        let results: Vec<_> = stream::iter(picks)
            .map(|(slot, person)| self.build_hitter(slot, person, date))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        settle(results, |h: &Hitter| (h.team.clone(), h.name.clone()))
    }

    async fn collect_pitchers(&self, picks: Vec<RosterPick>, date: NaiveDate) -> Vec<Pitcher> {
        let results: Vec<_> = stream::iter(picks)
            .map(|(slot, person)| self.build_pitcher(slot, person, date))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        settle(results, |p: &Pitcher| (p.team.clone(), p.name.clone()))
    }

    /// People search by full name. With `team`, only a person whose current
    /// team contains it matches.
    async fn search_person(
        &self,
        name: &str,
        team: Option<&str>,
    ) -> Result<Option<SearchedPerson>, ProviderError> {
        let response: PeopleResponse = self
            .client
            .get(
                "/api/v1/people/search",
                &[
                    ("names", name.trim().to_string()),
                    ("sportId", "1".to_string()),
                    ("hydrate", "currentTeam".to_string()),
                ],
            )
            .await?;

        let team = team.map(str::to_lowercase);
        let preferred = team.as_ref().and_then(|t| {
            response.people.iter().position(|p| {
                p.current_team
                    .as_ref()
                    .is_some_and(|ct| ct.name.to_lowercase().contains(t.as_str()))
            })
        });

        let mut people = response.people;
        Ok(match (preferred, team) {
            (Some(i), _) => Some(people.swap_remove(i)),
            (None, None) => people.into_iter().next(),
            (None, Some(_)) => None,
        })
    }
}

/// Drops players whose lookups failed and sorts by team then name.
fn settle<T>(
    results: Vec<Result<Option<T>, ProviderError>>,
    key: impl Fn(&T) -> (String, String),
) -> Vec<T> {
    let mut players: Vec<T> = results
        .into_iter()
        .filter_map(|r| match r {
            Ok(player) => player,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping player after failed stats lookup");
                None
            }
        })
        .collect();
    players.sort_by_key(key);
    players
}

#[async_trait]
impl DataProvider for StatsApiProvider {
    fn name(&self) -> &str {
        "statsapi"
    }

    async fn hitters(&self, date: NaiveDate) -> Result<Vec<Hitter>, ProviderError> {
        let slots = self.team_slots(date).await?;
        let (batters, _) = self.roster_entries(&slots).await;
        Ok(self.collect_hitters(batters, date).await)
    }

    async fn pitchers(&self, date: NaiveDate) -> Result<Vec<Pitcher>, ProviderError> {
        let slots = self.team_slots(date).await?;
        let (_, arms) = self.roster_entries(&slots).await;
        Ok(self.collect_pitchers(arms, date).await)
    }

    /// One schedule and one roster fetch per team serve both sides.
    async fn slate_players(
        &self,
        date: NaiveDate,
    ) -> Result<(Vec<Hitter>, Vec<Pitcher>), ProviderError> {
        let slots = self.team_slots(date).await?;
        let (batters, arms) = self.roster_entries(&slots).await;

        Ok(futures::join!(
            self.collect_hitters(batters, date),
            self.collect_pitchers(arms, date),
        ))
    }

    /// Counts games through `date` inclusive; games without an at-bat are
    /// skipped.
    async fn find_hitter(
        &self,
        name: &str,
        team: Option<&str>,
        date: NaiveDate,
        lookback: u32,
    ) -> Result<Option<HitterLookup>, ProviderError> {
        let Some(person) = self.search_person(name, team).await? else {
            return Ok(None);
        };

        let through = date.succ_opt().unwrap_or(date);
        let (season, lines) = self
            .player_lines(person.id, Group::Hitting, date.year(), through)
            .await?;
        let form = hitting_form(&lines, self.game_log_depth);

        Ok(Some(HitterLookup {
            player_id: person.id.to_string(),
            name: person.full_name,
            team: person.current_team.map(|t| t.name).unwrap_or_default(),
            season_avg: stat_f64(&season, "avg"),
            hitless_streak: form.hitless_streak.min(lookback),
        }))
    }

    async fn schedule(&self, date: NaiveDate) -> Result<Schedule, ProviderError> {
        let games = self
            .api_schedule(date)
            .await?
            .into_iter()
            .map(|g| {
                let status = GameStatus {
                    status_code: g.status.status_code,
                    detailed_state: g.status.detailed_state,
                    abstract_game_state: g.status.abstract_game_state,
                };
                Game {
                    game_pk: g.game_pk,
                    game_date: g.game_date,
                    not_started: status.is_not_started(),
                    status,
                    home: game_side(g.teams.home),
                    away: game_side(g.teams.away),
                }
            })
            .collect();

        Ok(Schedule {
            date: date.to_string(),
            games,
        })
    }
}

fn game_side(side: ApiTeamSide) -> GameSide {
    GameSide {
        team_id: side.team.id,
        team_name: side.team.name,
        probable_pitcher: side.probable_pitcher.map(|p| ProbablePitcher {
            id: p.id.to_string(),
            name: p.full_name,
        }),
    }
}
