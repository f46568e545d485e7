//! Pairs hot hitters with cold opposing starters and the reverse.

use crate::models::{Hitter, Pitcher};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HitterVsPitcher {
    pub hitter: Hitter,
    pub pitcher: Pitcher,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PitcherVsHitter {
    pub pitcher: Pitcher,
    pub hitter: Hitter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Matchups {
    pub hot_hitters_vs_cold_pitchers: Vec<HitterVsPitcher>,
    pub hot_pitchers_vs_cold_hitters: Vec<PitcherVsHitter>,
}

/// Finds the opposing starter for `hitter` among `candidates`.
///
/// An explicit probable pitcher id wins. Otherwise, if the provider knows the
/// opposing team's probable starter, only that pitcher can match. Failing
/// both, a candidate flagged probable for the opposing team is used; when
/// several are flagged the last one listed wins.
fn opposing_starter<'a>(
    hitter: &Hitter,
    candidates: &'a [Pitcher],
    probables_by_team: &HashMap<String, Pitcher>,
) -> Option<&'a Pitcher> {
    if let Some(id) = hitter.probable_pitcher_id.as_deref() {
        if let Some(p) = candidates.iter().find(|p| p.player_id == id) {
            return Some(p);
        }
    }

    let opponent = hitter.opponent_team.as_deref()?;

    if let Some(probable) = probables_by_team.get(opponent) {
        return candidates
            .iter()
            .find(|p| p.player_id == probable.player_id);
    }

    candidates
        .iter()
        .rfind(|p| p.is_probable && p.team == opponent)
}

pub fn build_matchups(
    hot_hitters: &[Hitter],
    cold_hitters: &[Hitter],
    hot_pitchers: &[Pitcher],
    cold_pitchers: &[Pitcher],
    probables_by_team: &HashMap<String, Pitcher>,
) -> Matchups {
    let hot_hitters_vs_cold_pitchers = hot_hitters
        .iter()
        .filter_map(|h| {
            opposing_starter(h, cold_pitchers, probables_by_team).map(|p| HitterVsPitcher {
                hitter: h.clone(),
                pitcher: p.clone(),
            })
        })
        .collect();

    let hot_pitchers_vs_cold_hitters = cold_hitters
        .iter()
        .filter_map(|h| {
            opposing_starter(h, hot_pitchers, probables_by_team).map(|p| PitcherVsHitter {
                pitcher: p.clone(),
                hitter: h.clone(),
            })
        })
        .collect();

    Matchups {
        hot_hitters_vs_cold_pitchers,
        hot_pitchers_vs_cold_hitters,
    }
}
