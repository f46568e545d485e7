//! Hot/cold streak filters for hitters and pitchers.
//!
//! Each filter runs its stages in order and, when asked, reports how many
//! players survived each stage.

use crate::models::{Hitter, Pitcher};
use std::collections::BTreeMap;

/// Strikeouts a start needs to count toward a hot streak.
pub const HOT_START_MIN_STRIKEOUTS: u32 = 6;

/// Earned runs a start needs to count toward a cold streak.
pub const COLD_START_MIN_RUNS: u32 = 3;

/// Survivor counts per filter stage.
pub type StageCounts = BTreeMap<String, usize>;

#[derive(Debug, Clone, Default)]
pub struct HotHitterCriteria {
    pub avg_min: f64,
    pub last_n: u32,
    pub obp_min: Option<f64>,
    pub slg_min: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ColdHitterCriteria {
    pub avg_min: f64,
    pub last_n_hitless: u32,
    pub obp_max: Option<f64>,
    pub slg_max: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct HotPitcherCriteria {
    pub era_max: f64,
    pub strikeouts_each_last_n: u32,
    pub kbb_min: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ColdPitcherCriteria {
    pub era_min: f64,
    pub runs_allowed_each_last_n: u32,
    pub kbb_max: Option<f64>,
}

/// A zero or absent threshold is disabled; an active threshold rejects a
/// missing value.
pub fn passes_min(value: Option<f64>, threshold: Option<f64>) -> bool {
    match threshold {
        None => true,
        Some(t) if t == 0.0 => true,
        Some(t) => value.is_some_and(|v| v >= t),
    }
}

pub fn passes_max(value: Option<f64>, threshold: Option<f64>) -> bool {
    match threshold {
        None => true,
        Some(t) if t == 0.0 => true,
        Some(t) => value.is_some_and(|v| v <= t),
    }
}

/// True when the first `n` entries exist and each reaches `floor`.
fn each_of_first(values: &[u32], n: u32, floor: u32) -> bool {
    let n = n as usize;
    values.len() >= n && values[..n].iter().all(|&v| v >= floor)
}

struct Stages {
    enabled: bool,
    counts: StageCounts,
}

impl Stages {
    fn new(enabled: bool, scanned: usize) -> Self {
        let mut stages = Self {
            enabled,
            counts: StageCounts::new(),
        };
        stages.record("scanned", scanned);
        stages
    }

    fn record(&mut self, stage: &str, kept: usize) {
        if self.enabled {
            self.counts.insert(stage.to_string(), kept);
        }
    }

    fn finish(self) -> StageCounts {
        self.counts
    }
}

pub fn find_hot_hitters(
    hitters: &[Hitter],
    criteria: &HotHitterCriteria,
    debug: bool,
) -> (Vec<Hitter>, StageCounts) {
    let mut stages = Stages::new(debug, hitters.len());

    let pool: Vec<&Hitter> = hitters.iter().filter(|h| h.avg >= criteria.avg_min).collect();
    stages.record("kept_after_avg", pool.len());

    let pool: Vec<&Hitter> = if criteria.last_n > 0 {
        pool.into_iter()
            .filter(|h| each_of_first(&h.last_n_hits_each_game, criteria.last_n, 1))
            .collect()
    } else {
        pool
    };
    stages.record("kept_after_hits", pool.len());

    let pool: Vec<Hitter> = pool
        .into_iter()
        .filter(|h| passes_min(h.obp, criteria.obp_min) && passes_min(h.slg, criteria.slg_min))
        .cloned()
        .collect();
    stages.record("kept_after_adv", pool.len());

    (pool, stages.finish())
}

pub fn find_cold_hitters(
    hitters: &[Hitter],
    criteria: &ColdHitterCriteria,
    debug: bool,
) -> (Vec<Hitter>, StageCounts) {
    let mut stages = Stages::new(debug, hitters.len());

    let pool: Vec<&Hitter> = hitters.iter().filter(|h| h.avg >= criteria.avg_min).collect();
    stages.record("kept_after_avg", pool.len());

    let pool: Vec<&Hitter> = if criteria.last_n_hitless > 0 {
        pool.into_iter()
            .filter(|h| h.last_n_hitless_games >= criteria.last_n_hitless)
            .collect()
    } else {
        pool
    };
    stages.record("kept_after_hitless", pool.len());

    let pool: Vec<Hitter> = pool
        .into_iter()
        .filter(|h| passes_max(h.obp, criteria.obp_max) && passes_max(h.slg, criteria.slg_max))
        .cloned()
        .collect();
    stages.record("kept_after_adv", pool.len());

    (pool, stages.finish())
}

pub fn find_hot_pitchers(
    pitchers: &[Pitcher],
    criteria: &HotPitcherCriteria,
    debug: bool,
) -> (Vec<Pitcher>, StageCounts) {
    let mut stages = Stages::new(debug, pitchers.len());

    let pool: Vec<&Pitcher> = pitchers.iter().filter(|p| p.era <= criteria.era_max).collect();
    stages.record("kept_after_era", pool.len());

    let pool: Vec<&Pitcher> = if criteria.strikeouts_each_last_n > 0 {
        pool.into_iter()
            .filter(|p| {
                each_of_first(
                    &p.k_per_start_last_n,
                    criteria.strikeouts_each_last_n,
                    HOT_START_MIN_STRIKEOUTS,
                )
            })
            .collect()
    } else {
        pool
    };
    stages.record("kept_after_ks", pool.len());

    let pool: Vec<Pitcher> = pool
        .into_iter()
        .filter(|p| passes_min(p.kbb, criteria.kbb_min))
        .cloned()
        .collect();
    stages.record("kept_after_kbb", pool.len());

    (pool, stages.finish())
}

pub fn find_cold_pitchers(
    pitchers: &[Pitcher],
    criteria: &ColdPitcherCriteria,
    debug: bool,
) -> (Vec<Pitcher>, StageCounts) {
    let mut stages = Stages::new(debug, pitchers.len());

    let pool: Vec<&Pitcher> = pitchers.iter().filter(|p| p.era >= criteria.era_min).collect();
    stages.record("kept_after_era", pool.len());

    let pool: Vec<&Pitcher> = if criteria.runs_allowed_each_last_n > 0 {
        pool.into_iter()
            .filter(|p| {
                each_of_first(
                    &p.runs_allowed_last_n,
                    criteria.runs_allowed_each_last_n,
                    COLD_START_MIN_RUNS,
                )
            })
            .collect()
    } else {
        pool
    };
    stages.record("kept_after_runs", pool.len());

    let pool: Vec<Pitcher> = pool
        .into_iter()
        .filter(|p| passes_max(p.kbb, criteria.kbb_max))
        .cloned()
        .collect();
    stages.record("kept_after_kbb", pool.len());

    (pool, stages.finish())
}

fn hits_per_recent_game(h: &Hitter) -> f64 {
    let games = &h.last_n_hits_each_game;
    games.iter().sum::<u32>() as f64 / games.len() as f64
}

/// League-wide hot list: hitters with recent games, ranked by hits per
/// recent game, then season AVG.
pub fn rank_hot_hitters(
    hitters: &[Hitter],
    top_n: usize,
    debug: bool,
) -> (Vec<Hitter>, StageCounts) {
    let mut stages = Stages::new(debug, hitters.len());

    let mut pool: Vec<&Hitter> = hitters
        .iter()
        .filter(|h| !h.last_n_hits_each_game.is_empty())
        .collect();
    stages.record("kept_with_recent_games", pool.len());

    pool.sort_by(|a, b| {
        hits_per_recent_game(b)
            .total_cmp(&hits_per_recent_game(a))
            .then(b.avg.total_cmp(&a.avg))
            .then_with(|| a.name.cmp(&b.name))
    });

    let ranked: Vec<Hitter> = pool.into_iter().take(top_n).cloned().collect();
    stages.record("returned", ranked.len());
    (ranked, stages.finish())
}

/// League-wide cold list: hitters in a hitless stretch, longest first. Among
/// equal streaks the better season hitter ranks higher.
pub fn rank_cold_hitters(
    hitters: &[Hitter],
    top_n: usize,
    debug: bool,
) -> (Vec<Hitter>, StageCounts) {
    let mut stages = Stages::new(debug, hitters.len());

    let mut pool: Vec<&Hitter> = hitters.iter().filter(|h| h.last_n_hitless_games > 0).collect();
    stages.record("kept_hitless", pool.len());

    pool.sort_by(|a, b| {
        b.last_n_hitless_games
            .cmp(&a.last_n_hitless_games)
            .then(b.avg.total_cmp(&a.avg))
            .then_with(|| a.name.cmp(&b.name))
    });

    let ranked: Vec<Hitter> = pool.into_iter().take(top_n).cloned().collect();
    stages.record("returned", ranked.len());
    (ranked, stages.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hitter(id: &str, avg: f64, hits: &[u32], hitless: u32) -> Hitter {
        Hitter {
            player_id: id.into(),
            name: format!("Hitter {id}"),
            team: "BOS".into(),
            opponent_team: None,
            probable_pitcher_id: None,
            avg,
            obp: None,
            slg: None,
            last_n_games: hits.len() as u32,
            last_n_hits_each_game: hits.to_vec(),
            last_n_hitless_games: hitless,
        }
    }

    fn pitcher(id: &str, era: f64, ks: &[u32], runs: &[u32]) -> Pitcher {
        Pitcher {
            player_id: id.into(),
            name: format!("Pitcher {id}"),
            team: "NYY".into(),
            opponent_team: None,
            era,
            kbb: None,
            k_per_start_last_n: ks.to_vec(),
            runs_allowed_last_n: runs.to_vec(),
            is_probable: false,
        }
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| id(i).to_string()).collect()
    }

    #[test]
    fn thresholds_treat_zero_as_disabled() {
        assert!(passes_min(None, None));
        assert!(passes_min(None, Some(0.0)));
        assert!(!passes_min(None, Some(0.3)));
        assert!(passes_min(Some(0.3), Some(0.3)));
        assert!(!passes_min(Some(0.29), Some(0.3)));

        assert!(passes_max(None, Some(0.0)));
        assert!(!passes_max(None, Some(0.3)));
        assert!(passes_max(Some(0.3), Some(0.3)));
        assert!(!passes_max(Some(0.31), Some(0.3)));
    }

    #[test]
    fn hot_hitters_need_a_hit_in_each_recent_game() {
        let hitters = vec![
            hitter("a", 0.310, &[1, 2, 1, 0], 0),
            hitter("b", 0.320, &[1, 0, 2], 0),
            hitter("c", 0.300, &[2, 2], 0),
            hitter("d", 0.250, &[3, 3, 3], 0),
        ];
        let criteria = HotHitterCriteria {
            avg_min: 0.280,
            last_n: 3,
            ..Default::default()
        };

        let (kept, counts) = find_hot_hitters(&hitters, &criteria, true);

        assert_eq!(ids(&kept, |h| &h.player_id), vec!["a"]);
        assert_eq!(counts["scanned"], 4);
        assert_eq!(counts["kept_after_avg"], 3);
        assert_eq!(counts["kept_after_hits"], 1);
        assert_eq!(counts["kept_after_adv"], 1);
    }

    #[test]
    fn hot_hitters_skip_game_check_when_last_n_is_zero() {
        let hitters = vec![hitter("a", 0.300, &[], 0)];
        let criteria = HotHitterCriteria {
            avg_min: 0.280,
            last_n: 0,
            ..Default::default()
        };

        let (kept, counts) = find_hot_hitters(&hitters, &criteria, false);
        assert_eq!(kept.len(), 1);
        assert!(counts.is_empty());
    }

    #[test]
    fn hot_hitters_apply_advanced_minimums() {
        let mut with_obp = hitter("a", 0.300, &[1, 1, 1], 0);
        with_obp.obp = Some(0.380);
        let without_obp = hitter("b", 0.300, &[1, 1, 1], 0);
        let criteria = HotHitterCriteria {
            avg_min: 0.280,
            last_n: 3,
            obp_min: Some(0.350),
            slg_min: None,
        };

        let (kept, _) = find_hot_hitters(&[with_obp, without_obp], &criteria, false);
        assert_eq!(ids(&kept, |h| &h.player_id), vec!["a"]);
    }

    #[test]
    fn cold_hitters_need_hitless_streak_and_respect_maximums() {
        let mut low_slg = hitter("a", 0.290, &[0, 0], 2);
        low_slg.slg = Some(0.380);
        let mut high_slg = hitter("b", 0.290, &[0, 0, 0], 3);
        high_slg.slg = Some(0.520);
        let short_streak = hitter("c", 0.300, &[0, 1], 1);
        let criteria = ColdHitterCriteria {
            avg_min: 0.275,
            last_n_hitless: 2,
            obp_max: None,
            slg_max: Some(0.450),
        };

        let (kept, counts) = find_cold_hitters(&[low_slg, high_slg, short_streak], &criteria, true);

        assert_eq!(ids(&kept, |h| &h.player_id), vec!["a"]);
        assert_eq!(counts["kept_after_avg"], 3);
        assert_eq!(counts["kept_after_hitless"], 2);
        assert_eq!(counts["kept_after_adv"], 1);
    }

    #[test]
    fn hot_pitchers_need_six_strikeouts_per_start() {
        let pitchers = vec![
            pitcher("a", 3.10, &[7, 6, 9], &[]),
            pitcher("b", 2.80, &[7, 5, 9], &[]),
            pitcher("c", 4.50, &[10, 10, 10], &[]),
            pitcher("d", 3.90, &[8, 8], &[]),
        ];
        let criteria = HotPitcherCriteria {
            era_max: 4.00,
            strikeouts_each_last_n: 3,
            kbb_min: None,
        };

        let (kept, counts) = find_hot_pitchers(&pitchers, &criteria, true);

        assert_eq!(ids(&kept, |p| &p.player_id), vec!["a"]);
        assert_eq!(counts["kept_after_era"], 3);
        assert_eq!(counts["kept_after_ks"], 1);
        assert_eq!(counts["kept_after_kbb"], 1);
    }

    #[test]
    fn cold_pitchers_need_three_runs_per_start_and_kbb_cap() {
        let mut wild = pitcher("a", 5.20, &[], &[4, 3]);
        wild.kbb = Some(1.8);
        let mut sharp = pitcher("b", 4.90, &[], &[3, 5]);
        sharp.kbb = Some(3.5);
        let recovering = pitcher("c", 4.70, &[], &[2, 6]);
        let criteria = ColdPitcherCriteria {
            era_min: 4.60,
            runs_allowed_each_last_n: 2,
            kbb_max: Some(2.5),
        };

        let (kept, counts) = find_cold_pitchers(&[wild, sharp, recovering], &criteria, true);

        assert_eq!(ids(&kept, |p| &p.player_id), vec!["a"]);
        assert_eq!(counts["kept_after_runs"], 2);
        assert_eq!(counts["kept_after_kbb"], 1);
    }

    #[test]
    fn league_hot_list_ranks_by_recent_hits() {
        let hitters = vec![
            hitter("a", 0.250, &[1, 1, 1], 0),
            hitter("b", 0.300, &[3, 2, 1], 0),
            hitter("c", 0.320, &[], 0),
            hitter("d", 0.290, &[1, 1, 1], 0),
        ];

        let (ranked, counts) = rank_hot_hitters(&hitters, 2, true);

        assert_eq!(ids(&ranked, |h| &h.player_id), vec!["b", "d"]);
        assert_eq!(counts["scanned"], 4);
        assert_eq!(counts["kept_with_recent_games"], 3);
        assert_eq!(counts["returned"], 2);
    }

    #[test]
    fn league_cold_list_prefers_longer_streaks_then_better_hitters() {
        let hitters = vec![
            hitter("a", 0.250, &[0, 0], 2),
            hitter("b", 0.310, &[0], 1),
            hitter("c", 0.300, &[0, 0], 2),
            hitter("d", 0.330, &[2], 0),
        ];

        let (ranked, counts) = rank_cold_hitters(&hitters, 10, false);

        assert_eq!(ids(&ranked, |h| &h.player_id), vec!["c", "a", "b"]);
        assert!(counts.is_empty());
    }
}
