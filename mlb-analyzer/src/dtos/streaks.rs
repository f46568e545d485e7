use crate::models::{Hitter, Pitcher};
use crate::services::filters::{
    ColdHitterCriteria, ColdPitcherCriteria, HotHitterCriteria, HotPitcherCriteria, StageCounts,
};
use crate::services::matchups::Matchups;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

fn default_hot_avg_min() -> f64 {
    0.280
}

fn default_hot_last_n() -> u32 {
    3
}

fn default_cold_avg_min() -> f64 {
    0.275
}

fn default_cold_last_n_hitless() -> u32 {
    2
}

fn default_hot_era_max() -> f64 {
    4.00
}

fn default_hot_ks_each_last_n() -> u32 {
    3
}

fn default_cold_era_min() -> f64 {
    4.60
}

fn default_cold_runs_each_last_n() -> u32 {
    2
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HotHittersQuery {
    /// today|yesterday|tomorrow|YYYY-MM-DD
    pub date: Option<String>,
    #[serde(default = "default_hot_avg_min")]
    #[param(default = 0.280)]
    pub avg_min: f64,
    /// Recent games that each need a hit; 0 disables the check.
    #[serde(default = "default_hot_last_n")]
    #[param(default = 3)]
    pub last_n: u32,
    pub obp_min: Option<f64>,
    pub slg_min: Option<f64>,
    /// Non-zero includes per-stage counters.
    #[serde(default)]
    pub debug: i64,
}

impl HotHittersQuery {
    pub fn criteria(&self) -> HotHitterCriteria {
        HotHitterCriteria {
            avg_min: self.avg_min,
            last_n: self.last_n,
            obp_min: self.obp_min,
            slg_min: self.slg_min,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ColdHittersQuery {
    pub date: Option<String>,
    #[serde(default = "default_cold_avg_min")]
    #[param(default = 0.275)]
    pub avg_min: f64,
    /// Minimum current hitless streak; 0 disables the check.
    #[serde(default = "default_cold_last_n_hitless")]
    #[param(default = 2)]
    pub last_n_hitless: u32,
    pub obp_max: Option<f64>,
    pub slg_max: Option<f64>,
    #[serde(default)]
    pub debug: i64,
}

impl ColdHittersQuery {
    pub fn criteria(&self) -> ColdHitterCriteria {
        ColdHitterCriteria {
            avg_min: self.avg_min,
            last_n_hitless: self.last_n_hitless,
            obp_max: self.obp_max,
            slg_max: self.slg_max,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PitcherStreaksQuery {
    pub date: Option<String>,
    #[serde(default = "default_hot_era_max")]
    #[param(default = 4.00)]
    pub era_max: f64,
    /// Recent starts that each need 6+ strikeouts.
    #[serde(default = "default_hot_ks_each_last_n")]
    #[param(default = 3)]
    pub strikeouts_each_last_n: u32,
    pub kbb_min: Option<f64>,
    #[serde(default)]
    pub debug: i64,
}

impl PitcherStreaksQuery {
    pub fn criteria(&self) -> HotPitcherCriteria {
        HotPitcherCriteria {
            era_max: self.era_max,
            strikeouts_each_last_n: self.strikeouts_each_last_n,
            kbb_min: self.kbb_min,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ColdPitchersQuery {
    pub date: Option<String>,
    #[serde(default = "default_cold_era_min")]
    #[param(default = 4.60)]
    pub era_min: f64,
    /// Recent starts that each need 3+ earned runs.
    #[serde(default = "default_cold_runs_each_last_n")]
    #[param(default = 2)]
    pub runs_allowed_each_last_n: u32,
    pub kbb_max: Option<f64>,
    #[serde(default)]
    pub debug: i64,
}

impl ColdPitchersQuery {
    pub fn criteria(&self) -> ColdPitcherCriteria {
        ColdPitcherCriteria {
            era_min: self.era_min,
            runs_allowed_each_last_n: self.runs_allowed_each_last_n,
            kbb_max: self.kbb_max,
        }
    }
}

/// Every bucket's thresholds in one query, prefixed by bucket.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlateScanQuery {
    pub date: Option<String>,
    #[serde(default)]
    pub debug: i64,

    #[serde(default = "default_hot_avg_min")]
    #[param(default = 0.280)]
    pub hot_avg_min: f64,
    #[serde(default = "default_hot_last_n")]
    #[param(default = 3)]
    pub hot_last_n: u32,
    pub hot_obp_min: Option<f64>,
    pub hot_slg_min: Option<f64>,

    #[serde(default = "default_cold_avg_min")]
    #[param(default = 0.275)]
    pub cold_avg_min: f64,
    #[serde(default = "default_cold_last_n_hitless")]
    #[param(default = 2)]
    pub cold_last_n_hitless: u32,
    pub cold_obp_max: Option<f64>,
    pub cold_slg_max: Option<f64>,

    #[serde(default = "default_hot_era_max")]
    #[param(default = 4.00)]
    pub hot_era_max: f64,
    #[serde(default = "default_hot_ks_each_last_n")]
    #[param(default = 3)]
    pub hot_ks_each_last_n: u32,
    pub hot_kbb_min: Option<f64>,

    #[serde(default = "default_cold_era_min")]
    #[param(default = 4.60)]
    pub cold_era_min: f64,
    #[serde(default = "default_cold_runs_each_last_n")]
    #[param(default = 2)]
    pub cold_runs_each_last_n: u32,
    pub cold_kbb_max: Option<f64>,
}

impl Default for SlateScanQuery {
    fn default() -> Self {
        Self {
            date: None,
            debug: 0,
            hot_avg_min: default_hot_avg_min(),
            hot_last_n: default_hot_last_n(),
            hot_obp_min: None,
            hot_slg_min: None,
            cold_avg_min: default_cold_avg_min(),
            cold_last_n_hitless: default_cold_last_n_hitless(),
            cold_obp_max: None,
            cold_slg_max: None,
            hot_era_max: default_hot_era_max(),
            hot_ks_each_last_n: default_hot_ks_each_last_n(),
            hot_kbb_min: None,
            cold_era_min: default_cold_era_min(),
            cold_runs_each_last_n: default_cold_runs_each_last_n(),
            cold_kbb_max: None,
        }
    }
}

impl SlateScanQuery {
    pub fn hot_hitters(&self) -> HotHitterCriteria {
        HotHitterCriteria {
            avg_min: self.hot_avg_min,
            last_n: self.hot_last_n,
            obp_min: self.hot_obp_min,
            slg_min: self.hot_slg_min,
        }
    }

    pub fn cold_hitters(&self) -> ColdHitterCriteria {
        ColdHitterCriteria {
            avg_min: self.cold_avg_min,
            last_n_hitless: self.cold_last_n_hitless,
            obp_max: self.cold_obp_max,
            slg_max: self.cold_slg_max,
        }
    }

    pub fn hot_pitchers(&self) -> HotPitcherCriteria {
        HotPitcherCriteria {
            era_max: self.hot_era_max,
            strikeouts_each_last_n: self.hot_ks_each_last_n,
            kbb_min: self.hot_kbb_min,
        }
    }

    pub fn cold_pitchers(&self) -> ColdPitcherCriteria {
        ColdPitcherCriteria {
            era_min: self.cold_era_min,
            runs_allowed_each_last_n: self.cold_runs_each_last_n,
            kbb_max: self.cold_kbb_max,
        }
    }
}

/// Filtered hitters. `debug` holds per-stage counts when requested.
#[derive(Debug, Serialize, ToSchema)]
pub struct HitterStreakResult {
    #[schema(value_type = Object)]
    pub debug: StageCounts,
    pub results: Vec<Hitter>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PitcherStreakResult {
    #[schema(value_type = Object)]
    pub debug: StageCounts,
    pub results: Vec<Pitcher>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlateScanResponse {
    pub date: String,
    /// Stage counts keyed by bucket; empty unless debug is set.
    #[schema(value_type = Object)]
    pub debug: BTreeMap<String, StageCounts>,
    pub hot_hitters: Vec<Hitter>,
    pub cold_hitters: Vec<Hitter>,
    pub hot_pitchers: Vec<Pitcher>,
    pub cold_pitchers: Vec<Pitcher>,
    pub matchups: Matchups,
}
