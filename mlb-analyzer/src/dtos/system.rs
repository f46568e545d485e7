use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "mlb-analyzer")]
    pub service: String,
    pub version: String,
    pub provider_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_provider_error: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// today|yesterday|tomorrow|YYYY-MM-DD
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProviderRawQuery {
    pub date: Option<String>,
    #[serde(default)]
    pub debug: i64,
    /// Maximum rows per list.
    pub limit: Option<usize>,
    /// Case-insensitive team substring.
    pub team: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RawCounts {
    pub hitters: usize,
    pub pitchers: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderRawResponse {
    pub date: String,
    pub provider: String,
    pub counts: RawCounts,
    #[schema(value_type = Vec<Object>)]
    pub hitters: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub pitchers: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub debug: Option<Value>,
}

fn default_self_test_limit() -> usize {
    10
}

fn default_self_test_debug() -> i64 {
    1
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SelfTestQuery {
    pub date: Option<String>,
    /// Rows kept per check, 1 to 200.
    #[serde(default = "default_self_test_limit")]
    #[param(default = 10, minimum = 1, maximum = 200)]
    pub limit: usize,
    #[serde(default = "default_self_test_debug")]
    #[param(default = 1)]
    pub debug: i64,
}

/// Outcome of one self-test check.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn passed(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelfTestProvider {
    pub loaded: bool,
    pub name: Option<String>,
    pub selector: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelfTestResponse {
    pub app: String,
    pub version: String,
    pub date: String,
    /// Wall clock in the configured zone.
    pub now_local: String,
    pub provider: SelfTestProvider,
    /// `OK` when every check passed, otherwise `DEGRADED`.
    #[schema(example = "OK")]
    pub status: String,
    pub checks: BTreeMap<String, CheckResult>,
    /// Player names echoed back to spot encoding problems.
    pub utf8_samples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub debug: Option<Value>,
}
