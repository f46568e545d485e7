use chrono_tz::Tz;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_STATS_API_BASE: &str = "https://statsapi.mlb.com";
const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    /// `module.path:ClassName` selector; `None` means the stub provider.
    pub provider: Option<String>,
    /// Zone whose calendar day "today" refers to.
    pub timezone: Tz,
    /// Advertised in the OpenAPI document's `servers` list when set.
    pub public_base_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub stats_api: StatsApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub max_retries: u32,
    pub concurrency: usize,
    /// Most recent games/starts kept per player.
    pub game_log_depth: usize,
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STATS_API_BASE.to_string(),
            api_key: None,
            timeout_secs: 15,
            cache_ttl_secs: 120,
            max_retries: 3,
            concurrency: 8,
            game_log_depth: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .as_str()
        {
            "prod" | "production" => Environment::Prod,
            _ => Environment::Dev,
        };
        let defaults = StatsApiConfig::default();

        let timezone_name = get_env("MLB_TIMEZONE", Some(DEFAULT_TIMEZONE))?;
        let timezone = Tz::from_str(&timezone_name).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "MLB_TIMEZONE '{}' is not a valid IANA zone: {}",
                timezone_name,
                e
            ))
        })?;

        Ok(AnalyzerConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("mlb-analyzer"))?,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: get_env("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            provider: get_optional_env("MLB_PROVIDER"),
            timezone,
            public_base_url: get_optional_env("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            cors_allowed_origins: get_env("CORS_ALLOWED_ORIGINS", Some("*"))?
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            stats_api: StatsApiConfig {
                base_url: get_optional_env("STATS_API_BASE")
                    .or_else(|| get_optional_env("DATA_API_BASE"))
                    .unwrap_or(defaults.base_url)
                    .trim_end_matches('/')
                    .to_string(),
                api_key: get_optional_env("STATS_API_KEY")
                    .or_else(|| get_optional_env("DATA_API_KEY")),
                timeout_secs: parse_env("HTTP_TIMEOUT_SEC", defaults.timeout_secs)?,
                cache_ttl_secs: parse_env("STATS_API_CACHE_TTL_SEC", defaults.cache_ttl_secs)?,
                max_retries: parse_env("STATS_API_MAX_RETRIES", defaults.max_retries)?,
                concurrency: parse_env("STATS_API_CONCURRENCY", defaults.concurrency)?.max(1),
                game_log_depth: parse_env("STATS_API_GAME_LOG_DEPTH", defaults.game_log_depth)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

/// Unset and blank are the same thing for optional settings.
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
