use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load the listener configuration.
    ///
    /// Sources, lowest to highest precedence: optional `configuration` file,
    /// `APP__*` variables, then the platform-assigned `PORT`.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let platform_port = std::env::var("PORT")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(|p| {
                p.trim().parse::<u16>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("PORT must be a port number: {}", e))
                })
            })
            .transpose()?;

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", platform_port.map(i64::from))?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_env(key: &str, value: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::set_var(key, value) }
    }

    fn clear_env(key: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    #[serial]
    fn platform_port_wins_over_prefixed_override() {
        set_env("APP__PORT", "9000");
        set_env("PORT", "10000");

        let config = Config::load().unwrap();
        assert_eq!(config.port, 10000);

        clear_env("PORT");
        clear_env("APP__PORT");
    }

    #[test]
    #[serial]
    fn falls_back_to_default_port() {
        clear_env("PORT");
        clear_env("APP__PORT");

        let config = Config::load().unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    #[serial]
    fn rejects_non_numeric_port() {
        set_env("PORT", "not-a-port");

        let result = Config::load();
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        clear_env("PORT");
    }
}
