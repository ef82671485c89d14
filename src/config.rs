use crate::state::Clock;
use chrono::NaiveDateTime;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/alerts.json";

/// Runtime settings, read from the environment:
/// - `PORT` → port
/// - `APP_DATA_PATH` → data_path
/// - `APP_FROZEN_NOW` → clock (e.g. `2024-06-10T12:00:00`)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub clock: Clock,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            clock: Clock::System,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(err) => warn!("ignoring PORT={port}: {err}"),
            }
        }
        if let Some(path) = lookup("APP_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(now) = lookup("APP_FROZEN_NOW") {
            match parse_frozen_now(&now) {
                Ok(now) => config.clock = Clock::Fixed(now),
                Err(err) => warn!("ignoring APP_FROZEN_NOW={now}: {err}"),
            }
        }

        config
    }
}

fn parse_frozen_now(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/alerts.json"));
        assert_eq!(config.clock, Clock::System);
    }

    #[test]
    fn env_overrides_apply() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/alerts.json"),
            ("APP_FROZEN_NOW", "2024-06-10T12:00:00"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/alerts.json"));
        let expected = NaiveDateTime::parse_from_str("2024-06-10 12:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(config.clock, Clock::Fixed(expected));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("APP_FROZEN_NOW", "yesterday")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.clock, Clock::System);
    }
}
