//! Configuration loading and management

use anyhow::{bail, Context, Result};
use tokio::time::Duration;

use crate::input::InputFormat;
use crate::state::Timings;

const DEFAULT_TIME_UNIT_MS: u64 = 1000;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seed for the reply and palette random sources (entropy when unset)
    pub seed: Option<u64>,

    /// Length of one time-unit; reveal and recovery delays are multiples of it
    pub time_unit: Duration,

    /// Keep the audio lifecycle but produce no audio output
    pub muted: bool,

    /// Plain question lines or JSON host messages on stdin
    pub input: InputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            time_unit: Duration::from_millis(DEFAULT_TIME_UNIT_MS),
            muted: false,
            input: InputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = lookup("COUNSELOR_SEED") {
            config.seed = Some(
                seed.trim()
                    .parse()
                    .context("COUNSELOR_SEED must be an unsigned integer")?,
            );
        }

        if let Some(unit) = lookup("COUNSELOR_TIME_UNIT_MS") {
            let millis: u64 = unit
                .trim()
                .parse()
                .context("COUNSELOR_TIME_UNIT_MS must be a number of milliseconds")?;
            if millis == 0 {
                bail!("COUNSELOR_TIME_UNIT_MS must be greater than zero");
            }
            config.time_unit = Duration::from_millis(millis);
        }

        if let Some(mute) = lookup("COUNSELOR_MUTE") {
            config.muted = matches!(mute.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(input) = lookup("COUNSELOR_INPUT") {
            config.input = match input.trim().to_lowercase().as_str() {
                "lines" => InputFormat::Lines,
                "json" => InputFormat::Json,
                other => bail!("COUNSELOR_INPUT must be `lines` or `json`, got `{other}`"),
            };
        }

        Ok(config)
    }

    /// Reveal and recovery delays for this configuration
    pub fn timings(&self) -> Timings {
        Timings::from_time_unit(self.time_unit)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timings().reply_delay, Duration::from_secs(3));
        assert_eq!(config.timings().recovery_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_config_overrides() {
        let config = from_vars(&[
            ("COUNSELOR_SEED", "42"),
            ("COUNSELOR_TIME_UNIT_MS", "10"),
            ("COUNSELOR_MUTE", "TRUE"),
            ("COUNSELOR_INPUT", "json"),
        ])
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.timings().reply_delay, Duration::from_millis(30));
        assert_eq!(config.timings().recovery_delay, Duration::from_millis(50));
        assert!(config.muted);
        assert_eq!(config.input, InputFormat::Json);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(from_vars(&[("COUNSELOR_SEED", "-1")]).is_err());
        assert!(from_vars(&[("COUNSELOR_TIME_UNIT_MS", "0")]).is_err());
        assert!(from_vars(&[("COUNSELOR_TIME_UNIT_MS", "soon")]).is_err());
        assert!(!from_vars(&[("COUNSELOR_MUTE", "no")]).unwrap().muted);
        assert!(from_vars(&[("COUNSELOR_INPUT", "xml")]).is_err());
    }
}
