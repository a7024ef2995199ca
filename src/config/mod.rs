use crate::error::Result;
use crate::execution::{CancelMode, DEFAULT_POOL_SIZE};
use crate::partition::PartitionStrategy;
use crate::time::fixed_offset_hours;
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::ConfigLoader;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "RANGE_RUNNER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub cancel_mode: CancelMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            partition: PartitionConfig::default(),
            cancel_mode: CancelMode::default(),
            log_level: None,
        }
    }
}

/// Serializable form of [`PartitionStrategy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PartitionConfig {
    #[default]
    Custom,
    CalendarMonth {
        #[serde(default)]
        utc_offset_hours: i32,
    },
    FixedInterval {
        minutes: i64,
    },
}

impl PartitionConfig {
    pub fn to_strategy(&self) -> Result<PartitionStrategy> {
        match *self {
            Self::Custom => Ok(PartitionStrategy::Custom),
            Self::CalendarMonth {
                utc_offset_hours: 0,
            } => Ok(PartitionStrategy::CalendarMonth),
            Self::CalendarMonth { utc_offset_hours } => Ok(PartitionStrategy::CalendarMonthIn(
                fixed_offset_hours(utc_offset_hours)?,
            )),
            Self::FixedInterval { minutes } => Ok(PartitionStrategy::FixedInterval { minutes }),
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_vars_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; unparsable values are ignored
    pub fn merge_vars_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pool_size) = lookup(&format!("{ENV_PREFIX}_POOL_SIZE")) {
            if let Ok(value) = pool_size.trim().parse::<usize>() {
                self.pool_size = value;
            }
        }

        if let Some(cancel_mode) = lookup(&format!("{ENV_PREFIX}_CANCEL_MODE")) {
            if let Ok(value) = cancel_mode.parse::<CancelMode>() {
                self.cancel_mode = value;
            }
        }

        if let Some(log_level) = lookup(&format!("{ENV_PREFIX}_LOG_LEVEL")) {
            self.log_level = Some(log_level);
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::new();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.partition, PartitionConfig::Custom);
        assert_eq!(config.cancel_mode, CancelMode::Drain);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_parse_fixed_interval() {
        let config = RunnerConfig::from_toml_str(
            r#"
pool_size = 8
cancel_mode = "abort"

[partition]
strategy = "fixed_interval"
minutes = 30
"#,
        )
        .unwrap();

        assert_eq!(config.pool_size, 8);
        assert_eq!(config.cancel_mode, CancelMode::Abort);
        assert_eq!(
            config.partition.to_strategy().unwrap(),
            PartitionStrategy::FixedInterval { minutes: 30 }
        );
    }

    #[test]
    fn test_calendar_month_offsets() {
        let config = RunnerConfig::from_toml_str(
            r#"
[partition]
strategy = "calendar_month"
"#,
        )
        .unwrap();
        assert_eq!(
            config.partition.to_strategy().unwrap(),
            PartitionStrategy::CalendarMonth
        );

        let shifted = PartitionConfig::CalendarMonth {
            utc_offset_hours: 8,
        };
        assert!(matches!(
            shifted.to_strategy().unwrap(),
            PartitionStrategy::CalendarMonthIn(offset) if offset.local_minus_utc() == 8 * 3600
        ));

        let invalid = PartitionConfig::CalendarMonth {
            utc_offset_hours: 30,
        };
        assert!(invalid.to_strategy().unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result = RunnerConfig::from_toml_str(
            r#"
[partition]
strategy = "weekly"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RANGE_RUNNER_POOL_SIZE", "12"),
            ("RANGE_RUNNER_CANCEL_MODE", "abort"),
            ("RANGE_RUNNER_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = RunnerConfig::new();
        config.merge_vars_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.pool_size, 12);
        assert_eq!(config.cancel_mode, CancelMode::Abort);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let mut config = RunnerConfig::new();
        config.merge_vars_from(|key| match key {
            "RANGE_RUNNER_POOL_SIZE" => Some("many".to_string()),
            "RANGE_RUNNER_CANCEL_MODE" => Some("sometimes".to_string()),
            _ => None,
        });

        assert_eq!(config, RunnerConfig::new());
    }
}
