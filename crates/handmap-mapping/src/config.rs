//! Engine tuning for a mapping orchestrator.

use serde::{Deserialize, Serialize};

/// Unit of `FrameObservation::timestamp` for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampUnit {
    Seconds,
    #[default]
    Milliseconds,
}

impl TimestampUnit {
    pub fn to_seconds(&self, timestamp: f64) -> f64 {
        match self {
            TimestampUnit::Seconds => timestamp,
            TimestampUnit::Milliseconds => timestamp / 1000.0,
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// How frame timestamps are converted before filtering
    pub timestamp_unit: TimestampUnit,

    /// Hands reported below this confidence are treated as absent
    pub min_hand_confidence: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timestamp_unit: TimestampUnit::Milliseconds,
            min_hand_confidence: 0.0,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_timestamp_unit(mut self, unit: TimestampUnit) -> Self {
        self.timestamp_unit = unit;
        self
    }

    pub fn with_min_hand_confidence(mut self, confidence: f64) -> Self {
        self.min_hand_confidence = confidence;
        self
    }

    /// Load configuration from file, with `HANDMAP_*` overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HANDMAP"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("HANDMAP"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.timestamp_unit, TimestampUnit::Milliseconds);
        assert_eq!(config.min_hand_confidence, 0.0);
    }

    #[test]
    fn test_timestamp_conversion() {
        assert_eq!(TimestampUnit::Milliseconds.to_seconds(1500.0), 1.5);
        assert_eq!(TimestampUnit::Seconds.to_seconds(1.5), 1.5);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("HANDMAP_TIMESTAMP_UNIT", "seconds");
        let config = OrchestratorConfig::from_env();
        std::env::remove_var("HANDMAP_TIMESTAMP_UNIT");

        let config = config.unwrap();
        assert_eq!(config.timestamp_unit, TimestampUnit::Seconds);
        assert_eq!(config.min_hand_confidence, 0.0);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("handmap-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "timestamp_unit = \"seconds\"\nmin_hand_confidence = 0.25\n",
        )
        .unwrap();

        let config = OrchestratorConfig::from_file(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.timestamp_unit, TimestampUnit::Seconds);
        assert_eq!(config.min_hand_confidence, 0.25);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(OrchestratorConfig::from_file("/nonexistent/handmap.toml").is_err());
    }
}
