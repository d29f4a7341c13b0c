use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::score::ScoreConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("log_sample_rate must be within [0, 1], got {0}")]
    SampleRate(f64),
    #[error("concurrency must be at least 1")]
    Concurrency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default)]
    pub scoring: ScoreConfig,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub data: Option<DataConfig>,
    #[serde(default)]
    pub qa: Option<QaConfig>,
}

fn default_concurrency() -> usize {
    8
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            scoring: ScoreConfig::default(),
            concurrency: default_concurrency(),
            data: None,
            qa: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl RewardConfig {
    /// Loads YAML, or JSON when the file ends in `.json`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&raw)?
        } else {
            Self::from_yaml_str(&raw)?
        };
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        for (field, value) in [
            ("format_score", s.format_score),
            ("correct_score", s.correct_score),
            ("partial_score", s.partial_score),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if !(0.0..=1.0).contains(&s.log_sample_rate) {
            return Err(ConfigError::SampleRate(s.log_sample_rate));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{MatchMethod, DEFAULT_CORRECT_SCORE, DEFAULT_LOG_SAMPLE_RATE};
    use std::io::Write;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = RewardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.scoring.format_score, 0.1);
        assert_eq!(config.scoring.correct_score, DEFAULT_CORRECT_SCORE);
        assert_eq!(config.scoring.log_sample_rate, DEFAULT_LOG_SAMPLE_RATE);
        assert_eq!(config.scoring.method, MatchMethod::Strict);
        assert!(config.qa.is_none());
    }

    #[test]
    fn test_yaml_overrides() {
        let raw = r#"
scoring:
  method: flexible
  format_score: 0.2
  log_sample_rate: 0.0
concurrency: 2
data:
  path: rollouts.jsonl
qa:
  url: http://localhost:8000
"#;
        let config = RewardConfig::from_yaml_str(raw).unwrap();
        assert_eq!(config.scoring.method, MatchMethod::Flexible);
        assert_eq!(config.scoring.format_score, 0.2);
        assert_eq!(config.scoring.correct_score, 1.1);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.data.unwrap().path, PathBuf::from("rollouts.jsonl"));
        let qa = config.qa.unwrap();
        assert_eq!(qa.url, "http://localhost:8000");
        assert_eq!(qa.timeout_secs, 30);
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let err = RewardConfig::from_yaml_str("scoring:\n  log_sample_rate: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::SampleRate(r) if r == 1.5));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let err = RewardConfig::from_json_str(r#"{"concurrency": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Concurrency));
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"scoring": {{"correct_score": 2.0}}}}"#).unwrap();
        let config = RewardConfig::from_path(file.path()).unwrap();
        assert_eq!(config.scoring.correct_score, 2.0);

        let err = RewardConfig::from_path("/nonexistent/rewardcraft.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
