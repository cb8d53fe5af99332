//! Configuration
//!
//! Layered, later layers override earlier ones:
//! 1. built-in defaults
//! 2. user config file (`<config dir>/measure-quest/config.yaml`)
//! 3. an explicit `--config` file
//! 4. environment (`MQ_PLAYER`, `MQ_SCORES_FILE`)

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::calibration::{find_reference, ReferenceObject};
use crate::core::evaluator::DEFAULT_POINTS_PER_QUESTION;
use crate::core::measurement::DisplayPrecision;
use crate::yaml::{parse_optional_yaml_file, parse_yaml_file, YamlError};

pub const ENV_PLAYER: &str = "MQ_PLAYER";
pub const ENV_SCORES_FILE: &str = "MQ_SCORES_FILE";

const CONFIG_FILE: &str = "config.yaml";
const SCORES_FILE: &str = "scores.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Partial config as read from a YAML layer; unset fields leave the lower
/// layer alone
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    player_name: Option<String>,
    points_per_question: Option<u32>,
    scores_file: Option<PathBuf>,
    display_precision: Option<DisplayPrecision>,
    auto_submit: Option<bool>,
    references: Option<Vec<ReferenceObject>>,
    decoder_reference: Option<String>,
    unit: Option<String>,
    questions_file: Option<PathBuf>,
}

/// Effective settings for a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Name stored with finished sessions
    pub player_name: String,

    pub points_per_question: u32,

    pub scores_file: PathBuf,

    pub display_precision: DisplayPrecision,

    /// Evaluate on the second tap instead of waiting for a submit
    pub auto_submit: bool,

    /// Reference objects available for calibration
    pub references: Vec<ReferenceObject>,

    /// Reference assumed when the decoder reports a code
    pub decoder_reference: String,

    /// Physical unit lengths are reported in
    pub unit: String,

    /// Question round to play instead of the built-in one
    pub questions_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            points_per_question: DEFAULT_POINTS_PER_QUESTION,
            scores_file: default_scores_file(),
            display_precision: DisplayPrecision::default(),
            auto_submit: false,
            references: ReferenceObject::defaults(),
            decoder_reference: "qr-code".to_string(),
            unit: "cm".to_string(),
            questions_file: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "measure-quest")
}

fn default_scores_file() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(SCORES_FILE))
        .unwrap_or_else(|| PathBuf::from(SCORES_FILE))
}

/// Location of the per-user config file, if the platform has one
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load every layer: defaults, user file, `explicit` file, environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = user_config_path() {
            if let Some(layer) = parse_optional_yaml_file::<ConfigLayer>(&path)? {
                debug!(path = %path.display(), "applying user config");
                config.apply(layer);
            }
        }

        if let Some(path) = explicit {
            let layer: ConfigLayer = parse_yaml_file(path)?;
            debug!(path = %path.display(), "applying config file");
            config.apply(layer);
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus a single YAML file, no user file or environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply(parse_yaml_file(path)?);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.player_name {
            self.player_name = v;
        }
        if let Some(v) = layer.points_per_question {
            self.points_per_question = v;
        }
        if let Some(v) = layer.scores_file {
            self.scores_file = v;
        }
        if let Some(v) = layer.display_precision {
            self.display_precision = v;
        }
        if let Some(v) = layer.auto_submit {
            self.auto_submit = v;
        }
        if let Some(v) = layer.references {
            self.references = v;
        }
        if let Some(v) = layer.decoder_reference {
            self.decoder_reference = v;
        }
        if let Some(v) = layer.unit {
            self.unit = v;
        }
        if let Some(v) = layer.questions_file {
            self.questions_file = Some(v);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(player) = lookup(ENV_PLAYER).filter(|v| !v.trim().is_empty()) {
            self.player_name = player;
        }
        if let Some(path) = lookup(ENV_SCORES_FILE).filter(|v| !v.trim().is_empty()) {
            self.scores_file = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points_per_question == 0 {
            return Err(ConfigError::Invalid(
                "points_per_question must be greater than zero".to_string(),
            ));
        }
        if self.references.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one reference object is required".to_string(),
            ));
        }
        for r in &self.references {
            if !r.length.is_finite() || r.length <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "reference '{}' must have a positive length (got {})",
                    r.name, r.length
                )));
            }
        }
        find_reference(&self.references, &self.decoder_reference).map_err(|_| {
            ConfigError::Invalid(format!(
                "decoder_reference '{}' is not a configured reference",
                self.decoder_reference
            ))
        })?;
        Ok(())
    }

    /// The reference object used when the decoder reports a code
    pub fn decoder_reference(&self) -> Option<&ReferenceObject> {
        find_reference(&self.references, &self.decoder_reference).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.points_per_question, 20);
        assert_eq!(config.display_precision, DisplayPrecision::OneDecimal);
        assert_eq!(config.decoder_reference().unwrap().length, 2.1);
        assert!(!config.auto_submit);
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"player_name: Dana
auto_submit: true
display_precision: whole
references:
  - name: ruler
    length: 30
decoder_reference: ruler
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.player_name, "Dana");
        assert!(config.auto_submit);
        assert_eq!(config.display_precision, DisplayPrecision::Whole);
        assert_eq!(config.references.len(), 1);
        assert_eq!(config.points_per_question, 20);
    }

    #[test]
    fn test_unknown_decoder_reference_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "decoder_reference: napkin\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_non_positive_reference_rejected() {
        let mut config = Config::default();
        config.references.push(ReferenceObject::new("flat", 0.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "calibration_factor: 3\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            ENV_PLAYER => Some("Eli".to_string()),
            ENV_SCORES_FILE => Some("/tmp/mq-scores.json".to_string()),
            _ => None,
        });
        assert_eq!(config.player_name, "Eli");
        assert_eq!(config.scores_file, PathBuf::from("/tmp/mq-scores.json"));
    }
}
