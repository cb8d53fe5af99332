//! Measurement questions
//!
//! A round is a fixed, ordered list of questions. The built-in round ships
//! embedded in the binary; other rounds can be loaded from YAML.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::measurement::MeasurementKind;
use crate::yaml::{parse_yaml, parse_yaml_file, YamlError};

#[derive(Embed)]
#[folder = "assets/"]
struct EmbeddedAssets;

const BUILTIN_FILE: &str = "questions.yaml";

/// A single measuring task with its acceptance band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementQuestion {
    pub id: u32,

    pub kind: MeasurementKind,

    /// Text shown to the player
    pub prompt: String,

    /// Expected value, in `unit`
    pub target: f64,

    pub unit: String,

    /// Inclusive symmetric margin around `target`
    pub tolerance: f64,
}

impl MeasurementQuestion {
    /// "100 cm (±5 cm)"
    pub fn target_label(&self) -> String {
        let sep = if self.unit == "°" { "" } else { " " };
        format!(
            "{}{sep}{} (±{}{sep}{})",
            self.target, self.unit, self.tolerance, self.unit
        )
    }
}

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("Question set is empty")]
    Empty,

    #[error("Question {id}: {reason}")]
    Invalid { id: u32, reason: String },

    #[error("Built-in question set is missing from the binary")]
    MissingBuiltin,
}

/// An ordered, read-only list of questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    questions: Vec<MeasurementQuestion>,
}

impl QuestionSet {
    pub fn new(questions: Vec<MeasurementQuestion>) -> Result<Self, QuestionError> {
        let set = Self { questions };
        set.validate()?;
        Ok(set)
    }

    /// The embedded four-question round
    pub fn builtin() -> Result<Self, QuestionError> {
        let file = EmbeddedAssets::get(BUILTIN_FILE).ok_or(QuestionError::MissingBuiltin)?;
        let content = String::from_utf8_lossy(&file.data);
        let set: QuestionSet = parse_yaml(&content, BUILTIN_FILE)?;
        set.validate()?;
        Ok(set)
    }

    pub fn from_file(path: &Path) -> Result<Self, QuestionError> {
        let set: QuestionSet = parse_yaml_file(path)?;
        set.validate()?;
        Ok(set)
    }

    /// Load `path` if given, otherwise the built-in round
    pub fn load(path: Option<&Path>) -> Result<Self, QuestionError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<(), QuestionError> {
        if self.questions.is_empty() {
            return Err(QuestionError::Empty);
        }
        for q in &self.questions {
            if !q.target.is_finite() {
                return Err(QuestionError::Invalid {
                    id: q.id,
                    reason: "target must be a finite number".to_string(),
                });
            }
            if !q.tolerance.is_finite() || q.tolerance < 0.0 {
                return Err(QuestionError::Invalid {
                    id: q.id,
                    reason: "tolerance must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&MeasurementQuestion> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementQuestion> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_round() {
        let set = QuestionSet::builtin().unwrap();
        assert_eq!(set.len(), 4);

        let first = set.get(0).unwrap();
        assert_eq!(first.kind, MeasurementKind::Length);
        assert_eq!(first.target, 100.0);
        assert_eq!(first.tolerance, 5.0);

        let second = set.get(1).unwrap();
        assert_eq!(second.kind, MeasurementKind::Angle);
        assert_eq!(second.target, 90.0);
        assert_eq!(second.unit, "°");
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(QuestionSet::new(vec![]), Err(QuestionError::Empty)));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let q = MeasurementQuestion {
            id: 7,
            kind: MeasurementKind::Length,
            prompt: "Edge".to_string(),
            target: 10.0,
            unit: "cm".to_string(),
            tolerance: -1.0,
        };
        assert!(matches!(
            QuestionSet::new(vec![q]),
            Err(QuestionError::Invalid { id: 7, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("round.yaml");
        std::fs::write(
            &path,
            r#"questions:
  - id: 1
    kind: angle
    prompt: Slope of the ramp
    target: 30
    unit: "°"
    tolerance: 2
"#,
        )
        .unwrap();

        let set = QuestionSet::load(Some(&path)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().prompt, "Slope of the ramp");
    }

    #[test]
    fn test_target_label() {
        let set = QuestionSet::builtin().unwrap();
        assert_eq!(set.get(0).unwrap().target_label(), "100 cm (±5 cm)");
        assert_eq!(set.get(1).unwrap().target_label(), "90° (±5°)");
    }
}
