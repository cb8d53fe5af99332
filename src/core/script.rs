//! Synthetic event scripts
//!
//! A script is a YAML list of steps replayed against a [`Session`] backed by
//! a [`SyntheticDevice`]. Taps and decoder detections travel through the
//! device queue exactly as camera events would; the remaining steps are the
//! player's button presses.
//!
//! ```yaml
//! player: Ana
//! steps:
//!   - start_camera
//!   - detect: "https://example.org/marker"
//!   - tap: [100, 100]
//!   - tap: [121, 100]
//!   - calibrate
//!   - tap: [0, 0]
//!   - tap: [1000, 0]
//!   - submit
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::device::{DeviceEvent, SyntheticDevice, SyntheticFeed};
use crate::core::geometry::Point;
use crate::core::session::{Outcome, Session, SessionError};
use crate::yaml::{parse_yaml_file, YamlError};

/// One scripted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    StartCamera,
    StopCamera,
    /// Decoder reports a reference marker with this payload
    Detect(String),
    /// Player taps the frame at `[x, y]`
    Tap(f64, f64),
    SelectReference(String),
    /// Calibrate against the detected or selected reference
    Calibrate,
    /// Calibrate against a named reference
    CalibrateWith(String),
    Submit,
    Reset,
    Recalibrate,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::StartCamera => write!(f, "start camera"),
            Step::StopCamera => write!(f, "stop camera"),
            Step::Detect(payload) => write!(f, "detect '{}'", payload),
            Step::Tap(x, y) => write!(f, "tap ({}, {})", x, y),
            Step::SelectReference(name) => write!(f, "select {}", name),
            Step::Calibrate => write!(f, "calibrate"),
            Step::CalibrateWith(name) => write!(f, "calibrate with {}", name),
            Step::Submit => write!(f, "submit"),
            Step::Reset => write!(f, "reset"),
            Step::Recalibrate => write!(f, "recalibrate"),
        }
    }
}

/// A replayable session recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Overrides the configured player name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,

    /// When set, every camera start fails with this reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_unavailable: Option<String>,

    /// Each step is a bare name or a one-key map (`tap: [x, y]`)
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self, YamlError> {
        parse_yaml_file(path)
    }
}

/// What happened to one step
#[derive(Debug)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub result: Result<Outcome, SessionError>,
}

/// Replays scripts, creating a fresh synthetic device per camera start
pub struct ScriptRunner {
    camera_unavailable: Option<String>,
    feed: Option<SyntheticFeed>,
}

impl ScriptRunner {
    pub fn new(script: &Script) -> Self {
        Self {
            camera_unavailable: script.camera_unavailable.clone(),
            feed: None,
        }
    }

    /// Run every step in order; failing steps are reported, not fatal
    pub fn run(&mut self, steps: &[Step], session: &mut Session) -> Vec<StepReport> {
        let mut reports = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            for result in self.apply(step, session) {
                reports.push(StepReport {
                    index,
                    step: step.clone(),
                    result,
                });
            }
        }
        reports
    }

    fn apply(&mut self, step: &Step, session: &mut Session) -> Vec<Result<Outcome, SessionError>> {
        match step {
            Step::StartCamera => {
                let (device, feed) = match &self.camera_unavailable {
                    Some(reason) => SyntheticDevice::unavailable(reason.clone()),
                    None => SyntheticDevice::new(),
                };
                let result = session.start_camera(Box::new(device));
                if result.is_ok() {
                    self.feed = Some(feed);
                }
                vec![result]
            }
            Step::StopCamera => {
                let result = session.stop_camera();
                self.feed = None;
                vec![result]
            }
            Step::Detect(payload) => {
                self.deliver(DeviceEvent::ReferenceDetected(payload.clone()), session)
            }
            Step::Tap(x, y) => self.deliver(DeviceEvent::Tap(Point::new(*x, *y)), session),
            Step::SelectReference(name) => vec![session.select_reference(name)],
            Step::Calibrate => vec![session.calibrate(None)],
            Step::CalibrateWith(name) => vec![session.calibrate(Some(name))],
            Step::Submit => vec![session.submit()],
            Step::Reset => vec![session.reset_points()],
            Step::Recalibrate => vec![session.recalibrate()],
        }
    }

    /// Push through the device when one is running, otherwise hand the
    /// event straight to the session (which will drop it)
    fn deliver(
        &mut self,
        event: DeviceEvent,
        session: &mut Session,
    ) -> Vec<Result<Outcome, SessionError>> {
        match &self.feed {
            Some(feed) if session.holds_device() => {
                feed.push(event);
                session.pump()
            }
            _ => vec![session.handle_device_event(event)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::evaluator::Advance;
    use crate::core::scores::MemoryScoreStore;
    use crate::core::session::SessionMode;
    use crate::entities::question::QuestionSet;
    use crate::yaml::parse_yaml;

    #[test]
    fn test_parse_script() {
        let script: Script = parse_yaml(
            r#"player: Ana
steps:
  - start_camera
  - detect: marker
  - tap: [1, 2.5]
  - calibrate_with: credit-card
  - select_reference: qr-code
  - submit
  - stop_camera
"#,
            "script.yaml",
        )
        .unwrap();
        assert_eq!(script.player.as_deref(), Some("Ana"));
        assert_eq!(
            script.steps,
            vec![
                Step::StartCamera,
                Step::Detect("marker".to_string()),
                Step::Tap(1.0, 2.5),
                Step::CalibrateWith("credit-card".to_string()),
                Step::SelectReference("qr-code".to_string()),
                Step::Submit,
                Step::StopCamera,
            ]
        );
    }

    #[test]
    fn test_replay_first_question() {
        let script: Script = parse_yaml(
            r#"steps:
  - start_camera
  - detect: marker
  - tap: [0, 0]
  - tap: [21, 0]
  - calibrate
  - tap: [0, 0]
  - tap: [1000, 0]
  - tap: [5, 5]
  - submit
"#,
            "script.yaml",
        )
        .unwrap();

        let mut session = Session::new(
            Config::default(),
            QuestionSet::builtin().unwrap(),
            Box::new(MemoryScoreStore::new()),
        );
        let reports = ScriptRunner::new(&script).run(&script.steps, &mut session);
        assert_eq!(reports.len(), 9);
        assert!(reports.iter().all(|r| r.result.is_ok()));

        assert!(matches!(
            reports[7].result,
            Ok(Outcome::Ignored { .. })
        ));
        assert!(matches!(
            reports[8].result,
            Ok(Outcome::Evaluated {
                advance: Advance::Next { index: 1 },
                ..
            })
        ));
        assert_eq!(session.score(), 20);
        assert_eq!(session.mode(), SessionMode::Measuring);
    }

    #[test]
    fn test_unavailable_camera_reported() {
        let script = Script {
            player: None,
            camera_unavailable: Some("permission denied".to_string()),
            steps: vec![Step::StartCamera, Step::Tap(1.0, 1.0)],
        };
        let mut session = Session::new(
            Config::default(),
            QuestionSet::builtin().unwrap(),
            Box::new(MemoryScoreStore::new()),
        );
        let reports = ScriptRunner::new(&script).run(&script.steps, &mut session);
        assert!(matches!(reports[0].result, Err(SessionError::Device(_))));
        assert!(matches!(reports[1].result, Ok(Outcome::Ignored { .. })));
        assert_eq!(session.mode(), SessionMode::Idle);
    }
}
