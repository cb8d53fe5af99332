//! Measuring session state machine
//!
//! One [`Session`] owns every piece of mutable state for a measuring round:
//! mode, captured points, pending result, calibration, question progress and
//! the capture device. Events are processed one at a time; each transition
//! function either fully applies or leaves the session untouched.
//!
//! ```text
//! Idle ──start──▶ AwaitingCalibration ──calibrate──▶ Measuring ──2nd tap──▶ PendingEvaluation
//!                        ▲                              ▲  ▲                    │      │
//!                        └────────recalibrate───────────┘  └──reject / reset────┘      │ accept
//!                                                          ▲                           ▼
//!                                                          └──more questions── AdvancingQuestion ──last──▶ Completed
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::core::calibration::{
    find_reference, CalibrationEngine, CalibrationError, CalibrationFactor, ReferenceObject,
};
use crate::core::capture::{Capture, IgnoreReason, PointCapture};
use crate::core::config::Config;
use crate::core::device::{CaptureDevice, DeviceError, DeviceEvent, DeviceGuard};
use crate::core::evaluator::{evaluate, Advance, Progress, Verdict};
use crate::core::geometry::{euclidean_distance, Point};
use crate::core::measurement::{measure, Measurement, MeasurementError};
use crate::core::scores::{ScoreRecord, ScoreStore, StoreError, MEASUREMENT_LABEL};
use crate::entities::question::{MeasurementQuestion, QuestionSet};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Camera off
    Idle,
    /// Camera on, no calibration factor set yet
    AwaitingCalibration,
    /// Calibrated and ready for two taps
    Measuring,
    /// Two points held, result waiting for the evaluator
    PendingEvaluation,
    /// Accepted answer, moving to the next question
    AdvancingQuestion,
    /// Every question answered; terminal
    Completed,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Idle => write!(f, "idle"),
            SessionMode::AwaitingCalibration => write!(f, "awaiting-calibration"),
            SessionMode::Measuring => write!(f, "measuring"),
            SessionMode::PendingEvaluation => write!(f, "pending-evaluation"),
            SessionMode::AdvancingQuestion => write!(f, "advancing-question"),
            SessionMode::Completed => write!(f, "completed"),
        }
    }
}

/// Check if a mode transition is allowed
pub fn is_valid_transition(from: SessionMode, to: SessionMode) -> bool {
    use SessionMode::*;
    matches!(
        (from, to),
        // Camera start
        (Idle, AwaitingCalibration)
            | (Idle, Measuring)
            // Calibration and recalibration
            | (AwaitingCalibration, Measuring)
            | (Measuring, AwaitingCalibration)
            | (PendingEvaluation, AwaitingCalibration)
            // Capture and evaluation
            | (Measuring, PendingEvaluation)
            | (PendingEvaluation, Measuring)
            | (PendingEvaluation, AdvancingQuestion)
            | (AdvancingQuestion, Measuring)
            | (AdvancingQuestion, Completed)
            // Camera stop
            | (AwaitingCalibration, Idle)
            | (Measuring, Idle)
            | (PendingEvaluation, Idle)
    )
}

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Failed to save the final score: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid mode transition: {from} → {to}")]
    InvalidTransition { from: SessionMode, to: SessionMode },

    #[error("Cannot {action} while {mode}")]
    WrongMode {
        action: &'static str,
        mode: SessionMode,
    },

    #[error("Session is complete; start a new session to play again")]
    Completed,
}

/// What an event did to the session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Outcome {
    CameraStarted { mode: SessionMode },
    CameraStopped,
    /// A reference is known; calibration taps are now accepted
    ReferenceReady { reference: String, length: f64 },
    FirstPointSet { point: Point },
    /// Both calibration points are held, awaiting `calibrate`
    CalibrationPointsSet { pixel_distance: f64 },
    Calibrated {
        reference: String,
        factor: CalibrationFactor,
    },
    /// Both measuring points are held, result awaits the evaluator
    Measured { measurement: Measurement },
    Evaluated { verdict: Verdict, advance: Advance },
    PointsReset { mode: SessionMode },
    Recalibrating,
    /// A tap that was silently dropped
    Ignored { reason: IgnoreReason },
    /// Event had no effect in the current mode
    Unchanged,
}

/// Final figures for a session that was ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub score: u32,
    pub answered: usize,
    pub total: usize,
    pub completed: bool,
}

/// A measuring round in progress
pub struct Session {
    id: Ulid,
    config: Config,
    questions: QuestionSet,
    mode: SessionMode,
    capture: PointCapture,
    calibration: CalibrationEngine,
    reference: Option<ReferenceObject>,
    pending: Option<Measurement>,
    progress: Progress,
    device: Option<DeviceGuard>,
    store: Box<dyn ScoreStore>,
    transitions: Vec<(SessionMode, SessionMode)>,
}

impl Session {
    /// Create a session in `Idle`
    pub fn new(config: Config, questions: QuestionSet, store: Box<dyn ScoreStore>) -> Self {
        let progress = Progress::new(questions.len(), config.points_per_question);
        let id = Ulid::new();
        debug!(session = %id, questions = questions.len(), "session created");
        Self {
            id,
            config,
            questions,
            mode: SessionMode::Idle,
            capture: PointCapture::new(),
            calibration: CalibrationEngine::new(),
            reference: None,
            pending: None,
            progress,
            device: None,
            store,
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.progress.score()
    }

    pub fn question_index(&self) -> usize {
        self.progress.index()
    }

    pub fn current_question(&self) -> Option<&MeasurementQuestion> {
        self.questions.get(self.progress.index())
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn start_point(&self) -> Option<&Point> {
        self.capture.start()
    }

    pub fn end_point(&self) -> Option<&Point> {
        self.capture.end()
    }

    pub fn pending(&self) -> Option<&Measurement> {
        self.pending.as_ref()
    }

    pub fn factor(&self) -> CalibrationFactor {
        self.calibration.factor()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Reference detected or selected for the next calibration
    pub fn active_reference(&self) -> Option<&ReferenceObject> {
        self.reference.as_ref()
    }

    /// True while the session holds an unreleased device
    pub fn holds_device(&self) -> bool {
        self.device.as_ref().is_some_and(|d| !d.is_released())
    }

    /// Every mode change so far, oldest first
    pub fn transitions(&self) -> &[(SessionMode, SessionMode)] {
        &self.transitions
    }

    fn transition(&mut self, to: SessionMode) -> Result<(), SessionError> {
        let from = self.mode;
        if !is_valid_transition(from, to) {
            return Err(SessionError::InvalidTransition { from, to });
        }
        debug!(session = %self.id, %from, %to, "mode transition");
        self.mode = to;
        self.transitions.push((from, to));
        Ok(())
    }

    fn wrong_mode(&self, action: &'static str) -> SessionError {
        if self.mode == SessionMode::Completed {
            SessionError::Completed
        } else {
            SessionError::WrongMode {
                action,
                mode: self.mode,
            }
        }
    }

    fn clear_attempt(&mut self) {
        self.capture.clear();
        self.pending = None;
    }

    /// Mode to return to after an attempt is cleared
    fn ready_mode(&self) -> SessionMode {
        if self.calibration.is_calibrated() {
            SessionMode::Measuring
        } else {
            SessionMode::AwaitingCalibration
        }
    }

    /// Acquire `device` and turn the camera on
    ///
    /// On failure the session stays `Idle` and the device is dropped.
    pub fn start_camera(
        &mut self,
        device: Box<dyn CaptureDevice>,
    ) -> Result<Outcome, SessionError> {
        if self.mode != SessionMode::Idle {
            return Err(self.wrong_mode("start the camera"));
        }
        let guard = DeviceGuard::acquire(device)?;
        let to = self.ready_mode();
        self.transition(to)?;
        self.device = Some(guard);
        Ok(Outcome::CameraStarted { mode: to })
    }

    /// Release the device and go back to `Idle`
    ///
    /// Calibration and question progress survive; points and the active
    /// reference do not.
    pub fn stop_camera(&mut self) -> Result<Outcome, SessionError> {
        match self.mode {
            SessionMode::Idle | SessionMode::Completed => return Ok(Outcome::Unchanged),
            _ => {}
        }
        self.transition(SessionMode::Idle)?;
        self.release_device();
        self.clear_attempt();
        self.reference = None;
        Ok(Outcome::CameraStopped)
    }

    fn release_device(&mut self) {
        if let Some(mut guard) = self.device.take() {
            guard.release();
        }
    }

    /// The decoder saw a reference marker
    ///
    /// The payload is only a trigger; the configured decoder reference
    /// supplies the physical size.
    pub fn reference_detected(&mut self, payload: &str) -> Result<Outcome, SessionError> {
        if self.mode != SessionMode::AwaitingCalibration || self.reference.is_some() {
            debug!(payload, mode = %self.mode, "reference detection ignored");
            return Ok(Outcome::Unchanged);
        }
        let reference = find_reference(&self.config.references, &self.config.decoder_reference)?
            .clone();
        info!(payload, reference = %reference.name, "reference detected");
        Ok(self.set_reference(reference))
    }

    /// The player picked a reference object by hand
    pub fn select_reference(&mut self, name: &str) -> Result<Outcome, SessionError> {
        if self.mode != SessionMode::AwaitingCalibration {
            return Err(self.wrong_mode("select a reference"));
        }
        let reference = find_reference(&self.config.references, name)?.clone();
        info!(reference = %reference.name, "reference selected");
        Ok(self.set_reference(reference))
    }

    fn set_reference(&mut self, reference: ReferenceObject) -> Outcome {
        let outcome = Outcome::ReferenceReady {
            reference: reference.name.clone(),
            length: reference.length,
        };
        self.reference = Some(reference);
        outcome
    }

    /// Offer a tap to the session
    ///
    /// Taps outside a capturing mode, before a reference is known, or after
    /// two points are held come back as [`Outcome::Ignored`] with no change.
    pub fn capture_point(&mut self, point: Point) -> Result<Outcome, SessionError> {
        let ignored = |reason: IgnoreReason| -> Result<Outcome, SessionError> {
            debug!(%reason, "tap ignored");
            Ok(Outcome::Ignored { reason })
        };

        match self.mode {
            SessionMode::AwaitingCalibration => {
                if self.reference.is_none() {
                    return ignored(IgnoreReason::NotReady);
                }
                match self.capture.accept(point) {
                    Capture::First(point) => Ok(Outcome::FirstPointSet { point }),
                    Capture::Second { start, end } => Ok(Outcome::CalibrationPointsSet {
                        pixel_distance: euclidean_distance(&start, &end),
                    }),
                    Capture::Ignored(reason) => ignored(reason),
                }
            }
            SessionMode::Measuring => match self.capture.accept(point) {
                Capture::First(point) => Ok(Outcome::FirstPointSet { point }),
                Capture::Second { start, end } => self.complete_measurement(start, end),
                Capture::Ignored(reason) => ignored(reason),
            },
            _ => ignored(IgnoreReason::NotCapturing),
        }
    }

    fn complete_measurement(&mut self, start: Point, end: Point) -> Result<Outcome, SessionError> {
        let Some(kind) = self.current_question().map(|q| q.kind) else {
            self.capture.undo_end();
            return Err(SessionError::Completed);
        };

        let measurement = match measure(kind, &start, &end, self.calibration.factor().value()) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "measurement rejected");
                self.capture.undo_end();
                return Err(e.into());
            }
        };

        self.transition(SessionMode::PendingEvaluation)?;
        self.pending = Some(measurement);
        debug!(kind = %measurement.kind, value = measurement.value, "measurement pending");

        if self.config.auto_submit {
            return self.submit();
        }
        Ok(Outcome::Measured { measurement })
    }

    /// Consume the two held points as a calibration against a reference
    ///
    /// Uses `reference` by name when given, otherwise the detected or
    /// selected one. On failure nothing changes.
    pub fn calibrate(&mut self, reference: Option<&str>) -> Result<Outcome, SessionError> {
        if self.mode != SessionMode::AwaitingCalibration {
            return Err(self.wrong_mode("calibrate"));
        }
        let reference = match reference {
            Some(name) => find_reference(&self.config.references, name)?.clone(),
            None => self
                .reference
                .clone()
                .ok_or(CalibrationError::NoReference)?,
        };

        let factor =
            self.calibration
                .calibrate(self.capture.start(), self.capture.end(), &reference)?;
        self.transition(SessionMode::Measuring)?;
        self.clear_attempt();
        Ok(Outcome::Calibrated {
            reference: reference.name,
            factor,
        })
    }

    /// Go back to calibrating, keeping the current factor until replaced
    pub fn recalibrate(&mut self) -> Result<Outcome, SessionError> {
        match self.mode {
            SessionMode::Measuring | SessionMode::PendingEvaluation => {}
            _ => return Err(self.wrong_mode("recalibrate")),
        }
        self.transition(SessionMode::AwaitingCalibration)?;
        self.clear_attempt();
        Ok(Outcome::Recalibrating)
    }

    /// Clear points and any pending result
    pub fn reset_points(&mut self) -> Result<Outcome, SessionError> {
        match self.mode {
            SessionMode::AwaitingCalibration
            | SessionMode::Measuring
            | SessionMode::PendingEvaluation => {}
            _ => return Err(self.wrong_mode("reset points")),
        }
        let to = self.ready_mode();
        if to != self.mode {
            self.transition(to)?;
        }
        self.clear_attempt();
        Ok(Outcome::PointsReset { mode: to })
    }

    /// Evaluate the pending measurement against the current question
    ///
    /// Accepting the last question appends the final score to the store
    /// before anything else changes; if that write fails the result stays
    /// pending so the submit can be retried.
    pub fn submit(&mut self) -> Result<Outcome, SessionError> {
        if self.mode != SessionMode::PendingEvaluation {
            return Err(self.wrong_mode("submit"));
        }
        let (Some(measurement), Some(question)) = (self.pending, self.current_question()) else {
            return Err(self.wrong_mode("submit"));
        };

        let verdict = evaluate(measurement.value, question);
        let advance = self.progress.preview(&verdict);

        if let Advance::Completed { final_score } = advance {
            let record = ScoreRecord::new(
                final_score,
                MEASUREMENT_LABEL,
                self.config.player_name.clone(),
            );
            self.store.append(record)?;
        }

        self.progress.apply(&verdict);
        info!(
            question = verdict.question_id,
            accepted = verdict.accepted,
            measured = verdict.measured,
            delta = verdict.delta,
            score = self.progress.score(),
            "measurement evaluated"
        );

        match advance {
            Advance::Retry { .. } => {
                self.transition(SessionMode::Measuring)?;
            }
            Advance::Next { .. } => {
                self.transition(SessionMode::AdvancingQuestion)?;
                self.transition(SessionMode::Measuring)?;
            }
            Advance::Completed { final_score } => {
                self.transition(SessionMode::AdvancingQuestion)?;
                self.transition(SessionMode::Completed)?;
                self.release_device();
                info!(session = %self.id, final_score, "session completed");
            }
        }
        self.clear_attempt();

        Ok(Outcome::Evaluated { verdict, advance })
    }

    /// Route one device event
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> Result<Outcome, SessionError> {
        match event {
            DeviceEvent::Tap(point) => self.capture_point(point),
            DeviceEvent::ReferenceDetected(payload) => self.reference_detected(&payload),
        }
    }

    /// Process every queued device event in arrival order
    pub fn pump(&mut self) -> Vec<Result<Outcome, SessionError>> {
        let mut results = Vec::new();
        while let Some(event) = self.device.as_mut().and_then(|d| d.poll_event()) {
            results.push(self.handle_device_event(event));
        }
        results
    }

    /// End the session, releasing the device if still held
    pub fn end(mut self) -> SessionSummary {
        self.release_device();
        let summary = SessionSummary {
            id: self.id(),
            score: self.progress.score(),
            answered: if self.progress.is_completed() {
                self.progress.total()
            } else {
                self.progress.index()
            },
            total: self.progress.total(),
            completed: self.progress.is_completed(),
        };
        info!(session = %summary.id, score = summary.score, "session ended");
        summary
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("capture", &self.capture)
            .field("pending", &self.pending)
            .field("factor", &self.calibration.factor())
            .field("progress", &self.progress)
            .field("device", &self.device)
            .finish()
    }
}
