//! Core module - measuring engines, session state machine, and collaborators

pub mod calibration;
pub mod capture;
pub mod config;
pub mod device;
pub mod evaluator;
pub mod geometry;
pub mod measurement;
pub mod scores;
pub mod script;
pub mod session;

pub use calibration::{
    calibrate, find_reference, Calibration, CalibrationEngine, CalibrationError,
    CalibrationFactor, ReferenceObject,
};
pub use capture::{Capture, IgnoreReason, PointCapture};
pub use config::{Config, ConfigError};
pub use device::{
    CaptureDevice, DeviceError, DeviceEvent, DeviceGuard, SyntheticDevice, SyntheticFeed,
};
pub use evaluator::{evaluate, Advance, Progress, Verdict};
pub use geometry::{direction_degrees, euclidean_distance, Point};
pub use measurement::{measure, DisplayPrecision, Measurement, MeasurementError, MeasurementKind};
pub use scores::{JsonScoreStore, MemoryScoreStore, ScoreRecord, ScoreStore, StoreError};
pub use script::{Script, ScriptRunner, Step, StepReport};
pub use session::{is_valid_transition, Outcome, Session, SessionError, SessionMode, SessionSummary};
