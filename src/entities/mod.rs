//! Serialisable records loaded from YAML

pub mod question;

pub use question::{MeasurementQuestion, QuestionError, QuestionSet};
