//! CLI command implementations

pub mod calibrate;
pub mod completions;
pub mod measure;
pub mod play;
pub mod questions;
pub mod refs;
pub mod scores;
