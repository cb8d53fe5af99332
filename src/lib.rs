//! Measure Quest: camera-assisted measuring game engine
//!
//! Players calibrate the camera against a reference object of known size,
//! tap two points to measure a length or an angle, and score when the result
//! falls inside the question's tolerance band.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
