//! Measurement engine
//!
//! Turns two captured points into a physical quantity. Values keep full
//! floating precision; rounding only happens when a value is displayed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::geometry::{direction_degrees, euclidean_distance, Point};

/// Errors raised by the measurement step
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasurementError {
    /// Configuration fault: the scale factor is unusable. Recalibrate.
    #[error("Invalid calibration factor {factor}: recalibrate before measuring")]
    InvalidFactor { factor: f64 },
}

/// What a question asks the player to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Length,
    Angle,
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementKind::Length => write!(f, "length"),
            MeasurementKind::Angle => write!(f, "angle"),
        }
    }
}

/// A computed measurement, unrounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub value: f64,
}

/// How lengths are rounded for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPrecision {
    #[default]
    OneDecimal,
    Whole,
}

impl Measurement {
    /// Value rounded for presentation; angles always show whole degrees
    pub fn display_value(&self, precision: DisplayPrecision) -> f64 {
        match (self.kind, precision) {
            (MeasurementKind::Angle, _) | (MeasurementKind::Length, DisplayPrecision::Whole) => {
                self.value.round()
            }
            (MeasurementKind::Length, DisplayPrecision::OneDecimal) => {
                (self.value * 10.0).round() / 10.0
            }
        }
    }

    /// Rounded value with its unit (angles are always in degrees)
    pub fn format(&self, precision: DisplayPrecision, length_unit: &str) -> String {
        let shown = self.display_value(precision);
        match (self.kind, precision) {
            (MeasurementKind::Angle, _) => format!("{:.0}°", shown),
            (MeasurementKind::Length, DisplayPrecision::Whole) => {
                format!("{:.0} {}", shown, length_unit)
            }
            (MeasurementKind::Length, DisplayPrecision::OneDecimal) => {
                format!("{:.1} {}", shown, length_unit)
            }
        }
    }
}

/// Measure the segment `a -> b`
///
/// - `Length`: pixel distance divided by `factor`; `factor` must be finite
///   and strictly positive.
/// - `Angle`: direction of `a -> b` in degrees within `[0, 360)`; `factor`
///   is ignored.
pub fn measure(
    kind: MeasurementKind,
    a: &Point,
    b: &Point,
    factor: f64,
) -> Result<Measurement, MeasurementError> {
    let value = match kind {
        MeasurementKind::Length => {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(MeasurementError::InvalidFactor { factor });
            }
            euclidean_distance(a, b) / factor
        }
        MeasurementKind::Angle => direction_degrees(a, b),
    };
    Ok(Measurement { kind, value })
}
