//! Calibration engine
//!
//! Converts a pixel distance measured across a reference object of known
//! physical size into a scale factor (pixels per physical unit).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::geometry::{euclidean_distance, Point};

/// Errors raised while computing a calibration factor
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Invalid calibration: two points are required (have {have})")]
    MissingPoints { have: usize },

    #[error("Invalid calibration: reference length must be a positive number (got {length})")]
    NonPositiveLength { length: f64 },

    #[error("Invalid calibration: calibration points coincide, pixel distance is {pixels}")]
    DegeneratePoints { pixels: f64 },

    #[error("Unknown reference object '{name}'")]
    UnknownReference { name: String },

    #[error("Invalid calibration: no reference object detected or selected")]
    NoReference,
}

/// A physical item of known size used to derive the scale factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    /// Short name used to select the reference (e.g. "credit-card")
    pub name: String,

    /// Physical length in the configured unit
    pub length: f64,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReferenceObject {
    pub fn new(name: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            length,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Standard printed QR code, 2.1 cm across
    pub fn qr_code() -> Self {
        Self::new("qr-code", 2.1).with_description("Printed QR code marker")
    }

    /// ISO/IEC 7810 ID-1 card width, rounded to 8.5 cm
    pub fn credit_card() -> Self {
        Self::new("credit-card", 8.5).with_description("Credit card (long edge)")
    }

    /// The built-in reference set
    pub fn defaults() -> Vec<Self> {
        vec![Self::qr_code(), Self::credit_card()]
    }
}

/// Look up a reference object by name (case-insensitive)
pub fn find_reference<'a>(
    references: &'a [ReferenceObject],
    name: &str,
) -> Result<&'a ReferenceObject, CalibrationError> {
    references
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CalibrationError::UnknownReference {
            name: name.to_string(),
        })
}

/// Pixels per physical unit
///
/// Always finite and strictly positive once constructed through
/// [`calibrate`]; the identity factor (1.0) stands in until then.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFactor(f64);

impl CalibrationFactor {
    pub const IDENTITY: CalibrationFactor = CalibrationFactor(1.0);

    /// Wrap a raw value without validation (the measurement engine re-checks it)
    pub fn from_raw(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl Default for CalibrationFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::fmt::Display for CalibrationFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} px/unit", self.0)
    }
}

/// The factor currently in force, and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    pub factor: CalibrationFactor,
    pub reference: String,
    pub pixel_distance: f64,
}

/// Compute `pixelDistance(a, b) / known_length`
///
/// Fails without side effects if either point is missing, the length is not
/// a finite positive number, or the points coincide (a zero factor would be
/// unusable for every later measurement).
pub fn calibrate(
    a: Option<&Point>,
    b: Option<&Point>,
    known_length: f64,
) -> Result<CalibrationFactor, CalibrationError> {
    measure_span(a, b, known_length).map(|(_, factor)| factor)
}

/// Pixel span between the two points and the factor it yields
fn measure_span(
    a: Option<&Point>,
    b: Option<&Point>,
    known_length: f64,
) -> Result<(f64, CalibrationFactor), CalibrationError> {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (a, b) => {
            let have = usize::from(a.is_some()) + usize::from(b.is_some());
            return Err(CalibrationError::MissingPoints { have });
        }
    };

    if !known_length.is_finite() || known_length <= 0.0 {
        return Err(CalibrationError::NonPositiveLength {
            length: known_length,
        });
    }

    let pixels = euclidean_distance(a, b);
    let factor = CalibrationFactor(pixels / known_length);
    if !factor.is_valid() {
        return Err(CalibrationError::DegeneratePoints { pixels });
    }

    debug!(pixels, known_length, factor = factor.value(), "computed calibration factor");
    Ok((pixels, factor))
}

/// Keeps the active calibration; last write wins, no averaging
#[derive(Debug, Clone, Default)]
pub struct CalibrationEngine {
    current: Option<Calibration>,
}

impl CalibrationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The factor in force, or the identity factor when never calibrated
    pub fn factor(&self) -> CalibrationFactor {
        self.current
            .as_ref()
            .map(|c| c.factor)
            .unwrap_or_default()
    }

    pub fn is_calibrated(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Calibration> {
        self.current.as_ref()
    }

    /// Recompute the factor against `reference`, overwriting any previous one
    ///
    /// On error the previous calibration is left untouched.
    pub fn calibrate(
        &mut self,
        a: Option<&Point>,
        b: Option<&Point>,
        reference: &ReferenceObject,
    ) -> Result<CalibrationFactor, CalibrationError> {
        let (pixel_distance, factor) = measure_span(a, b, reference.length)?;
        info!(reference = %reference.name, %factor, "calibration updated");
        self.current = Some(Calibration {
            factor,
            reference: reference.name.clone(),
            pixel_distance,
        });
        Ok(factor)
    }
}
