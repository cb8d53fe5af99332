//! Point capture
//!
//! Holds at most two taps per attempt: the first becomes the start point,
//! the second the end point. Anything after that is dropped until reset.

use serde::Serialize;

use crate::core::geometry::Point;

/// Why a tap was dropped. Never shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Session mode does not accept taps (idle, pending, completed)
    NotCapturing,
    /// Awaiting calibration but no reference has been detected or selected
    NotReady,
    /// Both points are already held
    PointsFull,
    /// Coordinates were NaN or infinite
    InvalidCoordinate,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::NotCapturing => write!(f, "not capturing"),
            IgnoreReason::NotReady => write!(f, "no calibration reference yet"),
            IgnoreReason::PointsFull => write!(f, "two points already set"),
            IgnoreReason::InvalidCoordinate => write!(f, "invalid coordinate"),
        }
    }
}

/// Result of offering a tap to [`PointCapture`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capture {
    First(Point),
    Second { start: Point, end: Point },
    Ignored(IgnoreReason),
}

/// The two points of the current attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCapture {
    start: Option<Point>,
    end: Option<Point>,
}

impl PointCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<&Point> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&Point> {
        self.end.as_ref()
    }

    pub fn count(&self) -> usize {
        usize::from(self.start.is_some()) + usize::from(self.end.is_some())
    }

    pub fn is_full(&self) -> bool {
        self.count() == 2
    }

    /// Both points, if both are set
    pub fn pair(&self) -> Option<(Point, Point)> {
        self.start.zip(self.end)
    }

    /// Record a tap, alternating start then end
    pub fn accept(&mut self, point: Point) -> Capture {
        if !point.is_finite() {
            return Capture::Ignored(IgnoreReason::InvalidCoordinate);
        }
        match (self.start, self.end) {
            (None, _) => {
                self.start = Some(point);
                Capture::First(point)
            }
            (Some(start), None) => {
                self.end = Some(point);
                Capture::Second { start, end: point }
            }
            (Some(_), Some(_)) => Capture::Ignored(IgnoreReason::PointsFull),
        }
    }

    /// Drop the second point only, keeping the first
    pub(crate) fn undo_end(&mut self) {
        self.end = None;
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }
}
