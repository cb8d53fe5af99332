//! Question/tolerance evaluator
//!
//! Decides pass/fail for a measurement and moves question progress along.
//! Comparisons always use the unrounded measured value.

use serde::Serialize;

use crate::entities::question::MeasurementQuestion;

/// Points awarded per accepted answer unless configured otherwise
pub const DEFAULT_POINTS_PER_QUESTION: u32 = 20;

/// The outcome of comparing one measurement with one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub question_id: u32,
    pub accepted: bool,
    pub measured: f64,
    pub target: f64,
    pub tolerance: f64,
    /// `measured - target`
    pub delta: f64,
}

/// `|result - target| <= tolerance`, boundary inclusive
pub fn evaluate(result: f64, question: &MeasurementQuestion) -> Verdict {
    let delta = result - question.target;
    Verdict {
        question_id: question.id,
        accepted: delta.abs() <= question.tolerance,
        measured: result,
        target: question.target,
        tolerance: question.tolerance,
        delta,
    }
}

/// What progress did after a verdict was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum Advance {
    /// Rejected: stay on the same question
    Retry { index: usize },
    /// Accepted: move on to `index`
    Next { index: usize },
    /// Accepted the last question
    Completed { final_score: u32 },
}

/// Question index and accumulated score for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    index: usize,
    score: u32,
    total: usize,
    points_per_question: u32,
    completed: bool,
}

impl Progress {
    pub fn new(total: usize, points_per_question: u32) -> Self {
        Self {
            index: 0,
            score: 0,
            total,
            points_per_question,
            completed: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// What applying `verdict` would do, without changing anything
    pub fn preview(&self, verdict: &Verdict) -> Advance {
        if !verdict.accepted {
            return Advance::Retry { index: self.index };
        }
        let next = self.index + 1;
        if next < self.total {
            Advance::Next { index: next }
        } else {
            Advance::Completed {
                final_score: self.score.saturating_add(self.points_per_question),
            }
        }
    }

    /// Award points and advance on acceptance; no-op on rejection
    pub fn apply(&mut self, verdict: &Verdict) -> Advance {
        let advance = self.preview(verdict);
        match advance {
            Advance::Retry { .. } => {}
            Advance::Next { index } => {
                self.score = self.score.saturating_add(self.points_per_question);
                self.index = index;
            }
            Advance::Completed { final_score } => {
                self.score = final_score;
                self.completed = true;
            }
        }
        advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::measurement::MeasurementKind;

    fn question(target: f64, tolerance: f64) -> MeasurementQuestion {
        MeasurementQuestion {
            id: 1,
            kind: MeasurementKind::Angle,
            prompt: "corner".to_string(),
            target,
            unit: "°".to_string(),
            tolerance,
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let q = question(100.0, 5.0);
        assert!(evaluate(105.0, &q).accepted);
        assert!(evaluate(95.0, &q).accepted);
        assert!(!evaluate(105.0 + 1e-9, &q).accepted);
        assert!(!evaluate(95.0 - 1e-9, &q).accepted);
    }

    #[test]
    fn test_angle_scenario() {
        let q = question(90.0, 5.0);
        let pass = evaluate(92.0, &q);
        assert!(pass.accepted);
        assert_eq!(pass.delta, 2.0);

        let fail = evaluate(96.0, &q);
        assert!(!fail.accepted);
        assert_eq!(fail.delta, 6.0);
    }

    #[test]
    fn test_zero_tolerance_requires_exact() {
        let q = question(45.0, 0.0);
        assert!(evaluate(45.0, &q).accepted);
        assert!(!evaluate(45.000001, &q).accepted);
    }

    #[test]
    fn test_progress_through_round() {
        let q = question(10.0, 1.0);
        let mut progress = Progress::new(2, 20);

        let miss = evaluate(20.0, &q);
        assert_eq!(progress.apply(&miss), Advance::Retry { index: 0 });
        assert_eq!(progress.score(), 0);

        let hit = evaluate(10.5, &q);
        assert_eq!(progress.apply(&hit), Advance::Next { index: 1 });
        assert_eq!(progress.score(), 20);

        assert_eq!(progress.apply(&hit), Advance::Completed { final_score: 40 });
        assert_eq!(progress.score(), 40);
        assert!(progress.is_completed());
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let q = question(10.0, 1.0);
        let progress = Progress::new(1, 20);
        let before = progress.clone();
        assert_eq!(
            progress.preview(&evaluate(10.0, &q)),
            Advance::Completed { final_score: 20 }
        );
        assert_eq!(progress, before);
    }
}
