//! Running score for a session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Correct answers out of cards graded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Cards graded correct.
    pub correct: u32,
    /// Cards graded in total.
    pub total: u32,
}

impl Score {
    /// Count a correct answer.
    pub fn record_correct(&mut self) {
        self.correct += 1;
        self.total += 1;
    }

    /// Count a miss.
    pub fn record_incorrect(&mut self) {
        self.total += 1;
    }

    /// Back to 0 / 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction correct, or `None` before anything was graded.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.correct) / f64::from(self.total))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_starts_empty() {
        let score = Score::default();
        assert_eq!(score, Score { correct: 0, total: 0 });
        assert!(score.accuracy().is_none());
    }

    #[test]
    fn test_record_correct_and_incorrect() {
        let mut score = Score::default();
        score.record_correct();
        assert_eq!(score, Score { correct: 1, total: 1 });

        score.record_incorrect();
        assert_eq!(score, Score { correct: 1, total: 2 });
        assert_eq!(score.accuracy(), Some(0.5));
    }

    #[test]
    fn test_reset() {
        let mut score = Score::default();
        score.record_correct();
        score.record_incorrect();
        score.reset();
        assert_eq!(score, Score::default());
    }

    #[test]
    fn test_display() {
        let score = Score { correct: 3, total: 5 };
        assert_eq!(score.to_string(), "3 / 5");
    }
}
