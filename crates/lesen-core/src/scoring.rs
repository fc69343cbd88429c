//! Weighted exam scoring.
//!
//! Each part contributes `correct × weight` points out of `total × weight`.
//! The exam percentage is `round(earned / max × 100)`, and an attempt passes
//! at [`PASS_THRESHOLD`] percent or more. A part or exam with no items scores 0.

use serde::{Deserialize, Serialize};

use crate::answers::{correct_count, AnswerKey, AnswerSheet, PartSheets};
use crate::model::{ExamContent, PartKind};

/// Minimum percentage required to pass, inclusive.
pub const PASS_THRESHOLD: u32 = 60;

/// Whether a percentage passes.
pub fn is_pass(percent: u32) -> bool {
    percent >= PASS_THRESHOLD
}

/// Rounded percentage of `earned` over `max`, 0 when there is nothing to earn.
pub fn percentage(earned: f64, max: f64) -> u32 {
    if max <= 0.0 {
        return 0;
    }
    (earned / max * 100.0).round() as u32
}

/// Score of a single part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartScore {
    pub part: PartKind,
    pub correct: usize,
    pub total: usize,
    pub weight: f64,
}

impl PartScore {
    pub fn compute<K: AnswerKey + ?Sized>(part: PartKind, key: &K, sheet: &AnswerSheet) -> Self {
        Self {
            part,
            correct: correct_count(key, sheet),
            total: key.item_ids().len(),
            weight: part.weight(),
        }
    }

    pub fn earned(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 * self.weight
    }

    pub fn max_points(&self) -> f64 {
        self.total as f64 * self.weight
    }

    /// Unweighted per-part percentage, as shown on the results bars.
    pub fn percent(&self) -> u32 {
        percentage(self.correct as f64, self.total as f64)
    }

    pub fn passed(&self) -> bool {
        is_pass(self.percent())
    }
}

/// Aggregate score across all five parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub parts: Vec<PartScore>,
    pub earned: f64,
    pub max_points: f64,
    pub percent: u32,
    pub passed: bool,
}

impl ScoreCard {
    /// Grade every part of `content` against the matching sheet.
    pub fn compute(content: &ExamContent, sheets: &PartSheets) -> Self {
        let parts = PartKind::ORDER
            .iter()
            .map(|&part| PartScore::compute(part, content.answer_key(part), sheets.get(part)))
            .collect();
        Self::from_parts(parts)
    }

    pub fn from_parts(parts: Vec<PartScore>) -> Self {
        let earned = parts.iter().fold(0.0, |acc, p| acc + p.earned());
        let max_points = parts.iter().fold(0.0, |acc, p| acc + p.max_points());
        let percent = percentage(earned, max_points);
        Self {
            parts,
            earned,
            max_points,
            percent,
            passed: is_pass(percent),
        }
    }

    pub fn part(&self, part: PartKind) -> Option<&PartScore> {
        self.parts.iter().find(|p| p.part == part)
    }

    /// Correct items across all parts.
    pub fn correct(&self) -> usize {
        self.parts.iter().map(|p| p.correct).sum()
    }

    /// Scorable items across all parts.
    pub fn total(&self) -> usize {
        self.parts.iter().map(|p| p.total).sum()
    }
}
