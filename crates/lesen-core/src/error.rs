//! Exam error types.
//!
//! Every failure the player can surface is one of these variants, so the
//! rendering side can pick a terminal state (not found, loading failed,
//! malformed content) without string matching.

use thiserror::Error;

use crate::model::Level;
use crate::session::Stage;
use crate::validate::ValidationIssue;

/// Errors raised while resolving or playing an exam.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The level/theme pair has no content.
    #[error("no {level} theme named '{theme}'")]
    NotFound { level: Level, theme: String },

    /// Transport or parse failure while fetching the content document.
    #[error("failed to load exam content: {message}")]
    Load { message: String, retryable: bool },

    /// The theme exists but its content breaks the document invariants.
    #[error("theme '{theme}' is malformed ({} issue(s))", .issues.len())]
    Validation {
        theme: String,
        issues: Vec<ValidationIssue>,
    },

    /// The requested version is not defined by the theme.
    #[error("unknown version: {0}")]
    UnknownVersion(String),

    /// The theme has several versions and none has been chosen yet.
    #[error("a version must be chosen before the exam starts")]
    VersionNotChosen,

    /// An operation was issued in a stage that does not accept it.
    #[error("cannot {action} while {stage}")]
    NotPlaying { action: &'static str, stage: Stage },
}

impl ExamError {
    /// Returns `true` if the session cannot continue and the user must navigate away.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExamError::NotFound { .. } | ExamError::Load { .. } | ExamError::Validation { .. }
        )
    }

    /// Returns `true` if offering a reload makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExamError::Load { retryable: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PartKind;

    #[test]
    fn classification() {
        let not_found = ExamError::NotFound {
            level: Level::B1,
            theme: "nobody".into(),
        };
        assert!(not_found.is_terminal());
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.to_string(), "no b1 theme named 'nobody'");

        let load = ExamError::Load {
            message: "connection reset".into(),
            retryable: true,
        };
        assert!(load.is_terminal());
        assert!(load.is_retryable());

        let gone = ExamError::Load {
            message: "content document not found: /data/lesen.json".into(),
            retryable: false,
        };
        assert!(gone.is_terminal());
        assert!(!gone.is_retryable());
        assert_eq!(
            gone.to_string(),
            "failed to load exam content: content document not found: /data/lesen.json"
        );

        let stage = ExamError::NotPlaying {
            action: "reveal answers",
            stage: Stage::Results,
        };
        assert!(!stage.is_terminal());
        assert!(stage.to_string().contains("results"));

        let part_stage = ExamError::NotPlaying {
            action: "choose a version",
            stage: Stage::Part(PartKind::Teil2),
        };
        assert!(part_stage.to_string().contains("teil-2"));
    }

    #[test]
    fn validation_message_counts_issues() {
        let err = ExamError::Validation {
            theme: "alicia".into(),
            issues: vec![
                ValidationIssue::new("text 1 has no answer"),
                ValidationIssue::new("text 2 has no answer"),
            ],
        };
        assert_eq!(err.to_string(), "theme 'alicia' is malformed (2 issue(s))");
    }
}
