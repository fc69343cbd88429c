//! Results screen: score breakdown, retry and exit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{Level, PartKind};
use crate::scoring::{PartScore, ScoreCard, PASS_THRESHOLD};
use crate::session::{Session, Stage};

/// Module tag handed back to the theme browser.
pub const MODULE_TAG: &str = "lesen";

const THEME_BROWSER_PATH: &str = "/services/learn-german/themes";

/// Where control goes when the user leaves the exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTarget {
    pub level: Level,
    pub module: String,
}

impl ExitTarget {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            module: MODULE_TAG.to_string(),
        }
    }

    /// Address of the theme browser, filtered to this level and module.
    pub fn browser_path(&self) -> String {
        format!(
            "{THEME_BROWSER_PATH}?level={}&module={}",
            self.level, self.module
        )
    }
}

impl fmt::Display for ExitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.browser_path())
    }
}

/// One bar of the per-part breakdown.
///
/// `passed` only drives the bar's colour; the verdict uses the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBar {
    pub part: PartKind,
    pub label: String,
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
    pub passed: bool,
}

impl From<&PartScore> for PartBar {
    fn from(score: &PartScore) -> Self {
        Self {
            part: score.part,
            label: score.part.short_label().to_string(),
            correct: score.correct,
            total: score.total,
            percent: score.percent(),
            passed: score.passed(),
        }
    }
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub percent: u32,
    pub passed: bool,
    pub earned: f64,
    pub max_points: f64,
    pub threshold: u32,
    pub bars: Vec<PartBar>,
}

impl ResultsSummary {
    pub fn from_score(card: &ScoreCard) -> Self {
        Self {
            percent: card.percent,
            passed: card.passed,
            earned: card.earned,
            max_points: card.max_points,
            threshold: PASS_THRESHOLD,
            bars: card.parts.iter().map(PartBar::from).collect(),
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed {
            "Bestanden"
        } else {
            "Nicht bestanden"
        }
    }

    /// Points line, e.g. `55 / 69 points · Pass threshold: 60%`.
    pub fn points_line(&self) -> String {
        format!(
            "{} / {} points · Pass threshold: {}%",
            self.earned.round(),
            self.max_points.round(),
            self.threshold
        )
    }
}

/// The results stage of a session, with its two exits.
pub struct ResultsController<'s> {
    session: &'s mut Session,
    summary: ResultsSummary,
}

impl<'s> ResultsController<'s> {
    /// Open the results of a finished session.
    pub fn open(session: &'s mut Session) -> Result<Self, ExamError> {
        if session.stage() != Stage::Results {
            return Err(ExamError::NotPlaying {
                action: "show results",
                stage: session.stage(),
            });
        }
        let card = session.score()?;
        tracing::debug!(
            session = %session.id(),
            theme = %session.theme().id,
            percent = card.percent,
            passed = card.passed,
            "exam finished"
        );
        Ok(Self {
            summary: ResultsSummary::from_score(&card),
            session,
        })
    }

    pub fn summary(&self) -> &ResultsSummary {
        &self.summary
    }

    /// Start over (see [`Session::retry`]).
    pub fn retry(self) -> Stage {
        self.session.retry();
        self.session.stage()
    }

    pub fn exit(self) -> ExitTarget {
        self.session.exit()
    }
}
