//! The exam session: version choice, part navigation, reveal and retry.
//!
//! A [`Session`] owns everything that changes while a user works through a
//! theme: the selected version, the current [`Stage`], the reveal flag of the
//! part on screen and one [`AnswerSheet`] per part. The theme itself is
//! shared and immutable.
//!
//! Every stage transition clears the reveal flag and fires the
//! [`TransitionEffects`] hooks. `back` on the first part is a no-op and fires
//! nothing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::{
    self, AdMatching, AnswerSheet, Cloze, HeadlineMatching, ItemFeedback, MultipleChoice,
    PartSheets, PartView,
};
use crate::error::ExamError;
use crate::model::{ExamContent, ExamTheme, ItemId, Level, PartKind};
use crate::results::ExitTarget;
use crate::scoring::ScoreCard;
use crate::traits::{NoopEffects, TransitionEffects};
use crate::validate::ValidationIssue;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "part", rename_all = "snake_case")]
pub enum Stage {
    /// The theme has several versions and the picker is showing.
    ChoosingVersion,
    /// Working on a part.
    Part(PartKind),
    /// The score breakdown is showing.
    Results,
}

impl Stage {
    pub fn part(self) -> Option<PartKind> {
        match self {
            Stage::Part(part) => Some(part),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ChoosingVersion => write!(f, "choosing a version"),
            Stage::Part(part) => write!(f, "on {part}"),
            Stage::Results => write!(f, "showing results"),
        }
    }
}

/// A point-in-time copy of session state, for persistence and assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub level: Level,
    pub theme_id: String,
    pub version: Option<String>,
    pub stage: Stage,
    pub revealed: bool,
    pub answers: PartSheets,
}

/// One user's pass through one theme.
pub struct Session {
    id: Uuid,
    level: Level,
    theme: Arc<ExamTheme>,
    version: Option<String>,
    stage: Stage,
    revealed: bool,
    sheets: PartSheets,
    /// Part to return to when the picker is reopened and the same version is kept.
    resume: Option<PartKind>,
    effects: Arc<dyn TransitionEffects>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("theme", &self.theme.id)
            .field("version", &self.version)
            .field("stage", &self.stage)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}

/// Content of the selected version, or the theme's fallback.
fn active_content<'t>(
    theme: &'t ExamTheme,
    version: Option<&str>,
) -> Result<&'t ExamContent, ExamError> {
    if version.is_none() && theme.content.is_none() && theme.requires_version_choice() {
        return Err(ExamError::VersionNotChosen);
    }
    theme.content_for(version).ok_or_else(|| ExamError::Validation {
        theme: theme.id.clone(),
        issues: vec![ValidationIssue::new(match version {
            Some(v) => format!("version '{v}' has no playable content"),
            None => "theme has no playable content".to_string(),
        })
        .with_theme(&theme.id)],
    })
}

impl Session {
    /// Start a session on a resolved theme.
    ///
    /// Themes with more than one selectable version open on the version
    /// picker with the default preselected; all others go straight to Teil 1.
    pub fn start(level: Level, theme: impl Into<Arc<ExamTheme>>) -> Result<Self, ExamError> {
        let theme = theme.into();
        let version = theme.preselected_version();
        active_content(&theme, version.as_deref())?;

        let stage = if theme.requires_version_choice() {
            Stage::ChoosingVersion
        } else {
            Stage::Part(PartKind::Teil1)
        };
        let session = Self {
            id: Uuid::new_v4(),
            level,
            theme,
            version,
            stage,
            revealed: false,
            sheets: PartSheets::new(),
            resume: None,
            effects: Arc::new(NoopEffects),
        };
        tracing::debug!(
            session = %session.id,
            theme = %session.theme.id,
            stage = %session.stage,
            "session started"
        );
        Ok(session)
    }

    pub fn with_effects(mut self, effects: Arc<dyn TransitionEffects>) -> Self {
        self.effects = effects;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn theme(&self) -> &ExamTheme {
        &self.theme
    }

    /// The selected (or preselected) version key.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn current_part(&self) -> Option<PartKind> {
        self.stage.part()
    }

    /// Whether the part on screen has its answers revealed.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Content of the selected version.
    pub fn content(&self) -> Result<&ExamContent, ExamError> {
        active_content(&self.theme, self.version.as_deref())
    }

    fn not_playing(&self, action: &'static str) -> ExamError {
        ExamError::NotPlaying {
            action,
            stage: self.stage,
        }
    }

    fn require_part(&self, action: &'static str) -> Result<PartKind, ExamError> {
        self.stage.part().ok_or_else(|| self.not_playing(action))
    }

    fn transition(&mut self, stage: Stage) {
        tracing::debug!(session = %self.id, from = %self.stage, to = %stage, "transition");
        self.stage = stage;
        self.revealed = false;
        self.effects.scroll_to_top();
        self.effects.on_stage_changed(&stage);
    }

    // -----------------------------------------------------------------------
    // Version selection
    // -----------------------------------------------------------------------

    /// Pick a version on the picker.
    ///
    /// Choosing a different version than the one in play discards all answers
    /// and starts at Teil 1. Re-choosing the current version after reopening
    /// the picker returns to where the user left off.
    pub fn choose_version(&mut self, key: &str) -> Result<(), ExamError> {
        if self.stage != Stage::ChoosingVersion {
            return Err(self.not_playing("choose a version"));
        }
        if !self.theme.versions.contains_key(key) {
            return Err(ExamError::UnknownVersion(key.to_string()));
        }

        let resume = self.resume.take();
        let target = match resume {
            Some(part) if self.version.as_deref() == Some(key) => part,
            _ => {
                self.sheets.clear_all();
                PartKind::Teil1
            }
        };
        self.version = Some(key.to_string());
        tracing::debug!(session = %self.id, version = key, "version chosen");
        self.transition(Stage::Part(target));
        Ok(())
    }

    /// Reopen the picker from a part (the version badge).
    ///
    /// Returns `false` for themes without a choice to make.
    pub fn reopen_version_picker(&mut self) -> Result<bool, ExamError> {
        let part = self.require_part("change the version")?;
        if !self.theme.requires_version_choice() {
            return Ok(false);
        }
        self.resume = Some(part);
        self.transition(Stage::ChoosingVersion);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Advance one part, or to the results after the last part.
    pub fn next(&mut self) -> Result<Stage, ExamError> {
        let part = self.require_part("go to the next part")?;
        let stage = match PartKind::from_index(part.index() + 1) {
            Some(next) => Stage::Part(next),
            None => Stage::Results,
        };
        self.transition(stage);
        Ok(stage)
    }

    /// Go back one part. A no-op on the first part.
    pub fn back(&mut self) -> Result<Stage, ExamError> {
        let part = self.require_part("go back")?;
        if part.is_first() {
            return Ok(self.stage);
        }
        let stage = Stage::Part(PartKind::ORDER[part.index() - 1]);
        self.transition(stage);
        Ok(stage)
    }

    /// Jump straight to any part. Completion of earlier parts is not required.
    pub fn jump_to(&mut self, part: PartKind) -> Result<(), ExamError> {
        self.require_part("jump to a part")?;
        self.transition(Stage::Part(part));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reveal
    // -----------------------------------------------------------------------

    /// Show or hide the answers of the current part. Returns the new state.
    pub fn toggle_reveal(&mut self) -> Result<bool, ExamError> {
        let part = self.require_part("reveal answers")?;
        self.revealed = !self.revealed;
        tracing::debug!(session = %self.id, %part, revealed = self.revealed, "reveal toggled");
        Ok(self.revealed)
    }

    pub fn reveal(&mut self) -> Result<(), ExamError> {
        if !self.revealed {
            self.toggle_reveal()?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Answers
    // -----------------------------------------------------------------------

    /// Whether writes to `part` are currently ignored.
    fn is_locked(&self, part: PartKind) -> bool {
        match self.stage {
            Stage::Part(current) => self.revealed && current == part,
            _ => true,
        }
    }

    /// Generic view on any part's answer sheet.
    ///
    /// Views are read-only outside the part stages and on the revealed part.
    fn view<K: ?Sized>(
        &mut self,
        part: PartKind,
        select: impl FnOnce(&ExamContent) -> &K,
    ) -> Result<PartView<'_, K>, ExamError>
    where
        K: answers::AnswerKey,
    {
        let locked = self.is_locked(part);
        let content = active_content(&self.theme, self.version.as_deref())?;
        Ok(PartView::new(select(content), self.sheets.get_mut(part), locked))
    }

    pub fn headline_matching(&mut self) -> Result<HeadlineMatching<'_>, ExamError> {
        self.view(PartKind::Teil1, |c| &c.teil1)
    }

    pub fn multiple_choice(&mut self) -> Result<MultipleChoice<'_>, ExamError> {
        self.view(PartKind::Teil2, |c| &c.teil2)
    }

    pub fn ad_matching(&mut self) -> Result<AdMatching<'_>, ExamError> {
        self.view(PartKind::Teil3, |c| &c.teil3)
    }

    /// Cloze view for a Sprachbausteine part, `None` for any other part.
    pub fn cloze(&mut self, part: PartKind) -> Result<Option<Cloze<'_>>, ExamError> {
        match part {
            PartKind::Sprachbausteine1 => self.view(part, |c| &c.sprachbausteine1).map(Some),
            PartKind::Sprachbausteine2 => self.view(part, |c| &c.sprachbausteine2).map(Some),
            _ => Ok(None),
        }
    }

    /// Record an answer for an item of `part`.
    ///
    /// Returns `false` when the write is ignored because the part is revealed.
    pub fn set_answer(
        &mut self,
        part: PartKind,
        item: ItemId,
        value: &str,
    ) -> Result<bool, ExamError> {
        self.require_part("answer")?;
        let locked = self.is_locked(part);
        let content = active_content(&self.theme, self.version.as_deref())?;
        let mut view = PartView::new(content.answer_key(part), self.sheets.get_mut(part), locked);
        Ok(view.set_answer(item, value))
    }

    pub fn clear_answer(&mut self, part: PartKind, item: ItemId) -> Result<bool, ExamError> {
        self.set_answer(part, item, "")
    }

    pub fn answers(&self, part: PartKind) -> &AnswerSheet {
        self.sheets.get(part)
    }

    pub fn sheets(&self) -> &PartSheets {
        &self.sheets
    }

    /// Grade one item. A pure read; the UI only shows it once revealed.
    pub fn is_correct(&self, part: PartKind, item: ItemId) -> Result<bool, ExamError> {
        let key = self.content()?.answer_key(part);
        Ok(answers::is_correct(key, self.sheets.get(part), item))
    }

    /// Feedback for the current part, available only while it is revealed.
    pub fn feedback(&self) -> Result<Option<Vec<ItemFeedback>>, ExamError> {
        let part = self.require_part("show feedback")?;
        if !self.revealed {
            return Ok(None);
        }
        let key = self.content()?.answer_key(part);
        Ok(Some(answers::feedback(key, self.sheets.get(part))))
    }

    // -----------------------------------------------------------------------
    // Results, retry, exit
    // -----------------------------------------------------------------------

    /// Score the current answers. Recomputed on every call.
    pub fn score(&self) -> Result<ScoreCard, ExamError> {
        Ok(ScoreCard::compute(self.content()?, &self.sheets))
    }

    /// Start over: clear every answer and return to the beginning.
    ///
    /// Multi-version themes go back to the picker with the current version
    /// preselected. Calling this twice has the same effect as calling it once.
    pub fn retry(&mut self) {
        self.sheets.clear_all();
        self.resume = None;
        let stage = if self.theme.requires_version_choice() {
            Stage::ChoosingVersion
        } else {
            Stage::Part(PartKind::Teil1)
        };
        tracing::debug!(session = %self.id, "retry");
        self.transition(stage);
    }

    /// Where to hand control back to when the user leaves.
    pub fn exit(&self) -> ExitTarget {
        ExitTarget::new(self.level)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            level: self.level,
            theme_id: self.theme.id.clone(),
            version: self.version.clone(),
            stage: self.stage,
            revealed: self.revealed,
            answers: self.sheets.clone(),
        }
    }
}
