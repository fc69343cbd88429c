//! Attempt history with JSON persistence.
//!
//! The session never writes history itself; a front end hands finished
//! attempts to a [`ScoreSink`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Level;
use crate::scoring::ScoreCard;
use crate::session::Session;
use crate::traits::ScoreSink;

/// One finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub level: Level,
    pub theme_id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub score: ScoreCard,
}

impl AttemptRecord {
    pub fn new(
        level: Level,
        theme_id: impl Into<String>,
        version: Option<String>,
        score: ScoreCard,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: None,
            level,
            theme_id: theme_id.into(),
            version,
            score,
        }
    }

    /// Capture the current score of a session.
    pub fn from_session(session: &Session) -> Result<Self> {
        let score = session.score()?;
        Ok(Self::new(
            session.level(),
            session.theme().id.clone(),
            session.version().map(str::to_string),
            score,
        ))
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// All recorded attempts, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptHistory {
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

impl AttemptHistory {
    /// Save the history as JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize history")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        Ok(())
    }

    /// Load a history file. A missing file is an empty history.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history from {}", path.display()))?;
        let history: AttemptHistory =
            serde_json::from_str(&content).context("failed to parse history JSON")?;
        Ok(history)
    }

    pub fn push(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    /// Load, append one record and save again.
    pub fn append(path: &Path, record: AttemptRecord) -> Result<()> {
        let mut history = Self::load_json(path)?;
        history.push(record);
        history.save_json(path)
    }

    /// Attempts of one user, or of everyone when `user` is `None`.
    pub fn for_user<'a>(&'a self, user: Option<&'a str>) -> impl Iterator<Item = &'a AttemptRecord> {
        self.attempts
            .iter()
            .filter(move |a| user.is_none() || a.user_id.as_deref() == user)
    }

    /// Best percentage reached on a theme.
    pub fn best(&self, level: Level, theme_id: &str) -> Option<u32> {
        self.attempts
            .iter()
            .filter(|a| a.level == level && a.theme_id == theme_id)
            .map(|a| a.score.percent)
            .max()
    }
}

/// A [`ScoreSink`] appending to a JSON history file.
#[derive(Debug, Clone)]
pub struct JsonHistorySink {
    path: PathBuf,
}

impl JsonHistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSink for JsonHistorySink {
    fn record(&self, attempt: &AttemptRecord) -> Result<()> {
        AttemptHistory::append(&self.path, attempt.clone())?;
        tracing::info!(
            attempt = %attempt.id,
            theme = %attempt.theme_id,
            percent = attempt.score.percent,
            path = %self.path.display(),
            "attempt recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PartKind;
    use crate::testutil::single_theme;

    fn record(theme: &str, percent: u32, user: Option<&str>) -> AttemptRecord {
        let mut score = ScoreCard::from_parts(vec![]);
        score.percent = percent;
        score.passed = percent >= 60;
        AttemptRecord::new(Level::B1, theme, None, score).with_user(user.map(str::to_string))
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = AttemptHistory::load_json(&dir.path().join("none.json")).unwrap();
        assert!(history.attempts.is_empty());
    }

    #[test]
    fn append_creates_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        AttemptHistory::append(&path, record("alicia", 40, Some("u1"))).unwrap();
        AttemptHistory::append(&path, record("alicia", 80, Some("u2"))).unwrap();

        let history = AttemptHistory::load_json(&path).unwrap();
        assert_eq!(history.attempts.len(), 2);
        assert_eq!(history.best(Level::B1, "alicia"), Some(80));
        assert_eq!(history.best(Level::B2, "alicia"), None);
        assert_eq!(history.for_user(Some("u1")).count(), 1);
        assert_eq!(history.for_user(None).count(), 2);
    }

    #[test]
    fn sink_writes_session_score() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonHistorySink::new(dir.path().join("history.json"));

        let mut session = Session::start(Level::B1, single_theme()).unwrap();
        session.set_answer(PartKind::Teil1, 1, "c").unwrap();
        let attempt = AttemptRecord::from_session(&session)
            .unwrap()
            .with_user(Some("anna".into()));
        sink.record(&attempt).unwrap();

        let history = AttemptHistory::load_json(sink.path()).unwrap();
        assert_eq!(history.attempts, vec![attempt]);
        assert_eq!(history.attempts[0].theme_id, "alicia");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(AttemptHistory::load_json(&path).is_err());
    }
}
