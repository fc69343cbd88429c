//! Theme and version resolution.
//!
//! The resolver fetches the content document from a [`ContentSource`],
//! resolves a level/theme pair and starts a [`Session`] on it. Every
//! failure comes back as a [`LoadOutcome`] terminal state rather than an
//! error the caller has to classify.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::library::ExamLibrary;
use crate::model::{ExamTheme, Level};
use crate::session::Session;
use crate::traits::ContentSource;
use crate::validate::ValidationIssue;

/// A version as shown on the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionOption {
    pub key: String,
    pub label: String,
    pub title: String,
}

/// Whether the user has to pick a version before playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionChoice {
    /// Nothing to choose; play `version` (or the fallback content when `None`).
    Single { version: Option<String> },
    /// Several versions, in display order, with one preselected.
    Choose {
        options: Vec<VersionOption>,
        preselected: Option<String>,
    },
}

impl VersionChoice {
    pub fn for_theme(theme: &ExamTheme) -> Self {
        if theme.requires_version_choice() {
            VersionChoice::Choose {
                options: theme
                    .selectable_versions()
                    .into_iter()
                    .map(|v| VersionOption {
                        key: v.key.clone(),
                        label: v.label.clone(),
                        title: v.title.clone(),
                    })
                    .collect(),
                preselected: theme.preselected_version(),
            }
        } else {
            VersionChoice::Single {
                version: theme.preselected_version(),
            }
        }
    }
}

/// Result of opening an exam.
#[derive(Debug)]
pub enum LoadOutcome {
    /// A session is ready (possibly on the version picker).
    Ready(Session),
    /// The level/theme pair does not exist.
    NotFound { level: Level, theme: String },
    /// The theme exists but its content is malformed.
    Invalid {
        theme: String,
        issues: Vec<ValidationIssue>,
    },
    /// The document could not be fetched or parsed.
    Failed { message: String, retryable: bool },
}

impl LoadOutcome {
    fn from_error(error: ExamError) -> Self {
        match error {
            ExamError::NotFound { level, theme } => LoadOutcome::NotFound { level, theme },
            ExamError::Validation { theme, issues } => LoadOutcome::Invalid { theme, issues },
            other => LoadOutcome::Failed {
                retryable: other.is_retryable(),
                message: other.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }
}

/// Loads themes from a content source.
pub struct ThemeResolver {
    source: Arc<dyn ContentSource>,
}

impl ThemeResolver {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and parse the whole document. There is no retry loop.
    ///
    /// A failure the source reports as permanent, or a document that does
    /// not parse, is not offered for retry.
    pub async fn load_library(&self) -> Result<ExamLibrary, ExamError> {
        tracing::debug!(source = self.source.name(), "fetching content document");
        let json = self
            .source
            .fetch()
            .await
            .map_err(|e| ExamError::Load {
                message: format!("{e:#}"),
                retryable: !self.source.is_permanent(&e),
            })?;
        let library = ExamLibrary::from_json(&json)?;
        tracing::info!(
            source = self.source.name(),
            themes = library.theme_count(),
            "content document loaded"
        );
        Ok(library)
    }

    /// Fetch the document and resolve one theme.
    pub async fn resolve(&self, level: Level, theme: &str) -> Result<ExamTheme, ExamError> {
        let library = self.load_library().await?;
        let resolved = library.resolve(level, theme)?;
        tracing::info!(
            %level,
            theme,
            versions = resolved.selectable_versions().len(),
            "theme resolved"
        );
        Ok(resolved)
    }

    /// Resolve a theme and start a session on it.
    pub async fn open(&self, level: Level, theme: &str) -> LoadOutcome {
        let result = match self.resolve(level, theme).await {
            Ok(resolved) => Session::start(level, resolved),
            Err(e) => Err(e),
        };
        match result {
            Ok(session) => LoadOutcome::Ready(session),
            Err(e) => {
                tracing::warn!(%level, theme, error = %e, "exam could not be opened");
                LoadOutcome::from_error(e)
            }
        }
    }
}
