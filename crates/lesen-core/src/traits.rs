//! Seams between the exam engine and its surroundings.
//!
//! `lesen-sources` implements [`ContentSource`]; front ends implement
//! [`TransitionEffects`]; [`ScoreSink`] receives finished attempts.

use std::sync::Arc;

use async_trait::async_trait;

use crate::history::AttemptRecord;
use crate::session::Stage;

// ---------------------------------------------------------------------------
// Content source trait
// ---------------------------------------------------------------------------

/// Anything that can produce the raw content document.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name (e.g. "file", "http").
    fn name(&self) -> &str;

    /// Fetch the complete content document as JSON text.
    async fn fetch(&self) -> anyhow::Result<String>;

    /// Whether `error`, returned by [`fetch`](Self::fetch), will come back
    /// on every retry.
    fn is_permanent(&self, _error: &anyhow::Error) -> bool {
        false
    }
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        (**self).fetch().await
    }

    fn is_permanent(&self, error: &anyhow::Error) -> bool {
        (**self).is_permanent(error)
    }
}

// ---------------------------------------------------------------------------
// Transition side effects
// ---------------------------------------------------------------------------

/// Presentation hooks fired on every stage transition.
///
/// The session calls these after its own state is updated; they must not fail.
pub trait TransitionEffects: Send + Sync {
    /// Bring the new screen into view from the top.
    fn scroll_to_top(&self);

    /// The session moved to `stage`.
    fn on_stage_changed(&self, _stage: &Stage) {}
}

/// Effects that do nothing. The default for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEffects;

impl TransitionEffects for NoopEffects {
    fn scroll_to_top(&self) {}
}

// ---------------------------------------------------------------------------
// Score sink
// ---------------------------------------------------------------------------

/// Destination for completed attempts.
pub trait ScoreSink: Send + Sync {
    fn record(&self, attempt: &AttemptRecord) -> anyhow::Result<()>;
}
