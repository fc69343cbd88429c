//! In-memory content source for tests and demos.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use lesen_core::traits::ContentSource;

use crate::error::{is_permanent_error, SourceError};

/// Serves a fixed document, or fails every fetch.
pub struct StaticSource {
    body: Result<String, String>,
    call_count: AtomicU32,
}

impl StaticSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Ok(body.into()),
            call_count: AtomicU32::new(0),
        }
    }

    /// A source whose every fetch fails with a network error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            body: Err(message.into()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of fetches made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(message) => Err(SourceError::Network(message.clone()).into()),
        }
    }
    fn is_permanent(&self, error: &anyhow::Error) -> bool {
        is_permanent_error(error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lesen_core::resolver::{LoadOutcome, ThemeResolver};
    use lesen_core::session::Stage;
    use lesen_core::Level;

    use super::*;

    const DOCUMENT: &str = include_str!("../../../content/lesen.json");

    #[tokio::test]
    async fn resolver_opens_sample_theme() {
        let source = Arc::new(StaticSource::new(DOCUMENT));
        let resolver = ThemeResolver::new(source.clone());

        let outcome = resolver.open(Level::B1, "annika").await;
        let LoadOutcome::Ready(session) = outcome else {
            panic!("expected a ready session");
        };
        assert_eq!(session.stage(), Stage::ChoosingVersion);
        assert_eq!(session.version(), Some("1"));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_source() {
        let source = StaticSource::failing("offline");
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("offline"));
        assert_eq!(source.call_count(), 1);

        let resolver = ThemeResolver::new(Arc::new(source));
        assert!(matches!(
            resolver.open(Level::B1, "alicia").await,
            LoadOutcome::Failed {
                retryable: true,
                ..
            }
        ));
    }
}
