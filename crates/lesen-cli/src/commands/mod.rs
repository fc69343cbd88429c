//! Subcommand implementations and the plumbing they share.

pub mod history;
pub mod init;
pub mod play;
pub mod score;
pub mod themes;
pub mod validate;

use std::sync::Arc;

use anyhow::{bail, Result};

use lesen_core::answers::NO_MATCH;
use lesen_core::model::{BlankInput, ClozeContent, ExamContent, ItemId};
use lesen_core::resolver::{LoadOutcome, ThemeResolver, VersionChoice};
use lesen_core::session::{Session, Stage};
use lesen_core::traits::ContentSource;
use lesen_core::{Level, PartKind};
use lesen_sources::config::load_config_from;
use lesen_sources::{create_source, FileSource, LesenConfig};

use crate::SourceArgs;

/// Load the config and build a resolver on the chosen content source.
///
/// `--content` wins over the configured source.
pub fn open_resolver(args: &SourceArgs) -> Result<(LesenConfig, ThemeResolver)> {
    let config = load_config_from(args.config.as_deref())?;
    let source: Arc<dyn ContentSource> = match &args.content {
        Some(path) => Arc::new(FileSource::new(path)),
        None => create_source(&config.source)?,
    };
    tracing::debug!(source = source.name(), "content source ready");
    Ok((config, ThemeResolver::new(source)))
}

/// Open a theme, turning every terminal load state into an error message.
pub async fn open_session(resolver: &ThemeResolver, level: Level, theme: &str) -> Result<Session> {
    match resolver.open(level, theme).await {
        LoadOutcome::Ready(session) => Ok(session),
        LoadOutcome::NotFound { level, theme } => {
            bail!("no {level} theme named '{theme}' (run `lesen themes --level {level}`)")
        }
        LoadOutcome::Invalid { theme, issues } => {
            for issue in &issues {
                eprintln!("  {issue}");
            }
            bail!("theme '{theme}' is malformed ({} issue(s))", issues.len())
        }
        LoadOutcome::Failed { message, retryable } => {
            if retryable {
                bail!("{message} (check the source and try again)")
            }
            bail!("{message}")
        }
    }
}

/// Settle the version before answering.
///
/// With `requested` set, that version is played (reopening the picker if a
/// different one is active). Without it, a pending picker takes the
/// preselected version.
pub fn settle_version(session: &mut Session, requested: Option<&str>) -> Result<()> {
    match requested {
        Some(key) if session.stage() == Stage::ChoosingVersion => session.choose_version(key)?,
        Some(key) if session.version() != Some(key) => {
            if !session.reopen_version_picker()? {
                bail!("theme '{}' has no version '{key}'", session.theme().id);
            }
            session.choose_version(key)?;
        }
        Some(_) => {}
        None => {
            if session.stage() != Stage::ChoosingVersion {
                return Ok(());
            }
            let VersionChoice::Choose {
                preselected: Some(key),
                ..
            } = VersionChoice::for_theme(session.theme())
            else {
                bail!("theme '{}' needs a version (use --version)", session.theme().id);
            };
            session.choose_version(&key)?;
        }
    }
    Ok(())
}

/// Check an answer against what the part can take and return its canonical
/// spelling (option ids and words matched case-insensitively).
pub fn canonical_answer(
    content: &ExamContent,
    part: PartKind,
    item: ItemId,
    value: &str,
) -> std::result::Result<String, String> {
    let value = value.trim();
    let (items, choices): (Vec<ItemId>, Option<Vec<&str>>) = match part {
        PartKind::Teil1 => (
            content.teil1.texts.iter().map(|t| t.id).collect(),
            Some(content.teil1.headlines.iter().map(|h| h.id.as_str()).collect()),
        ),
        PartKind::Teil2 => (
            content.teil2.questions.iter().map(|q| q.id).collect(),
            content
                .teil2
                .questions
                .iter()
                .find(|q| q.id == item)
                .map(|q| q.options.iter().map(|o| o.id.as_str()).collect()),
        ),
        PartKind::Teil3 => (
            content.teil3.situations.iter().map(|s| s.id).collect(),
            Some(
                content
                    .teil3
                    .ads
                    .iter()
                    .map(|a| a.id.as_str())
                    .chain(std::iter::once(NO_MATCH))
                    .collect(),
            ),
        ),
        PartKind::Sprachbausteine1 => cloze_choices(&content.sprachbausteine1, item),
        PartKind::Sprachbausteine2 => cloze_choices(&content.sprachbausteine2, item),
    };

    if !items.contains(&item) {
        return Err(format!("{part} has no item {item}"));
    }
    let Some(choices) = choices else {
        return Ok(value.to_string());
    };
    let lowered = value.to_lowercase();
    choices
        .iter()
        .find(|c| c.to_lowercase() == lowered)
        .map(|c| c.to_string())
        .ok_or_else(|| format!("'{value}' is not one of: {}", choices.join(", ")))
}

fn cloze_choices(content: &ClozeContent, item: ItemId) -> (Vec<ItemId>, Option<Vec<&str>>) {
    let choices = match content.input_for(item) {
        BlankInput::Choice(options) => Some(options.iter().map(String::as_str).collect()),
        BlankInput::FreeText => None,
    };
    (content.blank_ids_in_text(), choices)
}
