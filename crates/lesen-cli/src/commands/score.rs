//! The `lesen score` command: grade an answer file without playing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use lesen_core::answers::AnswerSheet;
use lesen_core::history::{AttemptRecord, JsonHistorySink};
use lesen_core::results::{ResultsController, ResultsSummary};
use lesen_core::session::Session;
use lesen_core::traits::ScoreSink;
use lesen_core::{Level, PartKind};
use lesen_report::{generate_html, generate_markdown};

use super::{canonical_answer, open_resolver, open_session, settle_version};
use crate::render;
use crate::SourceArgs;

#[derive(Serialize)]
struct ScoreOutput<'a> {
    attempt: &'a AttemptRecord,
    summary: &'a ResultsSummary,
}

/// Read an answer file keyed by part (`teil-1`, `sb1`, ...).
fn load_answers(path: &Path) -> Result<Vec<(PartKind, AnswerSheet)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    let raw: BTreeMap<String, AnswerSheet> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))?;
    raw.into_iter()
        .map(|(key, sheet)| -> Result<(PartKind, AnswerSheet)> {
            let part = key.parse::<PartKind>().map_err(anyhow::Error::msg)?;
            Ok((part, sheet))
        })
        .collect()
}

/// Enter every answer through the session and move on to the results.
fn fill(session: &mut Session, answers: &[(PartKind, AnswerSheet)]) -> Result<()> {
    for (part, sheet) in answers {
        session.jump_to(*part)?;
        for (item, value) in sheet.iter() {
            let value = canonical_answer(session.content()?, *part, item, value)
                .map_err(|e| anyhow::anyhow!("{part} item {item}: {e}"))?;
            session.set_answer(*part, item, &value)?;
        }
    }
    session.jump_to(PartKind::Teil3)?;
    session.next()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    theme: String,
    answers_path: PathBuf,
    level: Option<Level>,
    version: Option<String>,
    format: String,
    output: Option<PathBuf>,
    record: bool,
    user: Option<String>,
    source: SourceArgs,
) -> Result<()> {
    let (config, resolver) = open_resolver(&source)?;
    let level = level.unwrap_or(config.default_level);
    let answers = load_answers(&answers_path)?;

    let mut session = open_session(&resolver, level, &theme).await?;
    settle_version(&mut session, version.as_deref())?;
    fill(&mut session, &answers)?;

    let attempt = AttemptRecord::from_session(&session)?.with_user(user.or(config.user_id));
    let results = ResultsController::open(&mut session)?;
    let summary = results.summary().clone();

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&ScoreOutput {
            attempt: &attempt,
            summary: &summary,
        })?,
        "html" => generate_html(&attempt),
        "markdown" | "md" => generate_markdown(&attempt),
        "text" => {
            let mut text = Vec::new();
            render::results_header(&mut text, &summary)?;
            format!(
                "{}{}",
                String::from_utf8_lossy(&text),
                render::score_table(&attempt.score)
            )
        }
        other => anyhow::bail!("unknown format: {other} (expected text, json, html, markdown)"),
    };

    match &output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if record {
        JsonHistorySink::new(&config.history_file).record(&attempt)?;
        eprintln!("Attempt recorded in {}", config.history_file.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_file_keys_are_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{ "teil-1": { "1": "b" }, "sb2": { "31": "Wohnung" } }"#).unwrap();

        let answers = load_answers(&path).unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers
            .iter()
            .any(|(part, sheet)| *part == PartKind::Sprachbausteine2 && sheet.get(31) == Some("Wohnung")));
    }

    #[test]
    fn unknown_part_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{ "teil-9": { "1": "b" } }"#).unwrap();

        let err = load_answers(&path).unwrap_err();
        assert!(err.to_string().contains("unknown part"));
    }
}
