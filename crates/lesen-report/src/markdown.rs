//! Markdown summary, suitable for pasting into an issue or a study log.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use lesen_core::history::AttemptRecord;
use lesen_core::results::ResultsSummary;

/// Generate a Markdown summary of one attempt.
pub fn generate_markdown(record: &AttemptRecord) -> String {
    let summary = ResultsSummary::from_score(&record.score);
    let mut md = String::new();

    let _ = writeln!(
        md,
        "# Lesen {}: {}",
        record.level.to_string().to_uppercase(),
        record.theme_id
    );
    md.push('\n');
    if let Some(version) = &record.version {
        let _ = writeln!(md, "- Version: {version}");
    }
    if let Some(user) = &record.user_id {
        let _ = writeln!(md, "- User: {user}");
    }
    let _ = writeln!(
        md,
        "- Date: {}",
        record.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    md.push('\n');

    let _ = writeln!(md, "**{}% {}**", summary.percent, summary.verdict());
    md.push('\n');
    let _ = writeln!(md, "{}", summary.points_line());
    md.push('\n');

    md.push_str("| Part | Correct | Points | % |\n");
    md.push_str("|------|---------|--------|---|\n");
    for part in &record.score.parts {
        let mark = if part.passed() { "" } else { " ✗" };
        let _ = writeln!(
            md,
            "| {} | {}/{} | {} / {} | {}%{} |",
            part.part.full_label(),
            part.correct,
            part.total,
            part.earned(),
            part.max_points(),
            part.percent(),
            mark
        );
    }
    md
}

/// Write the Markdown summary to a file.
pub fn write_markdown_report(record: &AttemptRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(record))
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
