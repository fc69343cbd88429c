//! The `lesen history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use lesen_core::history::AttemptHistory;
use lesen_sources::config::load_config_from;

pub fn execute(
    user: Option<String>,
    theme: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = AttemptHistory::load_json(&config.history_file)?;

    let attempts: Vec<_> = history
        .for_user(user.as_deref())
        .filter(|a| theme.as_deref().map_or(true, |t| a.theme_id == t))
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&attempts)?);
        return Ok(());
    }

    if attempts.is_empty() {
        println!("No attempts recorded in {}.", config.history_file.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "User", "Level", "Theme", "Version", "Score", "Result",
    ]);
    for attempt in &attempts {
        let verdict = if attempt.score.passed {
            "Bestanden"
        } else {
            "Nicht bestanden"
        };
        table.add_row(vec![
            Cell::new(attempt.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(attempt.user_id.as_deref().unwrap_or("-")),
            Cell::new(attempt.level),
            Cell::new(&attempt.theme_id),
            Cell::new(attempt.version.as_deref().unwrap_or("-")),
            Cell::new(format!("{}%", attempt.score.percent)),
            Cell::new(verdict),
        ]);
    }
    println!("{table}");
    println!("{} attempt(s)", attempts.len());
    Ok(())
}
