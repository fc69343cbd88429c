//! The `lesen themes` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use lesen_core::history::AttemptHistory;
use lesen_core::Level;

use super::open_resolver;
use crate::SourceArgs;

pub async fn execute(level: Option<Level>, source: SourceArgs) -> Result<()> {
    let (config, resolver) = open_resolver(&source)?;
    let library = resolver.load_library().await?;
    let history = AttemptHistory::load_json(&config.history_file).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable history");
        AttemptHistory::default()
    });

    let levels = match level {
        Some(level) => vec![level],
        None => library.levels(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Level", "Theme", "Title", "Versions", "Best"]);
    let mut rows = 0;
    for level in levels {
        for theme in library.themes(level) {
            let versions = match theme.versions {
                0 => "-".to_string(),
                n => n.to_string(),
            };
            let best = history
                .best(level, &theme.key)
                .map(|p| format!("{p}%"))
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                Cell::new(level),
                Cell::new(&theme.key),
                Cell::new(&theme.title),
                Cell::new(versions),
                Cell::new(best),
            ]);
            rows += 1;
        }
    }

    if rows == 0 {
        println!("No themes found.");
    } else {
        println!("{table}");
    }
    Ok(())
}
