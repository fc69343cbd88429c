//! The `lesen validate` command.

use anyhow::Result;

use super::open_resolver;
use crate::SourceArgs;

pub async fn execute(source: SourceArgs) -> Result<()> {
    let (_config, resolver) = open_resolver(&source)?;
    let library = resolver.load_library().await?;

    for level in library.levels() {
        let themes = library.themes(level);
        println!("Level {level}: {} theme(s)", themes.len());
        for theme in &themes {
            println!("  {} ({})", theme.key, theme.title);
        }
    }

    let issues = library.validate();
    for (level, issue) in &issues {
        println!("  [{level}] ERROR: {issue}");
    }

    if issues.is_empty() {
        println!("All themes valid.");
        Ok(())
    } else {
        anyhow::bail!("{} issue(s) found", issues.len())
    }
}
