//! The `lesen init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("lesen.toml").exists() {
        println!("lesen.toml already exists, skipping.");
    } else {
        std::fs::write("lesen.toml", SAMPLE_CONFIG)?;
        println!("Created lesen.toml");
    }

    std::fs::create_dir_all("content")?;
    let content_path = Path::new("content/lesen.json");
    if content_path.exists() {
        println!("content/lesen.json already exists, skipping.");
    } else {
        std::fs::write(content_path, SAMPLE_CONTENT)?;
        println!("Created content/lesen.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: lesen validate");
    println!("  2. Run: lesen themes");
    println!("  3. Run: lesen play alicia");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lesen configuration

default_level = "b1"
history_file = "./lesen-results/history.json"
# user_id = "${USER}"

[source]
type = "file"
path = "content/lesen.json"

# Fetch the document from the site instead:
# [source]
# type = "http"
# base_url = "https://example.com"
# path = "/data/lesen.json"
# timeout_secs = 30
"#;

const SAMPLE_CONTENT: &str = include_str!("../../../../content/lesen.json");
