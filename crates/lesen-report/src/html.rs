//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use lesen_core::history::AttemptRecord;
use lesen_core::results::{PartBar, ResultsSummary};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the results page of one attempt.
pub fn generate_html(record: &AttemptRecord) -> String {
    let summary = ResultsSummary::from_score(&record.score);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Lesen {}: {}</title>\n",
        record.level.to_string().to_uppercase(),
        html_escape(&record.theme_id)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Lesen results</h1>\n");
    let version = record
        .version
        .as_deref()
        .map(|v| format!(" | Version {}", html_escape(v)))
        .unwrap_or_default();
    let user = record
        .user_id
        .as_deref()
        .map(|u| format!(" | {}", html_escape(u)))
        .unwrap_or_default();
    html.push_str(&format!(
        "<p class=\"meta\">Level <strong>{}</strong> | Theme <strong>{}</strong>{}{} | {}</p>\n",
        record.level.to_string().to_uppercase(),
        html_escape(&record.theme_id),
        version,
        user,
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    let verdict_class = if summary.passed { "pass" } else { "fail" };
    html.push_str(&format!(
        "<section class=\"verdict {verdict_class}\">\n<p class=\"percent\">{}%</p>\n<p class=\"label\">{}</p>\n<p>{}</p>\n</section>\n",
        summary.percent,
        summary.verdict(),
        html_escape(&summary.points_line())
    ));

    html.push_str("<section class=\"breakdown\">\n");
    html.push_str("<h2>Per part</h2>\n");
    if !summary.bars.is_empty() {
        html.push_str(&generate_bar_chart(&summary.bars));
    }

    html.push_str("<table>\n");
    html.push_str(
        "<thead><tr><th>Part</th><th>Task</th><th>Correct</th><th>Points</th><th>%</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for part in &record.score.parts {
        let class = if part.passed() { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{} / {}</td><td>{}%</td></tr>\n",
            part.part.full_label(),
            part.part.description(),
            part.correct,
            part.total,
            part.earned(),
            part.max_points(),
            part.percent()
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(record)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the results page to a file.
pub fn write_html_report(record: &AttemptRecord, path: &Path) -> Result<()> {
    let html = generate_html(record);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bars, one per part, green when the part alone would pass.
fn generate_bar_chart(bars: &[PartBar]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, bar) in bars.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = bar.percent as usize * max_width / 100;
        let color = if bar.passed { "#22c55e" } else { "#ef4444" };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&bar.label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{label_width}\" y=\"{y}\" width=\"{max_width}\" height=\"{bar_height}\" fill=\"var(--border)\" rx=\"4\"/>\n"
        ));
        svg.push_str(&format!(
            "  <rect x=\"{label_width}\" y=\"{y}\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{} ({}%)</text>\n",
            label_width + max_width + 8,
            y + bar_height / 2,
            bar.correct,
            bar.total,
            bar.percent
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 56rem; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.verdict { border-radius: 12px; padding: 1.5rem; text-align: center; }
.verdict .percent { font-size: 3rem; font-weight: bold; margin: 0; }
.verdict .label { font-size: 1.5rem; margin: 0.25rem 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
