//! Plain-text rendering of exam screens.

use std::io::Write;

use anyhow::Result;
use comfy_table::{Cell, Table};

use lesen_core::answers::{AnswerSheet, ItemFeedback, NO_MATCH};
use lesen_core::model::{
    BlankInput, ClozeContent, Segment, Teil1Content, Teil2Content, Teil3Content,
};
use lesen_core::resolver::VersionChoice;
use lesen_core::results::ResultsSummary;
use lesen_core::scoring::ScoreCard;
use lesen_core::session::{Session, Stage};
use lesen_core::PartKind;

/// Render whatever the session is showing.
pub fn screen(out: &mut impl Write, session: &Session) -> Result<()> {
    match session.stage() {
        Stage::ChoosingVersion => picker(out, session),
        Stage::Part(part) => part_screen(out, session, part),
        Stage::Results => {
            let summary = ResultsSummary::from_score(&session.score()?);
            results(out, &summary)
        }
    }
}

fn picker(out: &mut impl Write, session: &Session) -> Result<()> {
    let theme = session.theme();
    writeln!(out, "{}: choose a version", theme.title)?;
    if let VersionChoice::Choose {
        options,
        preselected,
    } = VersionChoice::for_theme(theme)
    {
        for option in &options {
            let marker = if preselected.as_deref() == Some(option.key.as_str()) {
                "*"
            } else {
                " "
            };
            writeln!(
                out,
                " {marker} {}  {} ({})",
                option.key, option.title, option.label
            )?;
        }
    }
    writeln!(out, "Type `version <key>` to start.")?;
    Ok(())
}

fn part_screen(out: &mut impl Write, session: &Session, part: PartKind) -> Result<()> {
    let content = session.content()?;
    let sheet = session.answers(part);

    let badge = match session.version() {
        Some(key) => theme_version_label(session, key),
        None => String::new(),
    };
    writeln!(
        out,
        "{} · {}{}  [{}/5] {}: {}",
        session.level().to_string().to_uppercase(),
        session.theme().title,
        badge,
        part.index() + 1,
        part.full_label(),
        part.description()
    )?;

    match part {
        PartKind::Teil1 => teil1(out, &content.teil1, sheet)?,
        PartKind::Sprachbausteine1 => cloze(out, &content.sprachbausteine1, sheet)?,
        PartKind::Sprachbausteine2 => cloze(out, &content.sprachbausteine2, sheet)?,
        PartKind::Teil2 => teil2(out, &content.teil2, sheet)?,
        PartKind::Teil3 => teil3(out, &content.teil3, sheet)?,
    }

    match session.feedback()? {
        Some(items) => feedback(out, &items)?,
        None => writeln!(
            out,
            "\n{} of {} answered",
            sheet.answered_count(),
            content.answer_key(part).item_ids().len()
        )?,
    }
    Ok(())
}

fn theme_version_label(session: &Session, key: &str) -> String {
    session
        .theme()
        .versions
        .get(key)
        .map(|v| format!(" ({})", v.label))
        .unwrap_or_default()
}

fn answer_of(sheet: &AnswerSheet, item: u32) -> &str {
    sheet.get(item).unwrap_or("_")
}

fn teil1(out: &mut impl Write, content: &Teil1Content, sheet: &AnswerSheet) -> Result<()> {
    writeln!(out, "{}\n", content.instruction)?;
    for headline in &content.headlines {
        let used = sheet.holders_of(&headline.id);
        let hint = if used.is_empty() {
            String::new()
        } else {
            format!("  (used: {})", join_ids(&used))
        };
        writeln!(out, "  {}) {}{}", headline.id, headline.text, hint)?;
    }
    writeln!(out)?;
    for text in &content.texts {
        writeln!(out, "[{}] {}  -> {}", text.id, text.text, answer_of(sheet, text.id))?;
    }
    Ok(())
}

fn teil2(out: &mut impl Write, content: &Teil2Content, sheet: &AnswerSheet) -> Result<()> {
    writeln!(out, "{}\n", content.instruction)?;
    writeln!(out, "{}\n{}\n", content.passage.title, content.passage.text)?;
    for question in &content.questions {
        writeln!(out, "[{}] {}", question.id, question.prompt)?;
        let chosen = sheet.get(question.id);
        for option in &question.options {
            let mark = if chosen == Some(option.id.as_str()) {
                "x"
            } else {
                " "
            };
            writeln!(out, "    ({mark}) {}) {}", option.id, option.text)?;
        }
    }
    Ok(())
}

fn teil3(out: &mut impl Write, content: &Teil3Content, sheet: &AnswerSheet) -> Result<()> {
    if !content.instruction.is_empty() {
        writeln!(out, "{}\n", content.instruction)?;
    }
    for ad in &content.ads {
        writeln!(out, "  {}) {}", ad.id, ad.text)?;
    }
    writeln!(out, "  {NO_MATCH}) no ad fits\n")?;
    for situation in &content.situations {
        writeln!(
            out,
            "[{}] {}  -> {}",
            situation.id,
            situation.text,
            answer_of(sheet, situation.id)
        )?;
    }
    Ok(())
}

fn cloze(out: &mut impl Write, content: &ClozeContent, sheet: &AnswerSheet) -> Result<()> {
    if !content.title.is_empty() {
        writeln!(out, "{}", content.title)?;
    }
    writeln!(out, "{}\n", content.instruction)?;
    let mut text = String::new();
    for segment in &content.segments {
        match segment {
            Segment::Text(value) => text.push_str(value),
            Segment::Blank(id) => text.push_str(&format!("[{id}: {}]", answer_of(sheet, *id))),
        }
    }
    writeln!(out, "{text}\n")?;
    for id in content.blank_ids_in_text() {
        match content.input_for(id) {
            BlankInput::Choice(options) => writeln!(out, "  {id}: {}", options.join(" | "))?,
            BlankInput::FreeText => writeln!(out, "  {id}: (free text)")?,
        }
    }
    Ok(())
}

fn feedback(out: &mut impl Write, items: &[ItemFeedback]) -> Result<()> {
    let correct = items.iter().filter(|i| i.correct).count();
    writeln!(out, "\nAnswers ({correct}/{} correct):", items.len())?;
    for item in items {
        let given = item.given.as_deref().unwrap_or("-");
        if item.correct {
            writeln!(out, "  ✓ {}: {given}", item.item)?;
        } else {
            writeln!(
                out,
                "  ✗ {}: {given} (correct: {})",
                item.item,
                item.expected.as_deref().unwrap_or("?")
            )?;
        }
    }
    Ok(())
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Verdict and points line.
pub fn results_header(out: &mut impl Write, summary: &ResultsSummary) -> Result<()> {
    writeln!(out, "Ergebnis: {}% {}", summary.percent, summary.verdict())?;
    writeln!(out, "{}", summary.points_line())?;
    Ok(())
}

/// Render the results screen.
pub fn results(out: &mut impl Write, summary: &ResultsSummary) -> Result<()> {
    results_header(out, summary)?;
    for bar in &summary.bars {
        let filled = (bar.percent as usize * 20) / 100;
        writeln!(
            out,
            "  {:<7} {}{} {}/{} ({}%)",
            bar.label,
            "#".repeat(filled),
            ".".repeat(20 - filled),
            bar.correct,
            bar.total,
            bar.percent
        )?;
    }
    writeln!(out, "Type `retry` to start over or `exit` to leave.")?;
    Ok(())
}

/// Per-part score table.
pub fn score_table(card: &ScoreCard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Part", "Correct", "Points", "%"]);
    for part in &card.parts {
        table.add_row(vec![
            Cell::new(part.part.full_label()),
            Cell::new(format!("{}/{}", part.correct, part.total)),
            Cell::new(format!("{} / {}", part.earned(), part.max_points())),
            Cell::new(format!("{}%", part.percent())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(format!("{}/{}", card.correct(), card.total())),
        Cell::new(format!("{} / {}", card.earned, card.max_points)),
        Cell::new(format!("{}%", card.percent)),
    ]);
    table
}
