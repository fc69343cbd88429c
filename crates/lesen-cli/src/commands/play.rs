//! The `lesen play` command: an interactive exam on stdin/stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;

use lesen_core::history::{AttemptRecord, JsonHistorySink};
use lesen_core::model::ItemId;
use lesen_core::results::ResultsController;
use lesen_core::session::{Session, Stage};
use lesen_core::traits::{ScoreSink, TransitionEffects};
use lesen_core::{Level, PartKind};
use lesen_report::html::write_html_report;

use super::{canonical_answer, open_resolver, open_session, settle_version};
use crate::render;
use crate::SourceArgs;

const HELP: &str = "\
Commands:
  show                 redraw the current screen
  next | n             go to the next part (or the results after Teil 3)
  back | b             go to the previous part
  jump <part>          jump to a part (teil-1, sb1, sb2, teil-2, teil-3)
  set <item> <answer>  answer an item of the current part
  clear <item>         remove an answer
  reveal | r           show or hide the answers of the current part
  version [key]        reopen the version picker, or pick a version
  score                show the score so far
  retry                clear all answers and start over
  exit | q             leave the exam";

/// Separates screens on stderr, keeping stdout for the screens themselves.
struct ConsoleEffects;

impl TransitionEffects for ConsoleEffects {
    fn scroll_to_top(&self) {
        eprintln!("{}", "-".repeat(60));
    }

    fn on_stage_changed(&self, stage: &Stage) {
        tracing::debug!(%stage, "screen changed");
    }
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Show,
    Next,
    Back,
    Jump(PartKind),
    Set(ItemId, String),
    Clear(ItemId),
    Reveal,
    Version(Option<String>),
    Score,
    Retry,
    Exit,
}

fn parse_item(s: &str) -> Result<ItemId, String> {
    s.parse()
        .map_err(|_| format!("'{s}' is not an item number"))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, rest)) = words.split_first() else {
            return Err("empty command".to_string());
        };
        let command = match (name.to_lowercase().as_str(), rest) {
            ("help" | "?", []) => Command::Help,
            ("show", []) => Command::Show,
            ("next" | "n", []) => Command::Next,
            ("back" | "b", []) => Command::Back,
            ("jump", [part]) => Command::Jump(part.parse()?),
            ("set", [item, value @ ..]) if !value.is_empty() => {
                Command::Set(parse_item(item)?, value.join(" "))
            }
            ("clear", [item]) => Command::Clear(parse_item(item)?),
            ("reveal" | "r", []) => Command::Reveal,
            ("version", []) => Command::Version(None),
            ("version", [key]) => Command::Version(Some(key.to_string())),
            ("score", []) => Command::Score,
            ("retry", []) => Command::Retry,
            ("exit" | "quit" | "q", []) => Command::Exit,
            _ => return Err(format!("unknown command: {line} (type `help`)")),
        };
        Ok(command)
    }
}

/// What to do after a command.
enum Flow {
    Redraw,
    Quiet,
    Exit,
}

/// Drives a session from line-oriented input.
struct Player {
    session: Session,
    user: Option<String>,
    sink: Option<Box<dyn ScoreSink>>,
    html: Option<PathBuf>,
}

impl Player {
    fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        render::screen(out, &self.session)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };

            let before = self.session.stage();
            match self.apply(command, out) {
                Ok(Flow::Exit) => return Ok(()),
                Ok(Flow::Quiet) => {}
                Ok(Flow::Redraw) => {
                    if before != Stage::Results && self.session.stage() == Stage::Results {
                        self.finish(out)?;
                    } else {
                        render::screen(out, &self.session)?;
                    }
                }
                Err(e) => writeln!(out, "{e:#}")?,
            }
        }

        writeln!(out, "Back to {}", self.session.exit())?;
        Ok(())
    }

    fn apply(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(Flow::Quiet);
            }
            Command::Show => {}
            Command::Next => {
                self.session.next()?;
            }
            Command::Back => {
                self.session.back()?;
            }
            Command::Jump(part) => self.session.jump_to(part)?,
            Command::Set(item, value) => return self.answer(item, Some(&value), out),
            Command::Clear(item) => return self.answer(item, None, out),
            Command::Reveal => {
                self.session.toggle_reveal()?;
            }
            Command::Version(None) => {
                if !self.session.reopen_version_picker()? {
                    writeln!(out, "This theme has a single version.")?;
                    return Ok(Flow::Quiet);
                }
            }
            Command::Version(Some(key)) => settle_version(&mut self.session, Some(&key))?,
            Command::Score => {
                writeln!(out, "{}", render::score_table(&self.session.score()?))?;
                return Ok(Flow::Quiet);
            }
            Command::Retry => {
                if self.session.stage() == Stage::Results {
                    ResultsController::open(&mut self.session)?.retry();
                } else {
                    self.session.retry();
                }
            }
            Command::Exit => {
                let target = if self.session.stage() == Stage::Results {
                    ResultsController::open(&mut self.session)?.exit()
                } else {
                    self.session.exit()
                };
                writeln!(out, "Back to {target}")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Redraw)
    }

    fn answer(&mut self, item: ItemId, value: Option<&str>, out: &mut impl Write) -> Result<Flow> {
        let Some(part) = self.session.current_part() else {
            writeln!(out, "Answers can only be given on a part.")?;
            return Ok(Flow::Quiet);
        };

        let accepted = match value {
            Some(value) => {
                match canonical_answer(self.session.content()?, part, item, value) {
                    Ok(v) => v,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        return Ok(Flow::Quiet);
                    }
                }
            }
            None => String::new(),
        };

        if !self.session.set_answer(part, item, &accepted)? {
            writeln!(out, "Answers are locked while revealed (type `reveal` to hide them).")?;
        } else if accepted.is_empty() {
            writeln!(out, "{item}: cleared")?;
        } else {
            writeln!(out, "{item}: {accepted}")?;
        }
        Ok(Flow::Quiet)
    }

    /// Show the results and hand the attempt to the history and report writers.
    fn finish(&mut self, out: &mut impl Write) -> Result<()> {
        let record = AttemptRecord::from_session(&self.session)?.with_user(self.user.clone());
        {
            let results = ResultsController::open(&mut self.session)?;
            render::results(out, results.summary())?;
        }

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.record(&record) {
                tracing::warn!(error = %e, "attempt not recorded");
            }
        }
        if let Some(path) = &self.html {
            write_html_report(&record, path)?;
            writeln!(out, "HTML report: {}", path.display())?;
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    theme: String,
    level: Option<Level>,
    version: Option<String>,
    user: Option<String>,
    html: Option<PathBuf>,
    no_history: bool,
    source: SourceArgs,
) -> Result<()> {
    let (config, resolver) = open_resolver(&source)?;
    let level = level.unwrap_or(config.default_level);

    let mut session = open_session(&resolver, level, &theme)
        .await?
        .with_effects(Arc::new(ConsoleEffects));
    if version.is_some() {
        settle_version(&mut session, version.as_deref())?;
    }

    let sink: Option<Box<dyn ScoreSink>> = if no_history {
        None
    } else {
        Some(Box::new(JsonHistorySink::new(&config.history_file)))
    };

    let mut player = Player {
        session,
        user: user.or(config.user_id),
        sink,
        html,
    };

    let mut stdout = std::io::stdout().lock();
    player.run(std::io::stdin().lock(), &mut stdout)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;

    use lesen_core::library::ExamLibrary;

    use super::*;

    const CONTENT: &str = include_str!("../../../../content/lesen.json");

    #[derive(Clone, Default)]
    struct MemorySink(Arc<Mutex<Vec<AttemptRecord>>>);

    impl MemorySink {
        fn records(&self) -> Vec<AttemptRecord> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ScoreSink for MemorySink {
        fn record(&self, attempt: &AttemptRecord) -> Result<()> {
            self.0.lock().unwrap().push(attempt.clone());
            Ok(())
        }
    }

    fn player(theme: &str, sink: &MemorySink) -> Player {
        let library = ExamLibrary::from_json(CONTENT).unwrap();
        let theme = library.resolve(Level::B1, theme).unwrap();
        Player {
            session: Session::start(Level::B1, theme).unwrap(),
            user: Some("anna".into()),
            sink: Some(Box::new(sink.clone())),
            html: None,
        }
    }

    fn play(player: &mut Player, script: &str) -> String {
        let mut out = Vec::new();
        player.run(Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!("next".parse::<Command>(), Ok(Command::Next));
        assert_eq!(
            "set 31 neue Wohnung".parse::<Command>(),
            Ok(Command::Set(31, "neue Wohnung".into()))
        );
        assert_eq!(
            "JUMP sb2".parse::<Command>(),
            Ok(Command::Jump(PartKind::Sprachbausteine2))
        );
        assert_eq!(
            "version 2".parse::<Command>(),
            Ok(Command::Version(Some("2".into())))
        );
        assert!("set 1".parse::<Command>().is_err());
        assert!("set x b".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn scripted_exam_reaches_results() {
        let sink = MemorySink::default();
        let mut p = player("alicia", &sink);
        let output = play(
            &mut p,
            "set 1 b\nset 2 E\nnext\nset 21 leider\nnext\nnext\nnext\nnext\nexit\n",
        );

        assert!(output.contains("1: b"));
        assert!(output.contains("2: e"));
        assert!(output.contains("21: Leider"));
        // 2 × 5 + 1 × 1.5 = 11.5 of 77.5
        assert!(output.contains("Ergebnis: 15% Nicht bestanden"));
        assert!(output.contains("Back to /services/learn-german/themes?level=b1&module=lesen"));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].theme_id, "alicia");
        assert_eq!(records[0].user_id.as_deref(), Some("anna"));
    }

    #[test]
    fn reveal_locks_answers_until_hidden() {
        let sink = MemorySink::default();
        let mut p = player("alicia", &sink);
        let output = play(&mut p, "set 1 a\nreveal\nset 1 b\nreveal\nset 1 b\n");

        assert!(output.contains("✗ 1: a (correct: b)"));
        assert!(output.contains("Answers are locked while revealed"));
        assert_eq!(p.session.answers(PartKind::Teil1).get(1), Some("b"));
    }

    #[test]
    fn invalid_input_is_reported_and_ignored() {
        let sink = MemorySink::default();
        let mut p = player("alicia", &sink);
        let output = play(&mut p, "set 1 z\nset 99 a\nfly\n");

        assert!(output.contains("'z' is not one of"));
        assert!(output.contains("teil-1 has no item 99"));
        assert!(output.contains("unknown command: fly"));
        assert!(p.session.answers(PartKind::Teil1).is_empty());
    }

    #[test]
    fn version_picker_and_retry() {
        let sink = MemorySink::default();
        let mut p = player("annika", &sink);
        let output = play(
            &mut p,
            "next\nversion 2\nset 1 b\njump teil-3\nnext\nretry\n",
        );

        assert!(output.contains("Annika: choose a version"));
        assert!(output.contains("cannot go to the next part while choosing a version"));
        assert!(output.contains("(Version 2)"));
        assert_eq!(sink.records().len(), 1);
        assert_eq!(p.session.stage(), Stage::ChoosingVersion);
        assert!(p.session.sheets().is_empty());
    }
}
