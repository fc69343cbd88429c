//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FULL_MARKS: &str = r#"{
    "teil-1": { "1": "b", "2": "e", "3": "h", "4": "g", "5": "d" },
    "sb1": { "21": "Leider", "22": "weil", "23": "wenn", "24": "Zeit", "25": "am" },
    "sb2": { "31": "Wohnung", "32": "balkon", "33": "Umzug", "34": "Auto", "35": "Abendessen" },
    "teil-2": { "6": "b", "7": "a", "8": "c", "9": "c", "10": "a" },
    "teil-3": { "11": "g", "12": "b", "13": "c", "14": "a", "15": "d" }
}"#;

fn content_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../content/lesen.json")
}

/// A `lesen` command isolated from the user's config and environment.
fn lesen(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lesen").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("LESEN_CONTENT_URL")
        .env_remove("LESEN_CONTENT_PATH")
        .env_remove("LESEN_USER")
        .current_dir(home.path());
    cmd
}

/// Write a config whose history lives inside `dir`.
fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("lesen.toml");
    let history = dir.path().join("history.json");
    std::fs::write(
        &path,
        format!(
            "history_file = {:?}\n\n[source]\ntype = \"file\"\npath = {:?}\n",
            history.display().to_string(),
            content_path().display().to_string()
        ),
    )
    .unwrap();
    path
}

#[test]
fn validate_sample_content() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("validate")
        .arg("--content")
        .arg(content_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Level b1: 2 theme(s)"))
        .stdout(predicate::str::contains("Level b2: 1 theme(s)"))
        .stdout(predicate::str::contains("All themes valid"));
}

#[test]
fn validate_reports_broken_theme() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{ "levels": { "b1": { "themes": {
            "empty": { "id": "empty", "title": "Empty", "lesen": { "parts": {} } }
        } } } }"#,
    )
    .unwrap();

    lesen(&home)
        .arg("validate")
        .arg("--content")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR"))
        .stderr(predicate::str::contains("issue(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("validate")
        .arg("--content")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn themes_lists_level() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("themes")
        .arg("--level")
        .arg("b1")
        .arg("--content")
        .arg(content_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("alicia"))
        .stdout(predicate::str::contains("Annika"))
        .stdout(predicate::str::contains("stadtleben").not());
}

#[test]
fn score_full_marks() {
    let home = TempDir::new().unwrap();
    let answers = home.path().join("answers.json");
    std::fs::write(&answers, FULL_MARKS).unwrap();

    lesen(&home)
        .arg("score")
        .arg("alicia")
        .arg("--answers")
        .arg(&answers)
        .arg("--content")
        .arg(content_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Ergebnis: 100% Bestanden"))
        .stdout(predicate::str::contains("78 / 78 points"))
        .stdout(predicate::str::contains("Sprachbausteine 2"));
}

#[test]
fn score_json_against_version() {
    let home = TempDir::new().unwrap();
    let answers = home.path().join("answers.json");
    std::fs::write(
        &answers,
        r#"{ "teil-2": { "6": "c", "7": "a", "8": "b", "9": "a", "10": "c" } }"#,
    )
    .unwrap();

    let output = lesen(&home)
        .arg("score")
        .arg("annika")
        .arg("--version")
        .arg("2")
        .arg("--format")
        .arg("json")
        .arg("--answers")
        .arg(&answers)
        .arg("--content")
        .arg(content_path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["attempt"]["version"], "2");
    assert_eq!(json["attempt"]["theme_id"], "annika");
    // 5 × 5 of 77.5 points
    assert_eq!(json["summary"]["percent"], 32);
    assert_eq!(json["summary"]["passed"], false);
}

#[test]
fn score_rejects_unknown_answer() {
    let home = TempDir::new().unwrap();
    let answers = home.path().join("answers.json");
    std::fs::write(&answers, r#"{ "teil-1": { "1": "z" } }"#).unwrap();

    lesen(&home)
        .arg("score")
        .arg("alicia")
        .arg("--answers")
        .arg(&answers)
        .arg("--content")
        .arg(content_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("teil-1 item 1"));
}

#[test]
fn score_unknown_theme() {
    let home = TempDir::new().unwrap();
    let answers = home.path().join("answers.json");
    std::fs::write(&answers, "{}").unwrap();

    lesen(&home)
        .arg("score")
        .arg("nobody")
        .arg("--answers")
        .arg(&answers)
        .arg("--content")
        .arg(content_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no b1 theme named 'nobody'"));
}

#[test]
fn score_writes_html_report() {
    let home = TempDir::new().unwrap();
    let answers = home.path().join("answers.json");
    std::fs::write(&answers, FULL_MARKS).unwrap();
    let report = home.path().join("out").join("result.html");

    lesen(&home)
        .arg("score")
        .arg("alicia")
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("html")
        .arg("--output")
        .arg(&report)
        .arg("--content")
        .arg(content_path())
        .assert()
        .success();

    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("<svg"));
    assert!(html.contains("Bestanden"));
}

#[test]
fn recorded_score_shows_in_history() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home);
    let answers = home.path().join("answers.json");
    std::fs::write(&answers, FULL_MARKS).unwrap();

    lesen(&home)
        .arg("score")
        .arg("alicia")
        .arg("--answers")
        .arg(&answers)
        .arg("--record")
        .arg("--user")
        .arg("anna")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    lesen(&home)
        .arg("history")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("alicia"))
        .stdout(predicate::str::contains("anna"))
        .stdout(predicate::str::contains("100%"))
        .stdout(predicate::str::contains("1 attempt(s)"));

    lesen(&home)
        .arg("history")
        .arg("--user")
        .arg("max")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No attempts recorded"));
}

#[test]
fn play_scripted_session() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("play")
        .arg("alicia")
        .arg("--no-history")
        .arg("--content")
        .arg(content_path())
        .write_stdin("set 1 b\nnext\nback\nreveal\nnext\nnext\nnext\nnext\nnext\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lesen Teil 1: Headline Matching"))
        .stdout(predicate::str::contains("1: b"))
        .stdout(predicate::str::contains("✗ 2: - (correct: e)"))
        .stdout(predicate::str::contains("Ergebnis: 6% Nicht bestanden"))
        .stdout(predicate::str::contains(
            "Back to /services/learn-german/themes?level=b1&module=lesen",
        ));
}

#[test]
fn play_records_finished_attempt() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home);

    lesen(&home)
        .arg("play")
        .arg("annika")
        .arg("--version")
        .arg("1")
        .arg("--user")
        .arg("anna")
        .arg("--config")
        .arg(&config)
        .write_stdin("jump teil-3\nnext\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(Version 1)"))
        .stdout(predicate::str::contains("Ergebnis: 0% Nicht bestanden"));

    let history = std::fs::read_to_string(home.path().join("history.json")).unwrap();
    let history: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(history["attempts"][0]["theme_id"], "annika");
    assert_eq!(history["attempts"][0]["version"], "1");
    assert_eq!(history["attempts"][0]["user_id"], "anna");
}

#[test]
fn init_creates_files() {
    let home = TempDir::new().unwrap();

    lesen(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created lesen.toml"))
        .stdout(predicate::str::contains("Created content/lesen.json"));

    assert!(home.path().join("lesen.toml").exists());
    assert!(home.path().join("content/lesen.json").exists());

    // The starter files are usable as they are.
    lesen(&home)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All themes valid"));
}

#[test]
fn init_skips_existing() {
    let home = TempDir::new().unwrap();

    lesen(&home).arg("init").assert().success();

    lesen(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reading exam player"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    lesen(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lesen"));
}
