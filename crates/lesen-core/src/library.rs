//! Content document parser.
//!
//! The document is `{ "levels": { "<level>": { "themes": { "<key>": theme } } } }`
//! in the camelCase JSON the site serves. Themes are kept in raw form until
//! they are resolved, so one malformed theme never hides the others.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{
    Ad, AdAnswer, Blank, BlankAnswer, ClozeContent, ExamContent, ExamTheme, ExamVersion, Headline,
    HeadlineAnswer, ItemId, Level, McOption, McQuestion, PartKind, Passage, ReadingText, Segment,
    Situation, Teil1Content, Teil2Content, Teil3Content, DEFAULT_VERSION_KEY,
};
use crate::validate::{validate_theme, ValidationIssue};

/// Intermediate JSON structure for the content document.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    levels: BTreeMap<String, RawLevel>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    #[serde(default)]
    themes: BTreeMap<String, RawTheme>,
}

/// Keys that may be written as strings or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Number(serde_json::Number),
}

impl RawKey {
    fn into_string(self) -> String {
        match self {
            RawKey::Text(s) => s,
            RawKey::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTheme {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    default_version: Option<RawKey>,
    #[serde(default)]
    version_order: Vec<RawKey>,
    #[serde(default)]
    versions: BTreeMap<String, RawVersion>,
    #[serde(default)]
    lesen: Option<RawLesen>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawVersion {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    lesen: Option<RawLesen>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLesen {
    #[serde(default)]
    parts: BTreeMap<String, RawPart>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPart {
    #[serde(default)]
    content: Option<serde_json::Value>,
}

// Part payloads, parsed one part at a time.

#[derive(Debug, Deserialize)]
struct WireChoice {
    id: RawKey,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTeil1 {
    #[serde(default)]
    instruction: String,
    texts: Vec<ReadingText>,
    headlines: Vec<WireChoice>,
    answers: Vec<WireHeadlineAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireHeadlineAnswer {
    text_id: ItemId,
    headline_id: RawKey,
}

#[derive(Debug, Deserialize)]
struct WireTeil2 {
    #[serde(default)]
    instruction: String,
    passage: Passage,
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    id: ItemId,
    prompt: String,
    options: Vec<WireChoice>,
    answer_id: RawKey,
}

#[derive(Debug, Deserialize)]
struct WireTeil3 {
    #[serde(default)]
    instruction: String,
    situations: Vec<Situation>,
    ads: Vec<WireChoice>,
    answers: Vec<WireAdAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAdAnswer {
    situation_id: ItemId,
    ad_id: RawKey,
}

#[derive(Debug, Deserialize)]
struct WireCloze {
    #[serde(default)]
    title: String,
    #[serde(default)]
    instruction: String,
    segments: Vec<WireSegment>,
    #[serde(default)]
    blanks: Vec<WireBlank>,
    #[serde(default)]
    answers: Vec<BlankAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireSegment {
    Text {
        #[serde(default)]
        value: String,
    },
    Luecke {
        #[serde(default)]
        id: Option<ItemId>,
        #[serde(default)]
        answer: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct WireBlank {
    id: ItemId,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    answer: Option<String>,
}

fn choice_pairs(choices: Vec<WireChoice>) -> impl Iterator<Item = (String, String)> {
    choices.into_iter().map(|c| (c.id.into_string(), c.text))
}

impl From<WireTeil1> for Teil1Content {
    fn from(wire: WireTeil1) -> Self {
        Self {
            instruction: wire.instruction,
            texts: wire.texts,
            headlines: choice_pairs(wire.headlines)
                .map(|(id, text)| Headline { id, text })
                .collect(),
            answers: wire
                .answers
                .into_iter()
                .map(|a| HeadlineAnswer {
                    text_id: a.text_id,
                    headline_id: a.headline_id.into_string(),
                })
                .collect(),
        }
    }
}

impl From<WireTeil2> for Teil2Content {
    fn from(wire: WireTeil2) -> Self {
        Self {
            instruction: wire.instruction,
            passage: wire.passage,
            questions: wire
                .questions
                .into_iter()
                .map(|q| McQuestion {
                    id: q.id,
                    prompt: q.prompt,
                    options: choice_pairs(q.options)
                        .map(|(id, text)| McOption { id, text })
                        .collect(),
                    answer_id: q.answer_id.into_string(),
                })
                .collect(),
        }
    }
}

impl From<WireTeil3> for Teil3Content {
    fn from(wire: WireTeil3) -> Self {
        Self {
            instruction: wire.instruction,
            situations: wire.situations,
            ads: choice_pairs(wire.ads)
                .map(|(id, text)| Ad { id, text })
                .collect(),
            answers: wire
                .answers
                .into_iter()
                .map(|a| AdAnswer {
                    situation_id: a.situation_id,
                    ad_id: a.ad_id.into_string(),
                })
                .collect(),
        }
    }
}

/// Convert a cloze part. Inline `answer`s on blanks or segments fill in ids
/// the answer list does not cover.
fn convert_cloze(part: PartKind, wire: WireCloze) -> (ClozeContent, Vec<ValidationIssue>) {
    let mut issues = Vec::new();
    let mut answers = wire.answers;
    let mut inline = Vec::new();

    let segments = wire
        .segments
        .into_iter()
        .filter_map(|segment| match segment {
            WireSegment::Text { value } => Some(Segment::Text(value)),
            WireSegment::Luecke { id: Some(id), answer } => {
                if let Some(answer) = answer {
                    inline.push((id, answer));
                }
                Some(Segment::Blank(id))
            }
            WireSegment::Luecke { id: None, .. } => {
                issues.push(ValidationIssue::in_part(part, "blank segment without an id"));
                None
            }
        })
        .collect();

    let blanks = wire
        .blanks
        .into_iter()
        .map(|blank| {
            if let Some(answer) = blank.answer {
                inline.push((blank.id, answer));
            }
            Blank {
                id: blank.id,
                options: blank.options.unwrap_or_default(),
            }
        })
        .collect();

    for (id, answer) in inline {
        if !answers.iter().any(|a| a.id == id) {
            answers.push(BlankAnswer { id, answer });
        }
    }

    let content = ClozeContent {
        title: wire.title,
        instruction: wire.instruction,
        segments,
        blanks,
        answers,
    };
    (content, issues)
}

fn parse_part<T: DeserializeOwned>(
    parts: &BTreeMap<String, RawPart>,
    part: PartKind,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    let Some(raw) = parts.get(part.key()) else {
        issues.push(ValidationIssue::in_part(part, "part is missing"));
        return None;
    };
    let Some(content) = &raw.content else {
        issues.push(ValidationIssue::in_part(part, "part has no content"));
        return None;
    };
    match serde_json::from_value(content.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            issues.push(ValidationIssue::in_part(
                part,
                format!("malformed content: {e}"),
            ));
            None
        }
    }
}

fn convert_content(lesen: &RawLesen) -> Result<ExamContent, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let parts = &lesen.parts;

    let teil1: Option<WireTeil1> = parse_part(parts, PartKind::Teil1, &mut issues);
    let sb1: Option<WireCloze> = parse_part(parts, PartKind::Sprachbausteine1, &mut issues);
    let sb2: Option<WireCloze> = parse_part(parts, PartKind::Sprachbausteine2, &mut issues);
    let teil2: Option<WireTeil2> = parse_part(parts, PartKind::Teil2, &mut issues);
    let teil3: Option<WireTeil3> = parse_part(parts, PartKind::Teil3, &mut issues);

    let mut cloze = |part: PartKind, wire: Option<WireCloze>| {
        wire.map(|wire| {
            let (content, found) = convert_cloze(part, wire);
            issues.extend(found);
            content
        })
    };
    let sb1 = cloze(PartKind::Sprachbausteine1, sb1);
    let sb2 = cloze(PartKind::Sprachbausteine2, sb2);

    match (teil1, sb1, sb2, teil2, teil3) {
        (Some(teil1), Some(sb1), Some(sb2), Some(teil2), Some(teil3)) if issues.is_empty() => {
            Ok(ExamContent {
                teil1: teil1.into(),
                sprachbausteine1: sb1,
                sprachbausteine2: sb2,
                teil2: teil2.into(),
                teil3: teil3.into(),
            })
        }
        _ => Err(issues),
    }
}

fn convert_theme(key: &str, raw: &RawTheme) -> Result<ExamTheme, Vec<ValidationIssue>> {
    let id = raw.id.clone().unwrap_or_else(|| key.to_string());
    let title = raw.title.clone().unwrap_or_else(|| id.clone());
    let mut issues = Vec::new();

    let content = match &raw.lesen {
        Some(lesen) => match convert_content(lesen) {
            Ok(content) => Some(content),
            Err(found) => {
                issues.extend(found);
                None
            }
        },
        None => None,
    };

    let mut versions = BTreeMap::new();
    for (version_key, version) in &raw.versions {
        let Some(lesen) = &version.lesen else {
            issues.push(
                ValidationIssue::new("version has no content").with_version(Some(version_key)),
            );
            continue;
        };
        match convert_content(lesen) {
            Ok(content) => {
                versions.insert(
                    version_key.clone(),
                    ExamVersion {
                        key: version_key.clone(),
                        label: version.label.clone().unwrap_or_else(|| version_key.clone()),
                        title: version.title.clone().unwrap_or_else(|| title.clone()),
                        content,
                    },
                );
            }
            Err(found) => issues.extend(
                found
                    .into_iter()
                    .map(|issue| issue.with_version(Some(version_key))),
            ),
        }
    }

    if !issues.is_empty() {
        return Err(issues.into_iter().map(|i| i.with_theme(&id)).collect());
    }

    let theme = ExamTheme {
        id,
        title,
        default_version: raw
            .default_version
            .clone()
            .map(RawKey::into_string)
            .filter(|key| key != DEFAULT_VERSION_KEY),
        version_order: raw
            .version_order
            .iter()
            .cloned()
            .map(RawKey::into_string)
            .collect(),
        versions,
        content,
    };

    let issues = validate_theme(&theme);
    if issues.is_empty() {
        Ok(theme)
    } else {
        Err(issues)
    }
}

/// One entry of a level's theme listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub key: String,
    pub title: String,
    /// Number of selectable versions (0 for fallback-only themes).
    pub versions: usize,
}

/// The parsed content document, indexed by level and theme key.
#[derive(Debug, Clone, Default)]
pub struct ExamLibrary {
    levels: BTreeMap<Level, BTreeMap<String, RawTheme>>,
}

impl ExamLibrary {
    /// Parse a content document. Unknown level keys are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self, ExamError> {
        let document: RawDocument = serde_json::from_str(json)
            .map_err(|e| ExamError::Load {
                message: format!("invalid content document: {e}"),
                retryable: false,
            })?;

        let mut levels = BTreeMap::new();
        for (key, level) in document.levels {
            match key.parse::<Level>() {
                Ok(parsed) => {
                    levels.insert(parsed, level.themes);
                }
                Err(e) => tracing::warn!(level = %key, error = %e, "skipping level"),
            }
        }
        Ok(Self { levels })
    }

    /// Read and parse a content document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read content document: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("failed to parse content document: {}", path.display()))
    }

    pub fn levels(&self) -> Vec<Level> {
        self.levels.keys().copied().collect()
    }

    pub fn theme_count(&self) -> usize {
        self.levels.values().map(BTreeMap::len).sum()
    }

    /// Themes of a level, sorted by key. Summaries are read without validation.
    pub fn themes(&self, level: Level) -> Vec<ThemeSummary> {
        let Some(themes) = self.levels.get(&level) else {
            return Vec::new();
        };
        themes
            .iter()
            .map(|(key, raw)| ThemeSummary {
                key: key.clone(),
                title: raw
                    .title
                    .clone()
                    .or_else(|| raw.id.clone())
                    .unwrap_or_else(|| key.clone()),
                versions: raw
                    .version_order
                    .iter()
                    .cloned()
                    .map(RawKey::into_string)
                    .filter(|k| k != DEFAULT_VERSION_KEY)
                    .count(),
            })
            .collect()
    }

    pub fn contains(&self, level: Level, key: &str) -> bool {
        self.levels
            .get(&level)
            .is_some_and(|themes| themes.contains_key(key))
    }

    /// Resolve a level/theme pair into a validated theme.
    pub fn resolve(&self, level: Level, key: &str) -> Result<ExamTheme, ExamError> {
        let raw = self
            .levels
            .get(&level)
            .and_then(|themes| themes.get(key))
            .ok_or_else(|| ExamError::NotFound {
                level,
                theme: key.to_string(),
            })?;

        convert_theme(key, raw).map_err(|issues| {
            tracing::warn!(%level, theme = key, issues = issues.len(), "theme failed validation");
            ExamError::Validation {
                theme: key.to_string(),
                issues,
            }
        })
    }

    /// Validate every theme of every level.
    pub fn validate(&self) -> Vec<(Level, ValidationIssue)> {
        let mut all = Vec::new();
        for (level, themes) in &self.levels {
            for (key, raw) in themes {
                if let Err(issues) = convert_theme(key, raw) {
                    all.extend(issues.into_iter().map(|issue| (*level, issue)));
                }
            }
        }
        all
    }
}
