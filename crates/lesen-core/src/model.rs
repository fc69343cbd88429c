//! Core data model types for lesen.
//!
//! An [`ExamTheme`] is one complete reading exam for a proficiency level. It
//! carries one or more [`ExamVersion`]s (alternate texts on the same
//! skeleton) and optionally a fallback [`ExamContent`] for themes without
//! explicit versions. Everything here is immutable once loaded.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a scorable item (text, question, situation or blank).
pub type ItemId = u32;

/// Version key that never counts as a selectable version.
pub const DEFAULT_VERSION_KEY: &str = "default";

/// Proficiency level an exam belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    B1,
    B2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::B1 => write!(f, "b1"),
            Level::B2 => write!(f, "b2"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b1" => Ok(Level::B1),
            "b2" => Ok(Level::B2),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// The five fixed parts of the reading exam, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartKind {
    #[serde(rename = "teil-1")]
    Teil1,
    #[serde(rename = "sprachbausteine-1")]
    Sprachbausteine1,
    #[serde(rename = "sprachbausteine-2")]
    Sprachbausteine2,
    #[serde(rename = "teil-2")]
    Teil2,
    #[serde(rename = "teil-3")]
    Teil3,
}

impl PartKind {
    /// Play order. `next`/`back` walk this array.
    pub const ORDER: [PartKind; 5] = [
        PartKind::Teil1,
        PartKind::Sprachbausteine1,
        PartKind::Sprachbausteine2,
        PartKind::Teil2,
        PartKind::Teil3,
    ];

    /// Position of this part in [`PartKind::ORDER`].
    pub fn index(self) -> usize {
        match self {
            PartKind::Teil1 => 0,
            PartKind::Sprachbausteine1 => 1,
            PartKind::Sprachbausteine2 => 2,
            PartKind::Teil2 => 3,
            PartKind::Teil3 => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn is_first(self) -> bool {
        self.index() == 0
    }

    pub fn is_last(self) -> bool {
        self.index() == Self::ORDER.len() - 1
    }

    /// Key used in the content document.
    pub fn key(self) -> &'static str {
        match self {
            PartKind::Teil1 => "teil-1",
            PartKind::Sprachbausteine1 => "sprachbausteine-1",
            PartKind::Sprachbausteine2 => "sprachbausteine-2",
            PartKind::Teil2 => "teil-2",
            PartKind::Teil3 => "teil-3",
        }
    }

    /// Points awarded per correct item.
    pub fn weight(self) -> f64 {
        match self {
            PartKind::Teil1 => 5.0,
            PartKind::Sprachbausteine1 => 1.5,
            PartKind::Sprachbausteine2 => 1.5,
            PartKind::Teil2 => 5.0,
            PartKind::Teil3 => 2.5,
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            PartKind::Teil1 => "Teil 1",
            PartKind::Sprachbausteine1 => "SB 1",
            PartKind::Sprachbausteine2 => "SB 2",
            PartKind::Teil2 => "Teil 2",
            PartKind::Teil3 => "Teil 3",
        }
    }

    pub fn full_label(self) -> &'static str {
        match self {
            PartKind::Teil1 => "Lesen Teil 1",
            PartKind::Sprachbausteine1 => "Sprachbausteine 1",
            PartKind::Sprachbausteine2 => "Sprachbausteine 2",
            PartKind::Teil2 => "Lesen Teil 2",
            PartKind::Teil3 => "Lesen Teil 3",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PartKind::Teil1 => "Headline Matching",
            PartKind::Sprachbausteine1 => "Fill in the Blanks",
            PartKind::Sprachbausteine2 => "Word Completion",
            PartKind::Teil2 => "Multiple Choice",
            PartKind::Teil3 => "Ad Matching",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teil-1" | "teil1" | "t1" => Ok(PartKind::Teil1),
            "sprachbausteine-1" | "sb1" | "sb-1" => Ok(PartKind::Sprachbausteine1),
            "sprachbausteine-2" | "sb2" | "sb-2" => Ok(PartKind::Sprachbausteine2),
            "teil-2" | "teil2" | "t2" => Ok(PartKind::Teil2),
            "teil-3" | "teil3" | "t3" => Ok(PartKind::Teil3),
            other => Err(format!("unknown part: {other}")),
        }
    }
}

/// One complete exam definition for a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamTheme {
    /// Theme identifier.
    pub id: String,
    /// Human-readable title (e.g. "Alicia").
    pub title: String,
    /// Version to preselect, if any.
    #[serde(default)]
    pub default_version: Option<String>,
    /// Display order of versions. May contain [`DEFAULT_VERSION_KEY`].
    #[serde(default)]
    pub version_order: Vec<String>,
    /// Versions keyed by version key.
    #[serde(default)]
    pub versions: BTreeMap<String, ExamVersion>,
    /// Fallback content for themes without explicit versions.
    #[serde(default)]
    pub content: Option<ExamContent>,
}

impl ExamTheme {
    /// Versions a user can pick from, in `version_order`.
    ///
    /// Entries of `version_order` without a matching version are skipped.
    pub fn selectable_versions(&self) -> Vec<&ExamVersion> {
        self.version_order
            .iter()
            .filter(|key| key.as_str() != DEFAULT_VERSION_KEY)
            .filter_map(|key| self.versions.get(key))
            .collect()
    }

    /// True when more than one real version exists and the user must pick.
    pub fn requires_version_choice(&self) -> bool {
        self.version_order
            .iter()
            .filter(|key| key.as_str() != DEFAULT_VERSION_KEY)
            .count()
            > 1
    }

    /// The version selected before the user has made a choice.
    pub fn preselected_version(&self) -> Option<String> {
        self.default_version.clone().or_else(|| {
            self.selectable_versions()
                .first()
                .map(|version| version.key.clone())
        })
    }

    /// Content for a version, falling back to the theme's own content.
    pub fn content_for(&self, version: Option<&str>) -> Option<&ExamContent> {
        version
            .and_then(|key| self.versions.get(key))
            .map(|v| &v.content)
            .or(self.content.as_ref())
    }
}

/// An alternate set of texts sharing the theme skeleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamVersion {
    pub key: String,
    /// Short label shown on the version badge.
    pub label: String,
    pub title: String,
    pub content: ExamContent,
}

/// The five parts of one playable exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamContent {
    pub teil1: Teil1Content,
    pub sprachbausteine1: ClozeContent,
    pub sprachbausteine2: ClozeContent,
    pub teil2: Teil2Content,
    pub teil3: Teil3Content,
}

impl ExamContent {
    /// Total number of scorable items across all parts.
    pub fn item_count(&self) -> usize {
        self.teil1.answers.len()
            + self.sprachbausteine1.answers.len()
            + self.sprachbausteine2.answers.len()
            + self.teil2.questions.len()
            + self.teil3.answers.len()
    }
}

// ---------------------------------------------------------------------------
// Teil 1: headline matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teil1Content {
    #[serde(default)]
    pub instruction: String,
    pub texts: Vec<ReadingText>,
    pub headlines: Vec<Headline>,
    /// Answer key: one entry per text.
    pub answers: Vec<HeadlineAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingText {
    pub id: ItemId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineAnswer {
    pub text_id: ItemId,
    pub headline_id: String,
}

// ---------------------------------------------------------------------------
// Teil 2: multiple choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teil2Content {
    #[serde(default)]
    pub instruction: String,
    pub passage: Passage,
    pub questions: Vec<McQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McQuestion {
    pub id: ItemId,
    pub prompt: String,
    pub options: Vec<McOption>,
    /// Id of the correct option.
    pub answer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McOption {
    pub id: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Teil 3: ad matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teil3Content {
    #[serde(default)]
    pub instruction: String,
    pub situations: Vec<Situation>,
    pub ads: Vec<Ad>,
    /// Answer key: one entry per situation.
    pub answers: Vec<AdAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Situation {
    pub id: ItemId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdAnswer {
    pub situation_id: ItemId,
    pub ad_id: String,
}

// ---------------------------------------------------------------------------
// Sprachbausteine: cloze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClozeContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instruction: String,
    pub segments: Vec<Segment>,
    pub blanks: Vec<Blank>,
    /// Answer key: one entry per blank.
    pub answers: Vec<BlankAnswer>,
}

impl ClozeContent {
    pub fn blank(&self, id: ItemId) -> Option<&Blank> {
        self.blanks.iter().find(|b| b.id == id)
    }

    /// How a blank takes input. Unknown blanks are free text.
    pub fn input_for(&self, id: ItemId) -> BlankInput<'_> {
        match self.blank(id) {
            Some(blank) if !blank.options.is_empty() => BlankInput::Choice(&blank.options),
            _ => BlankInput::FreeText,
        }
    }

    /// True when any blank is a constrained choice (rendered as dropdowns).
    pub fn uses_dropdowns(&self) -> bool {
        self.blanks.iter().any(|b| !b.options.is_empty())
    }

    /// Blank ids in the order they appear in the text.
    pub fn blank_ids_in_text(&self) -> Vec<ItemId> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Blank(id) => Some(*id),
                Segment::Text(_) => None,
            })
            .collect()
    }
}

/// A piece of cloze text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Text(String),
    Blank(ItemId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blank {
    pub id: ItemId,
    /// Closed option list; empty means free text.
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankAnswer {
    pub id: ItemId,
    pub answer: String,
}

/// Input mode of a single blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankInput<'a> {
    Choice(&'a [String]),
    FreeText,
}
