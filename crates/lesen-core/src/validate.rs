//! Content invariants, checked at the loading boundary.
//!
//! Every check reports instead of stopping, so one pass lists all the
//! problems in a theme.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answers::NO_MATCH;
use crate::model::{
    ClozeContent, ExamContent, ExamTheme, ItemId, PartKind, Segment, Teil1Content, Teil2Content,
    Teil3Content, DEFAULT_VERSION_KEY,
};

/// A broken invariant in the content document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Theme key (if applicable).
    #[serde(default)]
    pub theme: Option<String>,
    /// Version key (if applicable).
    #[serde(default)]
    pub version: Option<String>,
    /// Part (if applicable).
    #[serde(default)]
    pub part: Option<PartKind>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            theme: None,
            version: None,
            part: None,
            message: message.into(),
        }
    }

    pub fn in_part(part: PartKind, message: impl Into<String>) -> Self {
        Self {
            part: Some(part),
            ..Self::new(message)
        }
    }

    pub(crate) fn with_version(mut self, version: Option<&str>) -> Self {
        if self.version.is_none() {
            self.version = version.map(str::to_string);
        }
        self
    }

    pub(crate) fn with_theme(mut self, theme: &str) -> Self {
        if self.theme.is_none() {
            self.theme = Some(theme.to_string());
        }
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scope = Vec::new();
        if let Some(theme) = &self.theme {
            scope.push(theme.clone());
        }
        if let Some(version) = &self.version {
            scope.push(format!("version {version}"));
        }
        if let Some(part) = &self.part {
            scope.push(part.to_string());
        }
        if scope.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", scope.join(" / "), self.message)
        }
    }
}

/// Validate a whole theme: version bookkeeping plus every playable content bundle.
pub fn validate_theme(theme: &ExamTheme) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(default) = &theme.default_version {
        if default != DEFAULT_VERSION_KEY && !theme.versions.contains_key(default) {
            issues.push(ValidationIssue::new(format!(
                "defaultVersion '{default}' is not a defined version"
            )));
        }
    }

    let mut seen = HashSet::new();
    for key in &theme.version_order {
        if key == DEFAULT_VERSION_KEY {
            continue;
        }
        if !seen.insert(key) {
            issues.push(ValidationIssue::new(format!(
                "version '{key}' listed twice in versionOrder"
            )));
        }
        if !theme.versions.contains_key(key) {
            issues.push(ValidationIssue::new(format!(
                "versionOrder names undefined version '{key}'"
            )));
        }
    }

    if theme.versions.is_empty() && theme.content.is_none() {
        issues.push(ValidationIssue::new("theme has no playable content"));
    }
    if theme.content.is_none()
        && theme
            .preselected_version()
            .is_some_and(|key| !theme.versions.contains_key(&key))
    {
        issues.push(ValidationIssue::new(
            "preselected version has no content and there is no fallback",
        ));
    }
    if theme.content.is_none() && theme.preselected_version().is_none() && !theme.versions.is_empty()
    {
        issues.push(ValidationIssue::new(
            "no version is reachable: versionOrder is empty and there is no fallback content",
        ));
    }

    if let Some(content) = &theme.content {
        issues.extend(validate_content(content));
    }
    for (key, version) in &theme.versions {
        issues.extend(
            validate_content(&version.content)
                .into_iter()
                .map(|issue| issue.with_version(Some(key))),
        );
    }

    issues
        .into_iter()
        .map(|issue| issue.with_theme(&theme.id))
        .collect()
}

/// Validate the five parts of one content bundle.
pub fn validate_content(content: &ExamContent) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    issues.extend(validate_teil1(&content.teil1));
    issues.extend(validate_cloze(
        PartKind::Sprachbausteine1,
        &content.sprachbausteine1,
    ));
    issues.extend(validate_cloze(
        PartKind::Sprachbausteine2,
        &content.sprachbausteine2,
    ));
    issues.extend(validate_teil2(&content.teil2));
    issues.extend(validate_teil3(&content.teil3));
    issues
}

fn duplicate_ids(ids: impl IntoIterator<Item = ItemId>) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    let mut dupes: Vec<ItemId> = ids.into_iter().filter(|id| !seen.insert(*id)).collect();
    dupes.sort_unstable();
    dupes.dedup();
    dupes
}

/// Checks that a key covers `items` exactly once. `noun` names the item kind.
fn check_coverage(
    part: PartKind,
    noun: &str,
    items: &[ItemId],
    keyed: &[ItemId],
    issues: &mut Vec<ValidationIssue>,
) {
    for id in duplicate_ids(items.iter().copied()) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("duplicate {noun} id {id}"),
        ));
    }
    for id in duplicate_ids(keyed.iter().copied()) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("{noun} {id} has more than one answer-key entry"),
        ));
    }
    let keyed_set: HashSet<ItemId> = keyed.iter().copied().collect();
    let item_set: HashSet<ItemId> = items.iter().copied().collect();
    for id in items {
        if !keyed_set.contains(id) {
            issues.push(ValidationIssue::in_part(
                part,
                format!("{noun} {id} has no answer-key entry"),
            ));
        }
    }
    for id in keyed {
        if !item_set.contains(id) {
            issues.push(ValidationIssue::in_part(
                part,
                format!("answer key references unknown {noun} {id}"),
            ));
        }
    }
}

fn validate_teil1(content: &Teil1Content) -> Vec<ValidationIssue> {
    let part = PartKind::Teil1;
    let mut issues = Vec::new();

    if content.texts.is_empty() {
        issues.push(ValidationIssue::in_part(part, "no texts"));
    }
    let texts: Vec<ItemId> = content.texts.iter().map(|t| t.id).collect();
    let keyed: Vec<ItemId> = content.answers.iter().map(|a| a.text_id).collect();
    check_coverage(part, "text", &texts, &keyed, &mut issues);

    let headlines: HashSet<&str> = content.headlines.iter().map(|h| h.id.as_str()).collect();
    if headlines.len() != content.headlines.len() {
        issues.push(ValidationIssue::in_part(part, "duplicate headline ids"));
    }
    for answer in &content.answers {
        if !headlines.contains(answer.headline_id.as_str()) {
            issues.push(ValidationIssue::in_part(
                part,
                format!(
                    "text {} is keyed to unknown headline '{}'",
                    answer.text_id, answer.headline_id
                ),
            ));
        }
    }

    issues
}

fn validate_teil2(content: &Teil2Content) -> Vec<ValidationIssue> {
    let part = PartKind::Teil2;
    let mut issues = Vec::new();

    if content.questions.is_empty() {
        issues.push(ValidationIssue::in_part(part, "no questions"));
    }
    for id in duplicate_ids(content.questions.iter().map(|q| q.id)) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("duplicate question id {id}"),
        ));
    }
    for question in &content.questions {
        if question.options.is_empty() {
            issues.push(ValidationIssue::in_part(
                part,
                format!("question {} has no options", question.id),
            ));
        }
        if !question.options.iter().any(|o| o.id == question.answer_id) {
            issues.push(ValidationIssue::in_part(
                part,
                format!(
                    "question {} is keyed to '{}', which is not one of its options",
                    question.id, question.answer_id
                ),
            ));
        }
    }

    issues
}

fn validate_teil3(content: &Teil3Content) -> Vec<ValidationIssue> {
    let part = PartKind::Teil3;
    let mut issues = Vec::new();

    if content.situations.is_empty() {
        issues.push(ValidationIssue::in_part(part, "no situations"));
    }
    let situations: Vec<ItemId> = content.situations.iter().map(|s| s.id).collect();
    let keyed: Vec<ItemId> = content.answers.iter().map(|a| a.situation_id).collect();
    check_coverage(part, "situation", &situations, &keyed, &mut issues);

    let ads: HashSet<&str> = content.ads.iter().map(|a| a.id.as_str()).collect();
    if ads.len() != content.ads.len() {
        issues.push(ValidationIssue::in_part(part, "duplicate ad ids"));
    }
    if ads.contains(NO_MATCH) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("'{NO_MATCH}' is reserved and cannot be an ad id"),
        ));
    }
    for answer in &content.answers {
        if answer.ad_id == NO_MATCH {
            issues.push(ValidationIssue::in_part(
                part,
                format!(
                    "situation {} is keyed to '{NO_MATCH}', which is never correct",
                    answer.situation_id
                ),
            ));
        } else if !ads.contains(answer.ad_id.as_str()) {
            issues.push(ValidationIssue::in_part(
                part,
                format!(
                    "situation {} is keyed to unknown ad '{}'",
                    answer.situation_id, answer.ad_id
                ),
            ));
        }
    }

    issues
}

fn validate_cloze(part: PartKind, content: &ClozeContent) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let in_text: Vec<ItemId> = content
        .segments
        .iter()
        .filter_map(|s| match s {
            Segment::Blank(id) => Some(*id),
            Segment::Text(_) => None,
        })
        .collect();
    if in_text.is_empty() {
        issues.push(ValidationIssue::in_part(part, "text has no blanks"));
    }
    for id in duplicate_ids(in_text.iter().copied()) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("blank {id} appears more than once in the text"),
        ));
    }

    let defined: Vec<ItemId> = content.blanks.iter().map(|b| b.id).collect();
    for id in duplicate_ids(defined.iter().copied()) {
        issues.push(ValidationIssue::in_part(
            part,
            format!("blank {id} is defined more than once"),
        ));
    }
    let defined_set: HashSet<ItemId> = defined.iter().copied().collect();
    let text_set: HashSet<ItemId> = in_text.iter().copied().collect();
    for id in &in_text {
        if !defined_set.contains(id) {
            issues.push(ValidationIssue::in_part(
                part,
                format!("blank {id} has no definition"),
            ));
        }
    }
    for id in &defined {
        if !text_set.contains(id) {
            issues.push(ValidationIssue::in_part(
                part,
                format!("blank {id} is defined but never appears in the text"),
            ));
        }
    }

    let keyed: Vec<ItemId> = content.answers.iter().map(|a| a.id).collect();
    check_coverage(part, "blank", &in_text, &keyed, &mut issues);

    let options: HashMap<ItemId, &Vec<String>> = content
        .blanks
        .iter()
        .filter(|b| !b.options.is_empty())
        .map(|b| (b.id, &b.options))
        .collect();
    for answer in &content.answers {
        if answer.answer.trim().is_empty() {
            issues.push(ValidationIssue::in_part(
                part,
                format!("blank {} has an empty answer", answer.id),
            ));
        }
        if let Some(opts) = options.get(&answer.id) {
            if !opts.iter().any(|o| o == &answer.answer) {
                issues.push(ValidationIssue::in_part(
                    part,
                    format!(
                        "blank {} is keyed to '{}', which is not one of its options",
                        answer.id, answer.answer
                    ),
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdAnswer, Blank, BlankAnswer, HeadlineAnswer};
    use crate::testutil::sample_content;

    #[test]
    fn sample_content_is_clean() {
        assert!(validate_content(&sample_content()).is_empty());
    }

    #[test]
    fn teil1_coverage() {
        let mut content = sample_content();
        content.teil1.answers.pop();
        content.teil1.answers.push(HeadlineAnswer {
            text_id: 1,
            headline_id: "a".into(),
        });
        let issues = validate_content(&content);
        assert!(issues.iter().any(|i| i.message.contains("more than one answer-key entry")));
        assert!(issues.iter().any(|i| i.message.contains("has no answer-key entry")));
        assert!(issues.iter().all(|i| i.part == Some(PartKind::Teil1)));
    }

    #[test]
    fn teil2_answer_must_be_an_option() {
        let mut content = sample_content();
        content.teil2.questions[0].answer_id = "z".into();
        let issues = validate_content(&content);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("not one of its options"));
    }

    #[test]
    fn teil3_sentinel_cannot_be_keyed() {
        let mut content = sample_content();
        content.teil3.answers[0] = AdAnswer {
            situation_id: content.teil3.answers[0].situation_id,
            ad_id: NO_MATCH.into(),
        };
        let issues = validate_content(&content);
        assert!(issues.iter().any(|i| i.message.contains("never correct")));
    }

    #[test]
    fn cloze_blank_bookkeeping() {
        let mut content = sample_content();
        content.sprachbausteine1.blanks.push(Blank {
            id: 99,
            options: vec![],
        });
        content.sprachbausteine1.answers.push(BlankAnswer {
            id: 98,
            answer: "x".into(),
        });
        let issues = validate_content(&content);
        assert!(issues
            .iter()
            .any(|i| i.message.contains("blank 99 is defined but never appears")));
        assert!(issues
            .iter()
            .any(|i| i.message.contains("answer key references unknown blank 98")));
    }

    #[test]
    fn theme_version_bookkeeping() {
        let theme = ExamTheme {
            id: "broken".into(),
            title: "Broken".into(),
            default_version: Some("v9".into()),
            version_order: vec!["v1".into(), "v1".into()],
            versions: Default::default(),
            content: None,
        };
        let issues = validate_theme(&theme);
        assert!(issues.iter().any(|i| i.message.contains("defaultVersion 'v9'")));
        assert!(issues.iter().any(|i| i.message.contains("listed twice")));
        assert!(issues.iter().any(|i| i.message.contains("no playable content")));
        assert!(issues.iter().all(|i| i.theme.as_deref() == Some("broken")));
    }

    #[test]
    fn issue_display_includes_scope() {
        let issue = ValidationIssue::in_part(PartKind::Teil2, "no questions")
            .with_version(Some("2"))
            .with_theme("alicia");
        assert_eq!(issue.to_string(), "[alicia / version 2 / teil-2] no questions");
    }
}
