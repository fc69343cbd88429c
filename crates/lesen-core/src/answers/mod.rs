//! Per-part answer models.
//!
//! Every part stores the user's selections in an [`AnswerSheet`] (item id →
//! chosen value, empty meaning unanswered) and grades them against its
//! content's [`AnswerKey`]. A [`PartView`] couples the two for the part on
//! screen; the specialised views live in the submodules:
//!
//! - [`headline`]: Teil 1, many-to-one headline assignment
//! - [`choice`]: Teil 2, single-select multiple choice
//! - [`ads`]: Teil 3, ad assignment with the "no ad fits" sentinel
//! - [`cloze`]: Sprachbausteine, constrained or free-text blanks
//!
//! Drag-and-drop and click-to-assign both drive the [`input::Assign`]
//! capability.

pub mod ads;
pub mod choice;
pub mod cloze;
pub mod headline;
pub mod input;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ExamContent, ItemId, PartKind};

pub use ads::{AdMatching, NO_MATCH};
pub use choice::MultipleChoice;
pub use cloze::{normalize, Cloze};
pub use headline::HeadlineMatching;
pub use input::{Assign, ClickFocus, DragGesture};

/// The correct answers of one part.
pub trait AnswerKey {
    /// Scorable item ids, in answer-key order.
    fn item_ids(&self) -> Vec<ItemId>;

    /// The expected value for an item.
    fn expected(&self, item: ItemId) -> Option<&str>;

    /// Whether `given` is the right answer for `item`. Exact id equality by default.
    fn grade(&self, item: ItemId, given: &str) -> bool {
        !given.is_empty() && self.expected(item) == Some(given)
    }
}

/// A user's selections for one part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    entries: BTreeMap<ItemId, String>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, replacing any previous one. An empty value clears it.
    pub fn set(&mut self, item: ItemId, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.entries.remove(&item);
        } else {
            self.entries.insert(item, value);
        }
    }

    pub fn get(&self, item: ItemId) -> Option<&str> {
        self.entries.get(&item).map(String::as_str)
    }

    pub fn clear(&mut self, item: ItemId) {
        self.entries.remove(&item);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of items holding a selection.
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    /// Items currently holding `value`, in id order.
    pub fn holders_of(&self, value: &str) -> Vec<ItemId> {
        self.entries
            .iter()
            .filter(|(_, v)| v.as_str() == value)
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FromIterator<(ItemId, String)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (ItemId, String)>>(iter: T) -> Self {
        let mut sheet = AnswerSheet::new();
        for (item, value) in iter {
            sheet.set(item, value);
        }
        sheet
    }
}

impl ExamContent {
    /// The answer key of one part.
    pub fn answer_key(&self, part: PartKind) -> &dyn AnswerKey {
        match part {
            PartKind::Teil1 => &self.teil1,
            PartKind::Sprachbausteine1 => &self.sprachbausteine1,
            PartKind::Sprachbausteine2 => &self.sprachbausteine2,
            PartKind::Teil2 => &self.teil2,
            PartKind::Teil3 => &self.teil3,
        }
    }
}

/// One answer sheet per part, indexed in play order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSheets([AnswerSheet; 5]);

impl PartSheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, part: PartKind) -> &AnswerSheet {
        &self.0[part.index()]
    }

    pub fn get_mut(&mut self, part: PartKind) -> &mut AnswerSheet {
        &mut self.0[part.index()]
    }

    pub fn clear_all(&mut self) {
        for sheet in &mut self.0 {
            sheet.clear_all();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(AnswerSheet::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartKind, &AnswerSheet)> {
        PartKind::ORDER.into_iter().zip(self.0.iter())
    }
}

/// Correctness feedback for one item, shown after reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFeedback {
    pub item: ItemId,
    pub given: Option<String>,
    pub expected: Option<String>,
    pub correct: bool,
}

/// Grade a single item. Safe to call at any time; unanswered items are incorrect.
pub fn is_correct<K: AnswerKey + ?Sized>(key: &K, sheet: &AnswerSheet, item: ItemId) -> bool {
    sheet.get(item).is_some_and(|given| key.grade(item, given))
}

/// Number of answer-key items graded correct.
pub fn correct_count<K: AnswerKey + ?Sized>(key: &K, sheet: &AnswerSheet) -> usize {
    key.item_ids()
        .into_iter()
        .filter(|item| is_correct(key, sheet, *item))
        .count()
}

/// Feedback for every answer-key item.
pub fn feedback<K: AnswerKey + ?Sized>(key: &K, sheet: &AnswerSheet) -> Vec<ItemFeedback> {
    key.item_ids()
        .into_iter()
        .map(|item| ItemFeedback {
            item,
            given: sheet.get(item).map(str::to_string),
            expected: key.expected(item).map(str::to_string),
            correct: is_correct(key, sheet, item),
        })
        .collect()
}

/// A part's content together with its answer sheet and reveal state.
///
/// Writes are ignored while the part is revealed.
pub struct PartView<'a, K: ?Sized> {
    key: &'a K,
    sheet: &'a mut AnswerSheet,
    revealed: bool,
}

impl<'a, K: AnswerKey + ?Sized> PartView<'a, K> {
    pub fn new(key: &'a K, sheet: &'a mut AnswerSheet, revealed: bool) -> Self {
        Self {
            key,
            sheet,
            revealed,
        }
    }

    pub fn content(&self) -> &'a K {
        self.key
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Record a selection. Returns `false` if the part is locked by reveal.
    pub fn set_answer(&mut self, item: ItemId, value: &str) -> bool {
        if self.revealed {
            tracing::debug!(item, "ignoring answer while revealed");
            return false;
        }
        tracing::debug!(item, value, "answer set");
        self.sheet.set(item, value);
        true
    }

    pub fn clear_answer(&mut self, item: ItemId) -> bool {
        self.set_answer(item, "")
    }

    pub fn answer(&self, item: ItemId) -> Option<&str> {
        self.sheet.get(item)
    }

    pub fn sheet(&self) -> &AnswerSheet {
        self.sheet
    }

    /// Grade an item against the key. Readable before reveal; not a score.
    pub fn is_correct(&self, item: ItemId) -> bool {
        is_correct(self.key, self.sheet, item)
    }

    /// Per-item feedback, available only once the part is revealed.
    pub fn feedback(&self) -> Option<Vec<ItemFeedback>> {
        self.revealed.then(|| feedback(self.key, self.sheet))
    }

    pub fn correct_count(&self) -> usize {
        correct_count(self.key, self.sheet)
    }

    pub fn total(&self) -> usize {
        self.key.item_ids().len()
    }

    pub fn answered_count(&self) -> usize {
        self.sheet.answered_count()
    }

    /// Items currently holding `value` (for "used elsewhere" hints).
    pub fn holders_of(&self, value: &str) -> Vec<ItemId> {
        self.sheet.holders_of(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedKey(Vec<(ItemId, &'static str)>);

    impl AnswerKey for FixedKey {
        fn item_ids(&self) -> Vec<ItemId> {
            self.0.iter().map(|(id, _)| *id).collect()
        }

        fn expected(&self, item: ItemId) -> Option<&str> {
            self.0.iter().find(|(id, _)| *id == item).map(|(_, v)| *v)
        }
    }

    #[test]
    fn sheet_empty_value_clears() {
        let mut sheet = AnswerSheet::new();
        sheet.set(1, "a");
        assert_eq!(sheet.get(1), Some("a"));
        sheet.set(1, "");
        assert_eq!(sheet.get(1), None);
        assert!(sheet.is_empty());
    }

    #[test]
    fn sheet_holders() {
        let sheet: AnswerSheet = vec![(1, "a".to_string()), (2, "b".into()), (3, "a".into())]
            .into_iter()
            .collect();
        assert_eq!(sheet.holders_of("a"), vec![1, 3]);
        assert_eq!(sheet.answered_count(), 3);
    }

    #[test]
    fn sheet_serializes_as_map() {
        let sheet: AnswerSheet = vec![(2, "c".to_string())].into_iter().collect();
        let json = serde_json::to_string(&sheet).unwrap();
        assert_eq!(json, r#"{"2":"c"}"#);
        let back: AnswerSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sheet);
    }

    #[test]
    fn view_locks_while_revealed() {
        let key = FixedKey(vec![(1, "a")]);
        let mut sheet = AnswerSheet::new();

        let mut view = PartView::new(&key, &mut sheet, false);
        assert!(view.set_answer(1, "a"));
        assert!(view.is_correct(1));
        assert!(view.feedback().is_none());

        let mut view = PartView::new(&key, &mut sheet, true);
        assert!(!view.set_answer(1, "b"));
        assert_eq!(view.answer(1), Some("a"));
        let fb = view.feedback().unwrap();
        assert_eq!(fb.len(), 1);
        assert!(fb[0].correct);
    }

    #[test]
    fn part_sheets_index_by_kind() {
        let mut sheets = PartSheets::new();
        sheets.get_mut(PartKind::Teil2).set(6, "b");
        assert_eq!(sheets.get(PartKind::Teil2).get(6), Some("b"));
        assert!(sheets.get(PartKind::Teil1).is_empty());
        assert!(!sheets.is_empty());
        sheets.clear_all();
        assert!(sheets.is_empty());
    }

    #[test]
    fn unanswered_is_never_correct() {
        let key = FixedKey(vec![(1, "a"), (2, "b")]);
        let sheet = AnswerSheet::new();
        assert!(!is_correct(&key, &sheet, 1));
        assert_eq!(correct_count(&key, &sheet), 0);
        let fb = feedback(&key, &sheet);
        assert_eq!(fb[1].expected.as_deref(), Some("b"));
        assert_eq!(fb[1].given, None);
    }
}
