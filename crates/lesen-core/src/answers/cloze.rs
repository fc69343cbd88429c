//! Sprachbausteine: fill in the blanks.
//!
//! A blank with an option list is a constrained choice, anything else is
//! free text. Both are graded after trimming and lowercasing.

use crate::answers::{AnswerKey, PartView};
use crate::model::{BlankInput, ClozeContent, ItemId, Segment};

pub type Cloze<'a> = PartView<'a, ClozeContent>;

/// Canonical form used for blank comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl AnswerKey for ClozeContent {
    fn item_ids(&self) -> Vec<ItemId> {
        self.answers.iter().map(|a| a.id).collect()
    }

    fn expected(&self, item: ItemId) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.id == item)
            .map(|a| a.answer.as_str())
    }

    fn grade(&self, item: ItemId, given: &str) -> bool {
        let given = normalize(given);
        !given.is_empty()
            && self
                .expected(item)
                .is_some_and(|expected| normalize(expected) == given)
    }
}

impl PartView<'_, ClozeContent> {
    pub fn segments(&self) -> &[Segment] {
        &self.content().segments
    }

    pub fn input_for(&self, blank: ItemId) -> BlankInput<'_> {
        self.content().input_for(blank)
    }

    pub fn uses_dropdowns(&self) -> bool {
        self.content().uses_dropdowns()
    }
}
