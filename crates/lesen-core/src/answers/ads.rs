//! Teil 3: match an ad to every situation, or say none fits.
//!
//! The sentinel [`NO_MATCH`] is always selectable and never correct.

use crate::answers::{AnswerKey, PartView};
use crate::model::{Ad, ItemId, Situation, Teil3Content};

/// "No ad fits this situation."
pub const NO_MATCH: &str = "X";

pub type AdMatching<'a> = PartView<'a, Teil3Content>;

impl AnswerKey for Teil3Content {
    fn item_ids(&self) -> Vec<ItemId> {
        self.answers.iter().map(|a| a.situation_id).collect()
    }

    fn expected(&self, item: ItemId) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.situation_id == item)
            .map(|a| a.ad_id.as_str())
    }

    fn grade(&self, item: ItemId, given: &str) -> bool {
        given != NO_MATCH && !given.is_empty() && self.expected(item) == Some(given)
    }
}

impl PartView<'_, Teil3Content> {
    pub fn situations(&self) -> &[Situation] {
        &self.content().situations
    }

    pub fn ads(&self) -> &[Ad] {
        &self.content().ads
    }

    /// Every selectable value: the ad ids followed by the sentinel.
    pub fn choices(&self) -> Vec<&str> {
        self.content()
            .ads
            .iter()
            .map(|a| a.id.as_str())
            .chain(std::iter::once(NO_MATCH))
            .collect()
    }
}
