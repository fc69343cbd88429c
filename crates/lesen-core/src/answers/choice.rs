//! Teil 2: one option per question, no partial credit.

use crate::answers::{AnswerKey, PartView};
use crate::model::{ItemId, McQuestion, Passage, Teil2Content};

pub type MultipleChoice<'a> = PartView<'a, Teil2Content>;

impl AnswerKey for Teil2Content {
    fn item_ids(&self) -> Vec<ItemId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    fn expected(&self, item: ItemId) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.id == item)
            .map(|q| q.answer_id.as_str())
    }
}

impl PartView<'_, Teil2Content> {
    pub fn passage(&self) -> &Passage {
        &self.content().passage
    }

    pub fn questions(&self) -> &[McQuestion] {
        &self.content().questions
    }

    /// Select an option, replacing the previous selection for the question.
    pub fn select(&mut self, question: ItemId, option: &str) -> bool {
        self.set_answer(question, option)
    }
}
