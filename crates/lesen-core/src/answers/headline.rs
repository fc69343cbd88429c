//! Teil 1: match a headline to every text.
//!
//! One headline per text; assigning again overwrites. Nothing stops two
//! texts from holding the same headline, but the key uses each headline at
//! most once, so at most one of them can score.

use crate::answers::{AnswerKey, PartView};
use crate::model::{Headline, ItemId, ReadingText, Teil1Content};

pub type HeadlineMatching<'a> = PartView<'a, Teil1Content>;

impl AnswerKey for Teil1Content {
    fn item_ids(&self) -> Vec<ItemId> {
        self.answers.iter().map(|a| a.text_id).collect()
    }

    fn expected(&self, item: ItemId) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.text_id == item)
            .map(|a| a.headline_id.as_str())
    }
}

impl PartView<'_, Teil1Content> {
    pub fn texts(&self) -> &[ReadingText] {
        &self.content().texts
    }

    pub fn headlines(&self) -> &[Headline] {
        &self.content().headlines
    }

    pub fn headline(&self, id: &str) -> Option<&Headline> {
        self.content().headlines.iter().find(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerSheet;
    use crate::model::HeadlineAnswer;

    fn content() -> Teil1Content {
        Teil1Content {
            instruction: String::new(),
            texts: (1..=3)
                .map(|id| ReadingText {
                    id,
                    text: format!("Text {id}"),
                })
                .collect(),
            headlines: ["a", "b", "c", "d"]
                .iter()
                .map(|id| Headline {
                    id: id.to_string(),
                    text: format!("Headline {id}"),
                })
                .collect(),
            answers: vec![
                HeadlineAnswer {
                    text_id: 1,
                    headline_id: "c".into(),
                },
                HeadlineAnswer {
                    text_id: 2,
                    headline_id: "a".into(),
                },
                HeadlineAnswer {
                    text_id: 3,
                    headline_id: "d".into(),
                },
            ],
        }
    }

    #[test]
    fn reassigning_overwrites() {
        let content = content();
        let mut sheet = AnswerSheet::new();
        let mut view = HeadlineMatching::new(&content, &mut sheet, false);

        view.set_answer(1, "a");
        view.set_answer(1, "c");
        assert_eq!(view.answer(1), Some("c"));
        assert_eq!(view.answered_count(), 1);
        assert!(view.is_correct(1));
    }

    #[test]
    fn duplicate_assignment_scores_at_most_once() {
        let content = content();
        let mut sheet = AnswerSheet::new();
        let mut view = HeadlineMatching::new(&content, &mut sheet, false);

        view.set_answer(1, "a");
        view.set_answer(2, "a");
        assert_eq!(view.holders_of("a"), vec![1, 2]);
        assert_eq!(view.correct_count(), 1);
        assert!(!view.is_correct(1));
        assert!(view.is_correct(2));
    }

    #[test]
    fn unknown_headline_is_just_wrong() {
        let content = content();
        let mut sheet = AnswerSheet::new();
        let mut view = HeadlineMatching::new(&content, &mut sheet, false);

        assert!(view.set_answer(3, "zz"));
        assert!(!view.is_correct(3));
        assert!(view.headline("zz").is_none());
        assert_eq!(view.headline("d").map(|h| h.text.as_str()), Some("Headline d"));
        assert_eq!(view.total(), 3);
    }
}
