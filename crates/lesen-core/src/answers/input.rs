//! Input modalities for the matching parts.
//!
//! Drag-and-drop ([`DragGesture`]) and click-to-assign ([`ClickFocus`]) are
//! two callers of the same [`Assign`] capability. Neither holds answers;
//! they only track gesture state and forward the final mutation.

use crate::answers::PartView;
use crate::model::{ItemId, Teil1Content, Teil3Content};

/// Assign a choice (headline, ad) to a target item.
pub trait Assign {
    /// Assign `choice` to `target`, replacing any previous choice.
    fn assign(&mut self, target: ItemId, choice: &str) -> bool;

    /// Remove the choice held by `target`.
    fn unassign(&mut self, target: ItemId) -> bool;

    /// The choice `target` currently holds.
    fn assigned(&self, target: ItemId) -> Option<&str>;
}

impl Assign for PartView<'_, Teil1Content> {
    fn assign(&mut self, target: ItemId, choice: &str) -> bool {
        self.set_answer(target, choice)
    }

    fn unassign(&mut self, target: ItemId) -> bool {
        self.clear_answer(target)
    }

    fn assigned(&self, target: ItemId) -> Option<&str> {
        self.answer(target)
    }
}

impl Assign for PartView<'_, Teil3Content> {
    fn assign(&mut self, target: ItemId, choice: &str) -> bool {
        self.set_answer(target, choice)
    }

    fn unassign(&mut self, target: ItemId) -> bool {
        self.clear_answer(target)
    }

    fn assigned(&self, target: ItemId) -> Option<&str> {
        self.answer(target)
    }
}

/// Drag state: which choice is being dragged and which target it hovers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragGesture {
    dragging: Option<String>,
    over: Option<ItemId>,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, choice: &str) {
        self.dragging = Some(choice.to_string());
        self.over = None;
    }

    pub fn hover(&mut self, target: ItemId) {
        if self.dragging.is_some() {
            self.over = Some(target);
        }
    }

    pub fn leave(&mut self) {
        self.over = None;
    }

    /// Abandon the drag without assigning anything.
    pub fn cancel(&mut self) {
        self.dragging = None;
        self.over = None;
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn hovering(&self) -> Option<ItemId> {
        self.over
    }

    /// Drop the dragged choice onto `target`. The gesture ends either way.
    pub fn drop_on<A: Assign + ?Sized>(&mut self, model: &mut A, target: ItemId) -> bool {
        self.over = None;
        match self.dragging.take() {
            Some(choice) => model.assign(target, &choice),
            None => false,
        }
    }
}

/// Click state: which target has focus.
///
/// Picking the choice the focused target already holds clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickFocus {
    focused: Option<ItemId>,
}

impl ClickFocus {
    pub fn new(initial: Option<ItemId>) -> Self {
        Self { focused: initial }
    }

    pub fn focus(&mut self, target: ItemId) {
        self.focused = Some(target);
    }

    pub fn focused(&self) -> Option<ItemId> {
        self.focused
    }

    pub fn pick<A: Assign + ?Sized>(&self, model: &mut A, choice: &str) -> bool {
        let Some(target) = self.focused else {
            return false;
        };
        if model.assigned(target) == Some(choice) {
            model.unassign(target)
        } else {
            model.assign(target, choice)
        }
    }
}
