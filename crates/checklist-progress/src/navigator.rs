//! Step navigation
//!
//! Steps are 1-based positions in the flattened progress list. Only
//! top-level positions are navigable; a step shows its top-level item
//! followed by the sub-items listed after it.

use crate::error::NavigationError;
use crate::progress::ItemProgress;

/// Wizard position over a progress list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepNavigator {
    current_step: usize,
    review_mode: bool,
}

impl Default for StepNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl StepNavigator {
    /// Start at step 1, outside review mode
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_step: 1,
            review_mode: false,
        }
    }

    /// Current 1-based step
    #[inline]
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Whether every item is shown at once
    #[inline]
    #[must_use]
    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }

    /// Show every item
    #[inline]
    pub fn enter_review(&mut self) {
        self.review_mode = true;
    }

    /// Return to step-by-step display
    #[inline]
    pub fn exit_review(&mut self) {
        self.review_mode = false;
    }

    /// Items to render for the current step
    ///
    /// In review mode this is the whole list. A step that resolves to a
    /// sub-item or lies past the end shows nothing.
    #[must_use]
    pub fn items_to_show<'a>(&self, items: &'a [ItemProgress]) -> Vec<&'a ItemProgress> {
        if self.review_mode {
            return items.iter().collect();
        }
        let Some(index) = self.current_step.checked_sub(1) else {
            return Vec::new();
        };
        let Some(current) = items.get(index) else {
            return Vec::new();
        };
        if current.item.is_sub_item() {
            return Vec::new();
        }

        let mut shown = vec![current];
        shown.extend(
            items[index + 1..]
                .iter()
                .take_while(|next| !next.item.is_top_level())
                .filter(|next| current.item.is_parent_of(&next.item)),
        );
        shown
    }

    /// Advance to the next top-level step
    ///
    /// Stays put when no top-level item follows. Returns whether the step changed.
    pub fn next(&mut self, items: &[ItemProgress]) -> bool {
        match next_top_level(items, self.current_step) {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    /// Go back to the previous top-level step
    ///
    /// Stays put when no top-level item precedes. Returns whether the step changed.
    pub fn previous(&mut self, items: &[ItemProgress]) -> bool {
        match previous_top_level(items, self.current_step) {
            Some(step) => {
                self.current_step = step;
                true
            }
            None => false,
        }
    }

    /// Jump to `step`
    ///
    /// # Errors
    /// [`NavigationError::OutOfRange`] outside `1..=items.len()`,
    /// [`NavigationError::SubItem`] when the step is a sub-item.
    pub fn go_to(&mut self, step: usize, items: &[ItemProgress]) -> Result<(), NavigationError> {
        let Some(target) = step.checked_sub(1).and_then(|index| items.get(index)) else {
            return Err(NavigationError::OutOfRange {
                step,
                len: items.len(),
            });
        };
        if target.item.is_sub_item() {
            return Err(NavigationError::SubItem(step));
        }
        self.current_step = step;
        Ok(())
    }

    /// Jump to `step` and leave review mode
    ///
    /// # Errors
    /// As [`go_to`](Self::go_to); review mode is kept on failure.
    pub fn go_to_and_exit_review(
        &mut self,
        step: usize,
        items: &[ItemProgress],
    ) -> Result<(), NavigationError> {
        self.go_to(step, items)?;
        self.review_mode = false;
        Ok(())
    }

    /// No top-level step before the current one
    #[must_use]
    pub fn is_first(&self, items: &[ItemProgress]) -> bool {
        previous_top_level(items, self.current_step).is_none()
    }

    /// No top-level step after the current one
    #[must_use]
    pub fn is_last(&self, items: &[ItemProgress]) -> bool {
        next_top_level(items, self.current_step).is_none()
    }
}

fn next_top_level(items: &[ItemProgress], step: usize) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .skip(step)
        .find(|(_, p)| !p.item.is_sub_item())
        .map(|(index, _)| index + 1)
}

fn previous_top_level(items: &[ItemProgress], step: usize) -> Option<usize> {
    let end = step.saturating_sub(1).min(items.len());
    items[..end]
        .iter()
        .rposition(|p| !p.item.is_sub_item())
        .map(|index| index + 1)
}

/// Hierarchical label for the item at `position`
///
/// `"Item N"` for top-level items, counting top-level items only.
/// `"Sub-item P.S"` for sub-items, where `P` is the parent's 1-based
/// position in the list and `S` the sub-item's ordinal under that parent.
/// A sub-item without a parent falls back to `"Sub-item <position + 1>"`.
#[must_use]
pub fn item_label(items: &[ItemProgress], position: usize) -> String {
    let Some(progress) = items.get(position) else {
        return format!("Item {}", position + 1);
    };

    if progress.item.is_sub_item() {
        let parent = items[..position]
            .iter()
            .rposition(|p| p.item.is_parent_of(&progress.item))
            .or_else(|| items.iter().position(|p| p.item.is_parent_of(&progress.item)));

        return match parent {
            Some(parent) => {
                let (from, to) = if parent < position {
                    (parent + 1, position)
                } else {
                    (position, position)
                };
                let ordinal = 1 + items[from..to]
                    .iter()
                    .filter(|p| {
                        p.item.is_sub_item()
                            && p.item.template.parent_id == progress.item.template.parent_id
                    })
                    .count();
                format!("Sub-item {}.{}", parent + 1, ordinal)
            }
            None => format!("Sub-item {}", position + 1),
        };
    }

    let ordinal = 1 + items[..position]
        .iter()
        .filter(|p| p.item.is_top_level())
        .count();
    format!("Item {ordinal}")
}
