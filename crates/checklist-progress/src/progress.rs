//! Item progress records
//!
//! One [`ItemProgress`] exists per template item of the loaded instance.

use chrono::{DateTime, Utc};
use checklist_model::{ChecklistTemplateItem, CompletionRecord, ItemId, RawItemId};
use serde::{Deserialize, Serialize};

/// Template item as held by the progress store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressItem {
    /// Store key (compound once an instance is loaded)
    pub id: ItemId,
    /// Template item id, used for backend calls and parent matching
    pub base_item_id: u64,
    /// Position in the template item list
    pub original_position: usize,
    /// Template definition
    pub template: ChecklistTemplateItem,
}

impl ProgressItem {
    /// Wrap a template item under an explicit id
    #[must_use]
    pub fn new(id: ItemId, template: ChecklistTemplateItem, original_position: usize) -> Self {
        Self {
            base_item_id: id.base_id(),
            id,
            original_position,
            template,
        }
    }

    /// Top-level item
    #[inline]
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.template.is_top_level()
    }

    /// Sub-item
    #[inline]
    #[must_use]
    pub fn is_sub_item(&self) -> bool {
        self.template.is_sub_item()
    }

    /// Whether a sub-item with this `parent_id` belongs to this item
    ///
    /// Parents are referenced by `order_index` or by base item id.
    #[must_use]
    pub fn is_parent_of(&self, child: &Self) -> bool {
        if !self.is_top_level() || !child.is_sub_item() {
            return false;
        }
        child.template.parent_id.is_some_and(|parent| {
            self.template.order_index == Some(parent) || self.base_item_id == parent
        })
    }

    /// Photos needed for photo-driven completion
    ///
    /// An item without a minimum completes on its first photo.
    #[inline]
    #[must_use]
    pub fn completion_threshold(&self) -> usize {
        self.template.min_photos().max(1) as usize
    }
}

/// Mutable progress of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProgress {
    /// Item definition and keys
    pub item: ProgressItem,
    /// Completion flag
    pub completed: bool,
    /// Photo URLs in upload order
    pub photos: Vec<String>,
    /// Operator notes
    pub notes: String,
    /// When the item became complete
    pub completed_at: Option<DateTime<Utc>>,
}

impl ItemProgress {
    /// Fresh, incomplete record
    #[must_use]
    pub fn new(item: ProgressItem) -> Self {
        Self {
            item,
            completed: false,
            photos: Vec::new(),
            notes: String::new(),
            completed_at: None,
        }
    }

    /// Store key
    #[inline]
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Snapshot tuple for persistence
    #[must_use]
    pub fn to_record(&self) -> CompletionRecord {
        CompletionRecord {
            item_id: RawItemId::from(self.item.id),
            completed: self.completed,
            completed_at: self.completed_at,
            notes: self.notes.clone(),
        }
    }

    /// Set the completion flag, stamping or clearing the time on transitions
    ///
    /// Returns whether the flag changed.
    pub(crate) fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) -> bool {
        if completed == self.completed {
            if completed && self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            return false;
        }
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        true
    }
}

/// Partial update for [`ProgressStore::update_item_progress`](crate::ProgressStore::update_item_progress)
///
/// Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressPatch {
    /// New completion flag
    pub completed: Option<bool>,
    /// Replacement photo list
    pub photos: Option<Vec<String>>,
    /// Replacement notes
    pub notes: Option<String>,
    /// Replacement completion time (`Some(None)` clears it)
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl ProgressPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set completion flag
    #[inline]
    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Replace photos
    #[inline]
    #[must_use]
    pub fn photos(mut self, photos: Vec<String>) -> Self {
        self.photos = Some(photos);
        self
    }

    /// Replace notes
    #[inline]
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Replace completion time
    #[inline]
    #[must_use]
    pub fn completed_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn apply(self, progress: &mut ItemProgress) {
        if let Some(completed) = self.completed {
            progress.completed = completed;
        }
        if let Some(photos) = self.photos {
            progress.photos = photos;
        }
        if let Some(notes) = self.notes {
            progress.notes = notes;
        }
        if let Some(at) = self.completed_at {
            progress.completed_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_item(
        base: u64,
        order: u64,
        level: Option<u8>,
        parent: Option<u64>,
    ) -> ProgressItem {
        ProgressItem::new(
            ItemId::compound(1, base).unwrap(),
            ChecklistTemplateItem {
                id: Some(base),
                order_index: Some(order),
                level,
                parent_id: parent,
                ..ChecklistTemplateItem::default()
            },
            0,
        )
    }

    #[test]
    fn parent_matching_by_order_or_base_id() {
        let parent = progress_item(10, 2, Some(0), None);
        assert!(parent.is_parent_of(&progress_item(11, 3, Some(1), Some(2))));
        assert!(parent.is_parent_of(&progress_item(12, 4, Some(1), Some(10))));
        assert!(!parent.is_parent_of(&progress_item(13, 5, Some(1), Some(99))));
        assert!(!parent.is_parent_of(&progress_item(14, 6, None, Some(2))));
    }

    #[test]
    fn threshold_is_at_least_one() {
        let mut item = progress_item(1, 1, None, None);
        assert_eq!(item.completion_threshold(), 1);
        item.template.min_photos = Some(3);
        assert_eq!(item.completion_threshold(), 3);
    }

    #[test]
    fn set_completed_stamps_transitions() {
        let now = Utc::now();
        let mut progress = ItemProgress::new(progress_item(1, 1, None, None));
        assert!(progress.set_completed(true, now));
        assert_eq!(progress.completed_at, Some(now));
        assert!(!progress.set_completed(true, now + chrono::Duration::seconds(5)));
        assert_eq!(progress.completed_at, Some(now));
        assert!(progress.set_completed(false, now));
        assert_eq!(progress.completed_at, None);
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut progress = ItemProgress::new(progress_item(1, 1, None, None));
        progress.notes = "keep".to_string();
        ProgressPatch::new().completed(true).apply(&mut progress);
        assert!(progress.completed);
        assert_eq!(progress.notes, "keep");
        assert!(ProgressPatch::new().is_empty());
    }

    #[test]
    fn record_uses_compound_text() {
        let progress = ItemProgress::new(progress_item(950, 1, None, None));
        assert_eq!(progress.to_record().item_id, RawItemId::from("1_950"));
    }
}
