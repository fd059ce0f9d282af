//! Instance/template matching
//!
//! Instance items reference their template item inconsistently across
//! backend versions: by row id, by `template_item_id` or by `item_id`.
//! [`InstanceItemMatcher`] tries each in turn.

use chrono::{DateTime, Utc};
use checklist_model::{InstanceItem, InstancePhoto};

/// Which field produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    /// Instance item `id` equals the template item id
    ExactId,
    /// `template_item_id` equals the template item id
    TemplateItemId,
    /// `item_id` equals the template item id
    ItemId,
}

impl MatchStrategy {
    /// Strategies in the order they are tried
    pub const ORDER: [Self; 3] = [Self::ExactId, Self::TemplateItemId, Self::ItemId];

    fn matches(self, item: &InstanceItem, target: u64) -> bool {
        match self {
            Self::ExactId => item.id.as_ref().and_then(|id| id.as_u64()) == Some(target),
            Self::TemplateItemId => item.template_item_id == Some(target),
            Self::ItemId => item.item_id == Some(target),
        }
    }
}

/// Completion recorded by the backend for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionStatus {
    /// Backend completion flag
    pub is_completed: bool,
    /// Parsed completion time
    pub completed_at: Option<DateTime<Utc>>,
}

/// Reconciles template items with recorded instance items
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceItemMatcher;

impl InstanceItemMatcher {
    /// Create new matcher
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Find the instance item for a template item id
    ///
    /// Returns the match of the first strategy in [`MatchStrategy::ORDER`]
    /// that yields one.
    #[must_use]
    pub fn find_instance_item<'a>(
        &self,
        items: Option<&'a [InstanceItem]>,
        target: u64,
    ) -> Option<&'a InstanceItem> {
        self.find_with_strategy(items, target).map(|(item, _)| item)
    }

    /// Like [`find_instance_item`](Self::find_instance_item), also reporting the strategy used
    #[must_use]
    pub fn find_with_strategy<'a>(
        &self,
        items: Option<&'a [InstanceItem]>,
        target: u64,
    ) -> Option<(&'a InstanceItem, MatchStrategy)> {
        let items = items.filter(|items| !items.is_empty())?;
        MatchStrategy::ORDER.into_iter().find_map(|strategy| {
            items
                .iter()
                .find(|item| strategy.matches(item, target))
                .map(|item| (item, strategy))
        })
    }

    /// Photo URLs of an instance item, skipping entries without a URL
    #[must_use]
    pub fn extract_photos(&self, item: Option<&InstanceItem>) -> Vec<String> {
        item.map(|item| {
            item.photos
                .iter()
                .filter_map(|photo| photo.file_url.as_deref())
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Number of video submissions on an instance item
    #[must_use]
    pub fn count_videos(&self, item: Option<&InstanceItem>) -> usize {
        item.map_or(0, |item| item.photos.iter().filter(|p| p.is_video()).count())
    }

    /// Completion recorded for an instance item
    #[must_use]
    pub fn completion_status(&self, item: Option<&InstanceItem>) -> CompletionStatus {
        item.map(|item| CompletionStatus {
            is_completed: item.is_completed,
            completed_at: item.completed_at(),
        })
        .unwrap_or_default()
    }

    /// Photo record at `index` on an instance item
    #[must_use]
    pub fn photo_by_index<'a>(
        &self,
        item: Option<&'a InstanceItem>,
        index: usize,
    ) -> Option<&'a InstancePhoto> {
        item.and_then(|item| item.photos.get(index))
    }

    /// Search every instance item for the photo record with this URL
    #[must_use]
    pub fn find_photo_by_url<'a>(
        &self,
        items: Option<&'a [InstanceItem]>,
        url: &str,
    ) -> Option<&'a InstancePhoto> {
        items?
            .iter()
            .flat_map(|item| item.photos.iter())
            .find(|photo| photo.file_url.as_deref() == Some(url))
    }
}
