//! Progress initialization
//!
//! Builds the working set for an instance from three sources, in order of
//! precedence:
//! 1. the backend instance record (photos, completion),
//! 2. the local completion cache (completion when the backend has none, notes),
//! 3. the template defaults.

use crate::error::ProgressError;
use crate::matcher::InstanceItemMatcher;
use crate::progress::{ItemProgress, ProgressItem};
use crate::store::ProgressStore;
use checklist_model::{ChecklistInstance, ChecklistTemplate, CompletionRecord, ItemId};
use std::collections::HashMap;

/// Base id for a template item; missing or zero ids take `position + 1`
#[must_use]
pub fn resolve_base_id(template_id: Option<u64>, position: usize) -> u64 {
    match template_id {
        Some(id) if id > 0 => id,
        _ => {
            let fallback = position as u64 + 1;
            tracing::warn!(
                "Template item at position {} has no id, using {}",
                position,
                fallback
            );
            fallback
        }
    }
}

/// Merge template, instance record and cache into progress records
///
/// One record per template item, in template order, keyed by the compound
/// id `<instance_id>_<base_id>`.
///
/// # Errors
/// [`ProgressError::InvalidId`] when `instance_id` is zero.
pub fn initialize_progress(
    template: &ChecklistTemplate,
    instance: Option<&ChecklistInstance>,
    instance_id: u64,
    cache: &HashMap<String, CompletionRecord>,
) -> Result<Vec<ItemProgress>, ProgressError> {
    let matcher = InstanceItemMatcher::new();
    let instance_items = instance.map(ChecklistInstance::items);

    let mut records = Vec::with_capacity(template.items.len());
    for (position, template_item) in template.items.iter().enumerate() {
        let base_id = resolve_base_id(template_item.id, position);
        let id = ItemId::compound(instance_id, base_id)?;

        let instance_item = matcher.find_instance_item(instance_items, base_id);
        let status = matcher.completion_status(instance_item);
        let cached = cache.get(&id.to_string());

        let mut template_item = template_item.clone();
        template_item.id = Some(base_id);
        let mut progress = ItemProgress::new(ProgressItem::new(id, template_item, position));
        progress.photos = matcher.extract_photos(instance_item);
        progress.completed = status.is_completed;
        progress.completed_at = status.completed_at;

        if let Some(cached) = cached {
            if !status.is_completed {
                progress.completed = cached.completed;
                progress.completed_at = cached.completed_at.or(progress.completed_at);
            }
            progress.notes.clone_from(&cached.notes);
        }

        records.push(progress);
    }

    tracing::debug!(
        "Initialized {} progress records for instance {} ({} backend items, {} cached)",
        records.len(),
        instance_id,
        instance_items.map_or(0, <[_]>::len),
        cache.len()
    );
    Ok(records)
}

impl ProgressStore {
    /// Scope the store to `instance_id` and load its working set
    ///
    /// Reads the local cache for the instance, merges it with the template
    /// and instance record, and applies roll-up. Nothing is written.
    ///
    /// # Errors
    /// [`ProgressError::InvalidId`] when `instance_id` is zero.
    pub fn load_instance(
        &mut self,
        template: &ChecklistTemplate,
        instance: Option<&ChecklistInstance>,
        instance_id: u64,
    ) -> Result<(), ProgressError> {
        self.set_instance_id(instance_id);
        let cache = self.load_from_storage();
        let records = initialize_progress(template, instance, instance_id, &cache)?;
        self.set_item_progress(records);
        tracing::info!(
            "Loaded instance {} of template {}: {}/{} items complete",
            instance_id,
            template.id,
            self.completed_items_count(),
            self.total_items_count()
        );
        Ok(())
    }
}
