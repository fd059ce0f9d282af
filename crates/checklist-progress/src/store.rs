//! Progress state store
//!
//! [`ProgressStore`] owns the flattened, ordered [`ItemProgress`] list of the
//! loaded instance. Every mutation:
//! 1. applies to the addressed record,
//! 2. re-evaluates parent roll-up through the [`ParentIndex`],
//! 3. writes the completion snapshot through the [`PersistenceAdapter`].
//!
//! # Roll-up
//! A top-level item with sub-items is complete exactly when all of its
//! sub-items are complete, regardless of its own photos. Top-level items
//! without sub-items keep their own state.
//!
//! # Metrics
//! Percentage and item counts consider top-level items only. The required
//! status counts required items at every level.

use crate::error::{PersistenceError, ProgressError};
use crate::hierarchy::ParentIndex;
use crate::persistence::{
    decode_snapshot, encode_snapshot, storage_key, MemoryAdapter, PersistenceAdapter,
};
use crate::progress::{ItemProgress, ProgressPatch};
use chrono::{DateTime, Utc};
use checklist_model::{CompletionRecord, InstanceStatus, ItemId, ProgressSnapshot, UpdatePayload};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Completed vs. total required items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequiredStatus {
    /// Required items that are complete
    pub completed: usize,
    /// Required items
    pub total: usize,
}

impl RequiredStatus {
    /// Whether every required item is complete
    #[inline]
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.completed == self.total
    }
}

/// In-memory progress of one checklist instance
pub struct ProgressStore {
    items: Vec<ItemProgress>,
    positions: HashMap<ItemId, usize>,
    hierarchy: ParentIndex,
    instance_id: Option<u64>,
    persistence: Arc<dyn PersistenceAdapter>,
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore")
            .field("instance_id", &self.instance_id)
            .field("items", &self.items.len())
            .field("parents", &self.hierarchy.parents().count())
            .finish_non_exhaustive()
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ProgressStore {
    /// Create an empty store writing through `persistence`
    #[must_use]
    pub fn new(persistence: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
            hierarchy: ParentIndex::default(),
            instance_id: None,
            persistence,
        }
    }

    /// Create an empty store backed by a private [`MemoryAdapter`]
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryAdapter::new()))
    }

    // ------------------------------------------------------------------
    // Instance scope
    // ------------------------------------------------------------------

    /// Scope persistence to an instance
    #[inline]
    pub fn set_instance_id(&mut self, instance_id: u64) {
        self.instance_id = Some(instance_id);
    }

    /// Current instance
    #[inline]
    #[must_use]
    pub fn instance_id(&self) -> Option<u64> {
        self.instance_id
    }

    /// Storage key of the current instance
    #[inline]
    #[must_use]
    pub fn storage_key(&self) -> Option<String> {
        self.instance_id.map(storage_key)
    }

    /// Drop all records and the instance scope
    pub fn reset(&mut self) {
        self.items.clear();
        self.positions.clear();
        self.hierarchy = ParentIndex::default();
        self.instance_id = None;
    }

    // ------------------------------------------------------------------
    // Working set
    // ------------------------------------------------------------------

    /// All records in presentation order
    #[inline]
    #[must_use]
    pub fn item_progress(&self) -> &[ItemProgress] {
        &self.items
    }

    /// Replace the working set
    ///
    /// Rebuilds the id lookup and parent index, then applies roll-up.
    /// Does not write to storage.
    pub fn set_item_progress(&mut self, items: Vec<ItemProgress>) {
        self.positions = items
            .iter()
            .enumerate()
            .map(|(pos, progress)| (progress.id(), pos))
            .collect();
        if self.positions.len() != items.len() {
            tracing::warn!(
                "Progress list has duplicate ids: {} records, {} distinct",
                items.len(),
                self.positions.len()
            );
        }
        self.hierarchy = ParentIndex::build(&items);
        self.items = items;
        self.roll_up(Utc::now());
        tracing::debug!(
            "Loaded {} progress records ({} parents with sub-items)",
            self.items.len(),
            self.hierarchy.parents().count()
        );
    }

    /// Record for `id`
    #[must_use]
    pub fn find_item_progress(&self, id: &ItemId) -> Option<&ItemProgress> {
        self.position(id).map(|pos| &self.items[pos])
    }

    /// Position of `id` in the list
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Parent index built at load
    #[inline]
    #[must_use]
    pub fn hierarchy(&self) -> &ParentIndex {
        &self.hierarchy
    }

    /// Sub-items rolling up into `id`
    #[must_use]
    pub fn sub_items(&self, id: &ItemId) -> Vec<&ItemProgress> {
        self.position(id)
            .map(|pos| {
                self.hierarchy
                    .children(pos)
                    .iter()
                    .map(|child| &self.items[*child])
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Merge `patch` into the record for `id`
    ///
    /// An empty patch still re-runs roll-up and persistence.
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown; nothing changes.
    pub fn update_item_progress(
        &mut self,
        id: &ItemId,
        patch: ProgressPatch,
    ) -> Result<(), ProgressError> {
        self.mutate(id, |progress, _| {
            patch.apply(progress);
            Ok(())
        })
    }

    /// Flip completion; stamps the time when completing, clears it otherwise
    ///
    /// Returns the stored flag after roll-up. A parent with sub-items keeps
    /// the state its sub-items dictate, so toggling it may not change it.
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown.
    pub fn toggle_item_completion(&mut self, id: &ItemId) -> Result<bool, ProgressError> {
        let (pos, ()) = self.mutate_at(id, |progress, now| {
            let completed = !progress.completed;
            progress.set_completed(completed, now);
            Ok(())
        })?;
        Ok(self.items[pos].completed)
    }

    /// Mark complete without photo evidence
    ///
    /// Keeps an existing note, otherwise records `default_note`. Returns
    /// whether the item is complete after roll-up; `false` for a parent
    /// with an incomplete sub-item (the note is still recorded).
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown.
    pub fn mark_as_verified(
        &mut self,
        id: &ItemId,
        default_note: &str,
    ) -> Result<bool, ProgressError> {
        let (pos, ()) = self.mutate_at(id, |progress, now| {
            progress.completed = true;
            progress.completed_at = Some(now);
            if progress.notes.is_empty() {
                progress.notes = default_note.to_string();
            }
            Ok(())
        })?;
        let progress = &self.items[pos];
        if !progress.completed {
            tracing::debug!("{} has incomplete sub-items; verification not kept", progress.item.id);
        }
        Ok(progress.completed)
    }

    /// Append a photo and recompute photo-driven completion
    ///
    /// The item completes once its photo count reaches
    /// [`completion_threshold`](crate::ProgressItem::completion_threshold).
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown.
    pub fn add_photo(&mut self, id: &ItemId, url: impl Into<String>) -> Result<(), ProgressError> {
        let url = url.into();
        self.mutate(id, |progress, now| {
            progress.photos.push(url);
            recompute_photo_completion(progress, now);
            Ok(())
        })
    }

    /// Remove the photo at `index`, returning its URL
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown,
    /// [`ProgressError::PhotoIndexOutOfRange`] when `index` is past the end.
    pub fn remove_photo(&mut self, id: &ItemId, index: usize) -> Result<String, ProgressError> {
        let item = *id;
        self.mutate(id, |progress, now| {
            if index >= progress.photos.len() {
                return Err(ProgressError::PhotoIndexOutOfRange {
                    item,
                    index,
                    len: progress.photos.len(),
                });
            }
            let removed = progress.photos.remove(index);
            recompute_photo_completion(progress, now);
            Ok(removed)
        })
    }

    /// Remove every occurrence of `url`
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown,
    /// [`ProgressError::PhotoNotFound`] when the item does not hold `url`.
    pub fn remove_photo_by_url(&mut self, id: &ItemId, url: &str) -> Result<(), ProgressError> {
        let item = *id;
        self.mutate(id, |progress, now| {
            let before = progress.photos.len();
            progress.photos.retain(|p| p != url);
            if progress.photos.len() == before {
                return Err(ProgressError::PhotoNotFound {
                    item,
                    url: url.to_string(),
                });
            }
            recompute_photo_completion(progress, now);
            Ok(())
        })
    }

    /// Clear photos and completion
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown.
    pub fn remove_all_photos(&mut self, id: &ItemId) -> Result<(), ProgressError> {
        self.mutate(id, |progress, _| {
            progress.photos.clear();
            progress.completed = false;
            progress.completed_at = None;
            Ok(())
        })
    }

    /// Replace notes
    ///
    /// # Errors
    /// [`ProgressError::ItemNotFound`] when `id` is unknown.
    pub fn update_notes(
        &mut self,
        id: &ItemId,
        notes: impl Into<String>,
    ) -> Result<(), ProgressError> {
        let notes = notes.into();
        self.mutate(id, |progress, _| {
            progress.notes = notes;
            Ok(())
        })
    }

    /// Apply `f` to one record, then roll up and persist
    ///
    /// A failing `f` must leave the record untouched; nothing is persisted.
    fn mutate<T>(
        &mut self,
        id: &ItemId,
        f: impl FnOnce(&mut ItemProgress, DateTime<Utc>) -> Result<T, ProgressError>,
    ) -> Result<T, ProgressError> {
        self.mutate_at(id, f).map(|(_, out)| out)
    }

    /// [`mutate`](Self::mutate), also returning the record's position
    fn mutate_at<T>(
        &mut self,
        id: &ItemId,
        f: impl FnOnce(&mut ItemProgress, DateTime<Utc>) -> Result<T, ProgressError>,
    ) -> Result<(usize, T), ProgressError> {
        let pos = self.position(id).ok_or(ProgressError::ItemNotFound(*id))?;
        let now = Utc::now();
        let out = f(&mut self.items[pos], now)?;
        self.roll_up(now);
        self.persist();
        Ok((pos, out))
    }

    /// Force each parent's completion to match its sub-items
    fn roll_up(&mut self, now: DateTime<Utc>) {
        let updates: Vec<(usize, bool)> = self
            .hierarchy
            .parents()
            .map(|(parent, children)| {
                (parent, children.iter().all(|child| self.items[*child].completed))
            })
            .collect();

        for (parent, completed) in updates {
            let progress = &mut self.items[parent];
            if progress.set_completed(completed, now) {
                tracing::debug!(
                    "Roll-up set {} to {}",
                    progress.item.id,
                    if completed { "complete" } else { "incomplete" }
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn top_level(&self) -> impl Iterator<Item = &ItemProgress> {
        self.items.iter().filter(|p| p.item.is_top_level())
    }

    /// Top-level completion percentage, `0` without top-level items
    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        let total = self.total_items_count();
        if total == 0 {
            return 0;
        }
        let completed = self.completed_items_count();
        // round(100 * completed / total), halves rounded up
        let pct = (200 * completed + total) / (2 * total);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    /// Completed top-level items
    #[must_use]
    pub fn completed_items_count(&self) -> usize {
        self.top_level().filter(|p| p.completed).count()
    }

    /// Top-level items
    #[must_use]
    pub fn total_items_count(&self) -> usize {
        self.top_level().count()
    }

    /// Top-level items, for step navigation
    #[inline]
    #[must_use]
    pub fn total_parent_items_count(&self) -> usize {
        self.total_items_count()
    }

    /// Required items across all levels
    #[must_use]
    pub fn required_completion_status(&self) -> RequiredStatus {
        self.items
            .iter()
            .filter(|p| p.item.template.is_required)
            .fold(RequiredStatus::default(), |mut status, p| {
                status.total += 1;
                if p.completed {
                    status.completed += 1;
                }
                status
            })
    }

    /// Whether every required item is complete
    #[inline]
    #[must_use]
    pub fn are_all_required_items_completed(&self) -> bool {
        self.required_completion_status().is_satisfied()
    }

    // ------------------------------------------------------------------
    // Snapshots and storage
    // ------------------------------------------------------------------

    /// Completion records in list order
    #[must_use]
    pub fn completion_snapshot(&self) -> ProgressSnapshot {
        self.items.iter().map(ItemProgress::to_record).collect()
    }

    /// Instance update body for the backend
    #[must_use]
    pub fn update_payload(&self) -> UpdatePayload {
        let progress_percentage = self.completion_percentage();
        UpdatePayload {
            status: InstanceStatus::from_percentage(progress_percentage),
            progress_percentage,
            updated_at: Utc::now(),
            item_completion: self.completion_snapshot(),
        }
    }

    /// Write the snapshot now
    ///
    /// # Errors
    /// [`ProgressError::NoInstance`] without an instance scope,
    /// [`ProgressError::Persistence`] when the adapter fails.
    pub fn save_to_storage(&self) -> Result<(), ProgressError> {
        let key = self.storage_key().ok_or(ProgressError::NoInstance)?;
        self.write_snapshot(&key)?;
        tracing::info!("Saved {} completion records under {}", self.items.len(), key);
        Ok(())
    }

    /// Cached completion records keyed by item id text
    ///
    /// Empty without an instance scope, when nothing is cached, or when the
    /// cached data is unreadable.
    #[must_use]
    pub fn load_from_storage(&self) -> HashMap<String, CompletionRecord> {
        let Some(key) = self.storage_key() else {
            return HashMap::new();
        };
        match self.persistence.load(&key) {
            Ok(Some(bytes)) => decode_snapshot(&bytes),
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read cached completion data {}: {}", key, e);
                HashMap::new()
            }
        }
    }

    /// Remove the cached snapshot of the current instance
    ///
    /// # Errors
    /// [`ProgressError::Persistence`] when the adapter fails.
    pub fn clear_storage(&self) -> Result<(), ProgressError> {
        if let Some(key) = self.storage_key() {
            self.persistence.clear(&key)?;
        }
        Ok(())
    }

    fn write_snapshot(&self, key: &str) -> Result<(), PersistenceError> {
        let bytes = encode_snapshot(&self.completion_snapshot())?;
        self.persistence.save(key, &bytes)
    }

    /// Best-effort write after a mutation
    fn persist(&self) {
        let Some(key) = self.storage_key() else {
            return;
        };
        if let Err(e) = self.write_snapshot(&key) {
            tracing::warn!("Failed to cache completion data {}: {}", key, e);
        }
    }
}

fn recompute_photo_completion(progress: &mut ItemProgress, now: DateTime<Utc>) {
    let complete = progress.photos.len() >= progress.item.completion_threshold();
    progress.set_completed(complete, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MockPersistenceAdapter;
    use crate::progress::ProgressItem;
    use checklist_model::ChecklistTemplateItem;

    fn record(base: u64, min_photos: Option<u32>) -> ItemProgress {
        ItemProgress::new(ProgressItem::new(
            ItemId::compound(1, base).unwrap(),
            ChecklistTemplateItem {
                id: Some(base),
                order_index: Some(base),
                min_photos,
                ..ChecklistTemplateItem::default()
            },
            0,
        ))
    }

    fn id(base: u64) -> ItemId {
        ItemId::compound(1, base).unwrap()
    }

    #[test]
    fn unknown_ids_are_reported_without_change() {
        let mut store = ProgressStore::in_memory();
        store.set_item_progress(vec![record(1, None)]);
        let before = store.item_progress().to_vec();

        let err = store.toggle_item_completion(&id(99)).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.add_photo(&id(99), "a").is_err());
        assert_eq!(store.item_progress(), before.as_slice());
    }

    #[test]
    fn toggle_stamps_and_clears_time() {
        let mut store = ProgressStore::in_memory();
        store.set_item_progress(vec![record(1, None)]);

        assert!(store.toggle_item_completion(&id(1)).unwrap());
        assert!(store.find_item_progress(&id(1)).unwrap().completed_at.is_some());
        assert!(!store.toggle_item_completion(&id(1)).unwrap());
        assert!(store.find_item_progress(&id(1)).unwrap().completed_at.is_none());
    }

    #[test]
    fn remove_photo_reports_bad_index() {
        let mut store = ProgressStore::in_memory();
        store.set_item_progress(vec![record(1, None)]);
        store.add_photo(&id(1), "a").unwrap();
        assert!(matches!(
            store.remove_photo(&id(1), 3),
            Err(ProgressError::PhotoIndexOutOfRange { index: 3, len: 1, .. })
        ));
        assert_eq!(store.remove_photo(&id(1), 0).unwrap(), "a");
        assert!(!store.find_item_progress(&id(1)).unwrap().completed);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let mut store = ProgressStore::in_memory();
        let mut items: Vec<ItemProgress> = (1..=8).map(|b| record(b, None)).collect();
        items[0].completed = true;
        store.set_item_progress(items);
        // 1/8 = 12.5%
        assert_eq!(store.completion_percentage(), 13);
    }

    #[test]
    fn write_failures_do_not_fail_mutations() {
        let mut adapter = MockPersistenceAdapter::new();
        adapter.expect_save().returning(|key, _| {
            Err(PersistenceError::InvalidKey(key.to_string()))
        });

        let mut store = ProgressStore::new(Arc::new(adapter));
        store.set_instance_id(1);
        store.set_item_progress(vec![record(1, None)]);

        store.update_notes(&id(1), "scratch on housing").unwrap();
        assert_eq!(store.find_item_progress(&id(1)).unwrap().notes, "scratch on housing");
        assert!(matches!(store.save_to_storage(), Err(ProgressError::Persistence(_))));
    }

    #[test]
    fn no_writes_without_instance() {
        let mut adapter = MockPersistenceAdapter::new();
        adapter.expect_save().never();

        let mut store = ProgressStore::new(Arc::new(adapter));
        store.set_item_progress(vec![record(1, None)]);
        store.toggle_item_completion(&id(1)).unwrap();
        assert!(matches!(store.save_to_storage(), Err(ProgressError::NoInstance)));
    }

    #[test]
    fn each_mutation_writes_once() {
        let mut adapter = MockPersistenceAdapter::new();
        adapter
            .expect_save()
            .withf(|key, _| key.to_string() == "checklist_1_completion")
            .times(2)
            .returning(|_, _| Ok(()));

        let mut store = ProgressStore::new(Arc::new(adapter));
        store.set_instance_id(1);
        store.set_item_progress(vec![record(1, None)]);
        store.update_item_progress(&id(1), ProgressPatch::new()).unwrap();
        store.update_notes(&id(1), "n").unwrap();
    }

    #[test]
    fn read_failures_are_empty_cache() {
        let mut adapter = MockPersistenceAdapter::new();
        adapter
            .expect_load()
            .returning(|key| Err(PersistenceError::InvalidKey(key.to_string())));

        let mut store = ProgressStore::new(Arc::new(adapter));
        store.set_instance_id(3);
        assert!(store.load_from_storage().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = ProgressStore::in_memory();
        store.set_instance_id(4);
        store.set_item_progress(vec![record(1, None)]);
        store.reset();
        assert!(store.item_progress().is_empty());
        assert_eq!(store.instance_id(), None);
        assert!(store.find_item_progress(&id(1)).is_none());
    }
}
