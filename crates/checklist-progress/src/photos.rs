//! Photo deletion planning and URL resolution
//!
//! Deleting a photo needs its backend record id. The progress record only
//! holds URLs, so the record is located through the instance items: first
//! by the item's base id and the photo's index, then by URL across every
//! instance item. Photos with no backend record are removed locally only.

use crate::error::ProgressError;
use crate::matcher::InstanceItemMatcher;
use crate::progress::ItemProgress;
use checklist_model::InstanceItem;

/// How a photo should be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoDeletion {
    /// Delete the backend record, then remove locally
    Remote {
        /// Backend photo record id
        photo_id: u64,
    },
    /// No backend record; remove locally
    LocalOnly,
}

impl PhotoDeletion {
    /// Backend id to delete, if any
    #[inline]
    #[must_use]
    pub fn photo_id(&self) -> Option<u64> {
        match self {
            Self::Remote { photo_id } => Some(*photo_id),
            Self::LocalOnly => None,
        }
    }
}

/// Plan deletion of the photo with `url` from `progress`
///
/// # Errors
/// [`ProgressError::PhotoNotFound`] when the record does not hold `url`.
pub fn plan_photo_deletion(
    progress: &ItemProgress,
    url: &str,
    instance_items: Option<&[InstanceItem]>,
) -> Result<PhotoDeletion, ProgressError> {
    let index = progress
        .photos
        .iter()
        .position(|p| p == url)
        .ok_or_else(|| ProgressError::PhotoNotFound {
            item: progress.id(),
            url: url.to_string(),
        })?;
    Ok(locate(progress, index, url, instance_items))
}

/// Plan deletion of the photo at `index`, returning its URL with the plan
///
/// # Errors
/// [`ProgressError::PhotoIndexOutOfRange`] when `index` is past the end.
pub fn plan_photo_deletion_at(
    progress: &ItemProgress,
    index: usize,
    instance_items: Option<&[InstanceItem]>,
) -> Result<(String, PhotoDeletion), ProgressError> {
    let url = progress
        .photos
        .get(index)
        .ok_or(ProgressError::PhotoIndexOutOfRange {
            item: progress.id(),
            index,
            len: progress.photos.len(),
        })?;
    Ok((url.clone(), locate(progress, index, url, instance_items)))
}

/// Backend ids of every photo recorded for the item
///
/// Empty when the instance has no record for the item; the caller then
/// clears the photos locally.
#[must_use]
pub fn plan_delete_all(
    progress: &ItemProgress,
    instance_items: Option<&[InstanceItem]>,
) -> Vec<u64> {
    InstanceItemMatcher::new()
        .find_instance_item(instance_items, progress.item.base_item_id)
        .map(|item| item.photos.iter().filter_map(|photo| photo.id).collect())
        .unwrap_or_default()
}

fn locate(
    progress: &ItemProgress,
    index: usize,
    url: &str,
    instance_items: Option<&[InstanceItem]>,
) -> PhotoDeletion {
    let matcher = InstanceItemMatcher::new();
    let instance_item = matcher.find_instance_item(instance_items, progress.item.base_item_id);

    // Backend rows without a URL are not in `progress.photos`, so the index
    // only counts when the row at it carries the same URL
    let photo_id = matcher
        .photo_by_index(instance_item, index)
        .filter(|photo| photo.file_url.as_deref() == Some(url))
        .and_then(|photo| photo.id)
        .or_else(|| {
            matcher
                .find_photo_by_url(instance_items, url)
                .and_then(|photo| photo.id)
        });

    match photo_id {
        Some(photo_id) => PhotoDeletion::Remote { photo_id },
        None => {
            tracing::warn!(
                "Photo {} on item {} has no backend id, removing locally",
                url,
                progress.item.id
            );
            PhotoDeletion::LocalOnly
        }
    }
}

/// Absolute URL for a stored photo path
///
/// `http`/`https` URLs pass through; relative paths are joined to `base`.
#[must_use]
pub fn resolve_photo_url(base: &str, url: &str) -> String {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let path = url.strip_prefix('/').unwrap_or(url);
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressItem;
    use checklist_model::{ChecklistTemplateItem, InstancePhoto, ItemId};

    fn progress(photos: &[&str]) -> ItemProgress {
        let mut progress = ItemProgress::new(ProgressItem::new(
            ItemId::compound(8, 30).unwrap(),
            ChecklistTemplateItem {
                id: Some(30),
                ..ChecklistTemplateItem::default()
            },
            0,
        ));
        progress.photos = photos.iter().map(|p| (*p).to_string()).collect();
        progress
    }

    fn photo(id: Option<u64>, url: &str) -> InstancePhoto {
        InstancePhoto {
            id,
            file_url: Some(url.to_string()),
            file_type: None,
        }
    }

    fn url_less(id: u64) -> InstancePhoto {
        InstancePhoto {
            id: Some(id),
            file_url: None,
            file_type: None,
        }
    }

    fn instance_item(template_item_id: u64, photos: Vec<InstancePhoto>) -> InstanceItem {
        InstanceItem {
            template_item_id: Some(template_item_id),
            photos,
            ..InstanceItem::default()
        }
    }

    #[test]
    fn remote_by_index() {
        let items = vec![instance_item(
            30,
            vec![photo(Some(501), "a"), photo(Some(502), "b")],
        )];
        let plan =
            plan_photo_deletion(&progress(&["a", "b"]), "b", Some(items.as_slice())).unwrap();
        assert_eq!(plan, PhotoDeletion::Remote { photo_id: 502 });
    }

    #[test]
    fn url_less_rows_do_not_shift_the_index() {
        // Row 0 has no URL, so "b.jpg" is index 0 locally but row 1 on the backend
        let items = vec![instance_item(30, vec![url_less(1), photo(Some(2), "b.jpg")])];
        let plan = plan_photo_deletion(&progress(&["b.jpg"]), "b.jpg", Some(items.as_slice()));
        assert_eq!(plan.unwrap(), PhotoDeletion::Remote { photo_id: 2 });

        let (url, plan) =
            plan_photo_deletion_at(&progress(&["b.jpg"]), 0, Some(items.as_slice())).unwrap();
        assert_eq!(url, "b.jpg");
        assert_eq!(plan.photo_id(), Some(2));
    }

    #[test]
    fn stale_index_never_names_another_photo() {
        // "a.jpg" was removed locally only; the backend still lists it first
        let items = vec![instance_item(
            30,
            vec![photo(Some(10), "a.jpg"), photo(Some(11), "c.jpg")],
        )];
        let plan = plan_photo_deletion(&progress(&["c.jpg"]), "c.jpg", Some(items.as_slice()));
        assert_eq!(plan.unwrap(), PhotoDeletion::Remote { photo_id: 11 });

        let gone = plan_photo_deletion(&progress(&["x.jpg"]), "x.jpg", Some(items.as_slice()));
        assert_eq!(gone.unwrap(), PhotoDeletion::LocalOnly);
    }

    #[test]
    fn falls_back_to_url_search() {
        // Index lookup lands on a record without an id; the URL is recorded elsewhere
        let items = vec![
            instance_item(30, vec![photo(None, "stale")]),
            instance_item(31, vec![photo(Some(777), "a")]),
        ];
        let (url, plan) =
            plan_photo_deletion_at(&progress(&["a"]), 0, Some(items.as_slice())).unwrap();
        assert_eq!(url, "a");
        assert_eq!(plan.photo_id(), Some(777));
    }

    #[test]
    fn unknown_photo_is_local_only() {
        let plan = plan_photo_deletion(&progress(&["a"]), "a", None).unwrap();
        assert_eq!(plan, PhotoDeletion::LocalOnly);
        assert!(plan_photo_deletion(&progress(&["a"]), "z", None).is_err());
        assert!(matches!(
            plan_photo_deletion_at(&progress(&[]), 0, None),
            Err(ProgressError::PhotoIndexOutOfRange { len: 0, .. })
        ));
    }

    #[test]
    fn delete_all_collects_ids() {
        let items = vec![instance_item(
            30,
            vec![photo(Some(1), "a"), photo(None, "b"), photo(Some(3), "c")],
        )];
        let ids = plan_delete_all(&progress(&["a", "b", "c"]), Some(items.as_slice()));
        assert_eq!(ids, vec![1, 3]);
        assert!(plan_delete_all(&progress(&["a"]), None).is_empty());
    }

    #[test]
    fn url_resolution() {
        let base = "https://dashboard.eye-fi.com/";
        assert_eq!(resolve_photo_url(base, "https://cdn/x.jpg"), "https://cdn/x.jpg");
        assert_eq!(
            resolve_photo_url(base, "/uploads/x.jpg"),
            "https://dashboard.eye-fi.com/uploads/x.jpg"
        );
        assert_eq!(
            resolve_photo_url("http://localhost", "uploads/x.jpg"),
            "http://localhost/uploads/x.jpg"
        );
        assert_eq!(resolve_photo_url(base, ""), "");
    }
}
