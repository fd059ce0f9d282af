//! Checklist templates
//!
//! A [`ChecklistTemplate`] is the static, reusable definition of a checklist.
//! Its items are flat and ordered; hierarchy is expressed by value through
//! `level` and `parent_id` rather than by nesting.

use crate::de;
use serde::{Deserialize, Serialize};

/// Photo count ceiling used when an item does not configure one
pub const DEFAULT_MAX_PHOTOS: u32 = 10;

/// Static checklist definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    /// Template id
    pub id: u64,
    /// Display name
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    /// Free-text description
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    /// Template version label
    #[serde(default)]
    pub version: Option<String>,
    /// Items in presentation order
    #[serde(default, deserialize_with = "de::null_default")]
    pub items: Vec<ChecklistTemplateItem>,
}

/// What kind of media satisfies an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    /// Photos only, counted against `min_photos`
    #[default]
    Photo,
    /// At least one video
    Video,
    /// At least one photo or one video
    Either,
}

/// One checklist question or step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChecklistTemplateItem {
    /// Template item id; absent or zero ids are repaired on load
    #[serde(default, deserialize_with = "de::opt_number")]
    pub id: Option<u64>,
    /// Owning template
    #[serde(default, deserialize_with = "de::opt_number")]
    pub template_id: Option<u64>,
    /// Position within the template
    #[serde(default, deserialize_with = "de::opt_number")]
    pub order_index: Option<u64>,
    /// Prompt shown to the operator
    #[serde(default, deserialize_with = "de::null_default")]
    pub title: String,
    /// Longer instructions
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    /// Media kind this item accepts
    #[serde(default)]
    pub submission_type: Option<SubmissionType>,
    /// Photo capture guidance and limits
    #[serde(default, deserialize_with = "de::maybe_encoded")]
    pub photo_requirements: Option<PhotoRequirements>,
    /// Whether the item must be completed before submission
    #[serde(default, deserialize_with = "de::flag")]
    pub is_required: bool,
    /// Minimum photos
    #[serde(default, deserialize_with = "de::opt_number")]
    pub min_photos: Option<u32>,
    /// Maximum photos
    #[serde(default, deserialize_with = "de::opt_number")]
    pub max_photos: Option<u32>,
    /// `0` (or absent) for top-level items, `1` for sub-items
    #[serde(default, deserialize_with = "de::opt_number")]
    pub level: Option<u8>,
    /// Parent reference (its `order_index` or id), meaningful for sub-items
    #[serde(default, deserialize_with = "de::opt_number")]
    pub parent_id: Option<u64>,
    /// Reference image
    #[serde(default)]
    pub sample_image_url: Option<String>,
}

impl ChecklistTemplateItem {
    /// Top-level item (`level` 0 or absent)
    #[inline]
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.level.unwrap_or(0) == 0
    }

    /// Sub-item (`level` 1)
    #[inline]
    #[must_use]
    pub fn is_sub_item(&self) -> bool {
        self.level == Some(1)
    }

    /// Effective minimum photo count
    ///
    /// The item-level value wins over the one inside `photo_requirements`;
    /// zero counts as unset. Defaults to `0`.
    #[must_use]
    pub fn min_photos(&self) -> u32 {
        self.min_photos
            .filter(|n| *n > 0)
            .or_else(|| {
                self.photo_requirements
                    .as_ref()
                    .and_then(|r| r.min_photos)
                    .filter(|n| *n > 0)
            })
            .unwrap_or(0)
    }

    /// Effective maximum photo count, defaulting to [`DEFAULT_MAX_PHOTOS`]
    #[must_use]
    pub fn max_photos(&self) -> u32 {
        self.max_photos
            .filter(|n| *n > 0)
            .or_else(|| {
                self.photo_requirements
                    .as_ref()
                    .and_then(|r| r.max_photos)
                    .filter(|n| *n > 0)
            })
            .unwrap_or(DEFAULT_MAX_PHOTOS)
    }

    /// Effective submission type, defaulting to photos
    #[must_use]
    pub fn submission_type(&self) -> SubmissionType {
        self.submission_type
            .or_else(|| {
                self.photo_requirements
                    .as_ref()
                    .and_then(|r| r.submission_type)
            })
            .unwrap_or_default()
    }
}

/// Photo capture guidance attached to an item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhotoRequirements {
    /// Camera angle
    #[serde(default)]
    pub angle: Option<String>,
    /// Camera distance
    #[serde(default)]
    pub distance: Option<String>,
    /// Lighting conditions
    #[serde(default)]
    pub lighting: Option<String>,
    /// Focus guidance
    #[serde(default)]
    pub focus: Option<String>,
    /// Minimum resolution
    #[serde(default)]
    pub resolution: Option<String>,
    /// Accepted file formats
    #[serde(default, deserialize_with = "de::null_default")]
    pub format: Vec<String>,
    /// Minimum photos
    #[serde(default, deserialize_with = "de::opt_number")]
    pub min_photos: Option<u32>,
    /// Maximum photos
    #[serde(default, deserialize_with = "de::opt_number")]
    pub max_photos: Option<u32>,
    /// When `false`, the operator may confirm without a photo
    #[serde(default)]
    pub picture_required: Option<bool>,
    /// Media kind
    #[serde(default)]
    pub submission_type: Option<SubmissionType>,
    /// Longest accepted video
    #[serde(default, deserialize_with = "de::opt_number")]
    pub max_video_duration_seconds: Option<u32>,
}

impl PhotoRequirements {
    /// Whether any capture guidance (angle, distance, lighting, focus) is set
    #[must_use]
    pub fn has_guidance(&self) -> bool {
        [&self.angle, &self.distance, &self.lighting, &self.focus]
            .iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }
}
