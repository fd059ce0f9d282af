//! Checklist instances
//!
//! A [`ChecklistInstance`] is one execution of a template by an operator.
//! Its items carry what has been recorded so far: uploaded photos and
//! completion flags.

use crate::de;
use crate::id::RawItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Lifecycle status of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Created, nothing recorded yet
    #[default]
    Draft,
    /// Being worked on
    InProgress,
    /// Waiting for review
    Review,
    /// Every top-level item complete
    Completed,
    /// Handed in
    Submitted,
}

impl InstanceStatus {
    /// Status implied by a completion percentage
    #[inline]
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= 100 {
            Self::Completed
        } else {
            Self::InProgress
        }
    }

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Submitted => "submitted",
        }
    }
}

impl Display for InstanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of a checklist template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChecklistInstance {
    /// Instance id
    pub id: u64,
    /// Template this instance executes
    #[serde(default, deserialize_with = "de::opt_number")]
    pub template_id: Option<u64>,
    /// Operator working the checklist
    #[serde(default, deserialize_with = "de::opt_number")]
    pub operator_id: Option<u64>,
    /// Operator display name
    #[serde(default)]
    pub operator_name: Option<String>,
    /// Work order reference
    #[serde(default)]
    pub work_order_number: Option<String>,
    /// Part number under inspection
    #[serde(default)]
    pub part_number: Option<String>,
    /// Serial number under inspection
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Lifecycle status
    #[serde(default, deserialize_with = "de::null_default")]
    pub status: InstanceStatus,
    /// Last percentage reported by the backend
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    /// Recorded item data; may be absent for a fresh instance
    #[serde(default)]
    pub items: Option<Vec<InstanceItem>>,
}

impl ChecklistInstance {
    /// Recorded items, empty when none were sent
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[InstanceItem] {
        self.items.as_deref().unwrap_or(&[])
    }
}

/// Recorded data for one item of an instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceItem {
    /// Row id; usually equal to the template item id
    #[serde(default)]
    pub id: Option<RawItemId>,
    /// Explicit template item reference
    #[serde(default, deserialize_with = "de::opt_number")]
    pub template_item_id: Option<u64>,
    /// Alternate template item reference
    #[serde(default, deserialize_with = "de::opt_number")]
    pub item_id: Option<u64>,
    /// Uploaded media
    #[serde(default, deserialize_with = "de::null_default")]
    pub photos: Vec<InstancePhoto>,
    /// Completion flag recorded by the backend
    #[serde(default, deserialize_with = "de::flag")]
    pub is_completed: bool,
    /// Completion time as sent by the backend
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl InstanceItem {
    /// Parsed completion time; unparseable values are absent
    #[inline]
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_deref().and_then(de::parse_timestamp)
    }
}

/// Media kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Still image
    Image,
    /// Video clip
    Video,
}

/// An uploaded photo or video
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstancePhoto {
    /// Backend submission id; needed to delete the file remotely
    #[serde(default, deserialize_with = "de::opt_number")]
    pub id: Option<u64>,
    /// Location of the file
    #[serde(default)]
    pub file_url: Option<String>,
    /// Media kind
    #[serde(default)]
    pub file_type: Option<MediaType>,
}

impl InstancePhoto {
    /// Whether this is a video submission
    #[inline]
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.file_type == Some(MediaType::Video)
    }
}
