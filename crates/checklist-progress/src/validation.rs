//! Photo requirement validation
//!
//! [`PhotoValidator`] holds no state: every check takes the current counts
//! and the item configuration explicitly. Failures are returned as
//! [`PhotoValidation`] values for the caller to surface, never as errors.

use checklist_model::{ChecklistTemplateItem, SubmissionType, DEFAULT_MAX_PHOTOS};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Outcome of a photo check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoValidation {
    /// Whether the attempted action may proceed
    pub valid: bool,
    /// Message for the operator when `valid` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhotoValidation {
    /// Passing result
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// Failing result with a message
    #[inline]
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Photo count status for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStatus {
    /// No photos
    Empty,
    /// Below the minimum
    Insufficient,
    /// Within range
    Valid,
    /// Above the maximum
    Exceeded,
}

impl Display for PhotoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Insufficient => "insufficient",
            Self::Valid => "valid",
            Self::Exceeded => "exceeded",
        })
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Enforces min/max photo counts per item
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoValidator;

impl PhotoValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Minimum photos for the item (default 0)
    #[inline]
    #[must_use]
    pub fn min_photos(&self, item: &ChecklistTemplateItem) -> u32 {
        item.min_photos()
    }

    /// Maximum photos for the item (default 10)
    #[inline]
    #[must_use]
    pub fn max_photos(&self, item: &ChecklistTemplateItem) -> u32 {
        item.max_photos()
    }

    /// Count within `[min, max]`
    #[must_use]
    pub fn is_photo_count_valid(&self, count: usize, item: &ChecklistTemplateItem) -> bool {
        let count = saturate(count);
        count >= item.min_photos() && count <= item.max_photos()
    }

    /// Count meets the minimum
    #[must_use]
    pub fn are_photo_requirements_met(&self, count: usize, item: &ChecklistTemplateItem) -> bool {
        saturate(count) >= item.min_photos()
    }

    /// Room for at least one more photo
    #[must_use]
    pub fn can_add_more_photos(&self, count: usize, item: &ChecklistTemplateItem) -> bool {
        saturate(count) < item.max_photos()
    }

    /// Display status for a count
    #[must_use]
    pub fn photo_status(&self, count: usize, item: &ChecklistTemplateItem) -> PhotoStatus {
        let count = saturate(count);
        if count == 0 {
            PhotoStatus::Empty
        } else if count < item.min_photos() {
            PhotoStatus::Insufficient
        } else if count > item.max_photos() {
            PhotoStatus::Exceeded
        } else {
            PhotoStatus::Valid
        }
    }

    /// Operator-facing description of a count against the item's limits
    #[must_use]
    pub fn photo_count_message(&self, count: usize, item: &ChecklistTemplateItem) -> String {
        let count = saturate(count);
        let min = item.min_photos();
        let max = item.max_photos();

        if count < min {
            format!("Minimum {min} photo{} required ({count}/{min})", plural(min))
        } else if count > max {
            format!("Maximum {max} photo{} allowed ({count}/{max})", plural(max))
        } else if min > 0 || max < DEFAULT_MAX_PHOTOS {
            format!("{count}/{min}-{max} photos")
        } else {
            format!("{count} photo{}", plural(count))
        }
    }

    /// Check a batch of `incoming` photos before upload
    #[must_use]
    pub fn validate_batch(
        &self,
        incoming: usize,
        current: usize,
        item: &ChecklistTemplateItem,
    ) -> PhotoValidation {
        let max = item.max_photos();
        if saturate(current.saturating_add(incoming)) > max {
            return PhotoValidation::fail(format!(
                "Cannot add {incoming} photo(s). Maximum {max} allowed (currently {current})"
            ));
        }
        PhotoValidation::ok()
    }

    /// Whether the item may be marked complete with the media it has
    #[must_use]
    pub fn can_complete_item(
        &self,
        photo_count: usize,
        video_count: usize,
        item: &ChecklistTemplateItem,
    ) -> PhotoValidation {
        let min = item.min_photos();
        match item.submission_type() {
            SubmissionType::Photo if min > 0 && saturate(photo_count) < min => {
                PhotoValidation::fail(format!(
                    "Cannot mark as complete. This item requires at least {min} photo{}.",
                    plural(min)
                ))
            }
            SubmissionType::Video if video_count == 0 => PhotoValidation::fail(
                "Cannot mark as complete. This item requires a video submission.",
            ),
            SubmissionType::Either if photo_count == 0 && video_count == 0 => {
                PhotoValidation::fail(
                    "Cannot mark as complete. This item requires either a photo or video submission.",
                )
            }
            _ => PhotoValidation::ok(),
        }
    }

    /// Whether the submitted media satisfies the item's submission type
    #[must_use]
    pub fn are_submission_requirements_met(
        &self,
        photo_count: usize,
        video_count: usize,
        item: &ChecklistTemplateItem,
    ) -> bool {
        match item.submission_type() {
            SubmissionType::Photo => saturate(photo_count) >= item.min_photos(),
            SubmissionType::Video => video_count > 0,
            SubmissionType::Either => photo_count > 0 || video_count > 0,
        }
    }

    /// Whether the item carries capture guidance
    #[must_use]
    pub fn has_photo_requirements(&self, item: &ChecklistTemplateItem) -> bool {
        item.photo_requirements
            .as_ref()
            .is_some_and(checklist_model::PhotoRequirements::has_guidance)
    }
}

fn saturate(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
