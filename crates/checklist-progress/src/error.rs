//! Error types for checklist progress
//!
//! Validation failures are not errors: they come back as
//! [`PhotoValidation`](crate::PhotoValidation) values. The types here cover
//! lookup misses, storage faults, navigation and configuration.

use checklist_model::{ItemId, ItemIdError};
use std::path::PathBuf;

/// Progress store errors
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// No progress record with this id
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Photo index outside the item's photo list
    #[error("photo index {index} out of range for item {item} ({len} photos)")]
    PhotoIndexOutOfRange {
        /// Item addressed
        item: ItemId,
        /// Requested index
        index: usize,
        /// Photos held by the item
        len: usize,
    },

    /// Photo URL not held by the item
    #[error("photo not found on item {item}: {url}")]
    PhotoNotFound {
        /// Item addressed
        item: ItemId,
        /// Requested URL
        url: String,
    },

    /// No instance is loaded
    #[error("no checklist instance loaded")]
    NoInstance,

    /// Instance or item id cannot form a compound id
    #[error("invalid item id: {0}")]
    InvalidId(#[from] ItemIdError),

    /// Storage failure during an explicit save
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ProgressError {
    /// Lookup miss, as opposed to a storage fault
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound(_) | Self::PhotoNotFound { .. } | Self::PhotoIndexOutOfRange { .. }
        )
    }
}

/// Local storage errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Filesystem failure
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot encoding failed
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// Key cannot be mapped to storage
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Step navigation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Step outside `1..=len`
    #[error("step {step} out of range (1..={len})")]
    OutOfRange {
        /// Requested step
        step: usize,
        /// Items in the checklist
        len: usize,
    },

    /// Step resolves to a sub-item, which is shown with its parent
    #[error("step {0} is a sub-item")]
    SubItem(usize),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ProgressConfig`](crate::ProgressConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
