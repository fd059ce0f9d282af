//! Checklist Progress
//!
//! In-memory progress of a photo checklist instance:
//! - Matches template items against recorded instance data
//! - Validates photo counts and submission types
//! - Holds item progress with parent/sub-item roll-up
//! - Caches completion snapshots through a pluggable adapter
//! - Navigates the checklist step by step
//!
//! # Example
//!
//! ```rust
//! use checklist_model::{ChecklistTemplate, ChecklistTemplateItem, ItemId};
//! use checklist_progress::ProgressStore;
//!
//! # fn main() -> Result<(), checklist_progress::ProgressError> {
//! let template = ChecklistTemplate {
//!     id: 1,
//!     name: "Final inspection".to_string(),
//!     description: String::new(),
//!     version: None,
//!     items: vec![ChecklistTemplateItem {
//!         id: Some(950),
//!         min_photos: Some(2),
//!         ..ChecklistTemplateItem::default()
//!     }],
//! };
//!
//! let mut store = ProgressStore::in_memory();
//! store.load_instance(&template, None, 15)?;
//!
//! let id: ItemId = "15_950".parse().expect("valid id");
//! store.add_photo(&id, "uploads/front.jpg")?;
//! store.add_photo(&id, "uploads/back.jpg")?;
//! assert_eq!(store.completion_percentage(), 100);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod autosave;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod init;
pub mod matcher;
pub mod navigator;
pub mod persistence;
pub mod photos;
pub mod progress;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use autosave::{NotesAutoSaver, SharedStore};
pub use config::ProgressConfig;
pub use error::{ConfigError, NavigationError, PersistenceError, ProgressError};
pub use hierarchy::ParentIndex;
pub use init::{initialize_progress, resolve_base_id};
pub use matcher::{CompletionStatus, InstanceItemMatcher, MatchStrategy};
pub use navigator::{item_label, StepNavigator};
pub use persistence::{
    decode_snapshot, encode_snapshot, storage_key, FileAdapter, MemoryAdapter, PersistenceAdapter,
};
pub use photos::{
    plan_delete_all, plan_photo_deletion, plan_photo_deletion_at, resolve_photo_url, PhotoDeletion,
};
pub use progress::{ItemProgress, ProgressItem, ProgressPatch};
pub use store::{ProgressStore, RequiredStatus};
pub use validation::{PhotoStatus, PhotoValidation, PhotoValidator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with checklist progress
    pub use crate::{
        InstanceItemMatcher, ItemProgress, PersistenceAdapter, PhotoValidator, ProgressConfig,
        ProgressError, ProgressPatch, ProgressStore, StepNavigator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
