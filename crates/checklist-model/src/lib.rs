//! Checklist Model
//!
//! Data types shared by every layer of the photo checklist system.
//!
//! # Core Concepts
//!
//! - [`ChecklistTemplate`]: static checklist definition with a flat, ordered item list
//! - [`ChecklistInstance`]: one execution of a template with recorded photos and flags
//! - [`ItemId`]: tagged item identifier (base or `<instance>_<base>` compound)
//! - [`CompletionRecord`]: persisted per-item completion state
//!
//! # Example
//!
//! ```rust
//! use checklist_model::{create_compound_id, is_valid_item_id, ItemId};
//!
//! let encoded = create_compound_id(15, 950);
//! assert_eq!(encoded, "15_950");
//!
//! let id: ItemId = encoded.parse().unwrap();
//! assert_eq!(id.base_id(), 950);
//! assert!(!is_valid_item_id("15_-3"));
//! ```

#![warn(unreachable_pub)]

mod de;
pub mod id;
pub mod instance;
pub mod snapshot;
pub mod template;

// Re-exports
pub use de::parse_timestamp;
pub use id::{
    create_compound_id, extract_base_item_id, extract_instance_id, is_valid_instance_id,
    is_valid_item_id, to_numeric_key, ItemId, ItemIdError, RawItemId, SEPARATOR,
};
pub use instance::{ChecklistInstance, InstanceItem, InstancePhoto, InstanceStatus, MediaType};
pub use snapshot::{CompletionRecord, ProgressSnapshot, UpdatePayload};
pub use template::{
    ChecklistTemplate, ChecklistTemplateItem, PhotoRequirements, SubmissionType,
    DEFAULT_MAX_PHOTOS,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with checklist data
    pub use crate::{
        ChecklistInstance, ChecklistTemplate, ChecklistTemplateItem, CompletionRecord,
        InstanceItem, ItemId, RawItemId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
