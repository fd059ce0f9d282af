//! Testing utilities for the checklist workspace
//!
//! Shared fixtures for templates, instances and cached completion records.

#![allow(missing_docs)]

use checklist_model::{
    ChecklistInstance, ChecklistTemplate, ChecklistTemplateItem, CompletionRecord, InstanceItem,
    InstancePhoto, RawItemId,
};

/// Top-level item; `order_index` equals `id`
pub fn template_item(
    id: u64,
    min_photos: Option<u32>,
    max_photos: Option<u32>,
) -> ChecklistTemplateItem {
    ChecklistTemplateItem {
        id: Some(id),
        order_index: Some(id),
        title: format!("Item {id}"),
        level: Some(0),
        min_photos,
        max_photos,
        ..ChecklistTemplateItem::default()
    }
}

/// Required top-level item without photo limits
pub fn required_item(id: u64) -> ChecklistTemplateItem {
    ChecklistTemplateItem {
        is_required: true,
        ..template_item(id, None, None)
    }
}

/// Sub-item of the item whose `order_index` is `parent`
pub fn sub_item(id: u64, parent: u64) -> ChecklistTemplateItem {
    ChecklistTemplateItem {
        level: Some(1),
        parent_id: Some(parent),
        title: format!("Sub-item {id}"),
        ..template_item(id, None, None)
    }
}

pub fn template(items: Vec<ChecklistTemplateItem>) -> ChecklistTemplate {
    ChecklistTemplate {
        id: 1,
        name: "Final inspection".to_string(),
        description: "Outgoing quality inspection".to_string(),
        version: Some("1.0".to_string()),
        items,
    }
}

/// Five items:
/// - `1` parent of `2` and `3`
/// - `4` needs 2..=5 photos
/// - `5` required, no photo limits
pub fn inspection_template() -> ChecklistTemplate {
    template(vec![
        template_item(1, None, None),
        sub_item(2, 1),
        sub_item(3, 1),
        template_item(4, Some(2), Some(5)),
        required_item(5),
    ])
}

pub fn photo(id: Option<u64>, url: &str) -> InstancePhoto {
    InstancePhoto {
        id,
        file_url: Some(url.to_string()),
        file_type: None,
    }
}

/// Instance item referencing its template item by `template_item_id`
pub fn instance_item(
    template_item_id: u64,
    completed: bool,
    photos: Vec<InstancePhoto>,
) -> InstanceItem {
    InstanceItem {
        template_item_id: Some(template_item_id),
        is_completed: completed,
        photos,
        ..InstanceItem::default()
    }
}

pub fn instance(id: u64, items: Vec<InstanceItem>) -> ChecklistInstance {
    ChecklistInstance {
        id,
        template_id: Some(1),
        operator_id: Some(42),
        items: Some(items),
        ..ChecklistInstance::default()
    }
}

/// Cache entry keyed by item id text
pub fn cache_record(id: &str, completed: bool, notes: &str) -> (String, CompletionRecord) {
    (
        id.to_string(),
        CompletionRecord {
            item_id: RawItemId::from(id),
            completed,
            completed_at: None,
            notes: notes.to_string(),
        },
    )
}
