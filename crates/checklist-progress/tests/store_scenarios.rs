use checklist_model::{InstanceStatus, ItemId};
use checklist_progress::{
    item_label, PhotoStatus, PhotoValidator, ProgressPatch, ProgressStore, RequiredStatus,
    StepNavigator,
};
use checklist_test_utils::{inspection_template, required_item, sub_item, template, template_item};
use pretty_assertions::assert_eq;

const INSTANCE: u64 = 15;

fn id(base: u64) -> ItemId {
    ItemId::compound(INSTANCE, base).unwrap()
}

fn loaded() -> ProgressStore {
    let mut store = ProgressStore::in_memory();
    store.load_instance(&inspection_template(), None, INSTANCE).unwrap();
    store
}

fn completed(store: &ProgressStore, base: u64) -> bool {
    store.find_item_progress(&id(base)).unwrap().completed
}

#[test]
fn minimal_item_stays_incomplete_until_explicit() {
    let mut store = loaded();
    assert!(!completed(&store, 5));

    store.toggle_item_completion(&id(5)).unwrap();
    assert!(completed(&store, 5));
    store.toggle_item_completion(&id(5)).unwrap();
    assert!(!completed(&store, 5));

    store.mark_as_verified(&id(5), "Verified without photos").unwrap();
    let progress = store.find_item_progress(&id(5)).unwrap();
    assert!(progress.completed);
    assert!(progress.completed_at.is_some());
    assert_eq!(progress.notes, "Verified without photos");
}

#[test]
fn verification_keeps_existing_notes() {
    let mut store = loaded();
    store.update_notes(&id(5), "checked by QA").unwrap();
    store.mark_as_verified(&id(5), "Verified without photos").unwrap();
    assert_eq!(store.find_item_progress(&id(5)).unwrap().notes, "checked by QA");
}

#[test]
fn required_photo_item() {
    let mut store = loaded();
    let validator = PhotoValidator::new();
    let item = store.find_item_progress(&id(4)).unwrap().item.template.clone();

    store.add_photo(&id(4), "a").unwrap();
    let progress = store.find_item_progress(&id(4)).unwrap();
    assert!(!progress.completed);
    assert_eq!(validator.photo_status(progress.photos.len(), &item), PhotoStatus::Insufficient);

    store.add_photo(&id(4), "b").unwrap();
    let progress = store.find_item_progress(&id(4)).unwrap();
    assert!(progress.completed);
    assert!(progress.completed_at.is_some());
    assert_eq!(validator.photo_status(progress.photos.len(), &item), PhotoStatus::Valid);
    let stamped = progress.completed_at;

    for url in ["c", "d", "e"] {
        store.add_photo(&id(4), url).unwrap();
    }
    assert_eq!(store.find_item_progress(&id(4)).unwrap().completed_at, stamped);

    let photos = store.find_item_progress(&id(4)).unwrap().photos.len();
    let sixth = validator.validate_batch(1, photos, &item);
    assert!(!sixth.valid);
    assert_eq!(photos, 5);

    store.remove_photo_by_url(&id(4), "a").unwrap();
    assert!(store.find_item_progress(&id(4)).unwrap().completed);
    for _ in 0..3 {
        store.remove_photo(&id(4), 0).unwrap();
    }
    let progress = store.find_item_progress(&id(4)).unwrap();
    assert_eq!(progress.photos, vec!["e".to_string()]);
    assert!(!progress.completed);
    assert_eq!(progress.completed_at, None);
}

#[test]
fn remove_all_photos_resets_completion() {
    let mut store = loaded();
    store.add_photo(&id(4), "a").unwrap();
    store.add_photo(&id(4), "b").unwrap();
    store.remove_all_photos(&id(4)).unwrap();
    let progress = store.find_item_progress(&id(4)).unwrap();
    assert!(progress.photos.is_empty());
    assert!(!progress.completed);
    assert_eq!(progress.completed_at, None);
}

#[test]
fn parent_rolls_up_from_sub_items() {
    let mut store = loaded();
    store.toggle_item_completion(&id(2)).unwrap();
    assert!(!completed(&store, 1));

    store.toggle_item_completion(&id(3)).unwrap();
    assert!(completed(&store, 1));
    assert!(store.find_item_progress(&id(1)).unwrap().completed_at.is_some());

    store.toggle_item_completion(&id(3)).unwrap();
    assert!(!completed(&store, 1));
}

#[test]
fn parent_photos_do_not_override_roll_up() {
    let mut store = loaded();
    store.add_photo(&id(1), "parent.jpg").unwrap();
    assert!(!completed(&store, 1));
    store.toggle_item_completion(&id(1)).unwrap();
    assert!(!completed(&store, 1));
}

#[test]
fn toggling_a_parent_reports_the_rolled_up_state() {
    let mut store = loaded();
    let returned = store.toggle_item_completion(&id(1)).unwrap();
    assert!(!returned);
    assert_eq!(returned, completed(&store, 1));
    assert_eq!(store.find_item_progress(&id(1)).unwrap().completed_at, None);

    store.toggle_item_completion(&id(2)).unwrap();
    store.toggle_item_completion(&id(3)).unwrap();
    let returned = store.toggle_item_completion(&id(1)).unwrap();
    assert!(returned);
    assert_eq!(returned, completed(&store, 1));
}

#[test]
fn verifying_a_parent_defers_to_sub_items() {
    let mut store = loaded();
    let kept = store.mark_as_verified(&id(1), "Verified without photos").unwrap();
    assert!(!kept);
    let progress = store.find_item_progress(&id(1)).unwrap();
    assert!(!progress.completed);
    assert_eq!(progress.completed_at, None);
    assert_eq!(progress.notes, "Verified without photos");

    assert!(store.mark_as_verified(&id(5), "ok").unwrap());
}

#[test]
fn metrics_count_top_level_only() {
    let mut store = loaded();
    assert_eq!(store.total_items_count(), 3);
    assert_eq!(store.total_parent_items_count(), 3);
    assert_eq!(store.completion_percentage(), 0);

    store.toggle_item_completion(&id(2)).unwrap();
    assert_eq!(store.completed_items_count(), 0);

    store.mark_as_verified(&id(5), "ok").unwrap();
    assert_eq!(store.completed_items_count(), 1);
    assert_eq!(store.completion_percentage(), 33);

    store.toggle_item_completion(&id(3)).unwrap();
    assert_eq!(store.completion_percentage(), 67);
}

#[test]
fn required_status_counts_every_level() {
    let mut sub = sub_item(2, 1);
    sub.is_required = true;
    let template = template(vec![template_item(1, None, None), sub, required_item(3)]);

    let mut store = ProgressStore::in_memory();
    store.load_instance(&template, None, INSTANCE).unwrap();
    assert_eq!(store.required_completion_status(), RequiredStatus { completed: 0, total: 2 });

    store.toggle_item_completion(&id(2)).unwrap();
    assert_eq!(store.required_completion_status(), RequiredStatus { completed: 1, total: 2 });
    assert!(!store.are_all_required_items_completed());

    store.toggle_item_completion(&id(3)).unwrap();
    assert!(store.are_all_required_items_completed());
}

#[test]
fn empty_patch_is_idempotent() {
    let mut store = loaded();
    store.add_photo(&id(4), "a").unwrap();
    let before = store.item_progress().to_vec();
    store.update_item_progress(&id(4), ProgressPatch::new()).unwrap();
    assert_eq!(store.item_progress(), before.as_slice());
}

#[test]
fn patch_merges_fields() {
    let mut store = loaded();
    store
        .update_item_progress(&id(5), ProgressPatch::new().notes("torque ok").completed(true))
        .unwrap();
    let progress = store.find_item_progress(&id(5)).unwrap();
    assert!(progress.completed);
    assert_eq!(progress.notes, "torque ok");
}

#[test]
fn unknown_ids_leave_state_untouched() {
    let mut store = loaded();
    let before = store.item_progress().to_vec();
    let stranger = ItemId::compound(INSTANCE, 999).unwrap();

    assert!(store.toggle_item_completion(&stranger).is_err());
    assert!(store.update_notes(&stranger, "x").is_err());
    assert!(store.remove_all_photos(&stranger).is_err());
    assert!(store.find_item_progress(&stranger).is_none());
    assert_eq!(store.item_progress(), before.as_slice());
}

#[test]
fn update_payload_status_follows_percentage() {
    let mut store = loaded();
    store.mark_as_verified(&id(5), "ok").unwrap();
    let payload = store.update_payload();
    assert_eq!(payload.status, InstanceStatus::InProgress);
    assert_eq!(payload.progress_percentage, 33);
    assert_eq!(payload.item_completion.len(), 5);

    store.toggle_item_completion(&id(2)).unwrap();
    store.toggle_item_completion(&id(3)).unwrap();
    store.add_photo(&id(4), "a").unwrap();
    store.add_photo(&id(4), "b").unwrap();

    let payload = store.update_payload();
    assert_eq!(payload.status, InstanceStatus::Completed);
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["progress_percentage"], 100);
    assert_eq!(json["item_completion"][0]["itemId"], "15_1");
}

#[test]
fn steps_follow_the_store() {
    let store = loaded();
    let items = store.item_progress();
    let mut nav = StepNavigator::new();

    let shown: Vec<String> = nav.items_to_show(items).iter().map(|p| p.id().to_string()).collect();
    assert_eq!(shown, vec!["15_1", "15_2", "15_3"]);

    assert!(nav.next(items));
    assert_eq!(nav.current_step(), 4);
    assert!(nav.next(items));
    assert!(nav.is_last(items));

    let labels: Vec<String> = (0..items.len()).map(|pos| item_label(items, pos)).collect();
    assert_eq!(labels, vec!["Item 1", "Sub-item 1.1", "Sub-item 1.2", "Item 2", "Item 3"]);
}

#[test]
fn reset_unloads_the_instance() {
    let mut store = loaded();
    store.reset();
    assert!(store.item_progress().is_empty());
    assert_eq!(store.completion_percentage(), 0);
    assert_eq!(store.instance_id(), None);
}
