//! Parent/child index
//!
//! Sub-items reference their parent by value (`parent_id` equal to the
//! parent's `order_index` or base item id). [`ParentIndex`] resolves those
//! references once per load into position lists.

use crate::progress::ItemProgress;
use std::collections::{BTreeMap, HashMap};

/// Positions of top-level items and the sub-items that roll up into them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentIndex {
    children: BTreeMap<usize, Vec<usize>>,
    parent_of: HashMap<usize, usize>,
}

impl ParentIndex {
    /// Build from a flattened progress list
    ///
    /// When a `parent_id` matches several top-level items, the nearest one
    /// before the sub-item wins, else the first match.
    #[must_use]
    pub fn build(items: &[ItemProgress]) -> Self {
        let mut by_key: HashMap<u64, Vec<usize>> = HashMap::new();
        for (pos, progress) in items.iter().enumerate() {
            if !progress.item.is_top_level() {
                continue;
            }
            if let Some(order) = progress.item.template.order_index {
                by_key.entry(order).or_default().push(pos);
            }
            let base = progress.item.base_item_id;
            let entry = by_key.entry(base).or_default();
            if !entry.contains(&pos) {
                entry.push(pos);
            }
        }

        let mut index = Self::default();
        for (pos, progress) in items.iter().enumerate() {
            if !progress.item.is_sub_item() {
                continue;
            }
            let Some(candidates) = progress
                .item
                .template
                .parent_id
                .and_then(|parent| by_key.get(&parent))
            else {
                tracing::debug!("Sub-item {} has no matching parent", progress.item.id);
                continue;
            };

            let parent = candidates
                .iter()
                .copied()
                .filter(|p| *p < pos)
                .max()
                .or_else(|| candidates.iter().copied().min());

            if let Some(parent) = parent {
                index.children.entry(parent).or_default().push(pos);
                index.parent_of.insert(pos, parent);
            }
        }
        index
    }

    /// Sub-item positions of a parent, in list order
    #[must_use]
    pub fn children(&self, parent: usize) -> &[usize] {
        self.children.get(&parent).map_or(&[][..], Vec::as_slice)
    }

    /// Parent position of a sub-item
    #[inline]
    #[must_use]
    pub fn parent_of(&self, child: usize) -> Option<usize> {
        self.parent_of.get(&child).copied()
    }

    /// Parents that have at least one sub-item, in list order
    pub fn parents(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.children
            .iter()
            .map(|(parent, children)| (*parent, children.as_slice()))
    }

    /// Whether no parent/child relation exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressItem;
    use checklist_model::{ChecklistTemplateItem, ItemId};

    fn progress(base: u64, order: u64, level: u8, parent: Option<u64>) -> ItemProgress {
        ItemProgress::new(ProgressItem::new(
            ItemId::compound(5, base).unwrap(),
            ChecklistTemplateItem {
                id: Some(base),
                order_index: Some(order),
                level: Some(level),
                parent_id: parent,
                ..ChecklistTemplateItem::default()
            },
            0,
        ))
    }

    #[test]
    fn groups_by_order_index_and_base_id() {
        let items = vec![
            progress(100, 1, 0, None),
            progress(101, 2, 1, Some(1)),
            progress(102, 3, 1, Some(100)),
            progress(200, 4, 0, None),
            progress(201, 5, 1, Some(4)),
        ];
        let index = ParentIndex::build(&items);
        assert_eq!(index.children(0), &[1, 2]);
        assert_eq!(index.children(3), &[4]);
        assert_eq!(index.parent_of(2), Some(0));
        assert_eq!(index.parents().count(), 2);
        assert!(index.children(1).is_empty());
    }

    #[test]
    fn nearest_preceding_parent_wins() {
        // parent_id 2 matches the first parent's base id and the second's order_index
        let items = vec![
            progress(2, 10, 0, None),
            progress(50, 2, 0, None),
            progress(51, 11, 1, Some(2)),
        ];
        let index = ParentIndex::build(&items);
        assert_eq!(index.parent_of(2), Some(1));
    }

    #[test]
    fn orphans_are_ignored() {
        let items = vec![progress(1, 1, 0, None), progress(2, 2, 1, Some(77))];
        let index = ParentIndex::build(&items);
        assert!(index.is_empty());
        assert_eq!(index.parent_of(1), None);
    }
}
