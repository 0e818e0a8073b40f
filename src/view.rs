use serde::Serialize;

use crate::item::DisplayItem;
use crate::policy::Partition;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewEntry<'a, C> {
    Item {
        index: usize,
        item: &'a DisplayItem<C>,
        active: bool,
        anchor: bool,
    },
    OverflowTrigger {
        label: String,
        hidden_count: usize,
        open: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelEntry<'a, C> {
    pub index: usize,
    pub item: &'a DisplayItem<C>,
}

/// Render tree for one list: inline entries in display order plus the
/// overflow panel when it is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView<'a, C> {
    pub entries: Vec<ViewEntry<'a, C>>,
    pub panel: Option<Vec<PanelEntry<'a, C>>>,
}

impl<'a, C> ListView<'a, C> {
    pub fn build(
        items: &'a [DisplayItem<C>],
        partition: &Partition,
        trigger_label: String,
        menu_open: bool,
    ) -> Self {
        let mut entries = Vec::with_capacity(partition.visible.len() + 1);
        for (slot, index) in partition.visible.iter().copied().enumerate() {
            if partition.trigger_slot == Some(slot) {
                entries.push(overflow_trigger(partition, &trigger_label, menu_open));
            }
            let Some(item) = items.get(index) else {
                continue;
            };
            entries.push(ViewEntry::Item {
                index,
                item,
                active: partition.active == Some(index),
                anchor: partition.anchors.contains(&index),
            });
        }
        if partition.trigger_slot == Some(partition.visible.len()) {
            entries.push(overflow_trigger(partition, &trigger_label, menu_open));
        }

        let panel = (menu_open && partition.is_truncated()).then(|| {
            partition
                .hidden
                .iter()
                .filter_map(|index| {
                    items
                        .get(*index)
                        .map(|item| PanelEntry { index: *index, item })
                })
                .collect()
        });

        Self { entries, panel }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn inline_keys(&self) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ViewEntry::Item { item, .. } => Some(item.key.as_str()),
                ViewEntry::OverflowTrigger { .. } => None,
            })
            .collect()
    }

    pub fn trigger_label(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            ViewEntry::OverflowTrigger { label, .. } => Some(label.as_str()),
            ViewEntry::Item { .. } => None,
        })
    }

    pub fn panel_keys(&self) -> Option<Vec<&'a str>> {
        self.panel
            .as_ref()
            .map(|panel| panel.iter().map(|entry| entry.item.key.as_str()).collect())
    }
}

fn overflow_trigger<'a, C>(partition: &Partition, label: &str, open: bool) -> ViewEntry<'a, C> {
    ViewEntry::OverflowTrigger {
        label: label.to_owned(),
        hidden_count: partition.hidden.len(),
        open,
    }
}

#[cfg(test)]
mod tests {
    use crate::item::DisplayItem;
    use crate::policy::{BreadcrumbStrategy, LegendStrategy, Partition, TruncationStrategy};

    use super::{ListView, ViewEntry};

    fn items(keys: &[&str]) -> Vec<DisplayItem<String>> {
        keys.iter().copied().map(DisplayItem::labelled).collect()
    }

    #[test]
    fn breadcrumb_view_places_trigger_after_first_item() {
        let trail = items(&["Home", "Products", "Categories", "Electronics", "Devices", "Laptops"]);
        let partition = BreadcrumbStrategy::default().partition(&trail, None);
        let view = ListView::build(&trail, &partition, "...".to_owned(), false);

        assert!(matches!(view.entries[0], ViewEntry::Item { index: 0, .. }));
        assert!(matches!(
            view.entries[1],
            ViewEntry::OverflowTrigger {
                hidden_count: 2,
                open: false,
                ..
            }
        ));
        assert_eq!(view.inline_keys(), ["Home", "Electronics", "Devices", "Laptops"]);
        assert!(matches!(
            view.entries.last(),
            Some(ViewEntry::Item { active: true, .. })
        ));
        assert_eq!(view.panel_keys(), None);
    }

    #[test]
    fn open_legend_view_lists_hidden_keys_in_panel() {
        let keys = items(&["revenue", "profit", "traffic", "conversions"]);
        let partition = LegendStrategy.partition(&keys, Some(2));
        let view = ListView::build(&keys, &partition, "+2 more".to_owned(), true);

        assert_eq!(view.trigger_label(), Some("+2 more"));
        assert!(matches!(
            view.entries.last(),
            Some(ViewEntry::OverflowTrigger { open: true, .. })
        ));
        assert_eq!(view.panel_keys(), Some(vec!["traffic", "conversions"]));
    }

    #[test]
    fn empty_list_renders_nothing() {
        let none: Vec<DisplayItem<String>> = Vec::new();
        let view = ListView::build(&none, &Partition::identity(0), "...".to_owned(), true);
        assert!(view.is_empty());
        assert_eq!(view.panel, None);
    }
}
