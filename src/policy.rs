use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::item::DisplayItem;

/// Longest breadcrumb trail rendered without collapsing.
pub const BREADCRUMB_MAX_ITEMS: usize = 4;
const BREADCRUMB_TRAILING_ANCHORS: usize = 3;
const BREADCRUMB_TRIGGER_LABEL: &str = "...";

/// Which items render inline and which collapse into the overflow panel.
///
/// Indices refer to the presenter's item list; both lists keep display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub visible: Vec<usize>,
    pub hidden: Vec<usize>,
    /// Position in `visible` before which the overflow trigger renders.
    pub trigger_slot: Option<usize>,
    /// Terminal, non-navigable item.
    pub active: Option<usize>,
    /// Items this policy refuses to hide.
    pub anchors: Vec<usize>,
}

impl Partition {
    pub fn identity(len: usize) -> Self {
        Self {
            visible: (0..len).collect(),
            ..Self::default()
        }
    }

    pub fn is_truncated(&self) -> bool {
        !self.hidden.is_empty()
    }
}

pub trait TruncationStrategy {
    /// Splits `items` given the cutoff from the last fit measurement, if any.
    fn partition<C>(&self, items: &[DisplayItem<C>], cutoff: Option<usize>) -> Partition;

    /// Whether the presenter has to measure before the partition is final.
    fn needs_measurement(&self) -> bool;

    fn trigger_label(&self, hidden_count: usize) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationMode {
    /// Collapse whenever the trail is longer than the threshold.
    #[default]
    Always,
    /// Collapse only when the trail is long and a measurement says it overflows.
    Auto,
    Never,
}

impl TruncationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Auto => "auto",
            Self::Never => "never",
        }
    }
}

impl Display for TruncationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid truncation mode `{0}`; expected `always`, `auto` or `never`")]
pub struct ParseModeError(String);

impl FromStr for TruncationMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" | "truncate" => Ok(Self::Always),
            "auto" => Ok(Self::Auto),
            "never" | "none" => Ok(Self::Never),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

/// Fixed-anchor policy: first item, `...`, last three items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreadcrumbStrategy {
    pub mode: TruncationMode,
}

impl BreadcrumbStrategy {
    pub fn new(mode: TruncationMode) -> Self {
        Self { mode }
    }

    fn should_truncate(&self, len: usize, cutoff: Option<usize>) -> bool {
        if len <= BREADCRUMB_MAX_ITEMS {
            return false;
        }
        match self.mode {
            TruncationMode::Always => true,
            TruncationMode::Auto => cutoff.is_some_and(|cutoff| cutoff < len),
            TruncationMode::Never => false,
        }
    }
}

fn breadcrumb_anchors(len: usize) -> Vec<usize> {
    let tail_start = len.saturating_sub(BREADCRUMB_TRAILING_ANCHORS).max(1);
    let mut anchors = Vec::new();
    if len > 0 {
        anchors.push(0);
    }
    anchors.extend(tail_start..len);
    anchors
}

impl TruncationStrategy for BreadcrumbStrategy {
    fn partition<C>(&self, items: &[DisplayItem<C>], cutoff: Option<usize>) -> Partition {
        let len = items.len();
        let active = len.checked_sub(1);
        let anchors = breadcrumb_anchors(len);

        if !self.should_truncate(len, cutoff) {
            return Partition {
                active,
                anchors,
                ..Partition::identity(len)
            };
        }

        let tail_start = len - BREADCRUMB_TRAILING_ANCHORS;
        let mut visible = vec![0];
        visible.extend(tail_start..len);

        Partition {
            visible,
            hidden: (1..tail_start).collect(),
            trigger_slot: Some(1),
            active,
            anchors,
        }
    }

    fn needs_measurement(&self) -> bool {
        self.mode == TruncationMode::Auto
    }

    fn trigger_label(&self, _hidden_count: usize) -> String {
        BREADCRUMB_TRIGGER_LABEL.to_owned()
    }
}

/// Width-driven policy: whatever fits stays inline, the rest collapses into
/// a trailing `+N more`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegendStrategy;

impl TruncationStrategy for LegendStrategy {
    fn partition<C>(&self, items: &[DisplayItem<C>], cutoff: Option<usize>) -> Partition {
        let cutoff = cutoff.unwrap_or(items.len()).min(items.len());
        let mut partition = Partition::default();

        for (index, item) in items.iter().enumerate() {
            if item.is_anchor {
                partition.anchors.push(index);
            }
            if index < cutoff || item.is_anchor {
                partition.visible.push(index);
            } else {
                partition.hidden.push(index);
            }
        }

        if partition.is_truncated() {
            partition.trigger_slot = Some(partition.visible.len());
        }
        partition
    }

    fn needs_measurement(&self) -> bool {
        true
    }

    fn trigger_label(&self, hidden_count: usize) -> String {
        format!("+{hidden_count} more")
    }
}

#[cfg(test)]
mod tests {
    use crate::item::DisplayItem;

    use super::{
        BREADCRUMB_MAX_ITEMS, BreadcrumbStrategy, LegendStrategy, ParseModeError, Partition,
        TruncationMode, TruncationStrategy,
    };

    fn items(keys: &[&str]) -> Vec<DisplayItem<String>> {
        keys.iter().copied().map(DisplayItem::labelled).collect()
    }

    fn keys_at(list: &[DisplayItem<String>], indices: &[usize]) -> Vec<String> {
        indices.iter().map(|index| list[*index].key.clone()).collect()
    }

    #[test]
    fn breadcrumb_collapses_middle_of_long_trail() {
        let trail = items(&[
            "Home",
            "Products",
            "Categories",
            "Electronics",
            "Devices",
            "Laptops",
        ]);
        let partition = BreadcrumbStrategy::default().partition(&trail, None);

        assert_eq!(
            keys_at(&trail, &partition.visible),
            ["Home", "Electronics", "Devices", "Laptops"]
        );
        assert_eq!(keys_at(&trail, &partition.hidden), ["Products", "Categories"]);
        assert_eq!(partition.trigger_slot, Some(1));
        assert_eq!(partition.active, Some(5));
    }

    #[test]
    fn breadcrumb_never_truncates_short_trails() {
        for len in 0..=BREADCRUMB_MAX_ITEMS {
            let keys = (0..len).map(|index| format!("k{index}")).collect::<Vec<_>>();
            let trail = keys.iter().map(DisplayItem::labelled).collect::<Vec<_>>();
            for mode in [TruncationMode::Always, TruncationMode::Auto, TruncationMode::Never] {
                let partition = BreadcrumbStrategy::new(mode).partition(&trail, Some(0));
                assert!(!partition.is_truncated(), "len {len} mode {mode}");
                assert_eq!(partition.visible, (0..len).collect::<Vec<_>>());
                assert_eq!(partition.active, len.checked_sub(1));
            }
        }
    }

    #[test]
    fn breadcrumb_hides_exactly_len_minus_four() {
        for len in (BREADCRUMB_MAX_ITEMS + 1)..20 {
            let keys = (0..len).map(|index| format!("k{index}")).collect::<Vec<_>>();
            let trail = keys.iter().map(DisplayItem::labelled).collect::<Vec<_>>();
            let partition = BreadcrumbStrategy::default().partition(&trail, None);
            assert_eq!(partition.hidden.len(), len - 4);
            assert_eq!(partition.visible.len(), 4);
            assert_eq!(partition.visible[0], 0);
            assert_eq!(partition.active, Some(len - 1));
        }
    }

    #[test]
    fn breadcrumb_ignores_caller_anchors_in_the_middle() {
        let mut trail = items(&["a", "b", "c", "d", "e", "f"]);
        trail[1].is_anchor = true;
        let partition = BreadcrumbStrategy::default().partition(&trail, None);
        assert_eq!(partition.hidden, vec![1, 2]);
        assert_eq!(partition.anchors, vec![0, 3, 4, 5]);
    }

    #[test]
    fn breadcrumb_auto_mode_waits_for_overflow() {
        let trail = items(&["a", "b", "c", "d", "e", "f"]);
        let strategy = BreadcrumbStrategy::new(TruncationMode::Auto);

        assert_eq!(
            strategy.partition(&trail, None),
            Partition {
                active: Some(5),
                anchors: vec![0, 3, 4, 5],
                ..Partition::identity(6)
            }
        );
        assert!(!strategy.partition(&trail, Some(6)).is_truncated());
        assert_eq!(strategy.partition(&trail, Some(3)).hidden, vec![1, 2]);
    }

    #[test]
    fn breadcrumb_never_mode_is_identity() {
        let trail = items(&["a", "b", "c", "d", "e", "f", "g"]);
        let partition = BreadcrumbStrategy::new(TruncationMode::Never).partition(&trail, Some(1));
        assert_eq!(partition.visible, (0..7).collect::<Vec<_>>());
        assert_eq!(partition.trigger_slot, None);
    }

    #[test]
    fn legend_splits_at_cutoff() {
        let keys = items(&["revenue", "profit", "traffic", "conversions"]);
        let partition = LegendStrategy.partition(&keys, Some(2));

        assert_eq!(keys_at(&keys, &partition.visible), ["revenue", "profit"]);
        assert_eq!(keys_at(&keys, &partition.hidden), ["traffic", "conversions"]);
        assert_eq!(partition.trigger_slot, Some(2));
        assert_eq!(partition.active, None);
        assert_eq!(LegendStrategy.trigger_label(partition.hidden.len()), "+2 more");
    }

    #[test]
    fn legend_keeps_anchored_keys_visible() {
        let mut keys = items(&["revenue", "profit", "traffic", "conversions"]);
        keys[3].is_anchor = true;
        let partition = LegendStrategy.partition(&keys, Some(1));

        assert_eq!(keys_at(&keys, &partition.visible), ["revenue", "conversions"]);
        assert_eq!(keys_at(&keys, &partition.hidden), ["profit", "traffic"]);
        assert_eq!(partition.anchors, vec![3]);
    }

    #[test]
    fn legend_without_measurement_shows_everything() {
        let keys = items(&["revenue", "profit"]);
        assert_eq!(LegendStrategy.partition(&keys, None), Partition::identity(2));
        assert_eq!(LegendStrategy.partition(&keys, Some(9)), Partition::identity(2));
    }

    #[test]
    fn truncation_mode_parses_aliases() {
        assert_eq!("ALWAYS".parse::<TruncationMode>(), Ok(TruncationMode::Always));
        assert_eq!(" auto ".parse::<TruncationMode>(), Ok(TruncationMode::Auto));
        assert_eq!("none".parse::<TruncationMode>(), Ok(TruncationMode::Never));
        assert_eq!(
            "sometimes".parse::<TruncationMode>(),
            Err(ParseModeError("sometimes".to_owned()))
        );
    }
}
