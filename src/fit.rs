use serde::Serialize;
use tracing::debug;

/// Space reserved for the `+N more` trigger when a list does not fit.
pub const DEFAULT_OVERFLOW_BUFFER_PX: f32 = 56.0;
/// Width changes smaller than this are layout jitter, not a resize.
const WIDTH_EPSILON_PX: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemBox {
    pub left: f32,
    pub right: f32,
}

impl ItemBox {
    pub fn width(self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerBox {
    pub left: f32,
    pub right: f32,
}

impl ContainerBox {
    pub fn width(self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// Boxes of every item, rendered in display order, plus the box they must
/// fit in. All coordinates share one origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub container: ContainerBox,
    pub items: Vec<ItemBox>,
}

impl Measurement {
    /// Lays `widths` out left to right from `container.left` with `gap`
    /// between neighbours, the way a single-row flex container would.
    pub fn row(container: ContainerBox, widths: &[f32], gap: f32) -> Self {
        let mut cursor = container.left;
        let mut items = Vec::with_capacity(widths.len());
        for (index, width) in widths.iter().copied().enumerate() {
            if index > 0 {
                cursor += gap;
            }
            items.push(ItemBox {
                left: cursor,
                right: cursor + width.max(0.0),
            });
            cursor += width.max(0.0);
        }

        Self { container, items }
    }
}

/// Platform capability that renders every item once and reports the boxes.
pub trait LayoutMeasure {
    fn measure(&self) -> Measurement;
}

impl LayoutMeasure for Measurement {
    fn measure(&self) -> Measurement {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "cutoff", rename_all = "snake_case")]
pub enum FitOutcome {
    Measured(usize),
    /// Nothing has a size yet (hidden container, fonts not loaded).
    Deferred,
}

pub fn compute_cutoff(measurement: &Measurement, buffer: f32) -> FitOutcome {
    let items = &measurement.items;
    if items.is_empty() {
        return FitOutcome::Measured(0);
    }
    if measurement.container.width() <= 0.0 || items.iter().all(|item| item.width() <= 0.0) {
        return FitOutcome::Deferred;
    }

    let edge = measurement.container.right;
    // No trigger is rendered when everything fits, so no buffer is reserved.
    if items.iter().all(|item| item.right <= edge) {
        return FitOutcome::Measured(items.len());
    }

    let cutoff = items
        .iter()
        .position(|item| item.right + buffer.max(0.0) > edge)
        .unwrap_or(items.len());
    FitOutcome::Measured(cutoff)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AppliedFit {
    width: f32,
    cutoff: usize,
}

/// Remembers the last applied cutoff so repeated measurements cannot make the
/// list flicker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StableFit {
    applied: Option<AppliedFit>,
}

impl StableFit {
    pub fn cutoff(&self) -> Option<usize> {
        self.applied.map(|applied| applied.cutoff)
    }

    pub fn width(&self) -> Option<f32> {
        self.applied.map(|applied| applied.width)
    }

    pub fn reset(&mut self) {
        self.applied = None;
    }

    /// Folds a fresh measurement into the applied cutoff and returns it.
    pub fn apply(&mut self, width: f32, outcome: FitOutcome) -> Option<usize> {
        let FitOutcome::Measured(cutoff) = outcome else {
            debug!(width, "fit measurement deferred; keeping previous cutoff");
            return self.cutoff();
        };

        let next = match self.applied {
            Some(previous) if (previous.width - width).abs() < WIDTH_EPSILON_PX => previous,
            Some(previous) if width > previous.width && cutoff < previous.cutoff => AppliedFit {
                width,
                cutoff: previous.cutoff,
            },
            _ => AppliedFit { width, cutoff },
        };
        self.applied = Some(next);
        Some(next.cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ContainerBox, FitOutcome, ItemBox, LayoutMeasure, Measurement, StableFit,
        compute_cutoff,
    };

    fn container(width: f32) -> ContainerBox {
        ContainerBox {
            left: 0.0,
            right: width,
        }
    }

    #[test]
    fn row_layout_places_items_with_gaps() {
        let measurement = Measurement::row(container(100.0), &[10.0, 20.0], 5.0);
        assert_eq!(
            measurement.items,
            vec![
                ItemBox {
                    left: 0.0,
                    right: 10.0
                },
                ItemBox {
                    left: 15.0,
                    right: 35.0
                },
            ]
        );
    }

    #[test]
    fn cutoff_is_item_count_when_everything_fits() {
        let measurement = Measurement::row(container(300.0), &[60.0, 60.0, 60.0], 10.0);
        assert_eq!(compute_cutoff(&measurement, 56.0), FitOutcome::Measured(3));
    }

    #[test]
    fn cutoff_reserves_buffer_for_trigger_when_overflowing() {
        // revenue 0..90, profit 102..182, traffic 194..274, conversions 286..396
        let measurement =
            Measurement::row(container(300.0), &[90.0, 80.0, 80.0, 110.0], 12.0);
        assert_eq!(compute_cutoff(&measurement, 56.0), FitOutcome::Measured(2));
    }

    #[test]
    fn cutoff_can_be_zero_when_first_item_does_not_fit() {
        let measurement = Measurement::row(container(100.0), &[80.0, 80.0], 0.0);
        assert_eq!(compute_cutoff(&measurement, 40.0), FitOutcome::Measured(0));
    }

    #[test]
    fn empty_list_measures_zero() {
        let measurement = Measurement::row(container(0.0), &[], 0.0);
        assert_eq!(compute_cutoff(&measurement, 56.0), FitOutcome::Measured(0));
    }

    #[test]
    fn zero_width_boxes_defer() {
        let hidden_container = Measurement::row(container(0.0), &[40.0, 40.0], 0.0);
        assert_eq!(compute_cutoff(&hidden_container, 56.0), FitOutcome::Deferred);

        let unsized_items = Measurement::row(container(300.0), &[0.0, 0.0], 0.0);
        assert_eq!(compute_cutoff(&unsized_items, 56.0), FitOutcome::Deferred);
    }

    #[test]
    fn measurement_is_its_own_measure_source() {
        let measurement = Measurement::row(container(50.0), &[10.0], 0.0);
        assert_eq!(measurement.measure(), measurement);
    }

    #[test]
    fn stable_fit_is_idempotent_for_identical_widths() {
        let mut fit = StableFit::default();
        assert_eq!(fit.apply(300.0, FitOutcome::Measured(2)), Some(2));
        assert_eq!(fit.apply(300.0, FitOutcome::Measured(1)), Some(2));
        assert_eq!(fit.apply(300.2, FitOutcome::Measured(1)), Some(2));
    }

    #[test]
    fn stable_fit_never_shrinks_on_growth() {
        let mut fit = StableFit::default();
        fit.apply(300.0, FitOutcome::Measured(2));
        assert_eq!(fit.apply(320.0, FitOutcome::Measured(1)), Some(2));
        assert_eq!(fit.apply(500.0, FitOutcome::Measured(4)), Some(4));
    }

    #[test]
    fn stable_fit_shrinks_on_genuine_width_reduction() {
        let mut fit = StableFit::default();
        fit.apply(500.0, FitOutcome::Measured(4));
        assert_eq!(fit.apply(200.0, FitOutcome::Measured(1)), Some(1));
        assert_eq!(fit.width(), Some(200.0));
    }

    #[test]
    fn stable_fit_recovers_after_deferred_measurement() {
        let mut fit = StableFit::default();
        assert_eq!(fit.apply(0.0, FitOutcome::Deferred), None);
        assert_eq!(fit.apply(300.0, FitOutcome::Measured(2)), Some(2));
        assert_eq!(fit.apply(0.0, FitOutcome::Deferred), Some(2));
        assert_eq!(fit.apply(500.0, FitOutcome::Measured(4)), Some(4));

        fit.reset();
        assert_eq!(fit.cutoff(), None);
    }
}
