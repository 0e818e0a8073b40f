use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PresenterSettings;
use crate::debounce::{DEFAULT_RESIZE_DEBOUNCE, Debouncer};
use crate::fit::{DEFAULT_OVERFLOW_BUFFER_PX, LayoutMeasure, StableFit, compute_cutoff};
use crate::item::{DisplayItem, same_identity};
use crate::menu::{MenuEvent, OverflowMenu};
use crate::pointer::{PointerHub, Region};
use crate::policy::{BreadcrumbStrategy, LegendStrategy, Partition, TruncationStrategy};
use crate::view::ListView;

pub type BreadcrumbPresenter<C> = ListPresenter<C, BreadcrumbStrategy>;
pub type LegendPresenter<C> = ListPresenter<C, LegendStrategy>;

type SelectCallback = Box<dyn FnMut(&str)>;

const WIDTH_EPSILON_PX: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenterOptions {
    pub resize_debounce: Duration,
    pub overflow_buffer_px: f32,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            overflow_buffer_px: DEFAULT_OVERFLOW_BUFFER_PX,
        }
    }
}

impl From<&PresenterSettings> for PresenterOptions {
    fn from(settings: &PresenterSettings) -> Self {
        Self {
            resize_debounce: settings.resize_debounce(),
            overflow_buffer_px: settings.legend_buffer_px,
        }
    }
}

/// Everything one mounted list knows about itself.
#[derive(Debug)]
pub struct ListState<C> {
    items: Vec<DisplayItem<C>>,
    cutoff_index: usize,
    container_width: Option<f32>,
    menu: OverflowMenu,
}

impl<C> ListState<C> {
    pub fn items(&self) -> &[DisplayItem<C>] {
        &self.items
    }

    pub fn cutoff_index(&self) -> usize {
        self.cutoff_index
    }

    pub fn container_width(&self) -> Option<f32> {
        self.container_width
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }
}

/// Owns a list's state and decides, every pass, what renders inline and what
/// goes into the overflow panel.
pub struct ListPresenter<C, S> {
    strategy: S,
    state: ListState<C>,
    partition: Partition,
    fit: StableFit,
    resize: Debouncer<f32>,
    last_reported_width: Option<f32>,
    needs_measure: bool,
    overflow_buffer_px: f32,
    on_select: Option<SelectCallback>,
}

impl<C, S: TruncationStrategy> ListPresenter<C, S> {
    pub fn new(
        items: Vec<DisplayItem<C>>,
        strategy: S,
        hub: PointerHub,
        options: PresenterOptions,
    ) -> Self {
        let cutoff_index = items.len();
        let partition = strategy.partition(&items, None);
        let needs_measure = strategy.needs_measurement();

        Self {
            strategy,
            state: ListState {
                items,
                cutoff_index,
                container_width: None,
                menu: OverflowMenu::new(hub),
            },
            partition,
            fit: StableFit::default(),
            resize: Debouncer::new(options.resize_debounce),
            last_reported_width: None,
            needs_measure,
            overflow_buffer_px: options.overflow_buffer_px,
            on_select: None,
        }
    }

    /// Called with the key of an item chosen from the overflow panel or a
    /// navigable inline item.
    pub fn with_on_select(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn state(&self) -> &ListState<C> {
        &self.state
    }

    pub fn items(&self) -> &[DisplayItem<C>] {
        &self.state.items
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn cutoff_index(&self) -> usize {
        self.state.cutoff_index
    }

    pub fn is_menu_open(&self) -> bool {
        self.state.menu.is_open()
    }

    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    /// Replaces the item list. A different key sequence starts over: the
    /// cutoff is not carried to a list it was not measured for.
    pub fn set_items(&mut self, items: Vec<DisplayItem<C>>) -> bool {
        if same_identity(&self.state.items, &items) {
            self.state.items = items;
            self.repartition();
            // New content may have new widths; keep the cutoff until the next
            // measurement replaces it.
            self.fit.reset();
            self.needs_measure = self.strategy.needs_measurement();
            return false;
        }

        debug!(
            previous = self.state.items.len(),
            next = items.len(),
            "item list identity changed; resetting cutoff"
        );
        self.state.items = items;
        self.state.cutoff_index = self.state.items.len();
        self.fit.reset();
        self.resize.cancel();
        self.last_reported_width = None;
        self.needs_measure = self.strategy.needs_measurement();
        self.state.menu.apply(MenuEvent::Close);
        self.repartition();
        true
    }

    /// Measures immediately. Returns whether the rendered partition changed.
    pub fn measure_now(&mut self, measure: &impl LayoutMeasure) -> bool {
        if !self.strategy.needs_measurement() {
            return false;
        }

        let measurement = measure.measure();
        let width = measurement.container.width();
        let outcome = compute_cutoff(&measurement, self.overflow_buffer_px);
        self.state.container_width = Some(width);
        self.last_reported_width = Some(width);
        self.needs_measure = false;

        let Some(cutoff) = self.fit.apply(width, outcome) else {
            // Nothing measurable yet; keep the current partition.
            self.needs_measure = true;
            return false;
        };
        self.apply_cutoff(cutoff)
    }

    /// Queues a resize notification; the recomputation waits for the quiet
    /// window. Repeats of the last reported width are dropped.
    pub fn notify_resize(&mut self, width: f32, now: Instant) {
        if !self.strategy.needs_measurement() {
            return;
        }
        if self
            .last_reported_width
            .is_some_and(|last| (last - width).abs() < WIDTH_EPSILON_PX)
        {
            return;
        }
        self.last_reported_width = Some(width);
        self.resize.push(width, now);
    }

    /// Runs pending work: the first measurement after mount or a list change,
    /// and any resize whose quiet window has passed.
    pub fn tick(&mut self, now: Instant, measure: &impl LayoutMeasure) -> bool {
        if let Some(width) = self.resize.poll(now) {
            debug!(width, "resize settled; remeasuring");
            return self.measure_now(measure);
        }
        if self.needs_measure {
            return self.measure_now(measure);
        }
        false
    }

    pub fn resize_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    pub fn toggle_menu(&mut self) {
        if self.partition.is_truncated() {
            self.state.menu.apply(MenuEvent::Toggle);
        }
    }

    pub fn open_menu(&mut self) {
        if self.partition.is_truncated() {
            self.state.menu.apply(MenuEvent::Open);
        }
    }

    pub fn close_menu(&mut self) {
        self.state.menu.apply(MenuEvent::Close);
    }

    pub fn set_menu_regions(&mut self, trigger: Option<Region>, panel: Option<Region>) {
        self.state.menu.set_regions(trigger, panel);
    }

    #[cfg(test)]
    pub(crate) fn menu_regions(&self) -> (Option<Region>, Option<Region>) {
        self.state.menu.regions()
    }

    /// Processes pointer presses seen since the last call.
    pub fn handle_pointer(&mut self) -> bool {
        self.state.menu.poll_pointer()
    }

    /// Chooses a hidden item from the open panel.
    pub fn select_hidden(&mut self, key: &str) -> bool {
        let is_hidden = self
            .partition
            .hidden
            .iter()
            .any(|index| self.state.items[*index].key == key);
        if !is_hidden {
            return false;
        }

        let Some(selected) = self.state.menu.apply(MenuEvent::Select {
            key: key.to_owned(),
        }) else {
            return false;
        };
        self.notify_selected(&selected);
        true
    }

    /// Follows an inline item. The active item is not navigable.
    pub fn activate_visible(&mut self, key: &str) -> bool {
        let navigable = self.partition.visible.iter().any(|index| {
            self.state.items[*index].key == key && self.partition.active != Some(*index)
        });
        if !navigable {
            return false;
        }

        self.state.menu.apply(MenuEvent::Close);
        self.notify_selected(key);
        true
    }

    pub fn render(&self) -> ListView<'_, C> {
        ListView::build(
            &self.state.items,
            &self.partition,
            self.strategy.trigger_label(self.partition.hidden.len()),
            self.state.menu.is_open(),
        )
    }

    fn notify_selected(&mut self, key: &str) {
        if let Some(callback) = self.on_select.as_mut() {
            callback(key);
        }
    }

    fn apply_cutoff(&mut self, cutoff: usize) -> bool {
        let cutoff = cutoff.min(self.state.items.len());
        if cutoff == self.state.cutoff_index {
            return false;
        }

        debug!(
            previous = self.state.cutoff_index,
            cutoff,
            items = self.state.items.len(),
            "cutoff changed"
        );
        self.state.cutoff_index = cutoff;
        self.repartition();
        true
    }

    fn repartition(&mut self) {
        let cutoff = self.fit.cutoff().map(|_| self.state.cutoff_index);
        self.partition = self.strategy.partition(&self.state.items, cutoff);
        if !self.partition.is_truncated() {
            self.state.menu.apply(MenuEvent::Close);
        }
    }
}
