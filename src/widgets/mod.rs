use std::time::Instant;

use eframe::egui;

use crate::fit::Measurement;
use crate::item::DisplayItem;
use crate::pointer::{PointerHub, PointerPress, Region};
use crate::policy::TruncationStrategy;
use crate::presenter::ListPresenter;
use crate::view::ViewEntry;

pub mod breadcrumb;
pub mod legend;
mod overflow;

pub use self::breadcrumb::show_breadcrumb;
pub use self::legend::show_legend;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ListAction {
    Activate(String),
    ToggleMenu,
    Select(String),
}

pub fn to_region(rect: egui::Rect) -> Region {
    Region {
        left: rect.min.x,
        top: rect.min.y,
        right: rect.max.x,
        bottom: rect.max.y,
    }
}

/// Forwards this frame's pointer presses to `hub`. Call once per frame,
/// before any list is drawn.
pub fn forward_pointer_presses(ctx: &egui::Context, hub: &PointerHub) {
    let press = ctx.input(|input| {
        if input.pointer.any_pressed() {
            input.pointer.interact_pos()
        } else {
            None
        }
    });
    if let Some(position) = press {
        hub.dispatch(PointerPress {
            x: position.x,
            y: position.y,
        });
    }
}

fn text_width(ui: &egui::Ui, text: &str, style: egui::TextStyle) -> f32 {
    let font_id = style.resolve(ui.style());
    ui.fonts(|fonts| {
        fonts
            .layout_no_wrap(text.to_owned(), font_id, egui::Color32::PLACEHOLDER)
            .size()
            .x
    })
}

/// Reports the current container width and runs any measurement that is due.
fn track_container<C, S: TruncationStrategy>(
    presenter: &mut ListPresenter<C, S>,
    measurement: &Measurement,
    now: Instant,
) {
    presenter.notify_resize(measurement.container.width(), now);
    presenter.tick(now, measurement);
}

/// Draws a presenter's view in one row, then the overflow panel when open,
/// and feeds the interactions back into the presenter.
fn show_list<C, S: TruncationStrategy>(
    ui: &mut egui::Ui,
    presenter: &mut ListPresenter<C, S>,
    id: egui::Id,
    separator: Option<&str>,
    mut draw_item: impl FnMut(&mut egui::Ui, &DisplayItem<C>, bool) -> egui::Response,
    panel_label: impl Fn(&DisplayItem<C>) -> String,
) {
    let mut actions = Vec::new();
    let mut trigger_rect = None;
    let panel_entries = {
        let view = presenter.render();
        ui.horizontal(|ui| {
            for (slot, entry) in view.entries.iter().enumerate() {
                if slot > 0
                    && let Some(separator) = separator
                {
                    ui.weak(separator);
                }
                match entry {
                    ViewEntry::Item { item, active, .. } => {
                        let response = draw_item(ui, *item, *active);
                        if !*active && response.clicked() {
                            actions.push(ListAction::Activate(item.key.clone()));
                        }
                    }
                    ViewEntry::OverflowTrigger { label, open, .. } => {
                        let response = ui.selectable_label(*open, label.as_str());
                        if response.clicked() {
                            actions.push(ListAction::ToggleMenu);
                        }
                        trigger_rect = Some(response.rect);
                    }
                }
            }
        });

        view.panel.as_ref().map(|panel| {
            panel
                .iter()
                .map(|entry| (entry.item.key.clone(), panel_label(entry.item)))
                .collect::<Vec<_>>()
        })
    };

    let mut panel_region = None;
    if let (Some(entries), Some(anchor)) = (panel_entries, trigger_rect) {
        let outcome = overflow::show_overflow_panel(ui.ctx(), id.with("overflow"), anchor, &entries);
        if let Some(key) = outcome.chosen {
            actions.push(ListAction::Select(key));
        }
        panel_region = Some(outcome.region);
    }

    presenter.set_menu_regions(trigger_rect.map(to_region), panel_region);
    presenter.handle_pointer();

    for action in actions {
        match action {
            ListAction::Activate(key) => {
                presenter.activate_visible(&key);
            }
            ListAction::ToggleMenu => presenter.toggle_menu(),
            ListAction::Select(key) => {
                presenter.select_hidden(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    use eframe::egui;

    use crate::item::DisplayItem;
    use crate::pointer::{PointerHub, Region};
    use crate::policy::BreadcrumbStrategy;
    use crate::presenter::{BreadcrumbPresenter, ListPresenter, PresenterOptions};

    use super::{forward_pointer_presses, show_breadcrumb};

    struct Harness {
        ctx: egui::Context,
        hub: PointerHub,
        presenter: BreadcrumbPresenter<String>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Harness {
        fn new() -> Self {
            let hub = PointerHub::new();
            let calls = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&calls);
            let presenter = ListPresenter::new(
                ["Home", "Products", "Categories", "Electronics", "Devices", "Laptops"]
                    .into_iter()
                    .map(DisplayItem::labelled)
                    .collect(),
                BreadcrumbStrategy::default(),
                hub.clone(),
                PresenterOptions::default(),
            )
            .with_on_select(move |key: &str| sink.borrow_mut().push(key.to_owned()));

            let mut harness = Self {
                ctx: egui::Context::default(),
                hub,
                presenter,
                calls,
            };
            harness.settle();
            harness
        }

        fn frame(&mut self, events: Vec<egui::Event>) {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(800.0, 600.0),
                )),
                events,
                ..Default::default()
            };
            let hub = &self.hub;
            let presenter = &mut self.presenter;
            let _ = self.ctx.run(input, |ctx| {
                forward_pointer_presses(ctx, hub);
                egui::CentralPanel::default().show(ctx, |ui| {
                    show_breadcrumb(ui, presenter, "trail", Instant::now());
                });
            });
        }

        /// Empty frames so new areas finish their sizing pass.
        fn settle(&mut self) {
            for _ in 0..3 {
                self.frame(Vec::new());
            }
        }

        fn press(&mut self, pos: egui::Pos2) {
            self.frame(vec![egui::Event::PointerMoved(pos), button(pos, true)]);
        }

        fn release(&mut self, pos: egui::Pos2) {
            self.frame(vec![egui::Event::PointerMoved(pos), button(pos, false)]);
        }

        fn click(&mut self, pos: egui::Pos2) {
            self.press(pos);
            self.release(pos);
            self.settle();
        }

        fn trigger_center(&self) -> egui::Pos2 {
            let (trigger, _) = self.presenter.menu_regions();
            center(trigger.expect("trigger should be laid out"))
        }

        fn first_panel_entry(&self) -> egui::Pos2 {
            let (_, panel) = self.presenter.menu_regions();
            let panel = panel.expect("panel should be laid out while open");
            egui::pos2(panel.left + 16.0, panel.top + 15.0)
        }
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn center(region: Region) -> egui::Pos2 {
        egui::pos2(
            (region.left + region.right) / 2.0,
            (region.top + region.bottom) / 2.0,
        )
    }

    #[test]
    fn clicking_trigger_toggles_menu() {
        let mut harness = Harness::new();
        assert!(!harness.presenter.is_menu_open());

        let trigger = harness.trigger_center();
        harness.click(trigger);
        assert!(harness.presenter.is_menu_open());
        assert_eq!(harness.hub.listener_count(), 1);

        harness.click(trigger);
        assert!(!harness.presenter.is_menu_open());
        assert_eq!(harness.hub.listener_count(), 0);
        assert!(harness.calls.borrow().is_empty());
    }

    #[test]
    fn choosing_hidden_entry_notifies_once_and_closes() {
        let mut harness = Harness::new();
        let trigger = harness.trigger_center();
        harness.click(trigger);
        assert!(harness.presenter.is_menu_open());

        let entry = harness.first_panel_entry();
        harness.press(entry);
        assert!(
            harness.presenter.is_menu_open(),
            "a press inside the panel must not dismiss it"
        );
        harness.release(entry);
        harness.settle();

        assert!(!harness.presenter.is_menu_open());
        assert_eq!(*harness.calls.borrow(), ["Products"]);
        assert_eq!(harness.hub.listener_count(), 0);
    }

    #[test]
    fn pressing_outside_closes_without_selection() {
        let mut harness = Harness::new();
        let trigger = harness.trigger_center();
        harness.click(trigger);
        assert!(harness.presenter.is_menu_open());

        let outside = egui::pos2(700.0, 500.0);
        harness.press(outside);
        assert!(!harness.presenter.is_menu_open());
        assert_eq!(harness.hub.listener_count(), 0);

        harness.release(outside);
        harness.settle();
        assert!(!harness.presenter.is_menu_open());
        assert!(harness.calls.borrow().is_empty());
    }
}
