use std::time::{Duration, Instant};

use anyhow::Result;
use eframe::egui;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::config::PresenterSettings;
use crate::fixture::{BreadcrumbScenario, GalleryFixture, LegendScenario, LegendSwatch};
use crate::item::DisplayItem;
use crate::pointer::PointerHub;
use crate::presenter::{BreadcrumbPresenter, LegendPresenter, PresenterOptions};
use crate::widgets::{forward_pointer_presses, show_breadcrumb, show_legend};

const APP_TITLE: &str = "overflow_list gallery";
const MAX_ACTIVITY_ENTRIES: usize = 40;

pub fn run_gallery(settings: &PresenterSettings, fixture: GalleryFixture) -> Result<()> {
    let options = PresenterOptions::from(settings);
    let repaint_after = settings.resize_debounce();
    info!(
        breadcrumbs = fixture.breadcrumbs.len(),
        legends = fixture.legends.len(),
        resize_debounce_ms = settings.resize_debounce_ms,
        legend_buffer_px = settings.legend_buffer_px,
        "starting gallery"
    );

    eframe::run_native(
        APP_TITLE,
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(GalleryApp::new(fixture, options, repaint_after)))),
    )
    .map_err(|error| anyhow::anyhow!("gallery UI exited with error: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GalleryEvent {
    Selected { list_id: String, key: String },
}

struct MountedBreadcrumb {
    scenario: BreadcrumbScenario,
    presenter: BreadcrumbPresenter<String>,
}

struct MountedLegend {
    scenario: LegendScenario,
    presenter: LegendPresenter<LegendSwatch>,
    hidden_series: Vec<String>,
}

struct GalleryApp {
    pointer_hub: PointerHub,
    event_rx: UnboundedReceiver<GalleryEvent>,
    breadcrumbs: Vec<MountedBreadcrumb>,
    legends: Vec<MountedLegend>,
    activity: Vec<String>,
    repaint_after: Duration,
    events_disconnected: bool,
}

impl GalleryApp {
    fn new(fixture: GalleryFixture, options: PresenterOptions, repaint_after: Duration) -> Self {
        let pointer_hub = PointerHub::new();
        let (event_tx, event_rx) = unbounded_channel();

        let breadcrumbs = fixture
            .breadcrumbs
            .into_iter()
            .map(|scenario| {
                let presenter = scenario
                    .presenter(pointer_hub.clone(), options)
                    .with_on_select(selection_sink(&event_tx, &scenario.id));
                MountedBreadcrumb {
                    scenario,
                    presenter,
                }
            })
            .collect();
        let legends = fixture
            .legends
            .into_iter()
            .map(|scenario| {
                let presenter = scenario
                    .presenter(pointer_hub.clone(), options)
                    .with_on_select(selection_sink(&event_tx, &scenario.id));
                MountedLegend {
                    scenario,
                    presenter,
                    hidden_series: Vec::new(),
                }
            })
            .collect();

        Self {
            pointer_hub,
            event_rx,
            breadcrumbs,
            legends,
            activity: vec!["Gallery ready. Resize the side panel to reflow legends.".to_owned()],
            repaint_after,
            events_disconnected: false,
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.events_disconnected {
                        warn!("gallery selection channel disconnected");
                    }
                    self.events_disconnected = true;
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: GalleryEvent) {
        let GalleryEvent::Selected { list_id, key } = event;
        debug!(list = %list_id, key = %key, "list item selected");

        if let Some(mounted) = self
            .breadcrumbs
            .iter_mut()
            .find(|mounted| mounted.scenario.id == list_id)
        {
            navigate_to(&mut mounted.presenter, &key);
            self.record_activity(format!("{list_id}: navigated to `{key}`"));
            return;
        }

        if let Some(mounted) = self
            .legends
            .iter_mut()
            .find(|mounted| mounted.scenario.id == list_id)
        {
            let now_hidden = toggle_series(&mut mounted.hidden_series, &key);
            let state = if now_hidden { "hidden" } else { "shown" };
            self.record_activity(format!("{list_id}: series `{key}` {state}"));
        }
    }

    fn record_activity(&mut self, entry: String) {
        self.activity.push(entry);
        if self.activity.len() > MAX_ACTIVITY_ENTRIES {
            let extra = self.activity.len() - MAX_ACTIVITY_ENTRIES;
            self.activity.drain(0..extra);
        }
    }

    fn render_activity(&mut self, ui: &mut egui::Ui) {
        ui.heading("Activity");
        ui.label(format!("Pointer listeners: {}", self.pointer_hub.listener_count()));
        ui.separator();
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in &self.activity {
                    ui.label(entry);
                }
            });
    }

    fn render_lists(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.heading("Breadcrumbs");
        for mounted in &mut self.breadcrumbs {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&mounted.scenario.id).strong());
                    ui.weak(format!("mode: {}", mounted.scenario.mode));
                    if ui.small_button("Reset").clicked() {
                        mounted.presenter.set_items(mounted.scenario.display_items());
                    }
                });
                show_breadcrumb(ui, &mut mounted.presenter, &mounted.scenario.id, now);
            });
            ui.add_space(6.0);
        }

        ui.separator();
        ui.heading("Legends");
        for mounted in &mut self.legends {
            ui.group(|ui| {
                ui.label(egui::RichText::new(&mounted.scenario.id).strong());
                show_legend(ui, &mut mounted.presenter, &mounted.scenario.id, now);
                let state = mounted.presenter.state();
                ui.weak(format!(
                    "cutoff {} of {} | width {:.0}px | hidden series: {}",
                    state.cutoff_index(),
                    state.items().len(),
                    state.container_width().unwrap_or_default(),
                    if mounted.hidden_series.is_empty() {
                        "none".to_owned()
                    } else {
                        mounted.hidden_series.join(", ")
                    }
                ));
            });
            ui.add_space(6.0);
        }
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        forward_pointer_presses(ctx, &self.pointer_hub);
        self.drain_events();
        let now = Instant::now();

        egui::SidePanel::left("gallery_activity_pane")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.render_activity(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.render_lists(ui, now));

        ctx.request_repaint_after(self.repaint_after);
    }
}

fn selection_sink(
    event_tx: &UnboundedSender<GalleryEvent>,
    list_id: &str,
) -> impl FnMut(&str) + 'static {
    let event_tx = event_tx.clone();
    let list_id = list_id.to_owned();
    move |key: &str| {
        let _ = event_tx.send(GalleryEvent::Selected {
            list_id: list_id.clone(),
            key: key.to_owned(),
        });
    }
}

/// Cuts the trail back to `key`, the way following a breadcrumb link does.
fn navigate_to(presenter: &mut BreadcrumbPresenter<String>, key: &str) {
    let Some(position) = presenter.items().iter().position(|item| item.key == key) else {
        return;
    };
    let trail = presenter.items()[..=position]
        .iter()
        .map(|item| DisplayItem::new(item.key.clone(), item.content.clone()))
        .collect();
    presenter.set_items(trail);
}

/// Returns whether `key` is hidden after the toggle.
fn toggle_series(hidden_series: &mut Vec<String>, key: &str) -> bool {
    if let Some(position) = hidden_series.iter().position(|hidden| hidden == key) {
        hidden_series.remove(position);
        false
    } else {
        hidden_series.push(key.to_owned());
        true
    }
}
