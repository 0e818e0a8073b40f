use std::hash::Hash;
use std::time::Instant;

use eframe::egui;

use crate::fit::{ContainerBox, Measurement};
use crate::item::DisplayItem;
use crate::policy::TruncationMode;
use crate::presenter::BreadcrumbPresenter;

use super::{show_list, text_width, track_container};

const SEPARATOR: &str = "/";

/// Breadcrumb trail: links for every crumb but the last, which renders as
/// the current page.
pub fn show_breadcrumb(
    ui: &mut egui::Ui,
    presenter: &mut BreadcrumbPresenter<String>,
    id_salt: impl Hash,
    now: Instant,
) {
    let id = ui.make_persistent_id(id_salt);
    if presenter.strategy().mode == TruncationMode::Auto {
        let measurement = measure_trail(ui, presenter.items());
        track_container(presenter, &measurement, now);
    }

    show_list(
        ui,
        presenter,
        id,
        Some(SEPARATOR),
        |ui, item, active| {
            if active {
                ui.strong(item.content.as_str())
            } else {
                ui.link(item.content.as_str())
            }
        },
        |item| item.content.clone(),
    );
}

fn measure_trail(ui: &egui::Ui, items: &[DisplayItem<String>]) -> Measurement {
    let spacing = ui.spacing().item_spacing.x;
    let separator = text_width(ui, SEPARATOR, egui::TextStyle::Body) + spacing * 2.0;
    let widths = items
        .iter()
        .map(|item| text_width(ui, &item.content, egui::TextStyle::Body))
        .collect::<Vec<_>>();

    Measurement::row(
        ContainerBox {
            left: 0.0,
            right: ui.available_width(),
        },
        &widths,
        separator,
    )
}
