use std::hash::Hash;
use std::time::Instant;

use eframe::egui;

use crate::fit::{ContainerBox, Measurement};
use crate::fixture::LegendSwatch;
use crate::item::DisplayItem;
use crate::presenter::LegendPresenter;

use super::{show_list, text_width, track_container};

const SWATCH_SIZE: f32 = 10.0;

pub fn show_legend(
    ui: &mut egui::Ui,
    presenter: &mut LegendPresenter<LegendSwatch>,
    id_salt: impl Hash,
    now: Instant,
) {
    let id = ui.make_persistent_id(id_salt);
    let measurement = measure_legend(ui, presenter.items());
    track_container(presenter, &measurement, now);

    show_list(
        ui,
        presenter,
        id,
        None,
        |ui, item, _active| draw_swatch(ui, &item.content),
        |item| item.content.label.clone(),
    );
}

fn measure_legend(ui: &egui::Ui, items: &[DisplayItem<LegendSwatch>]) -> Measurement {
    let spacing = ui.spacing().item_spacing.x;
    let widths = items
        .iter()
        .map(|item| {
            SWATCH_SIZE + spacing + text_width(ui, &item.content.label, egui::TextStyle::Body)
        })
        .collect::<Vec<_>>();

    Measurement::row(
        ContainerBox {
            left: 0.0,
            right: ui.available_width(),
        },
        &widths,
        spacing,
    )
}

fn draw_swatch(ui: &mut egui::Ui, swatch: &LegendSwatch) -> egui::Response {
    ui.horizontal(|ui| {
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::hover());
        let [red, green, blue] = swatch.color;
        ui.painter().circle_filled(
            rect.center(),
            SWATCH_SIZE / 2.0,
            egui::Color32::from_rgb(red, green, blue),
        );
        ui.add(egui::Label::new(swatch.label.as_str()).sense(egui::Sense::click()))
    })
    .inner
}
