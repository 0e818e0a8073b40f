use eframe::egui;

use crate::pointer::Region;

use super::to_region;

const PANEL_OFFSET_Y: f32 = 4.0;

pub(super) struct PanelOutcome {
    pub chosen: Option<String>,
    pub region: Region,
}

/// Floating panel under `anchor` listing `(key, label)` entries.
pub(super) fn show_overflow_panel(
    ctx: &egui::Context,
    id: egui::Id,
    anchor: egui::Rect,
    entries: &[(String, String)],
) -> PanelOutcome {
    let area = egui::Area::new(id)
        .order(egui::Order::Foreground)
        .fixed_pos(anchor.left_bottom() + egui::vec2(0.0, PANEL_OFFSET_Y))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .show(ui, |ui| {
                    let mut chosen = None;
                    for (key, label) in entries {
                        if ui.selectable_label(false, label.as_str()).clicked() {
                            chosen = Some(key.clone());
                        }
                    }
                    chosen
                })
                .inner
        });

    PanelOutcome {
        chosen: area.inner,
        region: to_region(area.response.rect),
    }
}
