use egui::{Align, Frame, Layout, Sense, vec2};

use crate::ui::{CANVAS_BACKGROUND, paint_scene};

use super::LiveDashboardApp;

impl LiveDashboardApp {
    pub(crate) fn scene_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(Frame::new())
            .show(ctx, |ui| {
                let config = self.dashboard.scene_config();
                let canvas_size = vec2(config.width, config.height);
                ui.with_layout(Layout::top_down(Align::Center), |ui| {
                    let (response, painter) = ui.allocate_painter(canvas_size, Sense::hover());
                    match self.dashboard.scene() {
                        Some(scene) => paint_scene(&painter, response.rect, scene),
                        // nothing fetched yet, show an empty canvas
                        None => {
                            painter.rect_filled(response.rect, 0., CANVAS_BACKGROUND);
                        }
                    }
                });
            });
    }
}
