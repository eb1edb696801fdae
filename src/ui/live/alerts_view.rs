use egui::{Align2, Color32, RichText};

use super::LiveDashboardApp;

impl LiveDashboardApp {
    /// Shows the oldest pending fetch error until the user acknowledges it.
    pub(crate) fn alerts_view(&mut self, ctx: &egui::Context) {
        let Some(message) = self.dashboard.current_dialog().map(str::to_owned) else {
            return;
        };
        let pending = self.dashboard.pending_dialogs();

        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(Color32::WHITE));
                if pending > 1 {
                    ui.label(
                        RichText::new(format!("{} more", pending - 1)).color(Color32::GRAY),
                    );
                }
                if ui.button("OK").clicked() {
                    self.dashboard.dismiss_dialog();
                }
            });
    }
}
