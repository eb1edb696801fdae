use egui::{
    Align, Button, Color32, CornerRadius, Frame, Grid, Layout, Margin, RichText, Vec2b,
};
use egui_plot::{Line, PlotPoints};

use crate::ui::stroke_shade;

use super::{
    DEFAULT_BUTTON_CORNER_RADIUS, DEFAULT_WINDOW_CORNER_RADIUS, LiveDashboardApp, PALETTE_ORANGE,
};

impl LiveDashboardApp {
    pub(crate) fn telemetry_view(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls")
            .min_height(30.)
            .frame(
                Frame::new()
                    .inner_margin(Margin::same(8))
                    .corner_radius(CornerRadius {
                        nw: DEFAULT_WINDOW_CORNER_RADIUS,
                        ne: DEFAULT_WINDOW_CORNER_RADIUS,
                        ..Default::default()
                    }),
            )
            .show(ctx, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    if ui
                        .add_enabled(
                            self.dashboard.start_enabled(),
                            Button::new("Start").corner_radius(DEFAULT_BUTTON_CORNER_RADIUS),
                        )
                        .clicked()
                    {
                        self.dashboard.start();
                    }
                    if ui
                        .add_enabled(
                            self.dashboard.stop_enabled(),
                            Button::new("Stop").corner_radius(DEFAULT_BUTTON_CORNER_RADIUS),
                        )
                        .clicked()
                    {
                        self.dashboard.stop();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(latency) = self.dashboard.average_latency_ms() {
                            ui.label(
                                RichText::new(format!("avg round trip {:.0} ms", latency))
                                    .color(Color32::GRAY),
                            );
                        }
                    });
                });
                ui.separator();

                let displayed = self.dashboard.displayed();
                let obstacle_color = if self.dashboard.snapshot().is_some_and(|s| s.obstacle_detected)
                {
                    Color32::RED
                } else {
                    Color32::WHITE
                };
                Grid::new("vehicle_state")
                    .num_columns(2)
                    .spacing([24., 4.])
                    .show(ui, |ui| {
                        ui.label("Status");
                        ui.label(RichText::new(&displayed.status).color(Color32::WHITE));
                        ui.end_row();
                        ui.label("Position");
                        ui.label(RichText::new(&displayed.position).color(Color32::WHITE));
                        ui.end_row();
                        ui.label("Velocity");
                        ui.label(RichText::new(&displayed.velocity).color(Color32::WHITE));
                        ui.end_row();
                        ui.label("Obstacle detected");
                        ui.label(RichText::new(&displayed.obstacle).color(obstacle_color));
                        ui.end_row();
                    });
            });

        egui::TopBottomPanel::bottom("velocity_history")
            .exact_height(120.)
            .frame(Frame::new().corner_radius(CornerRadius {
                sw: DEFAULT_WINDOW_CORNER_RADIUS,
                se: DEFAULT_WINDOW_CORNER_RADIUS,
                ..Default::default()
            }))
            .show(ctx, |ui| {
                let velocity: Vec<[f64; 2]> = self
                    .dashboard
                    .velocity_history()
                    .enumerate()
                    .map(|(i, v)| [i as f64, v])
                    .collect();
                let top_speed = velocity.iter().map(|p| p[1].abs()).fold(1., f64::max);

                egui_plot::Plot::new("velocity")
                    .allow_drag(false)
                    .allow_scroll(false)
                    .allow_zoom(false)
                    .include_x(0.)
                    .include_x(self.dashboard.history_len() as f64)
                    .include_y(0.)
                    .auto_bounds(Vec2b::new(false, true))
                    .show_grid(false)
                    .show_background(false)
                    .show(ui, |plot_ui| {
                        plot_ui.line(
                            Line::new("Velocity", PlotPoints::new(velocity))
                                .gradient_color(
                                    std::sync::Arc::new(move |point| {
                                        stroke_shade(
                                            Color32::LIGHT_GRAY,
                                            PALETTE_ORANGE,
                                            (point.y.abs() / top_speed) as f32,
                                        )
                                    }),
                                    false,
                                )
                                .color(PALETTE_ORANGE),
                        );
                    });
            });
    }
}
