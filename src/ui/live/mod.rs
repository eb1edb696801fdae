mod alerts_view;
pub(crate) mod config;
mod scene_view;
mod telemetry_view;

use std::{sync::mpsc::Receiver, time::Duration};

use config::AppConfig;
use egui::{Color32, Visuals, style::Widgets};
use log::error;

use lanewatch::Dashboard;
use lanewatch::telemetry::{PollEvent, PollerHandle};

pub(crate) const POLL_INTERVAL_MS: u64 = 1000;
pub(crate) const HISTORY_POINTS: usize = 60;
const ALERT_REPAINT_MS: u64 = 100;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

const DEFAULT_BUTTON_CORNER_RADIUS: u8 = 4;
const DEFAULT_WINDOW_CORNER_RADIUS: u8 = 10;

/// `LiveDashboardApp` shows the simulation's vehicle state and scene, and
/// forwards Start/Stop clicks to the poller.
///
/// All state lives in the wrapped [`Dashboard`]; the app only moves poller
/// events into it once per frame and draws what it holds.
pub struct LiveDashboardApp {
    dashboard: Dashboard,
    poll_events: Receiver<PollEvent>,
    poller: Option<PollerHandle>,
    app_config: AppConfig,
}

impl LiveDashboardApp {
    pub fn new(
        dashboard: Dashboard,
        poll_events: Receiver<PollEvent>,
        poller: PollerHandle,
        app_config: AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BROWN,
            panel_fill: PALETTE_BLACK,
            button_frame: true,
            window_fill: PALETTE_BLACK,
            widgets: Widgets::dark(),
            striped: false,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        Self {
            dashboard,
            poll_events,
            poller: Some(poller),
            app_config,
        }
    }
}

impl eframe::App for LiveDashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dashboard.drain(&self.poll_events);

        if let Some(outer_rect) = ctx.input(|is| is.viewport().outer_rect) {
            self.app_config.window_position = outer_rect.min.into();
        }

        self.telemetry_view(ctx);
        self.scene_view(ctx);
        self.alerts_view(ctx);

        // poller events request their own repaint, only the alert completion needs polling
        if self.dashboard.alert_playing() {
            ctx.request_repaint_after(Duration::from_millis(ALERT_REPAINT_MS));
        }
    }
}
