use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, Sender},
    time::Duration,
};

use log::{debug, error, info};
use simple_moving_average::{SMA, SumTreeSMA};
use tokio::sync::mpsc::UnboundedSender;

use crate::LanewatchError;
use crate::alert::AlertTone;
use crate::scene::{Scene, SceneConfig, SceneFrame, render_scene};
use crate::telemetry::{ControlCommand, PollEvent, PollerCommand, TelemetrySnapshot, format_vector};

pub const FETCH_ERROR_MESSAGE: &str = "Error fetching vehicle status. Please try again later.";
const LATENCY_SAMPLES: usize = 10;
const PLACEHOLDER: &str = "-";

/// Text shown in the status fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayedTelemetry {
    pub status: String,
    pub position: String,
    pub velocity: String,
    pub obstacle: String,
}

impl Default for DisplayedTelemetry {
    fn default() -> Self {
        Self {
            status: PLACEHOLDER.to_string(),
            position: PLACEHOLDER.to_string(),
            velocity: PLACEHOLDER.to_string(),
            obstacle: PLACEHOLDER.to_string(),
        }
    }
}

impl From<&TelemetrySnapshot> for DisplayedTelemetry {
    fn from(value: &TelemetrySnapshot) -> Self {
        Self {
            status: value.status.clone(),
            position: format_vector(value.position),
            velocity: format_vector(value.velocity),
            obstacle: value.obstacle_detected.to_string(),
        }
    }
}

/// A queued error dialog, repeated `count` times in a row.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingDialog {
    message: String,
    count: usize,
}

/// State behind the dashboard window.
///
/// Owns everything the UI thread mutates: the poll epoch, the last accepted
/// snapshot and what is displayed for it, the alert tone, and the queue of
/// error dialogs. Widgets read from it and call [`Dashboard::start`] /
/// [`Dashboard::stop`]; results from the poller come in through
/// [`Dashboard::apply`].
///
/// Every start or stop begins a new epoch. Status results tagged with an
/// older epoch answer a request from a cycle that has since been superseded
/// and are dropped without touching the display.
pub struct Dashboard {
    commands: UnboundedSender<PollerCommand>,
    alert: AlertTone,
    scene_config: SceneConfig,
    epoch: u64,
    snapshot: Option<TelemetrySnapshot>,
    displayed: DisplayedTelemetry,
    scene: Option<Scene>,
    dialogs: VecDeque<PendingDialog>,
    velocity_history: VecDeque<f64>,
    history_len: usize,
    latency_ms: SumTreeSMA<f32, f32, LATENCY_SAMPLES>,
    recorder: Option<Sender<TelemetrySnapshot>>,
}

impl Dashboard {
    /// Creates the dashboard and asks the poller for the current status.
    pub fn new(
        commands: UnboundedSender<PollerCommand>,
        alert: AlertTone,
        scene_config: SceneConfig,
        history_len: usize,
    ) -> Self {
        let dashboard = Self {
            commands,
            alert,
            scene_config,
            epoch: 0,
            snapshot: None,
            displayed: DisplayedTelemetry::default(),
            scene: None,
            dialogs: VecDeque::new(),
            velocity_history: VecDeque::with_capacity(history_len),
            history_len,
            latency_ms: SumTreeSMA::new(),
            recorder: None,
        };
        dashboard.send(PollerCommand::Refresh { epoch: 0 });
        dashboard
    }

    /// Forwards every accepted snapshot to `recorder`.
    pub fn with_recorder(mut self, recorder: Sender<TelemetrySnapshot>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    fn send(&self, command: PollerCommand) {
        if self.commands.send(command).is_err() {
            error!(
                "{}, dropping {:?}",
                LanewatchError::PollerDisconnected,
                command
            );
        }
    }

    pub fn start(&mut self) {
        self.epoch += 1;
        info!("Starting simulation (epoch {})", self.epoch);
        self.send(PollerCommand::Control {
            command: ControlCommand::Start,
            epoch: self.epoch,
        });
        self.send(PollerCommand::StartTimer { epoch: self.epoch });
    }

    pub fn stop(&mut self) {
        self.epoch += 1;
        info!("Stopping simulation (epoch {})", self.epoch);
        self.velocity_history.clear();
        self.latency_ms = SumTreeSMA::new();
        self.send(PollerCommand::Control {
            command: ControlCommand::Stop,
            epoch: self.epoch,
        });
        self.send(PollerCommand::StopTimer { epoch: self.epoch });
    }

    pub fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::Status {
                epoch,
                latency,
                result,
            } => self.apply_status(epoch, latency, result),
            PollEvent::CommandAck { command, result } => match result {
                Ok(ack) => info!("Command {} response: {}", command, ack),
                Err(e) => error!("Error sending command {}: {}", command, e),
            },
        }
    }

    fn apply_status(
        &mut self,
        epoch: u64,
        latency: Duration,
        result: Result<TelemetrySnapshot, LanewatchError>,
    ) {
        if epoch < self.epoch {
            debug!(
                "Discarding status from epoch {}, current epoch is {}",
                epoch, self.epoch
            );
            return;
        }
        self.latency_ms.add_sample(latency.as_secs_f32() * 1000.);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error fetching status: {}", e);
                self.queue_dialog(FETCH_ERROR_MESSAGE);
                return;
            }
        };

        self.displayed = DisplayedTelemetry::from(&snapshot);
        self.velocity_history.push_back(snapshot.velocity[0]);
        while self.velocity_history.len() > self.history_len {
            self.velocity_history.pop_front();
        }

        let scene = render_scene(&self.scene_config, &SceneFrame::from(&snapshot));
        if scene.alert {
            self.alert.trigger();
        }
        self.scene = Some(scene);

        if let Some(recorder) = &self.recorder
            && recorder.send(snapshot.clone()).is_err()
        {
            error!("Snapshot recorder stopped, no longer recording");
            self.recorder = None;
        }
        self.snapshot = Some(snapshot);
    }

    fn queue_dialog(&mut self, message: &str) {
        match self.dialogs.back_mut() {
            Some(last) if last.message == message => last.count = last.count.saturating_add(1),
            _ => self.dialogs.push_back(PendingDialog {
                message: message.to_string(),
                count: 1,
            }),
        }
    }

    /// Applies every event the poller has delivered so far.
    pub fn drain(&mut self, events: &Receiver<PollEvent>) {
        while let Ok(event) = events.try_recv() {
            self.apply(event);
        }
        self.alert.poll();
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.as_ref().is_some_and(TelemetrySnapshot::is_running)
    }

    pub fn start_enabled(&self) -> bool {
        !self.is_running()
    }

    pub fn stop_enabled(&self) -> bool {
        self.is_running()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn displayed(&self) -> &DisplayedTelemetry {
        &self.displayed
    }

    /// Scene for the last accepted snapshot, `None` until the first one arrives.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_config(&self) -> &SceneConfig {
        &self.scene_config
    }

    pub fn alert_playing(&self) -> bool {
        self.alert.is_playing()
    }

    /// The error dialog that should be on screen, oldest first.
    pub fn current_dialog(&self) -> Option<&str> {
        self.dialogs.front().map(|dialog| dialog.message.as_str())
    }

    /// Dialogs still to be acknowledged, counting repeats.
    pub fn pending_dialogs(&self) -> usize {
        self.dialogs
            .iter()
            .fold(0, |total, dialog| total.saturating_add(dialog.count))
    }

    pub fn dismiss_dialog(&mut self) {
        if let Some(front) = self.dialogs.front_mut() {
            front.count -= 1;
            if front.count == 0 {
                self.dialogs.pop_front();
            }
        }
    }

    pub fn velocity_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.velocity_history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn average_latency_ms(&self) -> Option<f32> {
        (self.latency_ms.get_num_samples() > 0).then(|| self.latency_ms.get_average())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::alert::BellTone;

    fn failed_status() -> PollEvent {
        PollEvent::Status {
            epoch: 0,
            latency: Duration::from_millis(1),
            result: Err(LanewatchError::StatusHttp { status: 503 }),
        }
    }

    #[test]
    fn test_repeated_failures_share_one_queue_entry() {
        let (tx, _rx) = unbounded_channel();
        let mut dashboard = Dashboard::new(
            tx,
            AlertTone::new(Box::new(BellTone::new(Duration::ZERO))),
            SceneConfig::default(),
            5,
        );

        for _ in 0..1000 {
            dashboard.apply(failed_status());
        }
        assert_eq!(dashboard.dialogs.len(), 1);
        assert_eq!(dashboard.pending_dialogs(), 1000);

        dashboard.dismiss_dialog();
        assert_eq!(dashboard.pending_dialogs(), 999);
        assert_eq!(dashboard.current_dialog(), Some(FETCH_ERROR_MESSAGE));

        for _ in 0..999 {
            dashboard.dismiss_dialog();
        }
        assert!(dashboard.dialogs.is_empty());
        assert_eq!(dashboard.current_dialog(), None);
        dashboard.dismiss_dialog();
        assert_eq!(dashboard.pending_dialogs(), 0);
    }
}
