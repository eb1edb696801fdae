use std::{
    sync::{Arc, mpsc::Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    time::{Interval, MissedTickBehavior, interval_at},
};

use crate::LanewatchError;

use super::{ControlCommand, SimulationApi, TelemetrySnapshot};

/// Instructions from the UI thread to the poller worker.
///
/// Every variant that starts a request carries the epoch the UI controller
/// was in when it issued it. Results are tagged with that epoch so the
/// controller can drop answers to a superseded cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerCommand {
    /// Fetch the status once.
    Refresh { epoch: u64 },
    /// Send a control command, then fetch the status once.
    Control { command: ControlCommand, epoch: u64 },
    /// Begin periodic status fetches. No-op if the timer is already running.
    StartTimer { epoch: u64 },
    StopTimer { epoch: u64 },
    Shutdown,
}

#[derive(Debug)]
pub enum PollEvent {
    Status {
        epoch: u64,
        latency: Duration,
        result: Result<TelemetrySnapshot, LanewatchError>,
    },
    CommandAck {
        command: ControlCommand,
        result: Result<serde_json::Value, LanewatchError>,
    },
}

#[derive(Clone)]
struct EventSink {
    events: Sender<PollEvent>,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl EventSink {
    fn publish(&self, event: PollEvent) {
        if let Err(e) = self.events.send(event) {
            debug!("Dropping poll event, dashboard is gone: {:?}", e.0);
            return;
        }
        (self.notify)();
    }
}

pub struct PollerHandle {
    commands: UnboundedSender<PollerCommand>,
    worker: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn commands(&self) -> UnboundedSender<PollerCommand> {
        self.commands.clone()
    }

    /// Stops the worker and waits for its thread to exit. Requests still in
    /// flight are abandoned.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(PollerCommand::Shutdown);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("Poller thread panicked");
        }
    }
}

/// Starts the poller on its own thread.
///
/// `notify` runs after every published event, the dashboard uses it to
/// request a repaint.
pub fn spawn_poller<A: SimulationApi>(
    api: A,
    period: Duration,
    events: Sender<PollEvent>,
    notify: impl Fn() + Send + Sync + 'static,
) -> Result<PollerHandle, LanewatchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LanewatchError::RuntimeBuild { source: e })?;
    let (commands_tx, commands_rx) = unbounded_channel();
    let sink = EventSink {
        events,
        notify: Arc::new(notify),
    };

    let worker = thread::Builder::new()
        .name("lanewatch-poller".to_string())
        .spawn(move || runtime.block_on(run_worker(api, period, commands_rx, sink)))
        .map_err(|e| LanewatchError::RuntimeBuild { source: e })?;

    Ok(PollerHandle {
        commands: commands_tx,
        worker: Some(worker),
    })
}

async fn run_worker<A: SimulationApi>(
    api: A,
    period: Duration,
    mut commands: UnboundedReceiver<PollerCommand>,
    sink: EventSink,
) {
    let mut timer: Option<Interval> = None;
    let mut current_epoch = 0;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                None | Some(PollerCommand::Shutdown) => {
                    info!("Poller shutting down");
                    break;
                }
                Some(PollerCommand::Refresh { epoch }) => {
                    spawn_fetch(&api, epoch, &sink);
                }
                Some(PollerCommand::Control { command, epoch }) => {
                    current_epoch = epoch;
                    spawn_control(&api, command, epoch, &sink);
                }
                Some(PollerCommand::StartTimer { epoch }) => {
                    current_epoch = epoch;
                    if timer.is_none() {
                        // first tick one period from now, like a browser interval
                        let mut interval = interval_at(tokio::time::Instant::now() + period, period);
                        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        timer = Some(interval);
                        info!("Polling every {} ms", period.as_millis());
                    }
                }
                Some(PollerCommand::StopTimer { epoch }) => {
                    current_epoch = epoch;
                    if timer.take().is_some() {
                        info!("Polling stopped");
                    }
                }
            },
            _ = next_tick(&mut timer) => {
                spawn_fetch(&api, current_epoch, &sink);
            }
        }
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn spawn_fetch<A: SimulationApi>(api: &A, epoch: u64, sink: &EventSink) {
    let api = api.clone();
    let sink = sink.clone();
    tokio::spawn(async move {
        fetch(&api, epoch, &sink).await;
    });
}

fn spawn_control<A: SimulationApi>(
    api: &A,
    command: ControlCommand,
    epoch: u64,
    sink: &EventSink,
) {
    let api = api.clone();
    let sink = sink.clone();
    tokio::spawn(async move {
        let result = api.send_command(command).await;
        sink.publish(PollEvent::CommandAck { command, result });
        // refresh even when the command failed so the display converges on the backend state
        fetch(&api, epoch, &sink).await;
    });
}

async fn fetch<A: SimulationApi>(api: &A, epoch: u64, sink: &EventSink) {
    let started = Instant::now();
    let result = api.fetch_status().await;
    sink.publish(PollEvent::Status {
        epoch,
        latency: started.elapsed(),
        result,
    });
}
