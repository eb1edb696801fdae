mod ui;
mod writer;

use std::{path::PathBuf, sync::mpsc, time::Duration};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::warn;

use lanewatch::{
    ControlCommand, Dashboard, DisplayedTelemetry, LanewatchError,
    alert::{AlertTone, default_player},
    telemetry::{HttpSimulationClient, SimulationApi, spawn_poller},
};
use ui::live::{LiveDashboardApp, config::AppConfig};
use writer::SnapshotRecorder;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Base URL of the simulation backend
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the live dashboard
    Live {
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Record every accepted snapshot to this JSON lines file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch and print the vehicle status once
    Status,
    /// Send one control command
    Control {
        #[arg(value_enum)]
        command: ControlCommand,
    },
}

fn load_config(url: Option<&String>) -> AppConfig {
    let mut app_config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            AppConfig::default()
        }
    };
    if let Some(url) = url {
        app_config.base_url = url.clone();
    }
    app_config
}

fn client(app_config: &AppConfig) -> Result<HttpSimulationClient, LanewatchError> {
    HttpSimulationClient::new(
        &app_config.base_url,
        Duration::from_millis(app_config.request_timeout_ms),
    )
}

fn block_on<F: Future>(future: F) -> Result<F::Output, LanewatchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LanewatchError::RuntimeBuild { source: e })?;
    Ok(runtime.block_on(future))
}

fn live(
    mut app_config: AppConfig,
    interval_ms: Option<u64>,
    output: Option<PathBuf>,
) -> Result<(), LanewatchError> {
    if let Some(interval_ms) = interval_ms {
        app_config.poll_interval_ms = interval_ms;
    }
    let api = client(&app_config)?;
    let player = default_player(
        &app_config.alert_sound_url,
        Duration::from_millis(app_config.alert_duration_ms),
    );

    let (recorder, snapshot_tx) = match output {
        Some(output_file) => {
            let (recorder, snapshot_tx) = SnapshotRecorder::spawn(output_file)?;
            (Some(recorder), Some(snapshot_tx))
        }
        None => (None, None),
    };

    let mut native_options = eframe::NativeOptions::default();
    let canvas = &app_config.scene;
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(canvas.width + 40., canvas.height + 300.))
        .with_position(app_config.window_position.clone());

    let result = eframe::run_native(
        "Lanewatch",
        native_options,
        Box::new(move |cc| {
            let (events_tx, events_rx) = mpsc::channel();
            let repaint_ctx = cc.egui_ctx.clone();
            let poller = spawn_poller(
                api,
                Duration::from_millis(app_config.poll_interval_ms),
                events_tx,
                move || repaint_ctx.request_repaint(),
            )?;

            let mut dashboard = Dashboard::new(
                poller.commands(),
                AlertTone::new(player),
                app_config.scene.clone(),
                app_config.history_points,
            );
            if let Some(snapshot_tx) = snapshot_tx {
                dashboard = dashboard.with_recorder(snapshot_tx);
            }

            Ok(Box::new(LiveDashboardApp::new(
                dashboard, events_rx, poller, app_config, cc,
            )))
        }),
    )
    .map_err(|e| LanewatchError::DashboardWindow {
        description: e.to_string(),
    });

    // the app, and with it the last sender, is gone once run_native returns
    if let Some(recorder) = recorder {
        recorder.finish();
    }
    result
}

fn status(app_config: &AppConfig) -> Result<(), LanewatchError> {
    let api = client(app_config)?;
    let snapshot = block_on(api.fetch_status())??;
    let displayed = DisplayedTelemetry::from(&snapshot);
    println!("Status:            {}", displayed.status);
    println!("Position:          {}", displayed.position);
    println!("Velocity:          {}", displayed.velocity);
    println!("Obstacle detected: {}", displayed.obstacle);
    println!("Lane:              {}", u8::from(snapshot.lane));
    Ok(())
}

fn control(app_config: &AppConfig, command: ControlCommand) -> Result<(), LanewatchError> {
    let api = client(app_config)?;
    let ack = block_on(api.send_command(command))??;
    println!("{}", ack);
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let app_config = load_config(cli.url.as_ref());
    let result = match cli.command {
        Commands::Live {
            interval_ms,
            output,
        } => live(app_config, interval_ms, output),
        Commands::Status => status(&app_config),
        Commands::Control { command } => control(&app_config, command),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
