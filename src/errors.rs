// Error types for lanewatch

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LanewatchError {
    // Errors talking to the simulation backend
    #[snafu(display("Could not build HTTP client"))]
    HttpClientBuild { source: reqwest::Error },
    #[snafu(display("Status request to {url} failed"))]
    StatusRequest { url: String, source: reqwest::Error },
    #[snafu(display("Status request returned HTTP {status}"))]
    StatusHttp { status: u16 },
    #[snafu(display("Malformed telemetry snapshot"))]
    MalformedSnapshot { source: serde_json::Error },
    #[snafu(display("Lane {lane} is not one of the two highway lanes"))]
    InvalidLane { lane: u8 },
    #[snafu(display("Control request to {url} failed"))]
    ControlRequest { url: String, source: reqwest::Error },
    #[snafu(display("Control response was not valid JSON"))]
    ControlResponse { source: serde_json::Error },

    // Errors for the background poller
    #[snafu(display("Could not start the async runtime"))]
    RuntimeBuild { source: io::Error },
    #[snafu(display("Poller worker is no longer running"))]
    PollerDisconnected,

    // Errors for the snapshot recorder
    #[snafu(display("Error writing snapshot recording"))]
    WriterError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display("Error parsing config file"))]
    ConfigParseError { source: serde_json::Error },

    // UI errors
    #[snafu(display("Could not open dashboard window: {description}"))]
    DashboardWindow { description: String },

    // Alert tone errors
    #[snafu(display("Could not download alert sound from {url}"))]
    AlertSoundFetch { url: String, source: reqwest::Error },
    #[snafu(display("Audio output error: {description}"))]
    AudioOutput { description: String },
}
