pub mod client;
pub mod poller;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LanewatchError;

pub use client::{HttpSimulationClient, SimulationApi};
pub use poller::{PollEvent, PollerCommand, PollerHandle, spawn_poller};

/// Status string the backend reports while the simulation advances.
pub const RUNNING_STATUS: &str = "running";

/// One of the two parallel roads the ego vehicle can drive on.
///
/// On the wire this is the integer `1` (upper road) or `2` (lower road).
/// Anything else fails deserialization, which makes the whole snapshot
/// malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Lane {
    Upper,
    Lower,
}

impl Lane {
    /// The lane on the other road, where obstacles are shown.
    pub fn opposite(self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }
}

impl TryFrom<u8> for Lane {
    type Error = LanewatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Upper),
            2 => Ok(Self::Lower),
            lane => Err(LanewatchError::InvalidLane { lane }),
        }
    }
}

impl From<Lane> for u8 {
    fn from(value: Lane) -> Self {
        match value {
            Lane::Upper => 1,
            Lane::Lower => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub status: String,
    /// Simulation coordinates, x along the road and y across it
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub obstacle_detected: bool,
    pub lane: Lane,
}

impl TelemetrySnapshot {
    pub fn is_running(&self) -> bool {
        self.status == RUNNING_STATUS
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            status: "stopped".to_string(),
            position: [0., 0.],
            velocity: [0., 0.],
            obstacle_detected: false,
            lane: Lane::Upper,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Stop,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Body of a `POST /api/control` request.
#[derive(Debug, Serialize)]
pub struct ControlRequest {
    pub command: ControlCommand,
}

/// Formats a 2D vector as `[x.xx, y.yy]`.
pub fn format_vector(v: [f64; 2]) -> String {
    format!("[{:.2}, {:.2}]", v[0], v[1])
}

/// Parses a status response body.
pub fn decode_snapshot(body: &[u8]) -> Result<TelemetrySnapshot, LanewatchError> {
    serde_json::from_slice(body).map_err(|e| LanewatchError::MalformedSnapshot { source: e })
}
