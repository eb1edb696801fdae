// Library interface for lanewatch
// This allows integration tests to access internal modules

pub mod alert;
pub mod dashboard;
pub mod errors;
pub mod scene;
pub mod telemetry;

// Re-export commonly used types
pub use dashboard::{Dashboard, DisplayedTelemetry};
pub use errors::LanewatchError;
pub use scene::{Scene, SceneConfig, render_scene};
pub use telemetry::{ControlCommand, Lane, TelemetrySnapshot};
