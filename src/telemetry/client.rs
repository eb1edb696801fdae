use std::{future::Future, time::Duration};

use log::debug;

use crate::LanewatchError;

use super::{ControlCommand, ControlRequest, TelemetrySnapshot, decode_snapshot};

const STATUS_PATH: &str = "/api/status";
const CONTROL_PATH: &str = "/api/control";

/// Access to the remote vehicle simulation.
///
/// The poller only needs these two calls, so tests can drive it with an
/// in-memory implementation instead of a live backend.
pub trait SimulationApi: Clone + Send + Sync + 'static {
    /// Fetches the latest telemetry snapshot.
    fn fetch_status(
        &self,
    ) -> impl Future<Output = Result<TelemetrySnapshot, LanewatchError>> + Send;

    /// Sends a control command and returns the backend's acknowledgement.
    fn send_command(
        &self,
        command: ControlCommand,
    ) -> impl Future<Output = Result<serde_json::Value, LanewatchError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpSimulationClient {
    http_client: reqwest::Client,
    status_url: String,
    control_url: String,
}

impl HttpSimulationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LanewatchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LanewatchError::HttpClientBuild { source: e })?;
        let base_url = base_url.trim_end_matches('/');

        Ok(Self {
            http_client,
            status_url: format!("{base_url}{STATUS_PATH}"),
            control_url: format!("{base_url}{CONTROL_PATH}"),
        })
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }
}

impl SimulationApi for HttpSimulationClient {
    fn fetch_status(
        &self,
    ) -> impl Future<Output = Result<TelemetrySnapshot, LanewatchError>> + Send {
        let http_client = self.http_client.clone();
        let url = self.status_url.clone();
        async move {
            let response = http_client.get(&url).send().await.map_err(|e| {
                LanewatchError::StatusRequest {
                    url: url.clone(),
                    source: e,
                }
            })?;
            if !response.status().is_success() {
                return Err(LanewatchError::StatusHttp {
                    status: response.status().as_u16(),
                });
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| LanewatchError::StatusRequest { url, source: e })?;
            decode_snapshot(&body)
        }
    }

    fn send_command(
        &self,
        command: ControlCommand,
    ) -> impl Future<Output = Result<serde_json::Value, LanewatchError>> + Send {
        let http_client = self.http_client.clone();
        let url = self.control_url.clone();
        async move {
            let response = http_client
                .post(&url)
                .json(&ControlRequest { command })
                .send()
                .await
                .map_err(|e| LanewatchError::ControlRequest {
                    url: url.clone(),
                    source: e,
                })?;
            // the ack is parsed whatever the status code, rejected commands carry a JSON error too
            debug!("Control {} answered with HTTP {}", command, response.status());
            let body = response
                .bytes()
                .await
                .map_err(|e| LanewatchError::ControlRequest { url, source: e })?;
            serde_json::from_slice(&body).map_err(|e| LanewatchError::ControlResponse { source: e })
        }
    }
}
