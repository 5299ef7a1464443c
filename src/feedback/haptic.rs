use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::http_client::{actuator_agent, drain_ack};
use crate::pose::Side;

use super::channel::{Delivery, DeliveryError};
use super::command::VibrateCommand;

/// JSON body accepted by the actuator's `/vibrate` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VibratePayload {
    pub action: &'static str,
    pub side: Side,
    pub duration_ms: u32,
    pub intensity: u8,
}

impl From<VibrateCommand> for VibratePayload {
    fn from(command: VibrateCommand) -> Self {
        Self {
            action: "on",
            side: command.side,
            duration_ms: command.duration_ms,
            intensity: command.intensity,
        }
    }
}

/// Fire-and-forget client for the wearable actuator. One attempt per pulse.
pub struct HapticClient {
    url: String,
    agent: ureq::Agent,
}

impl HapticClient {
    pub fn new(host: &str, timeout: Duration) -> Self {
        Self {
            url: format!("{}/vibrate", host.trim_end_matches('/')),
            agent: actuator_agent(timeout),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn send(&self, command: VibrateCommand) -> Result<(), DeliveryError> {
        let payload = VibratePayload::from(command);
        let response = self
            .agent
            .post(&self.url)
            .send_json(payload)
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => DeliveryError::HapticStatus(code),
                ureq::Error::Transport(transport) => {
                    DeliveryError::HapticTransport(transport.to_string())
                }
            })?;
        let acknowledged = drain_ack(response)
            .map_err(|err| DeliveryError::HapticTransport(err.to_string()))?;
        debug!(
            side = payload.side.as_str(),
            duration_ms = payload.duration_ms,
            acknowledged,
            "Haptic pulse sent"
        );
        Ok(())
    }
}

impl Delivery<VibrateCommand> for HapticClient {
    fn deliver(&mut self, item: VibrateCommand) -> Result<(), DeliveryError> {
        self.send(item)
    }
}
