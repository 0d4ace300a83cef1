//! Relay request parsing.
//!
//! Two payload shapes reach the relay:
//!
//! ```text
//! {"query": "nhiệt độ 31°C, độ ẩm 70%", "device_state": {...}}
//! {"contents": [{"parts": [{"text": "bật điều hòa"}]}]}
//! ```
//!
//! The second mirrors the generator's own request format so clients written
//! against it can point at the relay unchanged.

use crate::error::RelayError;
use aircon_common::DeviceState;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    /// Sensor summary or voice utterance
    pub query: String,

    /// Caller's device snapshot, used by the fallback classifier
    pub device_state: Option<DeviceState>,
}

impl RelayRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            device_state: None,
        }
    }

    pub fn with_device_state(mut self, state: DeviceState) -> Self {
        self.device_state = Some(state);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self, RelayError> {
        let query = value
            .get("query")
            .and_then(Value::as_str)
            .or_else(|| value.pointer("/contents/0/parts/0/text").and_then(Value::as_str))
            .ok_or(RelayError::MissingQuery)?;

        let device_state = match value.get("device_state") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<DeviceState>(raw.clone())
                    .map_err(|e| RelayError::InvalidRequest(format!("device_state: {}", e)))?,
            ),
        };

        Ok(Self {
            query: query.to_string(),
            device_state,
        })
    }

    /// Device state for the classifier; defaults when the caller sent none
    pub fn state_or_default(&self) -> DeviceState {
        self.device_state.clone().unwrap_or_default()
    }
}
