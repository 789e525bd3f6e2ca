use mixia_types::{ChannelState, Instrument, MixerState};
use serde::{Deserialize, Serialize};
use serde_json::Number;

// Incoming bodies keep every field optional, a missing field is a validation failure the
// firmware reports itself rather than a JSON error. The volume is kept as whatever number was
// sent so that fractions and huge values still reach the range check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetVolumeRequest {
    #[serde(default)]
    pub instrument: Option<String>,
    #[serde(default)]
    pub volume: Option<Number>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MuteChannelRequest {
    #[serde(default)]
    pub instrument: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVolumeResponse {
    pub message: String,
    pub instrument: Instrument,
    pub volume: u8,
    pub state: ChannelState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteChannelResponse {
    pub message: String,
    pub instrument: Instrument,
    pub muted: bool,
    pub state: ChannelState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub mixer: MixerState,
    pub timestamp: String,
    pub firmware_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    pub state: MixerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            path: None,
        }
    }
}
