use serde::{Deserialize, Serialize};

mod device;
pub mod client;
pub mod clients;

pub use device::*;
use mixia_types::Instrument;

/// Firmware Version reported by the mock when no override is configured.
pub const MOCK_FIRMWARE_VERSION: &str = "mock-1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FirmwareRequest {
    SetVolume(Instrument, u8),
    ToggleMute(Instrument),
    GetStatus,
    Reset,
    Health,
}

impl FirmwareRequest {
    pub fn method(&self) -> HttpMethod {
        match self {
            FirmwareRequest::GetStatus | FirmwareRequest::Health => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            FirmwareRequest::SetVolume(_, _) => "/setVolume",
            FirmwareRequest::ToggleMute(_) => "/muteChannel",
            FirmwareRequest::GetStatus => "/status",
            FirmwareRequest::Reset => "/reset",
            FirmwareRequest::Health => "/health",
        }
    }

    /// The JSON body for POST requests, the firmware ignores bodies on everything else.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            FirmwareRequest::SetVolume(instrument, volume) => serde_json::to_value(SetVolumeRequest {
                instrument: Some(instrument.to_string()),
                volume: Some((*volume).into()),
            })
            .ok(),
            FirmwareRequest::ToggleMute(instrument) => serde_json::to_value(MuteChannelRequest {
                instrument: Some(instrument.to_string()),
            })
            .ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FirmwareResponse {
    VolumeSet(SetVolumeResponse),
    MuteToggled(MuteChannelResponse),
    Status(StatusResponse),
    Reset(ResetResponse),
    Health(HealthResponse),
}
