//! Audio endpoint data models.
//!
//! Safe counterparts of the raw enumerations, the endpoint snapshot a backend
//! works with, change events, and the error type for calls made through the
//! endpoint contracts.

use crate::interfaces::{
    eAll, eCapture, eCommunications, eConsole, eMultimedia, eRender, EDataFlow, ERole,
    DEVICE_STATE, DEVICE_STATE_ACTIVE, DEVICE_STATE_DISABLED, DEVICE_STATE_NOTPRESENT,
    DEVICE_STATE_UNPLUGGED,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use windows::core::HRESULT;
use windows::Win32::Foundation::{E_NOTIMPL, ERROR_NOT_FOUND, ERROR_NOT_SUPPORTED};

/// `HRESULT_FROM_WIN32(ERROR_NOT_SUPPORTED)`.
pub const E_NOT_SUPPORTED: HRESULT = ERROR_NOT_SUPPORTED.to_hresult();

/// `HRESULT_FROM_WIN32(ERROR_NOT_FOUND)`, returned when no matching endpoint exists.
pub const E_NOTFOUND: HRESULT = ERROR_NOT_FOUND.to_hresult();

/// Whether `code` is one of the statuses a restricted target returns for
/// operations it does not offer.
pub fn is_unsupported_status(code: HRESULT) -> bool {
    code == E_NOTIMPL || code == E_NOT_SUPPORTED
}

/// Direction of audio data (maps to `EDataFlow`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFlow {
    /// Playback endpoints (speakers, headphones)
    #[default]
    Render,

    /// Recording endpoints (microphones, line-in)
    Capture,

    /// Both directions; valid for enumeration only
    All,
}

impl DataFlow {
    pub fn to_raw(self) -> EDataFlow {
        match self {
            DataFlow::Render => eRender,
            DataFlow::Capture => eCapture,
            DataFlow::All => eAll,
        }
    }

    pub fn from_raw(flow: EDataFlow) -> Option<Self> {
        match flow.0 {
            0 => Some(DataFlow::Render),
            1 => Some(DataFlow::Capture),
            2 => Some(DataFlow::All),
            _ => None,
        }
    }
}

/// Audio device role (maps to `ERole`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    /// Used by games, system sounds, most general applications
    #[default]
    Console,

    /// Used by music players, video players
    Multimedia,

    /// Used by Teams, Zoom, Discord, and other VoIP applications
    Communications,
}

impl DeviceRole {
    pub fn to_raw(self) -> ERole {
        match self {
            DeviceRole::Console => eConsole,
            DeviceRole::Multimedia => eMultimedia,
            DeviceRole::Communications => eCommunications,
        }
    }

    pub fn from_raw(role: ERole) -> Option<Self> {
        match role.0 {
            0 => Some(DeviceRole::Console),
            1 => Some(DeviceRole::Multimedia),
            2 => Some(DeviceRole::Communications),
            _ => None,
        }
    }
}

/// Device state reported by `IMMDevice::GetState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Device is active and available for use
    Active,

    /// Device is disabled in Windows Sound settings
    Disabled,

    /// Device is not present (driver issue)
    NotPresent,

    /// Device is unplugged (for pluggable devices)
    Unplugged,
}

impl DeviceState {
    pub fn to_raw(self) -> DEVICE_STATE {
        match self {
            DeviceState::Active => DEVICE_STATE_ACTIVE,
            DeviceState::Disabled => DEVICE_STATE_DISABLED,
            DeviceState::NotPresent => DEVICE_STATE_NOTPRESENT,
            DeviceState::Unplugged => DEVICE_STATE_UNPLUGGED,
        }
    }

    /// Decode a single state. Values with zero or several bits set are not a
    /// device state and yield `None`.
    pub fn from_raw(state: DEVICE_STATE) -> Option<Self> {
        match state.0 {
            0x1 => Some(DeviceState::Active),
            0x2 => Some(DeviceState::Disabled),
            0x4 => Some(DeviceState::NotPresent),
            0x8 => Some(DeviceState::Unplugged),
            _ => None,
        }
    }
}

/// Snapshot of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Opaque endpoint ID from `IMMDevice::GetId`
    pub id: String,

    /// Current state, if the device reported a single known state
    pub state: Option<DeviceState>,

    /// Data flow, if the device exposes `IMMEndpoint`
    pub flow: Option<DataFlow>,
}

/// Events delivered through `IMMNotificationClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A new audio device was connected
    DeviceAdded { device_id: String },

    /// An audio device was disconnected
    DeviceRemoved { device_id: String },

    /// Device state changed (active, disabled, not present, unplugged)
    DeviceStateChanged {
        device_id: String,
        new_state: Option<DeviceState>,
    },

    /// Default device changed for a flow and role
    DefaultDeviceChanged {
        flow: Option<DataFlow>,
        role: Option<DeviceRole>,
        device_id: Option<String>, // None if no default device
    },

    /// A device property changed
    PropertyValueChanged {
        device_id: String,
        fmtid: windows::core::GUID,
        pid: u32,
    },
}

/// Errors from calls made through the endpoint contracts.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("{operation} is not supported on this platform ({code:?})")]
    Unsupported {
        operation: &'static str,
        code: HRESULT,
    },

    #[error("Failed to activate the device enumerator: {0}")]
    Activation(#[source] windows::core::Error),

    #[error("{operation} failed: {source}")]
    Call {
        operation: &'static str,
        #[source]
        source: windows::core::Error,
    },

    #[error("{operation} succeeded without returning an object")]
    MissingOutput { operation: &'static str },

    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("String conversion error: {0}")]
    StringConversion(String),

    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),
}

impl EndpointError {
    /// Classify a failed call. Statuses a restricted target uses for missing
    /// functionality become [`EndpointError::Unsupported`].
    pub fn from_call(operation: &'static str, source: windows::core::Error) -> Self {
        let code = source.code();
        if is_unsupported_status(code) {
            EndpointError::Unsupported { operation, code }
        } else {
            EndpointError::Call { operation, source }
        }
    }

    /// True for the expected "not on this platform" outcome.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EndpointError::Unsupported { .. })
    }

    /// Underlying status code, if the error came from a platform call.
    pub fn code(&self) -> Option<HRESULT> {
        match self {
            EndpointError::Unsupported { code, .. } => Some(*code),
            EndpointError::Activation(e) => Some(e.code()),
            EndpointError::Call { source, .. } => Some(source.code()),
            EndpointError::ComInitFailed(e) => Some(e.code()),
            _ => None,
        }
    }
}
