//! MMDevice Endpoint Shim - Library
//!
//! Declarations for the Windows MMDevice endpoint API, for targets whose SDK
//! leaves them out, plus a small backend layer built on them.
//!
//! ## Features
//!
//! - The five endpoint contracts with vtables in platform order
//! - Enumerator CLSID and contract IIDs, checked against their literal bytes
//! - `EDataFlow`, `ERole`, `DEVICE_STATE` flags and `PKEY_AudioEngine_DeviceFormat`
//! - Endpoint discovery that falls back when enumeration is unsupported
//! - Optional interop with `windows::Win32::Media::Audio` (`windows-sdk` feature)

#[cfg(not(windows))]
compile_error!("mmdevice-shim declares Windows COM contracts and only builds for Windows targets");

pub mod audio;
pub mod config;
pub mod interfaces;
pub mod logging;

#[cfg(test)]
mod stubs;

pub use audio::{
    discover, DataFlow, DeviceEnumerator, DeviceEvent, DeviceRole, DeviceState, DiscoveryReport,
    Endpoint, EndpointError, EndpointSource, NotificationSupport,
};
pub use config::{ConfigError, DiscoveryConfig};
pub use interfaces::*;
