//! Device change notifications through the declared `IMMNotificationClient`.
//!
//! The runtime may call the sink on any thread, so callbacks only decode
//! their arguments and forward a [`DeviceEvent`] over a channel.

use super::device::{DataFlow, DeviceEvent, DeviceRole, DeviceState, EndpointError};
use super::enumerator::{DeviceEnumerator, NotificationRegistration};
use crate::interfaces::{
    EDataFlow, ERole, IMMNotificationClient, IMMNotificationClient_Impl, DEVICE_STATE,
};
use std::sync::mpsc::{Receiver, Sender};
use tracing::debug;
use windows::core::{implement, HRESULT, PCWSTR};
use windows::Win32::Foundation::S_OK;
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;
// Re-export windows_core so the implement macro can find it
#[allow(unused_imports)]
use windows_core;

/// Notification client that sends events to a channel.
#[implement(IMMNotificationClient)]
pub struct DeviceNotificationClient {
    sender: Sender<DeviceEvent>,
}

impl DeviceNotificationClient {
    /// Create a new notification client.
    pub fn new(sender: Sender<DeviceEvent>) -> Self {
        Self { sender }
    }

    /// Register this notification client with an enumerator.
    /// Takes ownership of self because the COM interface needs to own the data.
    pub fn register(
        self,
        enumerator: &DeviceEnumerator,
    ) -> Result<NotificationRegistration, EndpointError> {
        let client: IMMNotificationClient = self.into();
        enumerator.register(client)
    }

    fn send(&self, event: DeviceEvent) {
        debug!(?event, "endpoint notification");
        // The receiver may already be gone during shutdown
        let _ = self.sender.send(event);
    }
}

unsafe fn read_id(id: &PCWSTR) -> Option<String> {
    if id.is_null() {
        None
    } else {
        id.to_string().ok()
    }
}

impl IMMNotificationClient_Impl for DeviceNotificationClient_Impl {
    unsafe fn OnDeviceStateChanged(&self, device_id: PCWSTR, new_state: DEVICE_STATE) -> HRESULT {
        if let Some(device_id) = read_id(&device_id) {
            self.send(DeviceEvent::DeviceStateChanged {
                device_id,
                new_state: DeviceState::from_raw(new_state),
            });
        }
        S_OK
    }

    unsafe fn OnDeviceAdded(&self, device_id: PCWSTR) -> HRESULT {
        if let Some(device_id) = read_id(&device_id) {
            self.send(DeviceEvent::DeviceAdded { device_id });
        }
        S_OK
    }

    unsafe fn OnDeviceRemoved(&self, device_id: PCWSTR) -> HRESULT {
        if let Some(device_id) = read_id(&device_id) {
            self.send(DeviceEvent::DeviceRemoved { device_id });
        }
        S_OK
    }

    unsafe fn OnDefaultDeviceChanged(
        &self,
        flow: EDataFlow,
        role: ERole,
        default_device_id: PCWSTR,
    ) -> HRESULT {
        self.send(DeviceEvent::DefaultDeviceChanged {
            flow: DataFlow::from_raw(flow),
            role: DeviceRole::from_raw(role),
            device_id: read_id(&default_device_id),
        });
        S_OK
    }

    unsafe fn OnPropertyValueChanged(&self, device_id: PCWSTR, key: PROPERTYKEY) -> HRESULT {
        if let Some(device_id) = read_id(&device_id) {
            self.send(DeviceEvent::PropertyValueChanged {
                device_id,
                fmtid: key.fmtid,
                pid: key.pid,
            });
        }
        S_OK
    }
}

/// Creates an event channel and returns the sender.
pub fn create_event_channel() -> (Sender<DeviceEvent>, Receiver<DeviceEvent>) {
    std::sync::mpsc::channel()
}
