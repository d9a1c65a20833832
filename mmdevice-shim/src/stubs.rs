//! In-process implementations of the endpoint contracts for tests.
//!
//! They stand in for the runtime enumerator so the declarations can be
//! exercised through their vtables without audio hardware or a running
//! endpoint service.

#![allow(non_snake_case)]

use crate::audio::cotask;
use crate::audio::device::E_NOTFOUND;
use crate::interfaces::*;
use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::Arc;
use windows::core::{implement, Interface, GUID, HRESULT, PCWSTR, PROPVARIANT, PWSTR};
use windows::Win32::Foundation::{E_NOINTERFACE, E_NOTIMPL, E_POINTER, S_OK};
use windows::Win32::System::Com::{CLSCTX, STGM};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};
// Re-export windows_core so the implement macro can find it
#[allow(unused_imports)]
use windows_core;

/// `AUDCLNT_E_DEVICE_INVALIDATED`, returned by a device that has been removed.
pub const AUDCLNT_E_DEVICE_INVALIDATED: HRESULT = HRESULT(0x8889_0004_u32 as i32);

/// Calls and registrations observed by a [`StubEnumerator`].
#[derive(Default)]
pub struct StubLog {
    calls: RefCell<Vec<&'static str>>,
    state_mask: RefCell<Option<u32>>,
    role: RefCell<Option<i32>>,
    clients: RefCell<Vec<IMMNotificationClient>>,
}

impl StubLog {
    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn last_state_mask(&self) -> Option<u32> {
        *self.state_mask.borrow()
    }

    pub fn last_role(&self) -> Option<i32> {
        *self.role.borrow()
    }

    pub fn registered_clients(&self) -> usize {
        self.clients.borrow().len()
    }

    /// Fire `OnDeviceAdded` on every registered client.
    pub fn announce_added(&self, device_id: &str) {
        let wide: Vec<u16> = device_id.encode_utf16().chain(std::iter::once(0)).collect();
        for client in self.clients.borrow().iter() {
            unsafe {
                let _ = client.OnDeviceAdded(PCWSTR::from_raw(wide.as_ptr()));
            }
        }
    }
}

/// One endpoint device exposing `IMMDevice` and `IMMEndpoint`.
#[implement(IMMDevice, IMMEndpoint)]
pub struct StubDevice {
    id: &'static str,
    state: DEVICE_STATE,
    state_status: HRESULT,
    flow: EDataFlow,
}

impl StubDevice {
    pub fn new(id: &'static str, state: DEVICE_STATE, flow: EDataFlow) -> Self {
        Self {
            id,
            state,
            state_status: S_OK,
            flow,
        }
    }

    /// Make `GetState` fail with `status`, as a device removed mid-enumeration does.
    pub fn with_state_status(mut self, status: HRESULT) -> Self {
        self.state_status = status;
        self
    }
}

impl IMMDevice_Impl for StubDevice_Impl {
    unsafe fn Activate(
        &self,
        _iid: *const GUID,
        _cls_ctx: CLSCTX,
        _activation_params: *mut PROPVARIANT,
        interface: *mut *mut c_void,
    ) -> HRESULT {
        if !interface.is_null() {
            *interface = std::ptr::null_mut();
        }
        E_NOINTERFACE
    }

    unsafe fn OpenPropertyStore(
        &self,
        _access: STGM,
        _properties: *mut Option<IPropertyStore>,
    ) -> HRESULT {
        E_NOTIMPL
    }

    unsafe fn GetId(&self, id: *mut PWSTR) -> HRESULT {
        if id.is_null() {
            return E_POINTER;
        }
        match cotask::alloc_wide(self.id) {
            Ok(value) => {
                *id = value;
                S_OK
            }
            Err(e) => e.code(),
        }
    }

    unsafe fn GetState(&self, state: *mut DEVICE_STATE) -> HRESULT {
        if state.is_null() {
            return E_POINTER;
        }
        if self.state_status.is_err() {
            return self.state_status;
        }
        *state = self.state;
        S_OK
    }
}

impl IMMEndpoint_Impl for StubDevice_Impl {
    unsafe fn GetDataFlow(&self, flow: *mut EDataFlow) -> HRESULT {
        if flow.is_null() {
            return E_POINTER;
        }
        *flow = self.flow;
        S_OK
    }
}

#[implement(IMMDeviceCollection)]
pub struct StubCollection {
    devices: Vec<IMMDevice>,
}

impl StubCollection {
    pub fn new(devices: Vec<IMMDevice>) -> Self {
        Self { devices }
    }
}

impl IMMDeviceCollection_Impl for StubCollection_Impl {
    unsafe fn GetCount(&self, count: *mut u32) -> HRESULT {
        if count.is_null() {
            return E_POINTER;
        }
        *count = self.devices.len() as u32;
        S_OK
    }

    unsafe fn Item(&self, index: u32, device: *mut Option<IMMDevice>) -> HRESULT {
        if device.is_null() {
            return E_POINTER;
        }
        match self.devices.get(index as usize) {
            Some(found) => {
                *device = Some(found.clone());
                S_OK
            }
            None => E_NOTFOUND,
        }
    }
}

/// Runtime enumerator stand-in. Statuses for enumeration and registration
/// are configurable so restricted targets can be simulated.
#[implement(IMMDeviceEnumerator)]
pub struct StubEnumerator {
    log: Arc<StubLog>,
    devices: Vec<(&'static str, IMMDevice)>,
    default: Option<IMMDevice>,
    enumeration_status: HRESULT,
    registration_status: HRESULT,
}

impl StubEnumerator {
    pub fn new(log: Arc<StubLog>) -> Self {
        Self {
            log,
            devices: Vec::new(),
            default: None,
            enumeration_status: S_OK,
            registration_status: S_OK,
        }
    }

    pub fn with_devices(mut self, devices: Vec<StubDevice>) -> Self {
        self.devices = devices
            .into_iter()
            .map(|device| (device.id, device.into()))
            .collect();
        self
    }

    pub fn with_default(mut self, device: StubDevice) -> Self {
        self.default = Some(device.into());
        self
    }

    pub fn with_enumeration_status(mut self, status: HRESULT) -> Self {
        self.enumeration_status = status;
        self
    }

    pub fn with_registration_status(mut self, status: HRESULT) -> Self {
        self.registration_status = status;
        self
    }
}

impl IMMDeviceEnumerator_Impl for StubEnumerator_Impl {
    unsafe fn EnumAudioEndpoints(
        &self,
        _flow: EDataFlow,
        state_mask: DEVICE_STATE,
        devices: *mut Option<IMMDeviceCollection>,
    ) -> HRESULT {
        self.log.record("EnumAudioEndpoints");
        *self.log.state_mask.borrow_mut() = Some(state_mask.0);

        if self.enumeration_status.is_err() {
            return self.enumeration_status;
        }
        if devices.is_null() {
            return E_POINTER;
        }

        let collection = StubCollection::new(
            self.devices.iter().map(|(_, device)| device.clone()).collect(),
        );
        *devices = Some(collection.into());
        S_OK
    }

    unsafe fn GetDefaultAudioEndpoint(
        &self,
        _flow: EDataFlow,
        role: ERole,
        endpoint: *mut Option<IMMDevice>,
    ) -> HRESULT {
        self.log.record("GetDefaultAudioEndpoint");
        *self.log.role.borrow_mut() = Some(role.0);

        if endpoint.is_null() {
            return E_POINTER;
        }
        match &self.default {
            Some(device) => {
                *endpoint = Some(device.clone());
                S_OK
            }
            None => E_NOTFOUND,
        }
    }

    unsafe fn GetDevice(&self, id: PCWSTR, device: *mut Option<IMMDevice>) -> HRESULT {
        self.log.record("GetDevice");

        if device.is_null() || id.is_null() {
            return E_POINTER;
        }
        let Ok(wanted) = id.to_string() else {
            return E_NOTFOUND;
        };
        match self.devices.iter().find(|(stub_id, _)| *stub_id == wanted) {
            Some((_, found)) => {
                *device = Some(found.clone());
                S_OK
            }
            None => E_NOTFOUND,
        }
    }

    unsafe fn RegisterEndpointNotificationCallback(&self, client: *mut c_void) -> HRESULT {
        self.log.record("RegisterEndpointNotificationCallback");

        if self.registration_status.is_err() {
            return self.registration_status;
        }
        match IMMNotificationClient::from_raw_borrowed(&client) {
            Some(client) => {
                self.log.clients.borrow_mut().push(client.clone());
                S_OK
            }
            None => E_POINTER,
        }
    }

    unsafe fn UnregisterEndpointNotificationCallback(&self, client: *mut c_void) -> HRESULT {
        self.log.record("UnregisterEndpointNotificationCallback");

        if self.registration_status.is_err() {
            return self.registration_status;
        }
        let mut clients = self.log.clients.borrow_mut();
        match clients.iter().position(|known| known.as_raw() == client) {
            Some(index) => {
                clients.remove(index);
                S_OK
            }
            None => E_NOTFOUND,
        }
    }
}

/// Notification sink that only records which slot was invoked.
#[implement(IMMNotificationClient)]
pub struct RecordingClient {
    log: Arc<StubLog>,
}

impl RecordingClient {
    pub fn new(log: Arc<StubLog>) -> Self {
        Self { log }
    }
}

impl IMMNotificationClient_Impl for RecordingClient_Impl {
    unsafe fn OnDeviceStateChanged(&self, _device_id: PCWSTR, _new_state: DEVICE_STATE) -> HRESULT {
        self.log.record("OnDeviceStateChanged");
        S_OK
    }

    unsafe fn OnDeviceAdded(&self, _device_id: PCWSTR) -> HRESULT {
        self.log.record("OnDeviceAdded");
        S_OK
    }

    unsafe fn OnDeviceRemoved(&self, _device_id: PCWSTR) -> HRESULT {
        self.log.record("OnDeviceRemoved");
        S_OK
    }

    unsafe fn OnDefaultDeviceChanged(
        &self,
        _flow: EDataFlow,
        _role: ERole,
        _default_device_id: PCWSTR,
    ) -> HRESULT {
        self.log.record("OnDefaultDeviceChanged");
        S_OK
    }

    unsafe fn OnPropertyValueChanged(&self, _device_id: PCWSTR, _key: PROPERTYKEY) -> HRESULT {
        self.log.record("OnPropertyValueChanged");
        S_OK
    }
}
