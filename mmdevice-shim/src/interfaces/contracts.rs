//! The five MMDevice capability contracts.
//!
//! Each contract is declared with `#[interface]`, which lays its methods out as
//! a `#[repr(C)]` vtable in declaration order after the three `IUnknown`
//! slots. The order below is the one the platform's runtime was compiled
//! against and must never change.
//!
//! On restricted targets the runtime may answer `EnumAudioEndpoints` and
//! `RegisterEndpointNotificationCallback` with an "unsupported" status. That
//! is a property of the target, not of these declarations.

#![allow(non_snake_case)]

use super::constants::{EDataFlow, ERole, DEVICE_STATE};
use std::ffi::c_void;
use windows::core::{
    interface, IUnknown, IUnknown_Vtbl, GUID, HRESULT, PCWSTR, PROPVARIANT, PWSTR,
};
use windows::Win32::System::Com::{CLSCTX, STGM};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

/// Sink for endpoint change notifications. Implemented by the caller and
/// invoked by the runtime enumerator.
#[interface("7991EEC9-7E89-4D85-8390-6C703CEC60C0")]
pub unsafe trait IMMNotificationClient: IUnknown {
    pub unsafe fn OnDeviceStateChanged(&self, device_id: PCWSTR, new_state: DEVICE_STATE) -> HRESULT;
    pub unsafe fn OnDeviceAdded(&self, device_id: PCWSTR) -> HRESULT;
    pub unsafe fn OnDeviceRemoved(&self, device_id: PCWSTR) -> HRESULT;
    pub unsafe fn OnDefaultDeviceChanged(
        &self,
        flow: EDataFlow,
        role: ERole,
        default_device_id: PCWSTR,
    ) -> HRESULT;
    pub unsafe fn OnPropertyValueChanged(&self, device_id: PCWSTR, key: PROPERTYKEY) -> HRESULT;
}

/// Root entry point, activated through `CLSID_MMDeviceEnumerator`.
///
/// The notification callbacks take the raw `IMMNotificationClient` pointer;
/// the runtime holds its own reference while the sink is registered.
#[interface("A95664D2-9614-4F35-A746-DE8DB63617E6")]
pub unsafe trait IMMDeviceEnumerator: IUnknown {
    pub unsafe fn EnumAudioEndpoints(
        &self,
        flow: EDataFlow,
        state_mask: DEVICE_STATE,
        devices: *mut Option<IMMDeviceCollection>,
    ) -> HRESULT;
    pub unsafe fn GetDefaultAudioEndpoint(
        &self,
        flow: EDataFlow,
        role: ERole,
        endpoint: *mut Option<IMMDevice>,
    ) -> HRESULT;
    pub unsafe fn GetDevice(&self, id: PCWSTR, device: *mut Option<IMMDevice>) -> HRESULT;
    pub unsafe fn RegisterEndpointNotificationCallback(&self, client: *mut c_void) -> HRESULT;
    pub unsafe fn UnregisterEndpointNotificationCallback(&self, client: *mut c_void) -> HRESULT;
}

/// One audio endpoint device.
///
/// `GetId` hands back a string allocated with the COM task allocator; the
/// caller frees it.
#[interface("D666063F-1587-4E43-81F1-B948E807363F")]
pub unsafe trait IMMDevice: IUnknown {
    pub unsafe fn Activate(
        &self,
        iid: *const GUID,
        cls_ctx: CLSCTX,
        activation_params: *mut PROPVARIANT,
        interface: *mut *mut c_void,
    ) -> HRESULT;
    pub unsafe fn OpenPropertyStore(
        &self,
        access: STGM,
        properties: *mut Option<IPropertyStore>,
    ) -> HRESULT;
    pub unsafe fn GetId(&self, id: *mut PWSTR) -> HRESULT;
    pub unsafe fn GetState(&self, state: *mut DEVICE_STATE) -> HRESULT;
}

/// Endpoint view of an `IMMDevice`, obtained with `QueryInterface`.
#[interface("1BE09788-6894-4089-8586-9A2A6C265AC5")]
pub unsafe trait IMMEndpoint: IUnknown {
    pub unsafe fn GetDataFlow(&self, flow: *mut EDataFlow) -> HRESULT;
}

/// Result of `EnumAudioEndpoints`.
#[interface("0BD7A1BE-7A1A-44DB-8397-CC5392387B5E")]
pub unsafe trait IMMDeviceCollection: IUnknown {
    pub unsafe fn GetCount(&self, count: *mut u32) -> HRESULT;
    pub unsafe fn Item(&self, index: u32, device: *mut Option<IMMDevice>) -> HRESULT;
}
