//! Device enumeration through the declared `IMMDeviceEnumerator` contract.
//!
//! Provides COM initialization, component activation and the enumeration
//! calls a backend makes. Every call checks its status before touching any
//! output; on restricted targets the "unsupported" statuses surface as
//! [`EndpointError::Unsupported`].

use super::cotask;
use super::device::{DataFlow, DeviceRole, DeviceState, Endpoint, EndpointError, E_NOTFOUND};
use crate::interfaces::{
    EDataFlow, IMMDevice, IMMDeviceCollection, IMMDeviceEnumerator, IMMEndpoint,
    IMMNotificationClient, CLSID_MMDeviceEnumerator, DEVICE_STATE,
};
use tracing::{debug, warn};
use windows::core::{Interface, IUnknown, GUID, PCWSTR, PWSTR};

use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX, CLSCTX_ALL, COINIT_MULTITHREADED,
};

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, EndpointError> {
        unsafe {
            // Audio backends run off the UI thread, so join the MTA
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(EndpointError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Platform component activation, keyed by class identifier.
pub trait ComponentActivator {
    fn activate(&self, clsid: &GUID) -> windows::core::Result<IUnknown>;
}

impl<F> ComponentActivator for F
where
    F: Fn(&GUID) -> windows::core::Result<IUnknown>,
{
    fn activate(&self, clsid: &GUID) -> windows::core::Result<IUnknown> {
        self(clsid)
    }
}

/// Activation through `CoCreateInstance`.
#[derive(Debug, Clone, Copy)]
pub struct ComActivator {
    context: CLSCTX,
}

impl Default for ComActivator {
    fn default() -> Self {
        Self { context: CLSCTX_ALL }
    }
}

impl ComponentActivator for ComActivator {
    fn activate(&self, clsid: &GUID) -> windows::core::Result<IUnknown> {
        unsafe { CoCreateInstance(clsid, None, self.context) }
    }
}

/// Device enumerator built on the declared MMDevice contracts.
#[derive(Clone)]
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new DeviceEnumerator with `CoCreateInstance`.
    ///
    /// Note: COM must be initialized before calling this function.
        pub fn new() -> Result<Self, EndpointError> {
        Self::activate(&ComActivator::default())
    }

    /// Activate `CLSID_MMDeviceEnumerator` and query it for `IMMDeviceEnumerator`.
    pub fn activate(activator: &impl ComponentActivator) -> Result<Self, EndpointError> {
        let unknown = activator
            .activate(&CLSID_MMDeviceEnumerator)
            .map_err(EndpointError::Activation)?;
        let enumerator = unknown
            .cast::<IMMDeviceEnumerator>()
            .map_err(EndpointError::Activation)?;

        debug!("activated device enumerator");
        Ok(Self { enumerator })
    }

    /// Wrap an enumerator obtained elsewhere.
    pub fn from_raw(enumerator: IMMDeviceEnumerator) -> Self {
        Self { enumerator }
    }

    /// Get the raw IMMDeviceEnumerator.
    pub fn raw_enumerator(&self) -> &IMMDeviceEnumerator {
        &self.enumerator
    }

    /// Enumerate endpoints matching a flow and state mask.
    pub fn endpoints(
        &self,
        flow: DataFlow,
        state_mask: DEVICE_STATE,
    ) -> Result<Vec<Endpoint>, EndpointError> {
        let collection = self.collection(flow, state_mask)?;

        let mut count = 0u32;
        unsafe {
            collection
                .GetCount(&mut count)
                .ok()
                .map_err(|e| EndpointError::from_call("GetCount", e))?;
        }

        let mut endpoints = Vec::with_capacity(count as usize);
        for index in 0..count {
            let mut device = None;
            unsafe {
                collection
                    .Item(index, &mut device)
                    .ok()
                    .map_err(|e| EndpointError::from_call("Item", e))?;
            }
            let device = device.ok_or(EndpointError::MissingOutput { operation: "Item" })?;

            // A device can vanish between GetCount and the query; skip it
            match describe(&device) {
                Ok(endpoint) => endpoints.push(endpoint),
                Err(e) => warn!(index, error = %e, "skipping endpoint that could not be described"),
            }
        }

        debug!(?flow, count, "enumerated endpoints");
        Ok(endpoints)
    }

    fn collection(
        &self,
        flow: DataFlow,
        state_mask: DEVICE_STATE,
    ) -> Result<IMMDeviceCollection, EndpointError> {
        let mut collection = None;
        let status = unsafe {
            self.enumerator
                .EnumAudioEndpoints(flow.to_raw(), state_mask, &mut collection)
        };

        if let Err(e) = status.ok() {
            let err = EndpointError::from_call("EnumAudioEndpoints", e);
            if err.is_unsupported() {
                warn!(?flow, "endpoint enumeration is not available");
            }
            return Err(err);
        }

        collection.ok_or(EndpointError::MissingOutput {
            operation: "EnumAudioEndpoints",
        })
    }

    /// Get the default endpoint for a flow and role, or `None` when the
    /// platform reports that no such endpoint exists.
    pub fn default_endpoint(
        &self,
        flow: DataFlow,
        role: DeviceRole,
    ) -> Result<Option<Endpoint>, EndpointError> {
        match self.default_device(flow, role)? {
            Some(device) => Ok(Some(describe(&device)?)),
            None => Ok(None),
        }
    }

    /// Get the default IMMDevice for a flow and role.
    pub fn default_device(
        &self,
        flow: DataFlow,
        role: DeviceRole,
    ) -> Result<Option<IMMDevice>, EndpointError> {
        let mut device = None;
        let status = unsafe {
            self.enumerator
                .GetDefaultAudioEndpoint(flow.to_raw(), role.to_raw(), &mut device)
        };

        match status.ok() {
            Ok(()) => device.map(Some).ok_or(EndpointError::MissingOutput {
                operation: "GetDefaultAudioEndpoint",
            }),
            // E_NOTFOUND: no endpoint of this flow is present
            Err(e) if e.code() == E_NOTFOUND => Ok(None),
            Err(e) => Err(EndpointError::from_call("GetDefaultAudioEndpoint", e)),
        }
    }

    /// Resolve an endpoint by its ID string.
    pub fn device(&self, device_id: &str) -> Result<Endpoint, EndpointError> {
        let device = self.device_raw(device_id)?;
        describe(&device)
    }

    /// Resolve an IMMDevice by its ID string.
    pub fn device_raw(&self, device_id: &str) -> Result<IMMDevice, EndpointError> {
        let device_id_wide: Vec<u16> = device_id.encode_utf16().chain(std::iter::once(0)).collect();

        let mut device = None;
        let status = unsafe {
            self.enumerator
                .GetDevice(PCWSTR::from_raw(device_id_wide.as_ptr()), &mut device)
        };

        match status.ok() {
            Ok(()) => device.ok_or(EndpointError::MissingOutput {
                operation: "GetDevice",
            }),
            Err(e) if e.code() == E_NOTFOUND => Err(EndpointError::DeviceNotFound {
                device_id: device_id.to_string(),
            }),
            Err(e) => Err(EndpointError::from_call("GetDevice", e)),
        }
    }

    /// Register a notification sink. The sink stays registered until the
    /// returned registration is dropped.
    pub fn register(
        &self,
        client: IMMNotificationClient,
    ) -> Result<NotificationRegistration, EndpointError> {
        unsafe {
            self.enumerator
                .RegisterEndpointNotificationCallback(client.as_raw())
                .ok()
                .map_err(|e| EndpointError::from_call("RegisterEndpointNotificationCallback", e))?;
        }

        debug!("registered endpoint notification client");
        Ok(NotificationRegistration {
            enumerator: self.enumerator.clone(),
            client,
        })
    }
}

/// A registered notification sink. Unregisters on drop.
pub struct NotificationRegistration {
    enumerator: IMMDeviceEnumerator,
    client: IMMNotificationClient,
}

impl NotificationRegistration {
    /// The registered sink.
    pub fn client(&self) -> &IMMNotificationClient {
        &self.client
    }
}

impl Drop for NotificationRegistration {
    fn drop(&mut self) {
        let status = unsafe {
            self.enumerator
                .UnregisterEndpointNotificationCallback(self.client.as_raw())
        };
        if status.is_err() {
            warn!(?status, "failed to unregister endpoint notification client");
        }
    }
}

/// Snapshot an IMMDevice into an [`Endpoint`].
pub fn describe(device: &IMMDevice) -> Result<Endpoint, EndpointError> {
    let mut raw_id = PWSTR::null();
    unsafe {
        device
            .GetId(&mut raw_id)
            .ok()
            .map_err(|e| EndpointError::from_call("GetId", e))?;
    }
    let id = unsafe { cotask::take_wide(raw_id) }
        .map_err(|e| EndpointError::StringConversion(e.to_string()))?;

    let mut state = DEVICE_STATE(0);
    unsafe {
        device
            .GetState(&mut state)
            .ok()
            .map_err(|e| EndpointError::from_call("GetState", e))?;
    }

    Ok(Endpoint {
        id,
        state: DeviceState::from_raw(state),
        flow: data_flow(device),
    })
}

/// Data flow of a device through its IMMEndpoint view, if it has one.
pub fn data_flow(device: &IMMDevice) -> Option<DataFlow> {
    let endpoint = device.cast::<IMMEndpoint>().ok()?;
    let mut flow = EDataFlow(-1);
    unsafe {
        endpoint.GetDataFlow(&mut flow).ok().ok()?;
    }
    DataFlow::from_raw(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{
        eCapture, eRender, DEVICE_STATEMASK_ALL, DEVICE_STATE_ACTIVE, DEVICE_STATE_DISABLED,
    };
    use crate::stubs::{StubDevice, StubEnumerator, StubLog, AUDCLNT_E_DEVICE_INVALIDATED};
    use std::sync::Arc;
    use windows::Win32::Foundation::{E_ACCESSDENIED, E_NOTIMPL, REGDB_E_CLASSNOTREG};

    fn stub_enumerator(stub: StubEnumerator) -> DeviceEnumerator {
        DeviceEnumerator::from_raw(stub.into())
    }

    #[test]
    fn test_activation_uses_enumerator_clsid() {
        let log = Arc::new(StubLog::default());
        let stub_log = log.clone();

        let enumerator = DeviceEnumerator::activate(&move |clsid: &GUID| {
            assert_eq!(*clsid, CLSID_MMDeviceEnumerator);
            let enumerator: IMMDeviceEnumerator = StubEnumerator::new(stub_log.clone()).into();
            enumerator.cast::<IUnknown>()
        });

        assert!(enumerator.is_ok());
    }

    #[test]
    fn test_activation_failure_is_reported() {
        let result = DeviceEnumerator::activate(&|_: &GUID| -> windows::core::Result<IUnknown> {
            Err(REGDB_E_CLASSNOTREG.into())
        });

        match result {
            Err(EndpointError::Activation(e)) => assert_eq!(e.code(), REGDB_E_CLASSNOTREG),
            other => panic!("unexpected activation result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_enumerates_endpoints_in_order() {
        let log = Arc::new(StubLog::default());
        let stub = StubEnumerator::new(log.clone()).with_devices(vec![
            StubDevice::new("render-1", DEVICE_STATE_ACTIVE, eRender),
            StubDevice::new("capture-1", DEVICE_STATE_DISABLED, eCapture),
        ]);
        let enumerator = stub_enumerator(stub);

        let endpoints = enumerator.endpoints(DataFlow::All, DEVICE_STATEMASK_ALL).unwrap();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].id, "render-1");
        assert_eq!(endpoints[0].state, Some(DeviceState::Active));
        assert_eq!(endpoints[0].flow, Some(DataFlow::Render));
        assert_eq!(endpoints[1].id, "capture-1");
        assert_eq!(endpoints[1].state, Some(DeviceState::Disabled));
        assert_eq!(endpoints[1].flow, Some(DataFlow::Capture));
        assert_eq!(log.calls(), vec!["EnumAudioEndpoints"]);
        assert_eq!(log.last_state_mask(), Some(DEVICE_STATEMASK_ALL.0));
    }

    #[test]
    fn test_device_activation_takes_optional_params() {
        let device: IMMDevice = StubDevice::new("render-1", DEVICE_STATE_ACTIVE, eRender).into();
        let mut interface = std::ptr::NonNull::<std::ffi::c_void>::dangling().as_ptr();
        let activation_params: *mut windows::core::PROPVARIANT = std::ptr::null_mut();

        let status = unsafe {
            device.Activate(
                &IMMEndpoint::IID,
                windows::Win32::System::Com::CLSCTX_ALL,
                activation_params,
                &mut interface,
            )
        };

        assert_eq!(status, windows::Win32::Foundation::E_NOINTERFACE);
        assert!(interface.is_null());
    }

    #[test]
    fn test_invalidated_device_is_skipped() {
        let log = Arc::new(StubLog::default());
        let stub = StubEnumerator::new(log).with_devices(vec![
            StubDevice::new("render-1", DEVICE_STATE_ACTIVE, eRender)
                .with_state_status(AUDCLNT_E_DEVICE_INVALIDATED),
            StubDevice::new("render-2", DEVICE_STATE_ACTIVE, eRender),
        ]);
        let enumerator = stub_enumerator(stub);

        let endpoints = enumerator.endpoints(DataFlow::Render, DEVICE_STATE_ACTIVE).unwrap();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].id, "render-2");
        assert_eq!(endpoints[0].state, Some(DeviceState::Active));
    }

    #[test]
    fn test_unsupported_enumeration_is_classified() {
        let log = Arc::new(StubLog::default());
        let enumerator =
            stub_enumerator(StubEnumerator::new(log).with_enumeration_status(E_NOTIMPL));

        let err = enumerator
            .endpoints(DataFlow::Render, DEVICE_STATE_ACTIVE)
            .unwrap_err();

        assert!(err.is_unsupported());
        assert_eq!(err.code(), Some(E_NOTIMPL));
    }

    #[test]
    fn test_other_enumeration_failures_are_not_unsupported() {
        let log = Arc::new(StubLog::default());
        let enumerator =
            stub_enumerator(StubEnumerator::new(log).with_enumeration_status(E_ACCESSDENIED));

        let err = enumerator
            .endpoints(DataFlow::Render, DEVICE_STATE_ACTIVE)
            .unwrap_err();

        assert!(matches!(
            err,
            EndpointError::Call {
                operation: "EnumAudioEndpoints",
                ..
            }
        ));
    }

    #[test]
    fn test_default_endpoint() {
        let log = Arc::new(StubLog::default());
        let enumerator = stub_enumerator(
            StubEnumerator::new(log.clone())
                .with_default(StubDevice::new("default-render", DEVICE_STATE_ACTIVE, eRender)),
        );

        let endpoint = enumerator
            .default_endpoint(DataFlow::Render, DeviceRole::Multimedia)
            .unwrap()
            .unwrap();

        assert_eq!(endpoint.id, "default-render");
        assert_eq!(log.last_role(), Some(1));
    }

    #[test]
    fn test_missing_default_endpoint_is_none() {
        let log = Arc::new(StubLog::default());
        let enumerator = stub_enumerator(StubEnumerator::new(log));

        let endpoint = enumerator
            .default_endpoint(DataFlow::Capture, DeviceRole::Console)
            .unwrap();

        assert!(endpoint.is_none());
    }

    #[test]
    fn test_device_lookup_by_id() {
        let log = Arc::new(StubLog::default());
        let enumerator = stub_enumerator(StubEnumerator::new(log).with_devices(vec![
            StubDevice::new("render-1", DEVICE_STATE_ACTIVE, eRender),
        ]));

        assert_eq!(enumerator.device("render-1").unwrap().id, "render-1");
        assert!(matches!(
            enumerator.device("missing"),
            Err(EndpointError::DeviceNotFound { device_id }) if device_id == "missing"
        ));
    }

    #[test]
    fn test_registration_unregisters_on_drop() {
        let log = Arc::new(StubLog::default());
        let enumerator = stub_enumerator(StubEnumerator::new(log.clone()));
        let (sender, _receiver) = crate::audio::notifications::create_event_channel();
        let client = crate::audio::DeviceNotificationClient::new(sender).into();

        let registration = enumerator.register(client).unwrap();
        assert_eq!(log.registered_clients(), 1);

        drop(registration);
        assert_eq!(log.registered_clients(), 0);
        assert_eq!(
            log.calls(),
            vec![
                "RegisterEndpointNotificationCallback",
                "UnregisterEndpointNotificationCallback"
            ]
        );
    }

    #[test]
    fn test_unsupported_registration() {
        let log = Arc::new(StubLog::default());
        let enumerator =
            stub_enumerator(StubEnumerator::new(log.clone()).with_registration_status(E_NOTIMPL));
        let (sender, _receiver) = crate::audio::notifications::create_event_channel();

        let err = enumerator
            .register(crate::audio::DeviceNotificationClient::new(sender).into())
            .err()
            .unwrap();

        assert!(err.is_unsupported());
        assert_eq!(log.registered_clients(), 0);
    }
}
