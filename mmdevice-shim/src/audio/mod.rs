//! Safe endpoint layer over the declared MMDevice contracts.
//!
//! This module provides enumerator activation, endpoint enumeration,
//! device notifications, and discovery that degrades on restricted targets.

pub mod cotask;
pub mod device;
pub mod discovery;
pub mod enumerator;
pub mod notifications;

pub use device::{
    is_unsupported_status, DataFlow, DeviceEvent, DeviceRole, DeviceState, Endpoint,
    EndpointError, E_NOTFOUND, E_NOT_SUPPORTED,
};
pub use discovery::{
    discover, DeviceWatcher, Discovery, DiscoveryReport, EndpointSource, NotificationSupport,
};
pub use enumerator::{
    ComActivator, ComGuard, ComponentActivator, DeviceEnumerator, NotificationRegistration,
};
pub use notifications::{create_event_channel, DeviceNotificationClient};
