//! Interop with the declarations in `windows::Win32::Media::Audio`.
//!
//! A shim handle and an SDK handle with the same IID name the same COM
//! object through the same vtable, so conversion moves the reference without
//! touching the count.

use super::contracts;
use windows::core::Interface;
use windows::Win32::Media::Audio as sdk;

macro_rules! rebind {
    ($($name:ident),* $(,)?) => {$(
        impl From<contracts::$name> for sdk::$name {
            fn from(value: contracts::$name) -> Self {
                unsafe { Interface::from_raw(value.into_raw()) }
            }
        }

        impl From<sdk::$name> for contracts::$name {
            fn from(value: sdk::$name) -> Self {
                unsafe { Interface::from_raw(value.into_raw()) }
            }
        }
    )*};
}

rebind!(
    IMMNotificationClient,
    IMMDeviceEnumerator,
    IMMDevice,
    IMMEndpoint,
    IMMDeviceCollection,
);
