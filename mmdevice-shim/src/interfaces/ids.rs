//! Identifier table.
//!
//! Every identifier exists twice: as a literal in [`literal`] and as the
//! value resolved from a named declaration. The exported constants use the
//! resolved form; tests hold the two byte-for-byte equal.

#![allow(non_upper_case_globals)]

use windows::core::{Interface, GUID};

#[cfg(not(feature = "windows-sdk"))]
use super::contracts::{IMMDeviceEnumerator, IMMEndpoint, IMMNotificationClient};
use super::contracts::{IMMDevice, IMMDeviceCollection};

#[cfg(feature = "windows-sdk")]
use windows::Win32::Media::Audio::{IMMDeviceEnumerator, IMMEndpoint, IMMNotificationClient};

/// Published values, as they appear in `mmdeviceapi.h`.
pub mod literal {
    use windows::core::GUID;

    pub const CLSID_MMDeviceEnumerator: GUID = GUID::from_values(
        0xBCDE0395,
        0xE52F,
        0x467C,
        [0x8E, 0x3D, 0xC4, 0x57, 0x92, 0x91, 0x69, 0x2E],
    );
    pub const IID_IMMDeviceEnumerator: GUID = GUID::from_values(
        0xA95664D2,
        0x9614,
        0x4F35,
        [0xA7, 0x46, 0xDE, 0x8D, 0xB6, 0x36, 0x17, 0xE6],
    );
    pub const IID_IMMNotificationClient: GUID = GUID::from_values(
        0x7991EEC9,
        0x7E89,
        0x4D85,
        [0x83, 0x90, 0x6C, 0x70, 0x3C, 0xEC, 0x60, 0xC0],
    );
    pub const IID_IMMEndpoint: GUID = GUID::from_values(
        0x1BE09788,
        0x6894,
        0x4089,
        [0x85, 0x86, 0x9A, 0x2A, 0x6C, 0x26, 0x5A, 0xC5],
    );
    pub const IID_IMMDevice: GUID = GUID::from_values(
        0xD666063F,
        0x1587,
        0x4E43,
        [0x81, 0xF1, 0xB9, 0x48, 0xE8, 0x07, 0x36, 0x3F],
    );
    pub const IID_IMMDeviceCollection: GUID = GUID::from_values(
        0x0BD7A1BE,
        0x7A1A,
        0x44DB,
        [0x83, 0x97, 0xCC, 0x53, 0x92, 0x38, 0x7B, 0x5E],
    );
}

/// Creatable component behind `IMMDeviceEnumerator`.
#[cfg(not(feature = "windows-sdk"))]
pub const CLSID_MMDeviceEnumerator: GUID = literal::CLSID_MMDeviceEnumerator;

/// Creatable component behind `IMMDeviceEnumerator`.
#[cfg(feature = "windows-sdk")]
pub const CLSID_MMDeviceEnumerator: GUID = windows::Win32::Media::Audio::MMDeviceEnumerator;

pub const IID_IMMDeviceEnumerator: GUID = <IMMDeviceEnumerator as Interface>::IID;
pub const IID_IMMNotificationClient: GUID = <IMMNotificationClient as Interface>::IID;
pub const IID_IMMEndpoint: GUID = <IMMEndpoint as Interface>::IID;
pub const IID_IMMDevice: GUID = <IMMDevice as Interface>::IID;
pub const IID_IMMDeviceCollection: GUID = <IMMDeviceCollection as Interface>::IID;

/// Render a GUID in the platform's canonical registry form,
/// `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, upper case and without braces.
pub fn canonical_string(guid: &GUID) -> String {
    let d = &guid.data4;
    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        guid.data1, guid.data2, guid.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
    )
}
