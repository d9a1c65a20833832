//! Enumerations, device-state flags and the property key used by endpoint callers.
//!
//! The numeric values are part of the binary contract; the names are only a
//! convenience. With the `windows-sdk` feature the enumeration and flag types
//! come from `windows::Win32::Media::Audio` instead of being declared here.

#![allow(non_upper_case_globals)]

use windows::core::GUID;
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

#[cfg(not(feature = "windows-sdk"))]
mod declared {
    use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

    /// Direction of audio data through an endpoint (`EDataFlow`).
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EDataFlow(pub i32);

    pub const eRender: EDataFlow = EDataFlow(0);
    pub const eCapture: EDataFlow = EDataFlow(1);
    pub const eAll: EDataFlow = EDataFlow(2);
    pub const EDataFlow_enum_count: EDataFlow = EDataFlow(3);

    /// Role a default endpoint is selected for (`ERole`).
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ERole(pub i32);

    pub const eConsole: ERole = ERole(0);
    pub const eMultimedia: ERole = ERole(1);
    pub const eCommunications: ERole = ERole(2);
    pub const ERole_enum_count: ERole = ERole(3);

    /// Device activity state, used both as a single state and as a filter mask.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DEVICE_STATE(pub u32);

    pub const DEVICE_STATE_ACTIVE: DEVICE_STATE = DEVICE_STATE(0x0000_0001);
    pub const DEVICE_STATE_DISABLED: DEVICE_STATE = DEVICE_STATE(0x0000_0002);
    pub const DEVICE_STATE_NOTPRESENT: DEVICE_STATE = DEVICE_STATE(0x0000_0004);
    pub const DEVICE_STATE_UNPLUGGED: DEVICE_STATE = DEVICE_STATE(0x0000_0008);
    pub const DEVICE_STATEMASK_ALL: DEVICE_STATE = DEVICE_STATE(0x0000_000F);

    impl DEVICE_STATE {
        pub const fn contains(&self, other: Self) -> bool {
            self.0 & other.0 == other.0
        }
    }

    impl BitOr for DEVICE_STATE {
        type Output = Self;
        fn bitor(self, other: Self) -> Self {
            Self(self.0 | other.0)
        }
    }

    impl BitAnd for DEVICE_STATE {
        type Output = Self;
        fn bitand(self, other: Self) -> Self {
            Self(self.0 & other.0)
        }
    }

    impl BitOrAssign for DEVICE_STATE {
        fn bitor_assign(&mut self, other: Self) {
            self.0.bitor_assign(other.0)
        }
    }

    impl BitAndAssign for DEVICE_STATE {
        fn bitand_assign(&mut self, other: Self) {
            self.0.bitand_assign(other.0)
        }
    }

    impl Not for DEVICE_STATE {
        type Output = Self;
        fn not(self) -> Self {
            Self(self.0.not())
        }
    }
}

#[cfg(not(feature = "windows-sdk"))]
pub use declared::*;

#[cfg(feature = "windows-sdk")]
pub use windows::Win32::Media::Audio::{
    eAll, eCapture, eCommunications, eConsole, eMultimedia, eRender, EDataFlow,
    EDataFlow_enum_count, ERole, ERole_enum_count, DEVICE_STATE, DEVICE_STATE_ACTIVE,
    DEVICE_STATE_DISABLED, DEVICE_STATE_NOTPRESENT, DEVICE_STATE_UNPLUGGED,
};

/// The SDK exports the mask as a bare `u32`; callers pass it where a `DEVICE_STATE` goes.
#[cfg(feature = "windows-sdk")]
pub const DEVICE_STATEMASK_ALL: DEVICE_STATE =
    DEVICE_STATE(windows::Win32::Media::Audio::DEVICE_STATEMASK_ALL);

/// Device format the audio engine uses in shared mode, stored as a `WAVEFORMATEX` blob.
pub const PKEY_AudioEngine_DeviceFormat: PROPERTYKEY = PROPERTYKEY {
    fmtid: GUID::from_values(
        0xF19F064D,
        0x082C,
        0x4E27,
        [0xBC, 0x73, 0x68, 0x82, 0xA1, 0xBB, 0x8E, 0x4C],
    ),
    pid: 0,
};
