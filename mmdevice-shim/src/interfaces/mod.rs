//! Declarations for the Windows MMDevice endpoint API.
//!
//! Restricted deployment targets ship an SDK without these declarations even
//! though the enumerator component is present at runtime. This module
//! re-declares the five endpoint contracts, the identifiers used to activate
//! and query them, and the constants their callers pass, so that client code
//! binds to the same binary objects the full SDK would describe.
//!
//! Nothing here executes. Reference counting belongs to `IUnknown` from
//! `windows-core`; enumeration belongs to the runtime component.
//!
//! ## Richer SDKs
//!
//! With the `windows-sdk` feature the enumeration and flag types, the enumerator
//! CLSID and the enumerator, notification and endpoint IIDs resolve through
//! `windows::Win32::Media::Audio`, and [`sdk`] converts handles between the two
//! sets of declarations. Everything else stays as declared here.

mod constants;
mod contracts;
mod ids;
mod shapes;

#[cfg(feature = "windows-sdk")]
pub mod sdk;

pub use constants::*;
pub use contracts::*;
pub use ids::{
    canonical_string, literal, CLSID_MMDeviceEnumerator, IID_IMMDevice, IID_IMMDeviceCollection,
    IID_IMMDeviceEnumerator, IID_IMMEndpoint, IID_IMMNotificationClient,
};
pub use shapes::{
    contract_by_iid, ContractShape, CONTRACTS, DEVICE, DEVICE_COLLECTION, DEVICE_ENUMERATOR,
    ENDPOINT, IUNKNOWN_SLOTS, NOTIFICATION_CLIENT,
};
