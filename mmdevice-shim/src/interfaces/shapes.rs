//! Machine-readable table of the declared contracts.

use super::ids;
use windows::core::GUID;

/// Number of vtable slots every contract inherits from `IUnknown`.
pub const IUNKNOWN_SLOTS: usize = 3;

/// Name, identifier and ordered operations of one capability contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractShape {
    pub name: &'static str,
    pub iid: GUID,
    /// Operation names in vtable order, excluding the `IUnknown` slots.
    pub operations: &'static [&'static str],
}

impl ContractShape {
    /// Absolute vtable slot of an operation, counting the `IUnknown` slots.
    pub fn slot(&self, operation: &str) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| *op == operation)
            .map(|ordinal| IUNKNOWN_SLOTS + ordinal)
    }

    /// Total number of vtable slots.
    pub fn slot_count(&self) -> usize {
        IUNKNOWN_SLOTS + self.operations.len()
    }
}

pub const NOTIFICATION_CLIENT: ContractShape = ContractShape {
    name: "IMMNotificationClient",
    iid: ids::IID_IMMNotificationClient,
    operations: &[
        "OnDeviceStateChanged",
        "OnDeviceAdded",
        "OnDeviceRemoved",
        "OnDefaultDeviceChanged",
        "OnPropertyValueChanged",
    ],
};

pub const DEVICE_ENUMERATOR: ContractShape = ContractShape {
    name: "IMMDeviceEnumerator",
    iid: ids::IID_IMMDeviceEnumerator,
    operations: &[
        "EnumAudioEndpoints",
        "GetDefaultAudioEndpoint",
        "GetDevice",
        "RegisterEndpointNotificationCallback",
        "UnregisterEndpointNotificationCallback",
    ],
};

pub const DEVICE: ContractShape = ContractShape {
    name: "IMMDevice",
    iid: ids::IID_IMMDevice,
    operations: &["Activate", "OpenPropertyStore", "GetId", "GetState"],
};

pub const ENDPOINT: ContractShape = ContractShape {
    name: "IMMEndpoint",
    iid: ids::IID_IMMEndpoint,
    operations: &["GetDataFlow"],
};

pub const DEVICE_COLLECTION: ContractShape = ContractShape {
    name: "IMMDeviceCollection",
    iid: ids::IID_IMMDeviceCollection,
    operations: &["GetCount", "Item"],
};

/// Every contract this crate declares.
pub static CONTRACTS: [ContractShape; 5] = [
    NOTIFICATION_CLIENT,
    DEVICE_ENUMERATOR,
    DEVICE,
    ENDPOINT,
    DEVICE_COLLECTION,
];

/// Look up a contract by interface identifier.
pub fn contract_by_iid(iid: &GUID) -> Option<&'static ContractShape> {
    CONTRACTS.iter().find(|shape| shape.iid == *iid)
}
