//! FFI bindings for the MMDevice endpoint shim.
//!
//! This crate provides C ABI functions for backends that are not written in
//! Rust. All functions use panic::catch_unwind to prevent Rust panics from
//! unwinding across the FFI boundary.

use mmdevice_shim::interfaces::{
    canonical_string, CLSID_MMDeviceEnumerator, IID_IMMDeviceEnumerator, IID_IMMEndpoint,
    IID_IMMNotificationClient, CONTRACTS, DEVICE_STATEMASK_ALL, IUNKNOWN_SLOTS,
};
use mmdevice_shim::audio::ComGuard;
use mmdevice_shim::{
    discover, logging, ConfigError, DeviceEnumerator, DiscoveryConfig, EndpointError,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic;
use std::ptr;
use tracing::error;
use windows::core::GUID;

// ============================================================================
// Error Handling
// ============================================================================

/// Error codes returned by FFI functions.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    InvalidArgument = -2,
    DeviceNotFound = -3,
    ComError = -4,
    JsonError = -5,
    ConfigError = -6,
    Unsupported = -7,
    Panic = -99,
}

impl From<&EndpointError> for ErrorCode {
    fn from(err: &EndpointError) -> Self {
        match err {
            EndpointError::Unsupported { .. } => ErrorCode::Unsupported,
            EndpointError::DeviceNotFound { .. } => ErrorCode::DeviceNotFound,
            EndpointError::StringConversion(_) => ErrorCode::InvalidArgument,
            _ => ErrorCode::ComError,
        }
    }
}

impl From<&ConfigError> for ErrorCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Parse(_) => ErrorCode::JsonError,
            _ => ErrorCode::ConfigError,
        }
    }
}

/// An error on its way to `LAST_ERROR`.
#[derive(Debug)]
struct FfiError {
    code: ErrorCode,
    message: String,
}

impl FfiError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<EndpointError> for FfiError {
    fn from(err: EndpointError) -> Self {
        Self::new(ErrorCode::from(&err), err.to_string())
    }
}

impl From<ConfigError> for FfiError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorCode::from(&err), err.to_string())
    }
}

impl From<serde_json::Error> for FfiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::JsonError, err.to_string())
    }
}

/// Thread-local storage for the last error.
thread_local! {
    static LAST_ERROR: RefCell<Option<(ErrorCode, String)>> = const { RefCell::new(None) };
}

fn set_last_error(code: ErrorCode, message: impl Into<String>) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some((code, message.into()));
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

// ============================================================================
// Data Types for JSON Serialization
// ============================================================================

/// One vtable slot of a contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct SlotDto {
    pub slot: usize,
    pub operation: String,
}

/// A declared contract with its identifier and slot layout.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContractDto {
    pub name: String,
    pub iid: String,
    pub slots: Vec<SlotDto>,
}

/// Response containing every declared contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContractListResponse {
    pub inherited_slots: usize,
    pub contracts: Vec<ContractDto>,
}

fn contract_list() -> ContractListResponse {
    let contracts = CONTRACTS
        .iter()
        .map(|contract| ContractDto {
            name: contract.name.to_string(),
            iid: canonical_string(&contract.iid),
            slots: contract
                .operations
                .iter()
                .enumerate()
                .map(|(ordinal, operation)| SlotDto {
                    slot: IUNKNOWN_SLOTS + ordinal,
                    operation: operation.to_string(),
                })
                .collect(),
        })
        .collect();

    ContractListResponse {
        inherited_slots: IUNKNOWN_SLOTS,
        contracts,
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Allocate a C string from a Rust string. Caller must free with mmshim_free_string.
fn alloc_c_string(s: &str) -> *mut c_char {
    // A string with an interior NUL becomes empty
    CString::new(s).unwrap_or_default().into_raw()
}

/// Parse a C string to a Rust string slice.
unsafe fn parse_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Turn the outcome of a string-returning call into a C string or null.
fn string_result(
    result: std::thread::Result<Result<String, FfiError>>,
    operation: &str,
) -> *mut c_char {
    match result {
        Ok(Ok(json)) => alloc_c_string(&json),
        Ok(Err(e)) => {
            set_last_error(e.code, e.message);
            ptr::null_mut()
        }
        Err(_) => {
            error!(operation, "panic caught at the FFI boundary");
            set_last_error(ErrorCode::Panic, format!("Panic during {operation}"));
            ptr::null_mut()
        }
    }
}

fn parse_config(config_json: *const c_char) -> Result<DiscoveryConfig, FfiError> {
    if config_json.is_null() {
        return Ok(DiscoveryConfig::default());
    }
    let json = unsafe { parse_c_str(config_json) }
        .ok_or_else(|| FfiError::new(ErrorCode::InvalidArgument, "Config is not valid UTF-8"))?;
    Ok(DiscoveryConfig::from_json(json)?)
}

fn run_probe(config: &DiscoveryConfig) -> Result<String, FfiError> {
    let _com = ComGuard::new()?;
    let enumerator = DeviceEnumerator::new()?;
    let discovery = discover(&enumerator, config)?;

    Ok(serde_json::to_string(&discovery.report)?)
}

// ============================================================================
// FFI Functions - Identifiers and Shapes
// ============================================================================

/// Copy one of the exported identifiers.
///
/// # Arguments
/// * `which` - 0 = CLSID_MMDeviceEnumerator, 1 = IID_IMMDeviceEnumerator,
///   2 = IID_IMMNotificationClient, 3 = IID_IMMEndpoint
/// * `out` - Receives the 16-byte GUID
///
/// # Returns
/// 0 on success, negative error code on failure.
///
/// # Safety
/// `out` must be null or point to writable memory for one GUID.
#[no_mangle]
pub extern "C" fn mmshim_copy_identifier(which: u32, out: *mut GUID) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error(ErrorCode::InvalidArgument, "Output pointer is null");
        return ErrorCode::InvalidArgument as i32;
    }

    let id = match which {
        0 => CLSID_MMDeviceEnumerator,
        1 => IID_IMMDeviceEnumerator,
        2 => IID_IMMNotificationClient,
        3 => IID_IMMEndpoint,
        _ => {
            set_last_error(ErrorCode::InvalidArgument, format!("Unknown identifier {which}"));
            return ErrorCode::InvalidArgument as i32;
        }
    };

    unsafe {
        out.write(id);
    }
    ErrorCode::Success as i32
}

/// Get `DEVICE_STATEMASK_ALL`, the union of every device state flag.
#[no_mangle]
pub extern "C" fn mmshim_device_state_mask_all() -> u32 {
    DEVICE_STATEMASK_ALL.0
}

/// Get the declared contracts and their vtable slots.
///
/// # Returns
/// JSON string. Caller must free with mmshim_free_string().
/// Returns null on failure.
#[no_mangle]
pub extern "C" fn mmshim_contracts_json() -> *mut c_char {
    clear_last_error();

    let result = panic::catch_unwind(|| -> Result<String, FfiError> {
        Ok(serde_json::to_string(&contract_list())?)
    });
    string_result(result, "contract listing")
}

// ============================================================================
// FFI Functions - Discovery
// ============================================================================

/// Run endpoint discovery on the calling thread.
///
/// # Arguments
/// * `config_json` - JSON configuration string (can be null for defaults)
///
/// # Returns
/// JSON discovery report. Caller must free with mmshim_free_string().
/// Returns null on failure. Unsupported enumeration degrades inside the
/// report instead of failing. Check mmshim_last_error_code() on failure.
#[no_mangle]
pub extern "C" fn mmshim_probe(config_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let result = panic::catch_unwind(|| -> Result<String, FfiError> {
        let config = parse_config(config_json)?;
        logging::init(config.log_filter.as_deref());
        run_probe(&config)
    });
    string_result(result, "discovery")
}

// ============================================================================
// FFI Functions - Memory Management
// ============================================================================

/// Free a string allocated by this library.
///
/// # Safety
/// The pointer must have been returned by one of the mmshim_* functions.
/// Do not call this on strings from other sources.
#[no_mangle]
pub extern "C" fn mmshim_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }

    let _ = panic::catch_unwind(|| unsafe {
        let _ = CString::from_raw(ptr);
    });
}

// ============================================================================
// FFI Functions - Error Handling
// ============================================================================

/// Get the last error code.
///
/// # Returns
/// The error code from the last failed operation, or 0 if no error.
#[no_mangle]
pub extern "C" fn mmshim_last_error_code() -> i32 {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|(code, _)| *code as i32)
            .unwrap_or(0)
    })
}

/// Get the last error message.
///
/// # Returns
/// Error message string. Caller must free with mmshim_free_string().
/// Returns null if no error.
#[no_mangle]
pub extern "C" fn mmshim_last_error_message() -> *mut c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|(_, msg)| alloc_c_string(msg))
            .unwrap_or(ptr::null_mut())
    })
}

// ============================================================================
// FFI Functions - Utility
// ============================================================================

/// Get the library version.
///
/// # Returns
/// Version string. Caller must free with mmshim_free_string().
#[no_mangle]
pub extern "C" fn mmshim_version() -> *mut c_char {
    alloc_c_string(env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Tests
// ============================================================================
