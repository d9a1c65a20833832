//! Strings owned by the COM task allocator.
//!
//! `IMMDevice::GetId` returns a string the caller must free with
//! `CoTaskMemFree`. Stub implementations allocate with `CoTaskMemAlloc` so
//! both sides of the contract use the same pair.

use std::ffi::c_void;
use std::string::FromUtf16Error;
use windows::core::{Result, PWSTR};
use windows::Win32::Foundation::E_OUTOFMEMORY;
use windows::Win32::System::Com::{CoTaskMemAlloc, CoTaskMemFree};

/// Copy `value` into a NUL-terminated wide string owned by the task allocator.
///
/// Implementations of `IMMDevice::GetId` use this so callers can release the
/// result with [`take_wide`].
pub fn alloc_wide(value: &str) -> Result<PWSTR> {
    let wide: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let ptr = CoTaskMemAlloc(wide.len() * std::mem::size_of::<u16>()) as *mut u16;
        if ptr.is_null() {
            return Err(E_OUTOFMEMORY.into());
        }
        std::ptr::copy_nonoverlapping(wide.as_ptr(), ptr, wide.len());
        Ok(PWSTR(ptr))
    }
}

/// Take ownership of a task-allocated wide string and return its contents.
///
/// The string is freed even when it is not valid UTF-16.
///
/// # Safety
/// `value` must be null or a NUL-terminated string from the task allocator
/// that nothing else will free.
pub unsafe fn take_wide(value: PWSTR) -> std::result::Result<String, FromUtf16Error> {
    if value.is_null() {
        return Ok(String::new());
    }

    let result = value.to_string();
    CoTaskMemFree(Some(value.0 as *const c_void));
    result
}
