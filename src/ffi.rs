//! FFI bindings for bedtime estimation
//!
//! This module provides C-compatible functions for calling the estimator from a
//! mobile host. Returned strings are allocated here and must be freed by the
//! caller using `bedtime_free_string`.
//!
//! Estimation calls always return an alert JSON object (`title`, `message`,
//! `success`). When the estimation itself failed, the alert carries the static
//! failure message and the diagnostic cause is kept in `bedtime_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::alert::BedtimeAlert;
use crate::estimator::estimate_bedtime;
use crate::model::{LinearSleepModel, SharedModel, SleepModel};

static EMBEDDED_MODEL: SharedModel = SharedModel::embedded();

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Run one estimation and encode the resulting alert
fn estimate_to_alert_json<M: SleepModel + ?Sized>(
    model: &M,
    wake_seconds_of_day: u32,
    sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    let result = estimate_bedtime(model, wake_seconds_of_day, sleep_hours, coffee_cups);
    if let Err(e) = &result {
        tracing::warn!(error = %e, "bedtime estimation failed");
        set_last_error(&e.to_string());
    }

    match serde_json::to_string(&BedtimeAlert::from_result(&result)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Embedded Model API
// ============================================================================

/// Estimate the bedtime with the embedded model and return the alert JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `bedtime_free_string`.
/// - Returns NULL only if the alert could not be encoded.
#[no_mangle]
pub unsafe extern "C" fn bedtime_estimate(
    wake_seconds_of_day: u32,
    sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();
    estimate_to_alert_json(&EMBEDDED_MODEL, wake_seconds_of_day, sleep_hours, coffee_cups)
}

// ============================================================================
// Host-Supplied Model API
// ============================================================================

/// Opaque handle to a loaded model
pub struct BedtimeModelHandle {
    model: LinearSleepModel,
}

/// Load a model artifact from JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `bedtime_model_free`.
/// - Returns NULL on error; call `bedtime_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bedtime_model_load(json: *const c_char) -> *mut BedtimeModelHandle {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    match LinearSleepModel::from_json(&json_str) {
        Ok(model) => Box::into_raw(Box::new(BedtimeModelHandle { model })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Estimate the bedtime with a loaded model and return the alert JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bedtime_model_load`.
/// - Returns a newly allocated string that must be freed with `bedtime_free_string`.
/// - Returns NULL on error; call `bedtime_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bedtime_model_estimate(
    handle: *const BedtimeModelHandle,
    wake_seconds_of_day: u32,
    sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null model handle");
        return ptr::null_mut();
    }

    let handle = &*handle;
    estimate_to_alert_json(&handle.model, wake_seconds_of_day, sleep_hours, coffee_cups)
}

/// Free a loaded model.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bedtime_model_load`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn bedtime_model_free(handle: *mut BedtimeModelHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must be a pointer returned by a `bedtime_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn bedtime_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next library call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn bedtime_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn bedtime_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
