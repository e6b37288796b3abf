//! Panic containment at the FFI boundary.
//!
//! Unwinding into C is undefined behavior, so every exported function that
//! touches the engine runs its body through [`ffi_guard!`] or
//! [`ffi_guard_ptr!`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::error;

use crate::types::WebRtcApmError;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

/// Runs `body`, returning `fallback` if it panics.
pub(crate) fn catch<T>(fallback: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(payload) => {
            error!(
                panic = panic_message(payload.as_ref()),
                "panic caught at FFI boundary"
            );
            fallback
        }
    }
}

/// Runs a status-returning body; a panic becomes `UNSPECIFIED_ERROR`.
pub(crate) fn catch_status(body: impl FnOnce() -> WebRtcApmError) -> WebRtcApmError {
    catch(WebRtcApmError::UnspecifiedError, body)
}

/// Runs a pointer-returning body; a panic becomes `NULL`.
pub(crate) fn catch_ptr<T>(body: impl FnOnce() -> *mut T) -> *mut T {
    catch(ptr::null_mut(), body)
}

/// Wraps a function body returning [`WebRtcApmError`]. `return` inside the
/// body returns from the guarded closure.
macro_rules! ffi_guard {
    ($($body:tt)*) => {
        $crate::panic_guard::catch_status(|| { $($body)* })
    };
}

/// Wraps a function body returning a raw pointer.
macro_rules! ffi_guard_ptr {
    ($($body:tt)*) => {
        $crate::panic_guard::catch_ptr(|| { $($body)* })
    };
}

pub(crate) use {ffi_guard, ffi_guard_ptr};
