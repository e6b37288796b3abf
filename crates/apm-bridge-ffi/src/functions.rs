//! Exported `extern "C"` functions for the audio processing C API.
//!
//! # Symbol prefix
//!
//! All public symbols use the `webrtc_apm_` prefix.
//!
//! # Pointer contract
//!
//! Handles must come from the matching `*_create` function and must not be
//! used after `*_destroy`. Sample buffers must match their stream
//! descriptor: int16 buffers hold `num_channels * sample_rate_hz / 100`
//! interleaved samples, float buffers are arrays of `num_channels` channel
//! pointers of `sample_rate_hz / 100` samples each. Source and destination
//! buffers must not overlap.

use std::ffi::{CStr, c_char, c_int};
use std::{ptr, slice};

use apm_bridge::{AudioProcessing, Config, Error, StreamConfig};
use tracing::warn;

use crate::panic_guard::{ffi_guard, ffi_guard_ptr};
use crate::types::{
    WebRtcApmError, WebRtcAudioProcessing, WebRtcAudioProcessingConfig, WebRtcStreamConfig,
};

const VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(version) => version,
    Err(_) => panic!("crate version contains a NUL byte"),
};

/// Maps an engine result to a status code, logging failures.
fn relay(operation: &'static str, result: Result<(), Error>) -> WebRtcApmError {
    match result {
        Ok(()) => WebRtcApmError::NoError,
        Err(err) => {
            warn!(operation, code = err.code(), %err, "engine call failed");
            err.into()
        }
    }
}

/// Borrows `num_channels` channel buffers of `num_frames` samples each.
///
/// A null channel pointer yields an empty channel, which the engine
/// rejects as a length mismatch.
///
/// # Safety
///
/// `channels` must point to `num_channels` pointers, each null or valid for
/// `num_frames` reads, for the lifetime `'a`.
unsafe fn input_channels<'a>(
    channels: *const *const f32,
    num_channels: usize,
    num_frames: usize,
) -> Vec<&'a [f32]> {
    // Safety: guaranteed by the caller.
    let pointers = unsafe { slice::from_raw_parts(channels, num_channels) };
    pointers
        .iter()
        .map(|&channel| {
            if channel.is_null() {
                Default::default()
            } else {
                // Safety: guaranteed by the caller.
                unsafe { slice::from_raw_parts(channel, num_frames) }
            }
        })
        .collect()
}

/// Mutable counterpart of [`input_channels`].
///
/// # Safety
///
/// `channels` must point to `num_channels` pointers, each null or valid for
/// `num_frames` writes and not aliased, for the lifetime `'a`.
unsafe fn output_channels<'a>(
    channels: *const *mut f32,
    num_channels: usize,
    num_frames: usize,
) -> Vec<&'a mut [f32]> {
    // Safety: guaranteed by the caller.
    let pointers = unsafe { slice::from_raw_parts(channels, num_channels) };
    pointers
        .iter()
        .map(|&channel| {
            if channel.is_null() {
                Default::default()
            } else {
                // Safety: guaranteed by the caller.
                unsafe { slice::from_raw_parts_mut(channel, num_frames) }
            }
        })
        .collect()
}

// ─── Version ─────────────────────────────────────────────────────────

/// Returns a pointer to a static null-terminated version string.
///
/// The returned pointer is valid for the lifetime of the process.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_version() -> *const c_char {
    VERSION.as_ptr()
}

// ─── Stream descriptors ──────────────────────────────────────────────

/// Creates a stream format descriptor.
///
/// The values are not validated here; unsupported formats are reported by
/// the processing calls. Returns `NULL` on internal error. Free with
/// [`webrtc_apm_stream_config_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_config_create(
    sample_rate_hz: c_int,
    num_channels: usize,
) -> *mut WebRtcStreamConfig {
    ffi_guard_ptr! {
        let config = StreamConfig::new(sample_rate_hz, num_channels);
        Box::into_raw(Box::new(WebRtcStreamConfig { config }))
    }
}

/// Destroys a stream format descriptor.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_config_destroy(config: *mut WebRtcStreamConfig) {
    if !config.is_null() {
        // Safety: created by Box::into_raw in webrtc_apm_stream_config_create,
        // and the caller guarantees single ownership.
        let _ = unsafe { Box::from_raw(config) };
    }
}

/// Sample rate of a descriptor, `0` for `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_config_sample_rate_hz(
    config: *const WebRtcStreamConfig,
) -> c_int {
    // Safety: the caller guarantees the pointer is null or valid.
    unsafe { config.as_ref() }.map_or(0, |c| c.config.sample_rate_hz())
}

/// Channel count of a descriptor, `0` for `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_config_num_channels(
    config: *const WebRtcStreamConfig,
) -> usize {
    // Safety: the caller guarantees the pointer is null or valid.
    unsafe { config.as_ref() }.map_or(0, |c| c.config.num_channels())
}

/// Samples per channel in a 10 ms frame, `0` for `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_config_num_frames(
    config: *const WebRtcStreamConfig,
) -> usize {
    // Safety: the caller guarantees the pointer is null or valid.
    unsafe { config.as_ref() }.map_or(0, |c| c.config.num_frames())
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Creates a new audio processing instance with default configuration.
///
/// Returns `NULL` if the engine cannot be built or on internal error.
/// The caller owns the returned pointer and must free it with
/// [`webrtc_apm_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_create() -> *mut WebRtcAudioProcessing {
    ffi_guard_ptr! {
        match AudioProcessing::builder().build() {
            Ok(apm) => Box::into_raw(Box::new(WebRtcAudioProcessing::new(Box::new(apm)))),
            Err(err) => {
                warn!(%err, "engine creation failed");
                ptr::null_mut()
            }
        }
    }
}

/// Destroys an audio processing instance and frees its memory.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_destroy(apm: *mut WebRtcAudioProcessing) {
    if !apm.is_null() {
        // Safety: we created this pointer via Box::into_raw in
        // webrtc_apm_create, and the caller guarantees single ownership.
        let _ = unsafe { Box::from_raw(apm) };
    }
}

/// Resets the processing state. The configuration is kept.
///
/// Returns `NULL_POINTER_ERROR` if `apm` is null and `UNSPECIFIED_ERROR`
/// for any engine failure.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_initialize(apm: *mut WebRtcAudioProcessing) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null() {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees the pointer is valid and not aliased.
        let apm = unsafe { &mut *apm };
        match apm.apm.initialize() {
            Ok(()) => WebRtcApmError::NoError,
            Err(err) => {
                warn!(code = err.code(), %err, "initialize failed");
                WebRtcApmError::UnspecifiedError
            }
        }
    }
}

// ─── Configuration ───────────────────────────────────────────────────

/// Returns a default-initialized configuration.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_config_default() -> WebRtcAudioProcessingConfig {
    WebRtcAudioProcessingConfig::from_rust(&Config::default())
}

/// Applies a complete configuration to the audio processing instance.
///
/// The record is stored as the instance's current configuration and then
/// handed to the engine, whose result is returned.
///
/// Returns `NULL_POINTER_ERROR` if `apm` or `config` is null.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_apply_config(
    apm: *mut WebRtcAudioProcessing,
    config: *const WebRtcAudioProcessingConfig,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null() || config.is_null() {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees the pointers are valid.
        let (apm, config) = unsafe { (&mut *apm, *config) };
        apm.current_config = config.to_rust();
        relay("apply_config", apm.apm.apply_config(&apm.current_config))
    }
}

/// Retrieves the current configuration.
///
/// Returns `NULL_POINTER_ERROR` if `apm` or `config_out` is null.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_get_config(
    apm: *const WebRtcAudioProcessing,
    config_out: *mut WebRtcAudioProcessingConfig,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null() || config_out.is_null() {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees the pointers are valid.
        let apm = unsafe { &*apm };
        let c_config = WebRtcAudioProcessingConfig::from_rust(&apm.current_config);
        // Safety: config_out is non-null and valid for writes.
        unsafe { ptr::write(config_out, c_config) };
        WebRtcApmError::NoError
    }
}

// ─── Int16 (interleaved) processing ──────────────────────────────────

/// Processes a capture frame of interleaved int16 samples.
///
/// Returns `NULL_POINTER_ERROR` if any pointer is null, otherwise the
/// engine's status.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_process_stream_int16(
    apm: *mut WebRtcAudioProcessing,
    input_config: *const WebRtcStreamConfig,
    output_config: *const WebRtcStreamConfig,
    src: *const i16,
    dest: *mut i16,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null()
            || input_config.is_null()
            || output_config.is_null()
            || src.is_null()
            || dest.is_null()
        {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees valid pointers and buffers sized by
        // the descriptors.
        let (apm, input_config, output_config) =
            unsafe { (&mut *apm, &(*input_config).config, &(*output_config).config) };
        let src = unsafe { slice::from_raw_parts(src, input_config.num_samples()) };
        let dest = unsafe { slice::from_raw_parts_mut(dest, output_config.num_samples()) };
        relay(
            "process_stream_int16",
            apm.apm.process_stream_i16(src, input_config, output_config, dest),
        )
    }
}

/// Processes a render (playback reference) frame of interleaved int16
/// samples.
///
/// Returns `NULL_POINTER_ERROR` if any pointer is null, otherwise the
/// engine's status.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_process_reverse_stream_int16(
    apm: *mut WebRtcAudioProcessing,
    input_config: *const WebRtcStreamConfig,
    output_config: *const WebRtcStreamConfig,
    src: *const i16,
    dest: *mut i16,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null()
            || input_config.is_null()
            || output_config.is_null()
            || src.is_null()
            || dest.is_null()
        {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees valid pointers and buffers sized by
        // the descriptors.
        let (apm, input_config, output_config) =
            unsafe { (&mut *apm, &(*input_config).config, &(*output_config).config) };
        let src = unsafe { slice::from_raw_parts(src, input_config.num_samples()) };
        let dest = unsafe { slice::from_raw_parts_mut(dest, output_config.num_samples()) };
        relay(
            "process_reverse_stream_int16",
            apm.apm
                .process_reverse_stream_i16(src, input_config, output_config, dest),
        )
    }
}

// ─── Float (deinterleaved) processing ────────────────────────────────

/// Processes a capture frame of deinterleaved float samples in `[-1, 1]`.
///
/// Returns `NULL_POINTER_ERROR` if any pointer is null, otherwise the
/// engine's status.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_process_stream_float32(
    apm: *mut WebRtcAudioProcessing,
    input_config: *const WebRtcStreamConfig,
    output_config: *const WebRtcStreamConfig,
    src: *const *const f32,
    dest: *const *mut f32,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null()
            || input_config.is_null()
            || output_config.is_null()
            || src.is_null()
            || dest.is_null()
        {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees valid pointers and channel buffers
        // sized by the descriptors.
        let (apm, input_config, output_config) =
            unsafe { (&mut *apm, &(*input_config).config, &(*output_config).config) };
        let src = unsafe {
            input_channels(src, input_config.num_channels(), input_config.num_frames())
        };
        let mut dest = unsafe {
            output_channels(dest, output_config.num_channels(), output_config.num_frames())
        };
        relay(
            "process_stream_float32",
            apm.apm
                .process_stream_f32(&src, input_config, output_config, &mut dest),
        )
    }
}

/// Processes a render (playback reference) frame of deinterleaved float
/// samples in `[-1, 1]`.
///
/// Returns `NULL_POINTER_ERROR` if any pointer is null, otherwise the
/// engine's status.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_process_reverse_stream_float32(
    apm: *mut WebRtcAudioProcessing,
    input_config: *const WebRtcStreamConfig,
    output_config: *const WebRtcStreamConfig,
    src: *const *const f32,
    dest: *const *mut f32,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null()
            || input_config.is_null()
            || output_config.is_null()
            || src.is_null()
            || dest.is_null()
        {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees valid pointers and channel buffers
        // sized by the descriptors.
        let (apm, input_config, output_config) =
            unsafe { (&mut *apm, &(*input_config).config, &(*output_config).config) };
        let src = unsafe {
            input_channels(src, input_config.num_channels(), input_config.num_frames())
        };
        let mut dest = unsafe {
            output_channels(dest, output_config.num_channels(), output_config.num_frames())
        };
        relay(
            "process_reverse_stream_float32",
            apm.apm
                .process_reverse_stream_f32(&src, input_config, output_config, &mut dest),
        )
    }
}

// ─── Stream delay ────────────────────────────────────────────────────

/// Sets the delay in ms between a render frame being played and its echo
/// reaching the capture side.
///
/// The value is passed to the engine unchanged. The built-in engine clamps
/// to `[0, 500]` and returns `BAD_STREAM_PARAMETER_WARNING` when it had to.
/// Returns `NULL_POINTER_ERROR` if `apm` is null.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_set_streamdelay_ms(
    apm: *mut WebRtcAudioProcessing,
    delay_ms: c_int,
) -> WebRtcApmError {
    ffi_guard! {
        if apm.is_null() {
            return WebRtcApmError::NullPointerError;
        }
        // Safety: the caller guarantees the pointer is valid and not aliased.
        let apm = unsafe { &mut *apm };
        relay("set_stream_delay_ms", apm.apm.set_stream_delay_ms(delay_ms))
    }
}

/// Returns the delay currently used by the engine, `0` for `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn webrtc_apm_stream_delay_ms(apm: *const WebRtcAudioProcessing) -> c_int {
    // Safety: the caller guarantees the pointer is null or valid.
    unsafe { apm.as_ref() }.map_or(0, |apm| apm.apm.stream_delay_ms())
}

// ─── Tests ───────────────────────────────────────────────────────────
