//! C-compatible API for the apm-bridge audio processing engine.
//!
//! This crate exposes `extern "C"` functions and `#[repr(C)]` types that
//! follow the WebRTC audio processing C wrapper: the same function names,
//! argument order, and status values, with the wrapper's `WEBRTC_APM_*`
//! status spellings defined as aliases in the header. Handles are typed
//! pointers (`WebRtcAudioProcessing *`) rather than `*Handle` typedefs.
//! The header is generated into `include/webrtc_apm.h` by the build script.
//!
//! # Symbol prefix
//!
//! - Functions: `webrtc_apm_*`
//! - Types: `WebRtc*`
//!
//! # Thread safety
//!
//! **NOT thread-safe.** All calls on the same [`WebRtcAudioProcessing`]
//! handle must be serialized by the caller. Distinct handles are
//! independent and a handle may move between threads. Stream descriptors
//! are immutable and may be shared.
//!
//! # Panics
//!
//! No panic crosses the boundary: every entry point that touches the engine
//! converts a panic into `UNSPECIFIED_ERROR` (or `NULL` for constructors).

pub mod types;

mod conversions;
pub mod functions;
mod panic_guard;

pub use functions::*;
pub use types::{
    WebRtcApmError, WebRtcAudioProcessing, WebRtcAudioProcessingConfig, WebRtcNsLevel,
    WebRtcStreamConfig,
};
