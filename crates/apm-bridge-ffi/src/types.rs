//! C-compatible type definitions for the audio processing C API.
//!
//! Value types here are `#[repr(C)]` / `#[repr(i32)]` and safe to pass
//! across the FFI boundary. Handles are opaque to C.

use apm_bridge::{Config, Engine, StreamConfig};
use derive_more::Debug;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Status codes returned by C API functions.
///
/// `0` = success, negative = error or warning. Values are stable.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebRtcApmError {
    /// Operation succeeded.
    NoError = 0,
    /// Failure without a more specific code, including a panic caught at
    /// the boundary.
    UnspecifiedError = -1,
    /// The engine could not be created.
    CreationFailedError = -2,
    /// Component not supported by the engine.
    UnsupportedComponentError = -3,
    /// Function not supported by the engine.
    UnsupportedFunctionError = -4,
    /// A required pointer argument was `NULL`.
    NullPointerError = -5,
    /// A configuration value was rejected by the engine.
    BadParameterError = -6,
    /// Unsupported or mismatched sample rate.
    BadSampleRateError = -7,
    /// A buffer did not match its stream descriptor.
    BadDataLengthError = -8,
    /// Unsupported channel count or channel combination.
    BadNumberChannelsError = -9,
    /// A stream parameter the engine needs was never set.
    StreamParameterNotSetError = -11,
    /// The addressed component is disabled.
    NotEnabledError = -12,
    /// A stream parameter was out of range and was clamped; the call still
    /// took effect.
    BadStreamParameterWarning = -13,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Noise suppression aggressiveness level.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebRtcNsLevel {
    Low = 0,
    Moderate = 1,
    High = 2,
    VeryHigh = 3,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Flat configuration record for the audio processing pipeline.
///
/// Each apply supplies the complete record. Obtain a default-initialized
/// instance via `webrtc_apm_config_default()`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebRtcAudioProcessingConfig {
    // -- Noise suppression --
    pub enable_noise_suppression: bool,
    pub ns_level: WebRtcNsLevel,

    // -- Echo cancellation --
    pub enable_echo_cancellation: bool,
    pub echo_mobile_mode: bool,

    // -- High-pass filter --
    pub enable_high_pass_filter: bool,

    // -- Gain control --
    pub enable_analog_gain_control: bool,
    /// Target level in dBFS, meaningful in `-31..=0`.
    pub agc_target_level_dbfs: i32,
    /// Maximum gain in dB, meaningful in `0..=90`.
    pub agc_compression_gain_db: i32,
    pub agc_enable_limiter: bool,
}

// ---------------------------------------------------------------------------
// Opaque handles
// ---------------------------------------------------------------------------

/// Opaque stream format descriptor: sample rate and channel count of one
/// 10 ms frame.
///
/// Created via `webrtc_apm_stream_config_create()`, destroyed via
/// `webrtc_apm_stream_config_destroy()`.
#[derive(Debug)]
pub struct WebRtcStreamConfig {
    pub(crate) config: StreamConfig,
}

/// Opaque handle to an audio processing instance.
///
/// Created via `webrtc_apm_create()`, destroyed via `webrtc_apm_destroy()`.
///
/// **NOT thread-safe**: all calls on the same handle must be serialized.
#[derive(Debug)]
pub struct WebRtcAudioProcessing {
    #[debug(skip)]
    pub(crate) apm: Box<dyn Engine>,
    /// Last configuration handed to the engine.
    pub(crate) current_config: Config,
}

impl WebRtcAudioProcessing {
    pub(crate) fn new(apm: Box<dyn Engine>) -> Self {
        Self {
            apm,
            current_config: Config::default(),
        }
    }
}
