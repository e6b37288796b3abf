//! Bidirectional conversions between C API types and Rust types.

use apm_bridge::Error;
use apm_bridge::config::{
    Config, EchoCanceller, GainController1, HighPassFilter, NoiseSuppression,
    NoiseSuppressionLevel,
};

use crate::types::{WebRtcApmError, WebRtcAudioProcessingConfig, WebRtcNsLevel};

// ---------------------------------------------------------------------------
// WebRtcAudioProcessingConfig <-> Config
// ---------------------------------------------------------------------------

impl WebRtcAudioProcessingConfig {
    /// Convert from the flat C record to the nested Rust [`Config`].
    ///
    /// Every field is copied 1:1; ranges are left to the engine.
    pub(crate) fn to_rust(self) -> Config {
        Config {
            noise_suppression: NoiseSuppression {
                enabled: self.enable_noise_suppression,
                level: self.ns_level.to_rust(),
            },
            echo_canceller: EchoCanceller {
                enabled: self.enable_echo_cancellation,
                mobile_mode: self.echo_mobile_mode,
            },
            high_pass_filter: HighPassFilter {
                enabled: self.enable_high_pass_filter,
            },
            gain_controller1: GainController1 {
                enabled: self.enable_analog_gain_control,
                target_level_dbfs: self.agc_target_level_dbfs,
                compression_gain_db: self.agc_compression_gain_db,
                enable_limiter: self.agc_enable_limiter,
            },
        }
    }

    /// Convert from the nested Rust [`Config`] to the flat C record.
    pub(crate) fn from_rust(config: &Config) -> Self {
        let ns = &config.noise_suppression;
        let ec = &config.echo_canceller;
        let agc = &config.gain_controller1;
        Self {
            enable_noise_suppression: ns.enabled,
            ns_level: WebRtcNsLevel::from_rust(ns.level),

            enable_echo_cancellation: ec.enabled,
            echo_mobile_mode: ec.mobile_mode,

            enable_high_pass_filter: config.high_pass_filter.enabled,

            enable_analog_gain_control: agc.enabled,
            agc_target_level_dbfs: agc.target_level_dbfs,
            agc_compression_gain_db: agc.compression_gain_db,
            agc_enable_limiter: agc.enable_limiter,
        }
    }
}

// ---------------------------------------------------------------------------
// Enum conversions
// ---------------------------------------------------------------------------

impl WebRtcNsLevel {
    pub(crate) fn to_rust(self) -> NoiseSuppressionLevel {
        match self {
            Self::Low => NoiseSuppressionLevel::Low,
            Self::Moderate => NoiseSuppressionLevel::Moderate,
            Self::High => NoiseSuppressionLevel::High,
            Self::VeryHigh => NoiseSuppressionLevel::VeryHigh,
        }
    }

    pub(crate) fn from_rust(level: NoiseSuppressionLevel) -> Self {
        match level {
            NoiseSuppressionLevel::Low => Self::Low,
            NoiseSuppressionLevel::Moderate => Self::Moderate,
            NoiseSuppressionLevel::High => Self::High,
            NoiseSuppressionLevel::VeryHigh => Self::VeryHigh,
        }
    }
}

// ---------------------------------------------------------------------------
// Error -> WebRtcApmError
// ---------------------------------------------------------------------------

impl WebRtcApmError {
    /// Looks up the status for a numeric code.
    pub(crate) const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::NoError,
            -1 => Self::UnspecifiedError,
            -2 => Self::CreationFailedError,
            -3 => Self::UnsupportedComponentError,
            -4 => Self::UnsupportedFunctionError,
            -5 => Self::NullPointerError,
            -6 => Self::BadParameterError,
            -7 => Self::BadSampleRateError,
            -8 => Self::BadDataLengthError,
            -9 => Self::BadNumberChannelsError,
            -11 => Self::StreamParameterNotSetError,
            -12 => Self::NotEnabledError,
            -13 => Self::BadStreamParameterWarning,
            _ => return None,
        })
    }
}

impl From<Error> for WebRtcApmError {
    /// Every engine error has a C status with the same value.
    fn from(err: Error) -> Self {
        Self::from_code(err.code()).unwrap_or(Self::UnspecifiedError)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
