//! Audio processing configuration.
//!
//! Each processing stage has its own sub-configuration with an `enabled`
//! flag. All stages are disabled by default.

use std::ops::RangeInclusive;

use crate::Error;

/// Accepted range of [`GainController1::target_level_dbfs`].
pub const TARGET_LEVEL_DBFS_RANGE: RangeInclusive<i32> = -31..=0;

/// Accepted range of [`GainController1::compression_gain_db`].
pub const COMPRESSION_GAIN_DB_RANGE: RangeInclusive<i32> = 0..=90;

/// Top-level configuration for the audio processing pipeline.
///
/// Applying a configuration always replaces the whole value; there is no
/// partial update.
///
/// # Example
///
/// ```
/// use apm_bridge::Config;
/// use apm_bridge::config::NoiseSuppressionLevel;
///
/// let mut config = Config::default();
/// config.echo_canceller.enabled = true;
/// config.noise_suppression.enabled = true;
/// config.noise_suppression.level = NoiseSuppressionLevel::High;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Background noise suppression.
    pub noise_suppression: NoiseSuppression,
    /// Acoustic echo cancellation.
    pub echo_canceller: EchoCanceller,
    /// Capture high-pass filter.
    pub high_pass_filter: HighPassFilter,
    /// Automatic gain control.
    pub gain_controller1: GainController1,
}

impl Config {
    /// Checks the numeric fields against their documented ranges.
    ///
    /// Returns [`Error::BadParameter`] for the first field out of range.
    pub fn validate(&self) -> Result<(), Error> {
        let agc = &self.gain_controller1;
        if !TARGET_LEVEL_DBFS_RANGE.contains(&agc.target_level_dbfs) {
            return Err(Error::BadParameter);
        }
        if !COMPRESSION_GAIN_DB_RANGE.contains(&agc.compression_gain_db) {
            return Err(Error::BadParameter);
        }
        Ok(())
    }

    /// Whether any capture stage is enabled.
    pub fn any_capture_stage_enabled(&self) -> bool {
        self.noise_suppression.enabled
            || self.echo_canceller.enabled
            || self.high_pass_filter.enabled
            || self.gain_controller1.enabled
    }
}

/// Background noise suppression settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseSuppression {
    pub enabled: bool,
    /// Aggressiveness level (default: `Moderate`).
    pub level: NoiseSuppressionLevel,
}

/// Noise suppression aggressiveness level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NoiseSuppressionLevel {
    /// Low suppression (~6 dB).
    Low,
    /// Moderate suppression (~12 dB, default).
    #[default]
    Moderate,
    /// High suppression (~18 dB).
    High,
    /// Very high suppression (~21 dB).
    VeryHigh,
}

impl NoiseSuppressionLevel {
    /// Maximum attenuation applied to noise, in dB.
    pub(crate) fn max_attenuation_db(self) -> f32 {
        match self {
            Self::Low => 6.0,
            Self::Moderate => 12.0,
            Self::High => 18.0,
            Self::VeryHigh => 21.0,
        }
    }
}

/// Echo canceller settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoCanceller {
    pub enabled: bool,
    /// Use the lightweight canceller (shorter echo tail, fixed residual
    /// suppression) intended for mobile devices.
    pub mobile_mode: bool,
}

/// High-pass filter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighPassFilter {
    pub enabled: bool,
}

/// Automatic gain control settings (adaptive digital mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainController1 {
    pub enabled: bool,
    /// Target peak level in dBFS, in `-31..=0` (default: -3).
    pub target_level_dbfs: i32,
    /// Maximum digital gain in dB, in `0..=90` (default: 9).
    pub compression_gain_db: i32,
    /// Hard-limit the output at the target level (default: true).
    pub enable_limiter: bool,
}

impl Default for GainController1 {
    fn default() -> Self {
        Self {
            enabled: false,
            target_level_dbfs: -3,
            compression_gain_db: 9,
            enable_limiter: true,
        }
    }
}
