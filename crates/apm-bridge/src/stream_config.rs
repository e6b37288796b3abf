//! Stream format description for audio frames.

/// Sample rates the engine processes natively, in Hz.
pub const NATIVE_SAMPLE_RATES_HZ: [i32; 4] = [8_000, 16_000, 32_000, 48_000];

/// Describes the format of one 10 ms audio frame: sample rate and channel
/// count.
///
/// A `StreamConfig` is a plain value and does not validate its fields; the
/// engine rejects unsupported formats when a frame is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamConfig {
    sample_rate_hz: i32,
    num_channels: usize,
}

impl StreamConfig {
    /// Create a new stream configuration.
    pub const fn new(sample_rate_hz: i32, num_channels: usize) -> Self {
        Self {
            sample_rate_hz,
            num_channels,
        }
    }

    /// The sampling rate in Hz.
    #[inline]
    pub fn sample_rate_hz(&self) -> i32 {
        self.sample_rate_hz
    }

    /// The number of channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// The number of samples per channel in a 10 ms frame.
    ///
    /// Zero for a non-positive sample rate.
    #[inline]
    pub fn num_frames(&self) -> usize {
        usize::try_from(self.sample_rate_hz / 100).unwrap_or(0)
    }

    /// Total number of samples in an interleaved frame (channels × frames).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_channels.saturating_mul(self.num_frames())
    }

    /// Whether the sample rate is one of [`NATIVE_SAMPLE_RATES_HZ`].
    pub fn has_native_rate(&self) -> bool {
        NATIVE_SAMPLE_RATES_HZ.contains(&self.sample_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prop_assert_eq;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn frame_sizes_follow_ten_ms_rule() {
        let config = StreamConfig::new(48_000, 2);
        assert_eq!(config.sample_rate_hz(), 48_000);
        assert_eq!(config.num_channels(), 2);
        assert_eq!(config.num_frames(), 480);
        assert_eq!(config.num_samples(), 960);

        let config = StreamConfig::new(8_000, 1);
        assert_eq!(config.num_frames(), 80);
        assert_eq!(config.num_samples(), 80);
    }

    #[proptest]
    fn samples_are_channels_times_frames(
        #[strategy(1i32..200_000)] sample_rate_hz: i32,
        #[strategy(0usize..32)] num_channels: usize,
    ) {
        let config = StreamConfig::new(sample_rate_hz, num_channels);
        prop_assert_eq!(config.num_frames(), (sample_rate_hz / 100) as usize);
        prop_assert_eq!(config.num_samples(), num_channels * config.num_frames());
    }

    #[test]
    fn non_positive_rate_has_no_frames() {
        assert_eq!(StreamConfig::new(0, 2).num_frames(), 0);
        assert_eq!(StreamConfig::new(-16_000, 2).num_frames(), 0);
        assert_eq!(StreamConfig::new(-16_000, 2).num_samples(), 0);
    }

    #[test]
    fn native_rates() {
        for rate in NATIVE_SAMPLE_RATES_HZ {
            assert!(StreamConfig::new(rate, 1).has_native_rate());
        }
        assert!(!StreamConfig::new(44_100, 1).has_native_rate());
        assert!(!StreamConfig::new(96_000, 1).has_native_rate());
    }
}
