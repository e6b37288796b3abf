//! Capture high-pass filter.
//!
//! Second-order Butterworth high-pass (one biquad section) removing DC and
//! low-frequency rumble below [`CUTOFF_HZ`].

use std::f32::consts::{FRAC_1_SQRT_2, PI};

/// Cut-off frequency of the filter.
pub(crate) const CUTOFF_HZ: f32 = 80.0;

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BiQuadCoefficients {
    pub(crate) b: [f32; 3],
    pub(crate) a: [f32; 2],
}

impl BiQuadCoefficients {
    /// Butterworth high-pass coefficients for `cutoff_hz` at `sample_rate_hz`.
    pub(crate) fn high_pass(cutoff_hz: f32, sample_rate_hz: i32) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate_hz as f32;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * FRAC_1_SQRT_2);
        let a0 = 1.0 + alpha;
        let b0 = (1.0 + cos_w0) / 2.0 / a0;
        Self {
            b: [b0, -2.0 * b0, b0],
            a: [-2.0 * cos_w0 / a0, (1.0 - alpha) / a0],
        }
    }
}

/// Direct form I biquad state for one channel.
#[derive(Debug, Clone, Default)]
struct BiQuadState {
    x: [f32; 2],
    y: [f32; 2],
}

/// Multi-channel high-pass filter.
#[derive(Debug)]
pub(crate) struct HighPassFilter {
    coefficients: BiQuadCoefficients,
    states: Vec<BiQuadState>,
}

impl HighPassFilter {
    pub(crate) fn new(sample_rate_hz: i32, num_channels: usize) -> Self {
        Self {
            coefficients: BiQuadCoefficients::high_pass(CUTOFF_HZ, sample_rate_hz),
            states: vec![BiQuadState::default(); num_channels],
        }
    }

    /// Filters every channel in place.
    pub(crate) fn process(&mut self, channels: &mut [Vec<f32>]) {
        debug_assert_eq!(channels.len(), self.states.len());
        let BiQuadCoefficients { b, a } = self.coefficients;
        for (channel, state) in channels.iter_mut().zip(&mut self.states) {
            for sample in channel.iter_mut() {
                let x = *sample;
                let y = b[0] * x + b[1] * state.x[0] + b[2] * state.x[1]
                    - a[0] * state.y[0]
                    - a[1] * state.y[1];
                state.x = [x, state.x[0]];
                state.y = [y, state.y[0]];
                *sample = y;
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.states.fill(BiQuadState::default());
    }
}
