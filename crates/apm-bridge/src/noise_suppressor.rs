//! Background noise suppression.
//!
//! Tracks the noise floor of each channel from its frame energies (fast
//! fall, slow rise) and applies a Wiener-style gain, floored at the
//! configured level's maximum attenuation. The gain is ramped across the
//! frame so level changes never produce discontinuities.

use crate::audio_util::{db_to_ratio, mean_square};
use crate::config::NoiseSuppressionLevel;

/// Per-frame growth of the noise estimate while the signal is above it
/// (~3 dB per second at 10 ms frames).
const NOISE_RISE_FACTOR: f32 = 1.0069;
/// Over-subtraction applied to the noise estimate.
const OVER_SUBTRACTION: f32 = 2.0;
/// Energy below which a frame is treated as digital silence.
const SILENCE_ENERGY: f32 = 1e-12;
/// Smoothing of the gain when it decreases; increases are immediate.
const GAIN_RELEASE: f32 = 0.6;

#[derive(Debug, Clone)]
struct ChannelState {
    noise_energy: Option<f32>,
    gain: f32,
}

impl ChannelState {
    fn new() -> Self {
        Self {
            noise_energy: None,
            gain: 1.0,
        }
    }

    /// Updates the noise estimate with `energy` and returns the gain for
    /// this frame, never below `min_gain`.
    fn target_gain(&mut self, energy: f32, min_gain: f32) -> f32 {
        if energy <= SILENCE_ENERGY {
            return min_gain;
        }
        let noise = match self.noise_energy {
            Some(noise) if energy < noise => energy,
            Some(noise) => noise * NOISE_RISE_FACTOR,
            None => energy,
        };
        self.noise_energy = Some(noise);

        let wiener = (1.0 - OVER_SUBTRACTION * noise / energy).max(0.0).sqrt();
        wiener.max(min_gain)
    }
}

/// Multi-channel noise suppressor.
#[derive(Debug)]
pub(crate) struct NoiseSuppressor {
    min_gain: f32,
    channels: Vec<ChannelState>,
}

impl NoiseSuppressor {
    pub(crate) fn new(level: NoiseSuppressionLevel, num_channels: usize) -> Self {
        Self {
            min_gain: db_to_ratio(-level.max_attenuation_db()),
            channels: vec![ChannelState::new(); num_channels],
        }
    }

    /// Suppresses noise in every channel in place.
    pub(crate) fn process(&mut self, channels: &mut [Vec<f32>]) {
        debug_assert_eq!(channels.len(), self.channels.len());
        let min_gain = self.min_gain;
        for (channel, state) in channels.iter_mut().zip(&mut self.channels) {
            let target = state.target_gain(mean_square(channel), min_gain);

            let previous = state.gain;
            let gain = if target >= previous {
                target
            } else {
                GAIN_RELEASE * previous + (1.0 - GAIN_RELEASE) * target
            };
            state.gain = gain;

            let len = channel.len().max(1) as f32;
            for (i, sample) in channel.iter_mut().enumerate() {
                let t = (i + 1) as f32 / len;
                *sample *= previous + (gain - previous) * t;
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.channels.fill(ChannelState::new());
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    /// Deterministic white noise in `[-amplitude, amplitude]`.
    fn noise_frame(seed: &mut u32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|_| {
                *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((*seed >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    #[test]
    fn target_gain_is_floored_per_level() {
        let min_gain = db_to_ratio(-NoiseSuppressionLevel::High.max_attenuation_db());
        let mut state = ChannelState::new();
        assert_eq!(state.target_gain(0.0, min_gain), min_gain);
        assert!(state.noise_energy.is_none());
        // A first frame is its own noise estimate, fully suppressed.
        assert_eq!(state.target_gain(0.01, min_gain), min_gain);
        assert_eq!(state.noise_energy, Some(0.01));
        // Far above the floor the gain approaches unity.
        assert!(state.target_gain(1.0, min_gain) > 0.95);
    }

    #[test]
    fn channels_are_processed_independently() {
        let mut ns = NoiseSuppressor::new(NoiseSuppressionLevel::Moderate, 2);
        let mut seed = 5;
        for _ in 0..30 {
            let mut channels = vec![noise_frame(&mut seed, 0.05, 160), vec![0.0f32; 160]];
            ns.process(&mut channels);
            assert!(channels[1].iter().all(|&s| s == 0.0));
        }
        assert!(ns.channels[0].noise_energy.is_some());
        assert!(ns.channels[1].noise_energy.is_none());
    }

    #[test]
    fn silence_stays_silent() {
        let mut ns = NoiseSuppressor::new(NoiseSuppressionLevel::High, 1);
        let mut channels = vec![vec![0.0f32; 160]];
        for _ in 0..10 {
            ns.process(&mut channels);
        }
        assert!(channels[0].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn stationary_noise_is_attenuated() {
        let mut ns = NoiseSuppressor::new(NoiseSuppressionLevel::High, 1);
        let mut seed = 1;
        let mut in_energy = 0.0;
        let mut out_energy = 0.0;
        for frame in 0..100 {
            let input = noise_frame(&mut seed, 0.05, 160);
            let mut channels = vec![input.clone()];
            ns.process(&mut channels);
            if frame >= 50 {
                in_energy += mean_square(&input);
                out_energy += mean_square(&channels[0]);
            }
        }
        assert!(
            out_energy < in_energy * 0.25,
            "expected >6 dB suppression: in {in_energy}, out {out_energy}"
        );
    }

    #[test]
    fn loud_signal_over_noise_is_preserved() {
        let mut ns = NoiseSuppressor::new(NoiseSuppressionLevel::Moderate, 1);
        let mut seed = 7;
        for _ in 0..50 {
            let mut channels = vec![noise_frame(&mut seed, 0.005, 160)];
            ns.process(&mut channels);
        }

        let mut in_energy = 0.0;
        let mut out_energy = 0.0;
        for frame in 0..20 {
            let noise = noise_frame(&mut seed, 0.005, 160);
            let input: Vec<f32> = noise
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let t = (frame * 160 + i) as f32 / 16_000.0;
                    n + 0.5 * (2.0 * PI * 440.0 * t).sin()
                })
                .collect();
            let mut channels = vec![input.clone()];
            ns.process(&mut channels);
            if frame >= 2 {
                in_energy += mean_square(&input);
                out_energy += mean_square(&channels[0]);
            }
        }
        assert!(
            out_energy > in_energy * 0.9,
            "tone should pass: in {in_energy}, out {out_energy}"
        );
    }

    #[test]
    fn higher_level_suppresses_more() {
        let run = |level| {
            let mut ns = NoiseSuppressor::new(level, 1);
            let mut seed = 3;
            let mut out_energy = 0.0;
            for frame in 0..100 {
                let mut channels = vec![noise_frame(&mut seed, 0.05, 160)];
                ns.process(&mut channels);
                if frame >= 50 {
                    out_energy += mean_square(&channels[0]);
                }
            }
            out_energy
        };
        assert!(run(NoiseSuppressionLevel::VeryHigh) < run(NoiseSuppressionLevel::Low));
    }

    #[test]
    fn reset_restores_unity_gain() {
        let mut ns = NoiseSuppressor::new(NoiseSuppressionLevel::Low, 2);
        let mut seed = 11;
        for _ in 0..20 {
            let mut channels = vec![
                noise_frame(&mut seed, 0.05, 160),
                noise_frame(&mut seed, 0.05, 160),
            ];
            ns.process(&mut channels);
        }
        ns.reset();
        assert!(ns.channels.iter().all(|c| c.gain == 1.0));
        assert!(ns.channels.iter().all(|c| c.noise_energy.is_none()));
    }
}
