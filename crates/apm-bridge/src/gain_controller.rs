//! Automatic gain control, adaptive digital mode.
//!
//! Estimates the peak level of the capture signal and applies a digital
//! gain that moves it toward the target level. The gain never goes below
//! 0 dB nor above the configured compression gain, and changes by a bounded
//! step per frame. The optional limiter hard-clips samples at the target
//! level.

use crate::audio_util::{MIN_LEVEL_DBFS, db_to_ratio};
use crate::config::GainController1;

/// Frames quieter than this do not update the level estimate.
const NOISE_GATE_DBFS: f32 = -60.0;
/// Maximum gain increase per frame.
const MAX_GAIN_INCREASE_DB: f32 = 1.0;
/// Maximum gain decrease per frame.
const MAX_GAIN_DECREASE_DB: f32 = 3.0;
/// Decay of the peak level estimate per frame.
const LEVEL_DECAY_DB: f32 = 0.5;

#[derive(Debug)]
pub(crate) struct GainController {
    target_level_dbfs: f32,
    compression_gain_db: f32,
    limiter_level: Option<f32>,
    level_dbfs: Option<f32>,
    gain_db: f32,
}

impl GainController {
    pub(crate) fn new(config: &GainController1) -> Self {
        let target_level_dbfs = config.target_level_dbfs as f32;
        Self {
            target_level_dbfs,
            compression_gain_db: config.compression_gain_db as f32,
            limiter_level: config
                .enable_limiter
                .then(|| db_to_ratio(target_level_dbfs)),
            level_dbfs: None,
            gain_db: 0.0,
        }
    }

    /// Current applied gain in dB.
    #[cfg(test)]
    pub(crate) fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Applies gain (and the limiter) to every channel in place.
    pub(crate) fn process(&mut self, channels: &mut [Vec<f32>]) {
        let peak = channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        let frame_level = if peak > 0.0 {
            (20.0 * peak.log10()).max(MIN_LEVEL_DBFS)
        } else {
            MIN_LEVEL_DBFS
        };

        if frame_level > NOISE_GATE_DBFS {
            let level = match self.level_dbfs {
                Some(level) => frame_level.max(level - LEVEL_DECAY_DB),
                None => frame_level,
            };
            self.level_dbfs = Some(level);
        }

        let previous = db_to_ratio(self.gain_db);
        if let Some(level) = self.level_dbfs {
            let desired = (self.target_level_dbfs - level).clamp(0.0, self.compression_gain_db);
            let step = (desired - self.gain_db).clamp(-MAX_GAIN_DECREASE_DB, MAX_GAIN_INCREASE_DB);
            self.gain_db += step;
        }
        let gain = db_to_ratio(self.gain_db);

        for channel in channels.iter_mut() {
            let len = channel.len().max(1) as f32;
            for (i, sample) in channel.iter_mut().enumerate() {
                let t = (i + 1) as f32 / len;
                *sample *= previous + (gain - previous) * t;
                if let Some(limit) = self.limiter_level {
                    *sample = sample.clamp(-limit, limit);
                }
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.level_dbfs = None;
        self.gain_db = 0.0;
    }
}
