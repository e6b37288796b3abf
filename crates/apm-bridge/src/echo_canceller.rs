//! Acoustic echo cancellation.
//!
//! Time-domain NLMS adaptive filter per capture channel, fed with the mono
//! downmix of the render (reverse) stream. The render history is read at an
//! offset equal to the reported stream delay, so the filter tail only has
//! to cover the room response, not the device latency.
//!
//! Adaptation is frozen while a Geigel detector reports double talk. Mobile
//! mode trades a shorter tail for a fixed residual echo attenuation.

use tracing::debug;

use crate::audio_util::db_to_ratio;

/// Echo tail covered by the adaptive filter.
const TAIL_MS: usize = 64;
/// Echo tail in mobile mode.
const MOBILE_TAIL_MS: usize = 16;
/// Largest stream delay the render history can compensate.
pub(crate) const MAX_DELAY_MS: i32 = 500;
/// NLMS step size.
const STEP_SIZE: f32 = 0.5;
/// NLMS regularization, per tap.
const REGULARIZATION: f32 = 1e-6;
/// Render windows with less energy than this are treated as silent.
const SILENT_RENDER_ENERGY: f32 = 1e-8;
/// Double talk is declared when the capture peak exceeds this fraction of
/// the render peak.
const GEIGEL_THRESHOLD: f32 = 1.0;
/// Residual echo attenuation applied in mobile mode while echo is present.
const MOBILE_RESIDUAL_ATTENUATION_DB: f32 = -10.0;

#[derive(Debug)]
pub(crate) struct EchoCanceller {
    sample_rate_hz: i32,
    frame_len: usize,
    tail_len: usize,
    max_delay_samples: usize,
    delay_samples: usize,
    /// Most recent render samples, newest last. Always full.
    render_history: Vec<f32>,
    /// One filter per capture channel, taps stored oldest first so they
    /// line up with a slice of the render history. Re-created when the
    /// capture channel count changes.
    filters: Vec<Vec<f32>>,
    residual_gain: Option<f32>,
}

impl EchoCanceller {
    pub(crate) fn new(sample_rate_hz: i32, mobile_mode: bool) -> Self {
        let samples_per_ms = usize::try_from(sample_rate_hz / 1000).unwrap_or(0).max(1);
        let tail_ms = if mobile_mode { MOBILE_TAIL_MS } else { TAIL_MS };
        let tail_len = tail_ms * samples_per_ms;
        let frame_len = samples_per_ms * 10;
        let max_delay_samples = MAX_DELAY_MS as usize * samples_per_ms;
        debug!(sample_rate_hz, mobile_mode, tail_len, "echo canceller created");
        Self {
            sample_rate_hz,
            frame_len,
            tail_len,
            max_delay_samples,
            delay_samples: 0,
            render_history: vec![0.0; max_delay_samples + tail_len + frame_len],
            filters: Vec::new(),
            residual_gain: mobile_mode.then(|| db_to_ratio(MOBILE_RESIDUAL_ATTENUATION_DB)),
        }
    }

    pub(crate) fn sample_rate_hz(&self) -> i32 {
        self.sample_rate_hz
    }

    /// Sets the render-to-capture delay. `delay_ms` must already be clamped
    /// to `0..=MAX_DELAY_MS`.
    pub(crate) fn set_delay_ms(&mut self, delay_ms: i32) {
        let samples_per_ms = self.frame_len / 10;
        let delay = usize::try_from(delay_ms).unwrap_or(0) * samples_per_ms;
        self.delay_samples = delay.min(self.max_delay_samples);
    }

    /// Appends a mono render frame to the reference history.
    pub(crate) fn analyze_render(&mut self, render: &[f32]) {
        let render = &render[render.len().saturating_sub(self.frame_len)..];
        let n = render.len();
        self.render_history.copy_within(n.., 0);
        let start = self.render_history.len() - n;
        self.render_history[start..].copy_from_slice(render);
    }

    /// Removes the estimated echo from every capture channel in place.
    pub(crate) fn process_capture(&mut self, channels: &mut [Vec<f32>]) {
        if self.filters.len() != channels.len() {
            self.filters = vec![vec![0.0; self.tail_len]; channels.len()];
        }
        let Some(n) = channels.first().map(Vec::len) else {
            return;
        };
        let n = n.min(self.frame_len);
        let tail = self.tail_len;
        // Index of the render sample aligned with capture sample 0.
        let base = self.render_history.len() - n - self.delay_samples;
        let window = &self.render_history[base + 1 - tail..base + n];

        let render_energy: f32 = window.iter().map(|x| x * x).sum();
        if render_energy < SILENT_RENDER_ENERGY {
            return;
        }
        let render_peak = window.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
        let capture_peak = channels
            .iter()
            .flat_map(|channel| channel[..n].iter())
            .fold(0.0f32, |acc, y| acc.max(y.abs()));
        let double_talk = capture_peak > GEIGEL_THRESHOLD * render_peak;
        let regularization = REGULARIZATION * tail as f32;

        for (channel, filter) in channels.iter_mut().zip(&mut self.filters) {
            for (j, sample) in channel[..n].iter_mut().enumerate() {
                let x = &self.render_history[base + j + 1 - tail..base + j + 1];
                let echo: f32 = filter.iter().zip(x).map(|(w, x)| w * x).sum();
                let error = *sample - echo;
                if !double_talk {
                    let energy: f32 = x.iter().map(|x| x * x).sum();
                    let mu = STEP_SIZE * error / (energy + regularization);
                    for (w, x) in filter.iter_mut().zip(x) {
                        *w += mu * x;
                    }
                }
                *sample = error;
            }
            if let (Some(gain), false) = (self.residual_gain, double_talk) {
                for sample in channel[..n].iter_mut() {
                    *sample *= gain;
                }
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.render_history.fill(0.0);
        for filter in &mut self.filters {
            filter.fill(0.0);
        }
        self.delay_samples = 0;
    }
}
