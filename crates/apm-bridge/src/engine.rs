//! The frame-processing contract between the facade and an engine.

use crate::{Config, Error, StreamConfig};

/// An audio processing engine.
///
/// This is the whole surface the C facade relies on: one-time setup,
/// configuration, the four frame-processing variants and the stream delay.
/// Every call is synchronous and processes exactly one 10 ms frame.
///
/// Forward ("stream") calls carry the capture signal and write processed
/// audio to `dest`. Reverse calls carry the playback reference used for
/// echo cancellation and must be made on the same cadence as forward calls.
///
/// **Not reentrant**: callers serialize all calls on one instance. Distinct
/// instances share nothing.
pub trait Engine: Send {
    /// Resets all processing state. The configuration is kept.
    fn initialize(&mut self) -> Result<(), Error>;

    /// Replaces the current configuration.
    fn apply_config(&mut self, config: &Config) -> Result<(), Error>;

    /// Processes a capture frame of interleaved int16 samples.
    fn process_stream_i16(
        &mut self,
        src: &[i16],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [i16],
    ) -> Result<(), Error>;

    /// Processes a playback reference frame of interleaved int16 samples.
    fn process_reverse_stream_i16(
        &mut self,
        src: &[i16],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [i16],
    ) -> Result<(), Error>;

    /// Processes a capture frame of deinterleaved float samples in `[-1, 1]`.
    fn process_stream_f32(
        &mut self,
        src: &[&[f32]],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [&mut [f32]],
    ) -> Result<(), Error>;

    /// Processes a playback reference frame of deinterleaved float samples.
    fn process_reverse_stream_f32(
        &mut self,
        src: &[&[f32]],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [&mut [f32]],
    ) -> Result<(), Error>;

    /// Sets the delay between a render frame leaving the speaker and its
    /// echo reaching the microphone.
    ///
    /// Typical values: 80-150 ms (PulseAudio), 30-60 ms (CoreAudio),
    /// 100-250 ms (Android), 40-80 ms (iOS).
    fn set_stream_delay_ms(&mut self, delay_ms: i32) -> Result<(), Error>;

    /// The stream delay currently in effect, in ms.
    fn stream_delay_ms(&self) -> i32;
}
