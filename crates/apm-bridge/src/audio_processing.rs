//! Public audio processing API.
//!
//! Provides the built-in [`AudioProcessing`] engine and the
//! [`AudioProcessingBuilder`] used to construct configured instances.

use std::mem;

use derive_more::Debug;
use tracing::{debug, warn};

use crate::audio_util::{deinterleave_s16, downmix_to_mono, interleave_s16, s16_to_float};
use crate::config::Config;
use crate::echo_canceller::{EchoCanceller, MAX_DELAY_MS};
use crate::engine::Engine;
use crate::error::Error;
use crate::gain_controller::GainController;
use crate::high_pass_filter::HighPassFilter;
use crate::noise_suppressor::NoiseSuppressor;
use crate::stream_config::StreamConfig;

// ─── Format validation ──────────────────────────────────────────────

fn validate_stream_config(config: &StreamConfig) -> Result<(), Error> {
    if config.num_channels() == 0 {
        return Err(Error::BadNumberChannels);
    }
    if !config.has_native_rate() {
        return Err(Error::BadSampleRate);
    }
    Ok(())
}

fn validate_float_configs(
    input_config: &StreamConfig,
    output_config: &StreamConfig,
) -> Result<(), Error> {
    validate_stream_config(input_config)?;
    validate_stream_config(output_config)?;
    // No resampling.
    if input_config.sample_rate_hz() != output_config.sample_rate_hz() {
        return Err(Error::BadSampleRate);
    }
    // Output must have 1 channel or the same number as input.
    let out_ch = output_config.num_channels();
    if out_ch != 1 && out_ch != input_config.num_channels() {
        return Err(Error::BadNumberChannels);
    }
    Ok(())
}

fn validate_i16_configs(
    input_config: &StreamConfig,
    output_config: &StreamConfig,
) -> Result<(), Error> {
    validate_float_configs(input_config, output_config)?;
    if input_config.num_channels() != output_config.num_channels() {
        return Err(Error::BadNumberChannels);
    }
    Ok(())
}

fn validate_i16_lengths(
    src: &[i16],
    input_config: &StreamConfig,
    output_config: &StreamConfig,
    dest: &[i16],
) -> Result<(), Error> {
    if src.len() != input_config.num_samples() || dest.len() != output_config.num_samples() {
        return Err(Error::BadDataLength);
    }
    Ok(())
}

fn validate_f32_lengths(
    src: &[&[f32]],
    input_config: &StreamConfig,
    output_config: &StreamConfig,
    dest: &[&mut [f32]],
) -> Result<(), Error> {
    let in_frames = input_config.num_frames();
    let out_frames = output_config.num_frames();
    if src.len() != input_config.num_channels()
        || dest.len() != output_config.num_channels()
        || src.iter().any(|channel| channel.len() != in_frames)
        || dest.iter().any(|channel| channel.len() != out_frames)
    {
        return Err(Error::BadDataLength);
    }
    Ok(())
}

/// Copies `src` to `dest`, averaging to mono when `dest` has one channel
/// and `src` more.
fn copy_or_downmix<C: AsRef<[f32]>>(src: &[C], dest: &mut [&mut [f32]]) {
    if src.len() == dest.len() {
        for (d, s) in dest.iter_mut().zip(src) {
            d.copy_from_slice(s.as_ref());
        }
    } else if let Some(mono) = dest.first_mut() {
        downmix_to_mono(src, mono);
    }
}

fn new_echo_canceller(config: &Config, sample_rate_hz: i32, delay_ms: i32) -> EchoCanceller {
    let mut aec = EchoCanceller::new(sample_rate_hz, config.echo_canceller.mobile_mode);
    aec.set_delay_ms(delay_ms);
    aec
}

// ─── Capture state ──────────────────────────────────────────────────

/// Capture-side stages, built for one stream format.
#[derive(Debug)]
struct CaptureState {
    sample_rate_hz: i32,
    num_channels: usize,
    high_pass_filter: Option<HighPassFilter>,
    noise_suppressor: Option<NoiseSuppressor>,
    gain_controller: Option<GainController>,
    #[debug(skip)]
    channels: Vec<Vec<f32>>,
}

impl CaptureState {
    fn new(config: &Config, sample_rate_hz: i32, num_channels: usize) -> Self {
        let frames = usize::try_from(sample_rate_hz / 100).unwrap_or(0);
        let mut state = Self {
            sample_rate_hz,
            num_channels,
            high_pass_filter: None,
            noise_suppressor: None,
            gain_controller: None,
            channels: vec![vec![0.0; frames]; num_channels],
        };
        state.build_high_pass_filter(config);
        state.build_noise_suppressor(config);
        state.build_gain_controller(config);
        state
    }

    fn matches(&self, config: &StreamConfig) -> bool {
        self.sample_rate_hz == config.sample_rate_hz() && self.num_channels == config.num_channels()
    }

    fn build_high_pass_filter(&mut self, config: &Config) {
        self.high_pass_filter = config
            .high_pass_filter
            .enabled
            .then(|| HighPassFilter::new(self.sample_rate_hz, self.num_channels));
    }

    fn build_noise_suppressor(&mut self, config: &Config) {
        let ns = &config.noise_suppression;
        self.noise_suppressor = ns
            .enabled
            .then(|| NoiseSuppressor::new(ns.level, self.num_channels));
    }

    fn build_gain_controller(&mut self, config: &Config) {
        let agc = &config.gain_controller1;
        self.gain_controller = agc.enabled.then(|| GainController::new(agc));
    }

    /// Re-creates only the stages whose configuration changed.
    fn update(&mut self, previous: &Config, config: &Config) {
        if previous.high_pass_filter != config.high_pass_filter {
            self.build_high_pass_filter(config);
        }
        if previous.noise_suppression != config.noise_suppression {
            self.build_noise_suppressor(config);
        }
        if previous.gain_controller1 != config.gain_controller1 {
            self.build_gain_controller(config);
        }
    }

    /// Clears the state of every built stage.
    fn reset(&mut self) {
        if let Some(hpf) = &mut self.high_pass_filter {
            hpf.reset();
        }
        if let Some(ns) = &mut self.noise_suppressor {
            ns.reset();
        }
        if let Some(agc) = &mut self.gain_controller {
            agc.reset();
        }
    }
}

// ─── AudioProcessingBuilder ─────────────────────────────────────────

/// Builder for constructing an [`AudioProcessing`] instance.
///
/// # Example
/// ```
/// use apm_bridge::{AudioProcessing, Config};
///
/// let mut config = Config::default();
/// config.echo_canceller.enabled = true;
/// config.noise_suppression.enabled = true;
///
/// let apm = AudioProcessing::builder()
///     .config(config)
///     .build()
///     .expect("valid config");
/// ```
#[derive(Debug, Default)]
pub struct AudioProcessingBuilder {
    config: Config,
}

impl AudioProcessingBuilder {
    /// Set the initial configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the [`AudioProcessing`] instance.
    ///
    /// Fails with [`Error::BadParameter`] if the configuration is out of
    /// range.
    pub fn build(self) -> Result<AudioProcessing, Error> {
        self.config.validate()?;
        Ok(AudioProcessing::with_config(self.config))
    }
}

// ─── AudioProcessing ────────────────────────────────────────────────

/// Built-in audio processing engine: high-pass filter, echo cancellation,
/// noise suppression and automatic gain control.
///
/// Processing state is created lazily for the stream format of the first
/// capture frame and rebuilt whenever the format changes.
#[derive(Debug)]
pub struct AudioProcessing {
    config: Config,
    stream_delay_ms: i32,
    capture: Option<CaptureState>,
    echo_canceller: Option<EchoCanceller>,
    #[debug(skip)]
    render_mono: Vec<f32>,
}

impl AudioProcessing {
    /// Creates a new instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Returns a builder for constructing an instance with custom configuration.
    pub fn builder() -> AudioProcessingBuilder {
        AudioProcessingBuilder::default()
    }

    fn with_config(config: Config) -> Self {
        debug!(?config, "audio processing created");
        Self {
            config,
            stream_delay_ms: 0,
            capture: None,
            echo_canceller: None,
            render_mono: Vec::new(),
        }
    }

    /// Returns the last applied configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Makes sure the echo canceller, if enabled, runs at the capture rate.
    fn prepare_echo_canceller(&mut self, sample_rate_hz: i32) {
        if !self.config.echo_canceller.enabled {
            return;
        }
        if let Some(aec) = &self.echo_canceller
            && aec.sample_rate_hz() != sample_rate_hz
        {
            debug!(
                from = aec.sample_rate_hz(),
                to = sample_rate_hz,
                "capture rate changed, resetting echo canceller"
            );
            self.echo_canceller = None;
        }
        if self.echo_canceller.is_none() {
            self.echo_canceller = Some(new_echo_canceller(
                &self.config,
                sample_rate_hz,
                self.stream_delay_ms,
            ));
        }
    }

    /// Runs the capture pipeline. `load` fills the per-channel float
    /// buffers, `store` reads the processed result.
    fn process_capture(
        &mut self,
        input_config: &StreamConfig,
        load: impl FnOnce(&mut [Vec<f32>]),
        store: impl FnOnce(&[Vec<f32>]),
    ) {
        self.prepare_echo_canceller(input_config.sample_rate_hz());

        if self.capture.as_ref().is_some_and(|c| !c.matches(input_config)) {
            debug!(
                sample_rate_hz = input_config.sample_rate_hz(),
                num_channels = input_config.num_channels(),
                "capture format changed, rebuilding stages"
            );
            self.capture = None;
        }
        let config = &self.config;
        let capture = self.capture.get_or_insert_with(|| {
            CaptureState::new(
                config,
                input_config.sample_rate_hz(),
                input_config.num_channels(),
            )
        });

        load(&mut capture.channels);
        if let Some(hpf) = &mut capture.high_pass_filter {
            hpf.process(&mut capture.channels);
        }
        if let Some(aec) = &mut self.echo_canceller {
            aec.process_capture(&mut capture.channels);
        }
        if let Some(ns) = &mut capture.noise_suppressor {
            ns.process(&mut capture.channels);
        }
        if let Some(agc) = &mut capture.gain_controller {
            agc.process(&mut capture.channels);
        }
        store(&capture.channels);
    }

    /// Feeds `self.render_mono` to the echo canceller.
    fn analyze_render(&mut self, sample_rate_hz: i32) {
        if !self.config.echo_canceller.enabled {
            return;
        }
        let config = &self.config;
        let delay_ms = self.stream_delay_ms;
        let aec = self
            .echo_canceller
            .get_or_insert_with(|| new_echo_canceller(config, sample_rate_hz, delay_ms));
        if aec.sample_rate_hz() != sample_rate_hz {
            debug!(
                render_rate = sample_rate_hz,
                capture_rate = aec.sample_rate_hz(),
                "render rate differs from capture rate, reference dropped"
            );
            return;
        }
        aec.analyze_render(&self.render_mono);
    }
}

impl Default for AudioProcessing {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for AudioProcessing {
    fn initialize(&mut self) -> Result<(), Error> {
        if let Some(capture) = &mut self.capture {
            capture.reset();
        }
        if let Some(aec) = &mut self.echo_canceller {
            aec.reset();
        }
        self.stream_delay_ms = 0;
        debug!("audio processing initialized");
        Ok(())
    }

    fn apply_config(&mut self, config: &Config) -> Result<(), Error> {
        if let Err(err) = config.validate() {
            warn!(?config, "rejected out-of-range configuration");
            return Err(err);
        }
        if *config == self.config {
            return Ok(());
        }
        let previous = mem::replace(&mut self.config, config.clone());
        if let Some(capture) = &mut self.capture {
            capture.update(&previous, &self.config);
        }
        if previous.echo_canceller != self.config.echo_canceller {
            self.echo_canceller = None;
        }
        debug!(config = ?self.config, "configuration applied");
        Ok(())
    }

    fn process_stream_i16(
        &mut self,
        src: &[i16],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [i16],
    ) -> Result<(), Error> {
        validate_i16_configs(input_config, output_config)?;
        validate_i16_lengths(src, input_config, output_config, dest)?;
        if !self.config.any_capture_stage_enabled() {
            dest.copy_from_slice(src);
            return Ok(());
        }
        self.process_capture(
            input_config,
            |channels| deinterleave_s16(src, channels),
            |channels| interleave_s16(channels, dest),
        );
        Ok(())
    }

    fn process_reverse_stream_i16(
        &mut self,
        src: &[i16],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [i16],
    ) -> Result<(), Error> {
        validate_i16_configs(input_config, output_config)?;
        validate_i16_lengths(src, input_config, output_config, dest)?;
        dest.copy_from_slice(src);
        if self.config.echo_canceller.enabled {
            let num_channels = input_config.num_channels();
            let scale = 1.0 / num_channels as f32;
            self.render_mono.clear();
            self.render_mono.extend(
                src.chunks_exact(num_channels)
                    .map(|frame| frame.iter().map(|&s| s16_to_float(s)).sum::<f32>() * scale),
            );
            self.analyze_render(input_config.sample_rate_hz());
        }
        Ok(())
    }

    fn process_stream_f32(
        &mut self,
        src: &[&[f32]],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [&mut [f32]],
    ) -> Result<(), Error> {
        validate_float_configs(input_config, output_config)?;
        validate_f32_lengths(src, input_config, output_config, dest)?;
        if !self.config.any_capture_stage_enabled() {
            copy_or_downmix(src, dest);
            return Ok(());
        }
        self.process_capture(
            input_config,
            |channels| {
                for (buffer, s) in channels.iter_mut().zip(src) {
                    buffer.copy_from_slice(s);
                }
            },
            |channels| copy_or_downmix(channels, dest),
        );
        Ok(())
    }

    fn process_reverse_stream_f32(
        &mut self,
        src: &[&[f32]],
        input_config: &StreamConfig,
        output_config: &StreamConfig,
        dest: &mut [&mut [f32]],
    ) -> Result<(), Error> {
        validate_float_configs(input_config, output_config)?;
        validate_f32_lengths(src, input_config, output_config, dest)?;
        copy_or_downmix(src, dest);
        if self.config.echo_canceller.enabled {
            self.render_mono.resize(input_config.num_frames(), 0.0);
            downmix_to_mono(src, &mut self.render_mono);
            self.analyze_render(input_config.sample_rate_hz());
        }
        Ok(())
    }

    /// Clamps the delay to `[0, 500]` ms. Returns
    /// `Err(BadStreamParameter)` if clamping was necessary (processing still
    /// proceeds with the clamped value).
    fn set_stream_delay_ms(&mut self, delay_ms: i32) -> Result<(), Error> {
        let clamped = delay_ms.clamp(0, MAX_DELAY_MS);
        self.stream_delay_ms = clamped;
        if let Some(aec) = &mut self.echo_canceller {
            aec.set_delay_ms(clamped);
        }
        if clamped != delay_ms {
            warn!(delay_ms, clamped, "stream delay out of range, clamped");
            return Err(Error::BadStreamParameter);
        }
        Ok(())
    }

    fn stream_delay_ms(&self) -> i32 {
        self.stream_delay_ms
    }
}
