//! Real-time audio processing engine.
//!
//! Provides noise suppression, acoustic echo cancellation, a high-pass
//! filter and automatic gain control on 10 ms frames, behind the
//! [`Engine`] contract that the C facade (`apm-bridge-ffi`) drives.
//!
//! # Quick Start
//!
//! ```
//! use apm_bridge::{AudioProcessing, Config, Engine, StreamConfig};
//! use apm_bridge::config::NoiseSuppressionLevel;
//!
//! let mut config = Config::default();
//! config.noise_suppression.enabled = true;
//! config.noise_suppression.level = NoiseSuppressionLevel::High;
//! config.high_pass_filter.enabled = true;
//!
//! let mut apm = AudioProcessing::builder().config(config).build().unwrap();
//! apm.initialize().unwrap();
//!
//! let stream = StreamConfig::new(16000, 1);
//! let src = vec![0i16; stream.num_samples()];
//! let mut dest = vec![0i16; stream.num_samples()];
//!
//! // For each 10 ms frame: feed the playback reference first, then the
//! // microphone signal.
//! apm.process_reverse_stream_i16(&src, &stream, &stream, &mut dest).unwrap();
//! apm.process_stream_i16(&src, &stream, &stream, &mut dest).unwrap();
//! ```

pub(crate) mod audio_processing;
pub(crate) mod audio_util;
pub mod config;
pub(crate) mod echo_canceller;
mod engine;
mod error;
pub(crate) mod gain_controller;
pub(crate) mod high_pass_filter;
pub(crate) mod noise_suppressor;
pub(crate) mod stream_config;

// Public re-exports.
pub use audio_processing::{AudioProcessing, AudioProcessingBuilder};
pub use config::Config;
pub use engine::Engine;
pub use error::Error;
pub use stream_config::{NATIVE_SAMPLE_RATES_HZ, StreamConfig};
