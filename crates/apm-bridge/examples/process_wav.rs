//! Process a capture WAV file through apm-bridge.
//!
//! Reads a 16-bit capture recording (and optionally the far-end reference
//! that was playing while it was recorded), runs it through the engine in
//! 10 ms frames and writes the processed result.
//!
//! ```sh
//! RUST_LOG=apm_bridge=debug cargo run -p apm-bridge --features examples \
//!     --example process_wav -- mic.wav out.wav --reference speaker.wav --aec --ns high
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use clap::{Parser, ValueEnum};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

use apm_bridge::config::NoiseSuppressionLevel;
use apm_bridge::{AudioProcessing, Config, Engine, StreamConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NsLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl From<NsLevel> for NoiseSuppressionLevel {
    fn from(level: NsLevel) -> Self {
        match level {
            NsLevel::Low => Self::Low,
            NsLevel::Moderate => Self::Moderate,
            NsLevel::High => Self::High,
            NsLevel::VeryHigh => Self::VeryHigh,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Run a WAV recording through the apm-bridge pipeline")]
struct Args {
    /// Capture (microphone) recording, 16-bit PCM at 8, 16, 32 or 48 kHz.
    input: PathBuf,

    /// Where to write the processed recording.
    output: PathBuf,

    /// Far-end reference recording, same format as the input.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Enable echo cancellation (needs --reference to do anything useful).
    #[arg(long)]
    aec: bool,

    /// Use the mobile echo canceller.
    #[arg(long)]
    mobile: bool,

    /// Enable noise suppression at the given level.
    #[arg(long, value_enum)]
    ns: Option<NsLevel>,

    /// Enable the high-pass filter.
    #[arg(long)]
    hpf: bool,

    /// Enable automatic gain control.
    #[arg(long)]
    agc: bool,

    /// AGC target level in dBFS.
    #[arg(long, default_value_t = -3, allow_hyphen_values = true)]
    agc_target: i32,

    /// AGC maximum gain in dB.
    #[arg(long, default_value_t = 9)]
    agc_gain: i32,

    /// Render-to-capture delay in ms.
    #[arg(long, default_value_t = 0)]
    delay_ms: i32,
}

fn read_samples(path: &Path) -> Result<(WavSpec, Vec<i16>)> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!("{}: expected 16-bit PCM", path.display());
    }
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;
    Ok((spec, samples))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = Config::default();
    config.echo_canceller.enabled = args.aec;
    config.echo_canceller.mobile_mode = args.mobile;
    if let Some(level) = args.ns {
        config.noise_suppression.enabled = true;
        config.noise_suppression.level = level.into();
    }
    config.high_pass_filter.enabled = args.hpf;
    config.gain_controller1.enabled = args.agc;
    config.gain_controller1.target_level_dbfs = args.agc_target;
    config.gain_controller1.compression_gain_db = args.agc_gain;

    let mut apm = AudioProcessing::builder()
        .config(config)
        .build()
        .context("invalid configuration")?;
    apm.initialize()?;
    // A clamped delay is only a warning.
    if let Err(err) = apm.set_stream_delay_ms(args.delay_ms)
        && !err.is_warning()
    {
        return Err(err.into());
    }

    let (spec, capture) = read_samples(&args.input)?;
    let stream = StreamConfig::new(
        i32::try_from(spec.sample_rate).context("sample rate out of range")?,
        usize::from(spec.channels),
    );
    ensure!(
        stream.has_native_rate(),
        "unsupported sample rate {} Hz",
        spec.sample_rate
    );

    let reference = match &args.reference {
        Some(path) => {
            let (ref_spec, samples) = read_samples(path)?;
            ensure!(
                ref_spec.sample_rate == spec.sample_rate && ref_spec.channels == spec.channels,
                "reference format does not match the input"
            );
            Some(samples)
        }
        None => None,
    };

    let frame_len = stream.num_samples();
    let mut writer = WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = vec![0i16; frame_len];
    let mut ref_out = vec![0i16; frame_len];
    let mut frames = 0usize;

    // Trailing samples that do not fill a 10 ms frame are dropped.
    for (index, frame) in capture.chunks_exact(frame_len).enumerate() {
        if let Some(reference) = &reference {
            let start = index * frame_len;
            if let Some(ref_frame) = reference.get(start..start + frame_len) {
                apm.process_reverse_stream_i16(ref_frame, &stream, &stream, &mut ref_out)?;
            }
        }
        apm.process_stream_i16(frame, &stream, &stream, &mut out)?;
        for &s in &out {
            writer.write_sample(s)?;
        }
        frames += 1;
    }
    writer.finalize()?;

    info!(frames, output = %args.output.display(), "processing finished");
    println!("Processed {frames} frames into {}", args.output.display());
    Ok(())
}
