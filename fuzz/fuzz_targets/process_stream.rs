#![no_main]

use apm_bridge::config::{EchoCanceller, GainController1, HighPassFilter, NoiseSuppression};
use apm_bridge::{AudioProcessing, Config, Engine, StreamConfig};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Sample rate index: 0=8k, 1=16k, 2=32k, 3=48k
    sample_rate_idx: u8,
    /// Number of channels (clamped to 1-2)
    channels: u8,
    /// Downmix the capture output to mono
    mono_output: bool,
    /// Audio samples (will be clamped to frame size and [-1, 1])
    samples: Vec<f32>,
}

fn sample_rate(idx: u8) -> i32 {
    match idx % 4 {
        0 => 8000,
        1 => 16000,
        2 => 32000,
        _ => 48000,
    }
}

/// Clamp to valid audio range [-1, 1], replacing NaN/inf with 0.
fn sanitize_sample(s: f32) -> f32 {
    if s.is_finite() {
        s.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fuzz_target!(|input: FuzzInput| {
    let rate = sample_rate(input.sample_rate_idx);
    let channels = (input.channels % 2) as usize + 1;
    let stream = StreamConfig::new(rate, channels);
    let frames = stream.num_frames();

    if input.samples.len() < stream.num_samples() {
        return;
    }

    let config = Config {
        echo_canceller: EchoCanceller {
            enabled: true,
            ..Default::default()
        },
        noise_suppression: NoiseSuppression {
            enabled: true,
            ..Default::default()
        },
        high_pass_filter: HighPassFilter { enabled: true },
        gain_controller1: GainController1 {
            enabled: true,
            ..Default::default()
        },
    };
    let Ok(mut apm) = AudioProcessing::builder().config(config).build() else {
        return;
    };
    let output = if input.mono_output {
        StreamConfig::new(rate, 1)
    } else {
        stream
    };

    // Build per-channel slices from sanitized flat data
    let sanitized: Vec<f32> = input.samples.iter().copied().map(sanitize_sample).collect();
    let src_slices: Vec<&[f32]> = (0..channels)
        .map(|ch| &sanitized[ch * frames..(ch + 1) * frames])
        .collect();
    let mut render_data: Vec<Vec<f32>> = (0..channels).map(|_| vec![0.0f32; frames]).collect();
    let mut render_slices: Vec<&mut [f32]> =
        render_data.iter_mut().map(|v| v.as_mut_slice()).collect();
    let mut dest_data: Vec<Vec<f32>> = (0..output.num_channels())
        .map(|_| vec![0.0f32; frames])
        .collect();
    let mut dest_slices: Vec<&mut [f32]> =
        dest_data.iter_mut().map(|v| v.as_mut_slice()).collect();

    let _ = apm.process_reverse_stream_f32(&src_slices, &stream, &stream, &mut render_slices);
    let _ = apm.process_stream_f32(&src_slices, &stream, &output, &mut dest_slices);

    assert!(
        dest_data.iter().flatten().all(|s| s.is_finite()),
        "non-finite output"
    );
});
