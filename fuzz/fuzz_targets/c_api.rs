#![no_main]

use apm_bridge_ffi::*;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sample_rate_idx: u8,
    channels: u8,
    operations: Vec<FuzzOp>,
    samples: Vec<f32>,
}

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    ProcessF32,
    ProcessI16,
    ProcessReverseF32,
    ProcessReverseI16,
    ApplyConfig {
        ec: bool,
        ns: bool,
        ns_level: u8,
        hpf: bool,
        agc: bool,
        agc_target_level_dbfs: i32,
        agc_compression_gain_db: i32,
    },
    GetConfig,
    SetDelay(i32),
    Initialize,
}

fn sample_rate(idx: u8) -> i32 {
    match idx % 4 {
        0 => 8000,
        1 => 16000,
        2 => 32000,
        _ => 48000,
    }
}

fn ns_level(idx: u8) -> WebRtcNsLevel {
    match idx % 4 {
        0 => WebRtcNsLevel::Low,
        1 => WebRtcNsLevel::Moderate,
        2 => WebRtcNsLevel::High,
        _ => WebRtcNsLevel::VeryHigh,
    }
}

fuzz_target!(|input: FuzzInput| {
    let rate = sample_rate(input.sample_rate_idx);
    let channels = (input.channels % 2) as usize + 1;
    let stream = webrtc_apm_stream_config_create(rate, channels);
    if stream.is_null() {
        return;
    }
    let frames = webrtc_apm_stream_config_num_frames(stream);
    let total = frames * channels;

    if input.samples.len() < total {
        webrtc_apm_stream_config_destroy(stream);
        return;
    }

    let apm = webrtc_apm_create();
    if apm.is_null() {
        webrtc_apm_stream_config_destroy(stream);
        return;
    }

    // Prepare audio buffers sized by the descriptor
    let src_data: Vec<Vec<f32>> = input.samples[..total]
        .chunks_exact(frames)
        .map(|c| c.to_vec())
        .collect();
    let mut dest_data: Vec<Vec<f32>> = (0..channels).map(|_| vec![0.0f32; frames]).collect();
    let src_i16: Vec<i16> = input.samples[..total]
        .iter()
        .map(|&s| (s * 16384.0) as i16)
        .collect();
    let mut dest_i16 = vec![0i16; total];

    for op in &input.operations {
        let src_ptrs: Vec<*const f32> = src_data.iter().map(|c| c.as_ptr()).collect();
        let dest_ptrs: Vec<*mut f32> = dest_data.iter_mut().map(|c| c.as_mut_ptr()).collect();
        match op {
            FuzzOp::ProcessF32 => {
                let _ = webrtc_apm_process_stream_float32(
                    apm,
                    stream,
                    stream,
                    src_ptrs.as_ptr(),
                    dest_ptrs.as_ptr(),
                );
            }
            FuzzOp::ProcessI16 => {
                let _ = webrtc_apm_process_stream_int16(
                    apm,
                    stream,
                    stream,
                    src_i16.as_ptr(),
                    dest_i16.as_mut_ptr(),
                );
            }
            FuzzOp::ProcessReverseF32 => {
                let _ = webrtc_apm_process_reverse_stream_float32(
                    apm,
                    stream,
                    stream,
                    src_ptrs.as_ptr(),
                    dest_ptrs.as_ptr(),
                );
            }
            FuzzOp::ProcessReverseI16 => {
                let _ = webrtc_apm_process_reverse_stream_int16(
                    apm,
                    stream,
                    stream,
                    src_i16.as_ptr(),
                    dest_i16.as_mut_ptr(),
                );
            }
            FuzzOp::ApplyConfig {
                ec,
                ns,
                ns_level: level,
                hpf,
                agc,
                agc_target_level_dbfs,
                agc_compression_gain_db,
            } => {
                let mut config = webrtc_apm_config_default();
                config.enable_echo_cancellation = *ec;
                config.enable_noise_suppression = *ns;
                config.ns_level = ns_level(*level);
                config.enable_high_pass_filter = *hpf;
                config.enable_analog_gain_control = *agc;
                config.agc_target_level_dbfs = *agc_target_level_dbfs;
                config.agc_compression_gain_db = *agc_compression_gain_db;
                let _ = webrtc_apm_apply_config(apm, &config);
            }
            FuzzOp::GetConfig => {
                let mut config = webrtc_apm_config_default();
                let _ = webrtc_apm_get_config(apm, &mut config);
            }
            FuzzOp::SetDelay(delay) => {
                let _ = webrtc_apm_set_streamdelay_ms(apm, *delay);
                let _ = webrtc_apm_stream_delay_ms(apm);
            }
            FuzzOp::Initialize => {
                let _ = webrtc_apm_initialize(apm);
            }
        }
    }

    webrtc_apm_destroy(apm);
    webrtc_apm_stream_config_destroy(stream);
});
