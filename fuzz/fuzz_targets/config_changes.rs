#![no_main]

use apm_bridge::config::{
    EchoCanceller, GainController1, HighPassFilter, NoiseSuppression, NoiseSuppressionLevel,
};
use apm_bridge::{AudioProcessing, Config, Engine, StreamConfig};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    configs: Vec<FuzzConfig>,
    /// Audio samples to process between config changes
    samples: Vec<i16>,
}

#[derive(Debug, Arbitrary)]
struct FuzzConfig {
    ec_enabled: bool,
    ec_mobile: bool,
    ns_enabled: bool,
    ns_level: u8,
    hpf_enabled: bool,
    agc_enabled: bool,
    agc_target_level_dbfs: i32,
    agc_compression_gain_db: i32,
    agc_limiter: bool,
    delay_ms: i32,
}

fn ns_level(idx: u8) -> NoiseSuppressionLevel {
    match idx % 4 {
        0 => NoiseSuppressionLevel::Low,
        1 => NoiseSuppressionLevel::Moderate,
        2 => NoiseSuppressionLevel::High,
        _ => NoiseSuppressionLevel::VeryHigh,
    }
}

fuzz_target!(|input: FuzzInput| {
    let stream = StreamConfig::new(16000, 1);
    let frames = stream.num_samples();

    if input.samples.len() < frames || input.configs.is_empty() {
        return;
    }

    let mut apm = AudioProcessing::new();
    let src = &input.samples[..frames];
    let mut dest = vec![0i16; frames];

    for cfg in &input.configs {
        let config = Config {
            echo_canceller: EchoCanceller {
                enabled: cfg.ec_enabled,
                mobile_mode: cfg.ec_mobile,
            },
            noise_suppression: NoiseSuppression {
                enabled: cfg.ns_enabled,
                level: ns_level(cfg.ns_level),
            },
            high_pass_filter: HighPassFilter {
                enabled: cfg.hpf_enabled,
            },
            gain_controller1: GainController1 {
                enabled: cfg.agc_enabled,
                target_level_dbfs: cfg.agc_target_level_dbfs,
                compression_gain_db: cfg.agc_compression_gain_db,
                enable_limiter: cfg.agc_limiter,
            },
        };
        let applied = apm.apply_config(&config);
        assert_eq!(applied.is_ok(), config.validate().is_ok());
        let _ = apm.set_stream_delay_ms(cfg.delay_ms);

        let _ = apm.process_reverse_stream_i16(src, &stream, &stream, &mut dest);
        let _ = apm.process_stream_i16(src, &stream, &stream, &mut dest);
    }
});
