//! Behavior of the C API as seen by a C caller.

use std::f32::consts::PI;
use std::ptr;

use apm_bridge_ffi::*;
use proptest::prop_assert_eq;
use test_strategy::proptest;

/// Every pointer argument of a processing call.
const POINTER_ARGS: u32 = 5;

/// `webrtc_apm_process_*_int16` as declared in `webrtc_apm.h`.
type ProcessInt16 = unsafe extern "C" fn(
    *mut WebRtcAudioProcessing,
    *const WebRtcStreamConfig,
    *const WebRtcStreamConfig,
    *const i16,
    *mut i16,
) -> WebRtcApmError;

/// `webrtc_apm_process_*_float32` as declared in `webrtc_apm.h`.
type ProcessFloat32 = unsafe extern "C" fn(
    *mut WebRtcAudioProcessing,
    *const WebRtcStreamConfig,
    *const WebRtcStreamConfig,
    *const *const f32,
    *const *mut f32,
) -> WebRtcApmError;

fn sine_i16(frame: usize, len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = (frame * len + i) as f32 / 16_000.0;
            ((2.0 * PI * 440.0 * t).sin() * 8_000.0) as i16
        })
        .collect()
}

#[proptest]
fn stream_descriptor_reports_its_values(
    #[strategy(-1_000i32..200_000)] sample_rate_hz: i32,
    #[strategy(0usize..16)] num_channels: usize,
) {
    let config = webrtc_apm_stream_config_create(sample_rate_hz, num_channels);
    prop_assert_eq!(webrtc_apm_stream_config_sample_rate_hz(config), sample_rate_hz);
    prop_assert_eq!(webrtc_apm_stream_config_num_channels(config), num_channels);
    webrtc_apm_stream_config_destroy(config);
}

#[test]
fn create_destroy_without_initialize() {
    for _ in 0..4 {
        let apm = webrtc_apm_create();
        assert!(!apm.is_null());
        webrtc_apm_destroy(apm);
    }
}

#[test]
fn apply_before_initialize_succeeds() {
    let apm = webrtc_apm_create();
    let mut config = webrtc_apm_config_default();
    config.enable_noise_suppression = true;
    assert_eq!(webrtc_apm_apply_config(apm, &config), WebRtcApmError::NoError);
    assert_eq!(webrtc_apm_initialize(apm), WebRtcApmError::NoError);
    webrtc_apm_destroy(apm);
}

#[test]
fn initialize_twice_succeeds() {
    let apm = webrtc_apm_create();
    assert_eq!(webrtc_apm_initialize(apm), WebRtcApmError::NoError);
    assert_eq!(webrtc_apm_initialize(apm), WebRtcApmError::NoError);
    webrtc_apm_destroy(apm);
}

#[test]
fn any_null_argument_is_rejected() {
    let apm = webrtc_apm_create();
    let stream = webrtc_apm_stream_config_create(16_000, 1);
    let src = [0i16; 160];
    let mut dest = [0i16; 160];
    let src_f = [0.0f32; 160];
    let mut dest_f = [0.0f32; 160];
    let src_channels = [src_f.as_ptr()];
    let dest_channels = [dest_f.as_mut_ptr()];

    // Bit i set keeps argument i non-null; the all-set mask is skipped.
    for mask in 0..(1u32 << POINTER_ARGS) - 1 {
        let keep = |bit: u32| mask & (1 << bit) != 0;
        let handle = if keep(0) { apm } else { ptr::null_mut() };
        let input = if keep(2) { stream.cast_const() } else { ptr::null() };
        let output = if keep(3) { stream.cast_const() } else { ptr::null() };

        let src_i16 = if keep(1) { src.as_ptr() } else { ptr::null() };
        let dest_i16 = if keep(4) { dest.as_mut_ptr() } else { ptr::null_mut() };
        let src_f32 = if keep(1) { src_channels.as_ptr() } else { ptr::null() };
        let dest_f32 = if keep(4) { dest_channels.as_ptr() } else { ptr::null() };

        let statuses = [
            webrtc_apm_process_stream_int16(handle, input, output, src_i16, dest_i16),
            webrtc_apm_process_reverse_stream_int16(handle, input, output, src_i16, dest_i16),
            webrtc_apm_process_stream_float32(handle, input, output, src_f32, dest_f32),
            webrtc_apm_process_reverse_stream_float32(handle, input, output, src_f32, dest_f32),
        ];
        for status in statuses {
            assert_eq!(status, WebRtcApmError::NullPointerError, "mask {mask:05b}");
        }
    }

    webrtc_apm_stream_config_destroy(stream);
    webrtc_apm_destroy(apm);
}

#[test]
fn reapplying_the_same_config_changes_nothing() {
    let mut config = webrtc_apm_config_default();
    config.enable_noise_suppression = true;
    config.ns_level = WebRtcNsLevel::High;
    config.enable_high_pass_filter = true;
    config.enable_analog_gain_control = true;

    let once = webrtc_apm_create();
    let twice = webrtc_apm_create();
    assert_eq!(webrtc_apm_apply_config(once, &config), WebRtcApmError::NoError);
    assert_eq!(webrtc_apm_apply_config(twice, &config), WebRtcApmError::NoError);

    let stream = webrtc_apm_stream_config_create(16_000, 1);
    for frame in 0..20 {
        // Re-apply mid-stream on one instance only.
        if frame == 10 {
            assert_eq!(webrtc_apm_apply_config(twice, &config), WebRtcApmError::NoError);
        }
        let src = sine_i16(frame, 160);
        let mut out_once = [0i16; 160];
        let mut out_twice = [0i16; 160];
        assert_eq!(
            webrtc_apm_process_stream_int16(
                once,
                stream,
                stream,
                src.as_ptr(),
                out_once.as_mut_ptr()
            ),
            WebRtcApmError::NoError
        );
        assert_eq!(
            webrtc_apm_process_stream_int16(
                twice,
                stream,
                stream,
                src.as_ptr(),
                out_twice.as_mut_ptr()
            ),
            WebRtcApmError::NoError
        );
        assert_eq!(out_once, out_twice, "frame {frame}");
    }

    webrtc_apm_stream_config_destroy(stream);
    webrtc_apm_destroy(once);
    webrtc_apm_destroy(twice);
}

#[test]
fn set_delay_on_null_handle_is_rejected() {
    assert_eq!(
        webrtc_apm_set_streamdelay_ms(ptr::null_mut(), 10),
        WebRtcApmError::NullPointerError
    );
    assert_eq!(webrtc_apm_stream_delay_ms(ptr::null()), 0);
}

#[test]
fn disabled_pipeline_passes_frames_through() {
    let apm = webrtc_apm_create();
    let config = webrtc_apm_config_default();
    assert_eq!(webrtc_apm_apply_config(apm, &config), WebRtcApmError::NoError);

    let stream = webrtc_apm_stream_config_create(16_000, 1);
    let src = sine_i16(0, 160);
    let mut dest = [0i16; 160];
    assert_eq!(
        webrtc_apm_process_stream_int16(apm, stream, stream, src.as_ptr(), dest.as_mut_ptr()),
        WebRtcApmError::NoError
    );
    assert_eq!(dest.as_slice(), src.as_slice());

    webrtc_apm_stream_config_destroy(stream);
    webrtc_apm_destroy(apm);
}

#[test]
fn full_pipeline_keeps_silence_silent() {
    let apm = webrtc_apm_create();
    assert!(!apm.is_null());
    assert_eq!(webrtc_apm_initialize(apm), WebRtcApmError::NoError);

    let mut config = webrtc_apm_config_default();
    config.enable_noise_suppression = true;
    config.ns_level = WebRtcNsLevel::High;
    config.enable_echo_cancellation = true;
    config.enable_high_pass_filter = true;
    config.enable_analog_gain_control = true;
    config.agc_target_level_dbfs = -3;
    config.agc_compression_gain_db = 9;
    config.agc_enable_limiter = true;
    assert_eq!(webrtc_apm_apply_config(apm, &config), WebRtcApmError::NoError);

    let stream = webrtc_apm_stream_config_create(48_000, 1);
    let num_samples = webrtc_apm_stream_config_num_frames(stream)
        * webrtc_apm_stream_config_num_channels(stream);
    assert_eq!(num_samples, 480);

    let render = vec![0i16; num_samples];
    let mut render_out = vec![0i16; num_samples];
    let capture = vec![0i16; num_samples];
    let mut capture_out = vec![1i16; num_samples];
    for _ in 0..10 {
        assert_eq!(
            webrtc_apm_process_reverse_stream_int16(
                apm,
                stream,
                stream,
                render.as_ptr(),
                render_out.as_mut_ptr()
            ),
            WebRtcApmError::NoError
        );
        assert_eq!(
            webrtc_apm_process_stream_int16(
                apm,
                stream,
                stream,
                capture.as_ptr(),
                capture_out.as_mut_ptr()
            ),
            WebRtcApmError::NoError
        );
        assert_eq!(capture_out.len(), num_samples);
        assert!(capture_out.iter().all(|&s| s == 0));
    }

    webrtc_apm_stream_config_destroy(stream);
    webrtc_apm_destroy(apm);
}

#[test]
fn float_pipeline_processes_stereo() {
    let apm = webrtc_apm_create();
    let mut config = webrtc_apm_config_default();
    config.enable_high_pass_filter = true;
    assert_eq!(webrtc_apm_apply_config(apm, &config), WebRtcApmError::NoError);

    let stereo = webrtc_apm_stream_config_create(32_000, 2);
    let mono = webrtc_apm_stream_config_create(32_000, 1);
    let left = [0.25f32; 320];
    let right = [-0.25f32; 320];
    let src = [left.as_ptr(), right.as_ptr()];

    let mut out_left = [0.0f32; 320];
    let mut out_right = [0.0f32; 320];
    let dest = [out_left.as_mut_ptr(), out_right.as_mut_ptr()];
    assert_eq!(
        webrtc_apm_process_stream_float32(apm, stereo, stereo, src.as_ptr(), dest.as_ptr()),
        WebRtcApmError::NoError
    );

    let mut downmix = [1.0f32; 320];
    let dest = [downmix.as_mut_ptr()];
    assert_eq!(
        webrtc_apm_process_stream_float32(apm, stereo, mono, src.as_ptr(), dest.as_ptr()),
        WebRtcApmError::NoError
    );
    assert!(downmix.iter().all(|s| s.abs() < 1e-6));

    webrtc_apm_stream_config_destroy(stereo);
    webrtc_apm_stream_config_destroy(mono);
    webrtc_apm_destroy(apm);
}

#[test]
fn unsupported_formats_are_reported() {
    let apm = webrtc_apm_create();
    let odd_rate = webrtc_apm_stream_config_create(22_050, 1);
    let no_channels = webrtc_apm_stream_config_create(16_000, 0);
    let src = [0i16; 441];
    let mut dest = [0i16; 441];
    assert_eq!(
        webrtc_apm_process_stream_int16(
            apm,
            odd_rate,
            odd_rate,
            src.as_ptr(),
            dest.as_mut_ptr()
        ),
        WebRtcApmError::BadSampleRateError
    );
    assert_eq!(
        webrtc_apm_process_stream_int16(
            apm,
            no_channels,
            no_channels,
            src.as_ptr(),
            dest.as_mut_ptr()
        ),
        WebRtcApmError::BadNumberChannelsError
    );
    webrtc_apm_stream_config_destroy(odd_rate);
    webrtc_apm_stream_config_destroy(no_channels);
    webrtc_apm_destroy(apm);
}

#[test]
fn out_of_range_gain_is_rejected() {
    let apm = webrtc_apm_create();
    let mut config = webrtc_apm_config_default();
    config.enable_analog_gain_control = true;
    config.agc_target_level_dbfs = 5;
    assert_eq!(
        webrtc_apm_apply_config(apm, &config),
        WebRtcApmError::BadParameterError
    );
    webrtc_apm_destroy(apm);
}

#[test]
fn process_calls_follow_the_c_prototype() {
    let forward_i16: ProcessInt16 = webrtc_apm_process_stream_int16;
    let reverse_i16: ProcessInt16 = webrtc_apm_process_reverse_stream_int16;
    let forward_f32: ProcessFloat32 = webrtc_apm_process_stream_float32;
    let reverse_f32: ProcessFloat32 = webrtc_apm_process_reverse_stream_float32;

    let apm = webrtc_apm_create();
    let mut config = webrtc_apm_config_default();
    config.enable_noise_suppression = true;
    config.ns_level = WebRtcNsLevel::High;
    config.enable_echo_cancellation = true;
    config.enable_high_pass_filter = true;
    config.enable_analog_gain_control = true;
    assert_eq!(webrtc_apm_apply_config(apm, &config), WebRtcApmError::NoError);

    let stream = webrtc_apm_stream_config_create(48_000, 1);
    let silence = [0i16; 480];
    let mut out = [1i16; 480];
    let silence_f = [0.0f32; 480];
    let mut out_f = [1.0f32; 480];
    let src_channels = [silence_f.as_ptr()];
    let dest_channels = [out_f.as_mut_ptr()];

    // Safety: every pointer is valid and buffers match the descriptor.
    unsafe {
        assert_eq!(
            reverse_i16(apm, stream, stream, silence.as_ptr(), out.as_mut_ptr()),
            WebRtcApmError::NoError
        );
        assert_eq!(
            forward_i16(apm, stream, stream, silence.as_ptr(), out.as_mut_ptr()),
            WebRtcApmError::NoError
        );
        assert_eq!(
            reverse_f32(apm, stream, stream, src_channels.as_ptr(), dest_channels.as_ptr()),
            WebRtcApmError::NoError
        );
        assert_eq!(
            forward_f32(apm, stream, stream, src_channels.as_ptr(), dest_channels.as_ptr()),
            WebRtcApmError::NoError
        );
    }
    assert!(out.iter().all(|&s| s == 0));
    assert!(out_f.iter().all(|&s| s == 0.0));

    webrtc_apm_stream_config_destroy(stream);
    webrtc_apm_destroy(apm);
}
