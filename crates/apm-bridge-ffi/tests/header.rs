//! The checked-in C header matches what C callers of the wrapper expect.

use apm_bridge_ffi::WebRtcApmError;

const HEADER: &str = include_str!("../include/webrtc_apm.h");

/// Value of `name` after following the header's `#define` aliases and enum
/// entries.
fn constant_value(name: &str) -> Option<i32> {
    let mut name = name.to_owned();
    loop {
        let alias = HEADER.lines().find_map(|line| {
            let rest = line.trim().strip_prefix("#define ")?;
            let (key, value) = rest.split_once(char::is_whitespace)?;
            (key == name).then(|| value.trim().to_owned())
        });
        match alias {
            Some(target) => name = target,
            None => break,
        }
    }
    HEADER.lines().find_map(|line| {
        let (key, value) = line.trim().trim_end_matches(',').split_once(" = ")?;
        (key == name).then(|| value.parse().ok())?
    })
}

#[test]
fn status_codes_keep_their_wrapper_spellings() {
    let codes = [
        ("WEBRTC_APM_NO_ERROR", WebRtcApmError::NoError),
        ("WEBRTC_APM_UNSPECIFIED_ERROR", WebRtcApmError::UnspecifiedError),
        ("WEBRTC_APM_CREATION_FAILED_ERROR", WebRtcApmError::CreationFailedError),
        (
            "WEBRTC_APM_UNSUPPORTED_COMPONENT_ERROR",
            WebRtcApmError::UnsupportedComponentError,
        ),
        (
            "WEBRTC_APM_UNSUPPORTED_FUNCTION_ERROR",
            WebRtcApmError::UnsupportedFunctionError,
        ),
        ("WEBRTC_APM_NULL_POINTER_ERROR", WebRtcApmError::NullPointerError),
        ("WEBRTC_APM_BAD_PARAMETER_ERROR", WebRtcApmError::BadParameterError),
        ("WEBRTC_APM_BAD_SAMPLE_RATE_ERROR", WebRtcApmError::BadSampleRateError),
        ("WEBRTC_APM_BAD_DATA_LENGTH_ERROR", WebRtcApmError::BadDataLengthError),
        (
            "WEBRTC_APM_BAD_NUMBER_CHANNELS_ERROR",
            WebRtcApmError::BadNumberChannelsError,
        ),
        (
            "WEBRTC_APM_STREAM_PARAMETER_NOT_SET_ERROR",
            WebRtcApmError::StreamParameterNotSetError,
        ),
        ("WEBRTC_APM_NOT_ENABLED_ERROR", WebRtcApmError::NotEnabledError),
        (
            "WEBRTC_APM_BAD_STREAM_PARAMETER_WARNING",
            WebRtcApmError::BadStreamParameterWarning,
        ),
    ];
    for (name, code) in codes {
        assert_eq!(constant_value(name), Some(code as i32), "{name}");
    }
}

#[test]
fn process_prototypes_take_descriptors_before_buffers() {
    for name in [
        "webrtc_apm_process_stream_int16",
        "webrtc_apm_process_reverse_stream_int16",
        "webrtc_apm_process_stream_float32",
        "webrtc_apm_process_reverse_stream_float32",
    ] {
        let start = HEADER
            .find(&format!(" {name}("))
            .unwrap_or_else(|| panic!("{name} missing"));
        let prototype = &HEADER[start..];
        let prototype = &prototype[..prototype.find(';').unwrap()];
        let params: Vec<&str> = prototype
            .split(['(', ',', ')'])
            .skip(1)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let names: Vec<&str> = params
            .iter()
            .map(|p| p.rsplit(['*', ' ']).next().unwrap())
            .collect();
        assert_eq!(
            names,
            ["apm", "input_config", "output_config", "src", "dest"],
            "{name}"
        );
    }
}
