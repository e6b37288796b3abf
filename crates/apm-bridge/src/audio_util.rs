//! Sample conversion and level helpers shared by the processing stages.

/// Converts an int16 sample to a float in `[-1, 1)`.
#[inline]
pub(crate) fn s16_to_float(v: i16) -> f32 {
    f32::from(v) / 32768.0
}

/// Converts a float sample to int16, rounding to nearest and saturating.
#[inline]
pub(crate) fn float_to_s16(v: f32) -> i16 {
    let scaled = v * 32768.0;
    if scaled >= 32767.0 {
        i16::MAX
    } else if scaled <= -32768.0 {
        i16::MIN
    } else {
        scaled.round() as i16
    }
}

/// Converts a dB value to a linear ratio: `10^(v/20)`.
#[inline]
pub(crate) fn db_to_ratio(v: f32) -> f32 {
    10.0_f32.powf(v / 20.0)
}

/// Floor for levels in dBFS, the level of one LSB at 16 bits.
pub(crate) const MIN_LEVEL_DBFS: f32 = -90.309;

/// Mean of the squared samples, `0.0` for an empty slice.
pub(crate) fn mean_square(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32
}

/// Splits an interleaved int16 buffer into per-channel float buffers.
pub(crate) fn deinterleave_s16(src: &[i16], dst: &mut [Vec<f32>]) {
    let num_channels = dst.len();
    for (ch, channel) in dst.iter_mut().enumerate() {
        for (frame, sample) in channel.iter_mut().enumerate() {
            *sample = s16_to_float(src[frame * num_channels + ch]);
        }
    }
}

/// Writes per-channel float buffers to an interleaved int16 buffer.
pub(crate) fn interleave_s16(src: &[Vec<f32>], dst: &mut [i16]) {
    let num_channels = src.len();
    for (ch, channel) in src.iter().enumerate() {
        for (frame, &sample) in channel.iter().enumerate() {
            dst[frame * num_channels + ch] = float_to_s16(sample);
        }
    }
}

/// Averages all channels into `dst`.
pub(crate) fn downmix_to_mono<C: AsRef<[f32]>>(src: &[C], dst: &mut [f32]) {
    dst.fill(0.0);
    if src.is_empty() {
        return;
    }
    for channel in src {
        for (d, &s) in dst.iter_mut().zip(channel.as_ref()) {
            *d += s;
        }
    }
    let scale = 1.0 / src.len() as f32;
    for d in dst.iter_mut() {
        *d *= scale;
    }
}
