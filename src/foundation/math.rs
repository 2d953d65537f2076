/// Linear interpolation between two channel values, rounded to the nearest integer.
pub(crate) fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) * (1.0 - t) + f64::from(b) * t;
    v.round().clamp(0.0, 255.0) as u8
}

/// `round(len * factor)` clamped into `[0, len]`; rounding is half away from zero.
pub(crate) fn scale_len(len: u32, factor: f64) -> u32 {
    let v = (f64::from(len) * factor).round();
    v.clamp(0.0, f64::from(len)) as u32
}

/// Fraction `i / n` of a transition run. `n` must be non-zero.
pub(crate) fn progress(i: u32, n: u32) -> f64 {
    debug_assert!(n > 0);
    f64::from(i) / f64::from(n)
}
