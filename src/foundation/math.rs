const SMOOTH_SCALE: f64 = 1e10;

/// Round away float noise such as `cos(pi / 2) = 6.1e-17`.
pub(crate) fn smooth(v: f64) -> f64 {
    let s = (v * SMOOTH_SCALE).round() / SMOOTH_SCALE;
    if s == 0.0 { 0.0 } else { s }
}

/// Round half towards positive infinity, the way pixel offsets are snapped.
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

pub(crate) fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
