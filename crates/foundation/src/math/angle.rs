//! Angle normalization and shortest-path interpolation targets.
//!
//! All angles are radians. Periodic angles are kept in the half-open range
//! `(-π, π]`, so `-π` and `π` share the single representative `π`.

use core::f64::consts::{PI, TAU};

/// Wrap `angle` into `(-π, π]`.
///
/// Values already in range are returned bit-for-bit unchanged, which makes the
/// function exactly idempotent. Non-finite input is returned as-is.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }

    // `PI - r` with `r` in `[0, 2π)` lands in `(-π, π]`.
    let r = (PI - angle).rem_euclid(TAU);
    let wrapped = PI - r;
    if wrapped <= -PI { PI } else { wrapped }
}

/// Target angle for animating from `from` towards `to` the short way round.
///
/// The result is `normalize(from) + delta` with `|delta| <= π`, so linear
/// interpolation between `normalize(from)` and the result never crosses more
/// than half a turn. The result itself may lie outside `(-π, π]`.
pub fn shortest_angle_path(from: f64, to: f64) -> f64 {
    let from = normalize_angle(from);
    let to = normalize_angle(to);

    let mut delta = to - from;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }

    from + delta
}

/// Signed shortest difference `a - b`, wrapped into `(-π, π]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}
