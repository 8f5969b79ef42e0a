//! Conversion of a raw estimate into a percentage in `[0, 100]`.

/// Raw values this close to an integer are taken as that integer before
/// truncation, so knot evaluations that land a hair below their stored
/// percentage do not lose a whole point.
pub const SNAP_EPSILON: f64 = 1e-6;

/// Truncate toward zero, then clamp to `[0, 100]`.
///
/// NaN maps to 0; infinities saturate to the nearest bound.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_percentage(raw: f64) -> u8 {
    let nearest = raw.round();
    let snapped = if (raw - nearest).abs() <= SNAP_EPSILON {
        nearest
    } else {
        raw
    };
    // `as` saturates and maps NaN to 0
    let truncated = snapped.trunc() as i64;
    truncated.clamp(0, 100) as u8
}
