//! Numeric conversion helpers used across the project.
//!
//! These utilities guard conversions between floating-point world
//! coordinates and the integer block and fixed-point domains. Out-of-range
//! inputs saturate instead of wrapping, and `NaN` maps to zero.

use crate::FIXED_POINT_SCALE;

/// Floor a world coordinate and clamp it into the `i32` domain.
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn floor_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let floored = value.floor();
    let clamped = floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    clamped as i32
}

/// Ceil a world coordinate and clamp it into the `i32` domain.
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn ceil_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let ceiled = value.ceil();
    let clamped = ceiled.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    clamped as i32
}

/// Convert a world coordinate into 1/32-block fixed-point units, flooring.
///
/// # Examples
/// ```
/// use voxsim::numeric::to_fixed_point;
/// assert_eq!(to_fixed_point(1.0), 32);
/// assert_eq!(to_fixed_point(-0.01), -1);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The scaled value is clamped to the i64 bounds before casting."
)]
#[must_use]
pub fn to_fixed_point(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let scaled = (value * FIXED_POINT_SCALE).floor();
    scaled.clamp(i64::MIN as f64, i64::MAX as f64) as i64
}

/// Narrow a fixed-point delta into the signed byte range of relative moves.
///
/// Returns `None` when the delta does not fit.
#[must_use]
pub fn fit_i8(value: i64) -> Option<i8> {
    i8::try_from(value).ok()
}
