//! Orientation helpers.
//!
//! Yaw and pitch are stored in degrees. Yaw rotates around the vertical axis
//! with 0° facing +Z and 90° facing +X; pitch is positive when looking up.
use glam::DVec3;

/// Below this magnitude a direction is treated as zero when deriving angles.
const DIRECTION_EPSILON: f64 = 1e-7;

/// Wraps an angle in degrees into the half-open range `(-180, 180]`.
///
/// # Examples
/// ```
/// use voxsim::vector_math::normalize_angle_degrees;
/// assert_eq!(normalize_angle_degrees(270.0), -90.0);
/// assert_eq!(normalize_angle_degrees(-180.0), 180.0);
/// ```
#[must_use]
pub fn normalize_angle_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    // rem_euclid maps -180 onto 180, which keeps the range half-open.
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Returns the unit look vector for the supplied yaw and pitch.
#[must_use]
pub fn look_vector(yaw: f64, pitch: f64) -> DVec3 {
    let (yaw_sin, yaw_cos) = yaw.to_radians().sin_cos();
    let (pitch_sin, pitch_cos) = pitch.to_radians().sin_cos();
    DVec3::new(yaw_sin * pitch_cos, pitch_sin, yaw_cos * pitch_cos)
}

/// Derives a yaw from the horizontal components of a direction.
///
/// Directions whose horizontal part is effectively zero yield `0.0`; the
/// angle is undefined there.
#[must_use]
pub fn yaw_from_direction(direction: DVec3) -> f64 {
    if direction.x.abs() < DIRECTION_EPSILON && direction.z.abs() < DIRECTION_EPSILON {
        return 0.0;
    }
    direction.x.atan2(direction.z).to_degrees()
}

/// Derives a pitch from a direction; near-zero directions yield `0.0`.
#[must_use]
pub fn pitch_from_direction(direction: DVec3) -> f64 {
    let horizontal = direction.x.hypot(direction.z);
    if horizontal.abs() < DIRECTION_EPSILON && direction.y.abs() < DIRECTION_EPSILON {
        return 0.0;
    }
    direction.y.atan2(horizontal).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(180.0, 180.0)]
    #[case(-180.0, 180.0)]
    #[case(190.0, -170.0)]
    #[case(-190.0, 170.0)]
    #[case(720.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn wraps_angles(#[case] input: f64, #[case] expected: f64) {
        assert_relative_eq!(normalize_angle_degrees(input), expected);
    }

    #[rstest]
    #[case(0.0, 0.0, DVec3::Z)]
    #[case(90.0, 0.0, DVec3::X)]
    #[case(0.0, 90.0, DVec3::Y)]
    fn look_vector_axes(#[case] yaw: f64, #[case] pitch: f64, #[case] expected: DVec3) {
        let look = look_vector(yaw, pitch);
        assert_relative_eq!(look.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(look.y, expected.y, epsilon = 1e-9);
        assert_relative_eq!(look.z, expected.z, epsilon = 1e-9);
    }

    #[test]
    fn angles_round_trip_through_look_vector() {
        let look = look_vector(35.0, -20.0);
        assert_relative_eq!(yaw_from_direction(look), 35.0, epsilon = 1e-9);
        assert_relative_eq!(pitch_from_direction(look), -20.0, epsilon = 1e-9);
    }

    #[test]
    fn near_zero_direction_yields_zero_angles() {
        let tiny = DVec3::new(1e-9, -1e-9, 1e-9);
        assert_eq!(yaw_from_direction(tiny), 0.0);
        assert_eq!(pitch_from_direction(tiny), 0.0);
    }
}
