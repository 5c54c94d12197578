//! Angle helpers.
//!
//! All angles are in radians. Coordinate frame follows ROS REP-103:
//! X-forward, Y-left, counter-clockwise positive rotation.

use std::f32::consts::PI;

/// Two times PI (full circle in radians).
pub const TWO_PI: f32 = 2.0 * PI;

/// Normalize angle to [-π, π).
///
/// # Example
/// ```
/// use anveshan::core::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(PI / 2.0) - PI / 2.0).abs() < 1e-6);
/// assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TWO_PI;
    if a >= PI {
        a -= TWO_PI;
    } else if a < -PI {
        a += TWO_PI;
    }
    a
}

/// Signed shortest angular difference from `from` to `to`, in [-π, π).
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_wraps_into_range() {
        assert_relative_eq!(normalize_angle(0.5), 0.5);
        assert_relative_eq!(normalize_angle(0.5 + TWO_PI), 0.5, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(0.5 - TWO_PI), 0.5, epsilon = 1e-5);
        assert!(normalize_angle(3.0 * PI).abs() - PI < 1e-5);
    }

    #[test]
    fn test_angle_diff_crosses_boundary() {
        let diff = angle_diff(-0.9 * PI, 0.9 * PI);
        assert_relative_eq!(diff, -0.2 * PI, epsilon = 1e-5);
    }
}
