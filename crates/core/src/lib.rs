//! Core units, constants, and shared primitives for the Transfer Window Planner workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Smallest delta-v (m/s) treated as a real burn; used to keep logarithms finite.
    pub const MIN_DELTA_V: f64 = 1e-9;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    /// Convert days to seconds for a given day length.
    #[inline]
    pub fn days_to_seconds(days: f64, seconds_per_day: f64) -> f64 {
        days * seconds_per_day
    }

    /// Convert seconds to days for a given day length.
    #[inline]
    pub fn seconds_to_days(seconds: f64, seconds_per_day: f64) -> f64 {
        seconds / seconds_per_day
    }
}

/// Angle helpers.
pub mod angle {
    use std::f64::consts::{PI, TAU};

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn wrap_two_pi(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// Wrap an angle into `(-π, π]`.
    #[inline]
    pub fn wrap_pi(angle: f64) -> f64 {
        let wrapped = wrap_two_pi(angle);
        if wrapped > PI { wrapped - TAU } else { wrapped }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`; the zero vector maps to itself.
    #[inline]
    pub fn unit(v: &Vector3) -> Vector3 {
        let n = norm(v);
        if n > 0.0 { scale(v, 1.0 / n) } else { [0.0; 3] }
    }

    /// Unsigned angle between two vectors in `[0, π]`.
    pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
        // atan2 form stays accurate near 0 and π where acos does not
        norm(&cross(a, b)).atan2(dot(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::angle::{wrap_pi, wrap_two_pi};
    use super::vector::{angle_between, cross};
    use std::f64::consts::PI;

    #[test]
    fn wrapping_keeps_angles_in_range() {
        assert!((wrap_two_pi(-0.5) - (2.0 * PI - 0.5)).abs() < 1e-12);
        assert!((wrap_two_pi(7.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_pi(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert!((wrap_pi(PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn cross_and_angle_agree_on_axes() {
        assert_eq!(cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert!((angle_between(&[1.0, 0.0, 0.0], &[-1.0, 1e-9, 0.0]) - PI).abs() < 1e-8);
    }
}
