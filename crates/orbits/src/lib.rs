//! Orbit utilities: Keplerian elements, two-body propagation, and patched-conic estimates.

pub mod kepler;
pub mod propagate;

pub use kepler::Orbit;
pub use propagate::propagate;

use thiserror::Error;

/// Errors raised while building or evaluating an orbit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrbitError {
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("{solver} failed to converge within {iterations} iterations")]
    NoConvergence {
        solver: &'static str,
        iterations: usize,
    },
}

/// Speed of a circular orbit of radius `radius_m` around a body with parameter `mu_m3_s2`.
pub fn circular_speed(mu_m3_s2: f64, radius_m: f64) -> f64 {
    (mu_m3_s2 / radius_m).sqrt()
}

/// Patched-conic escape delta-v from a circular parking orbit.
pub fn escape_delta_v(mu_m3_s2: f64, parking_radius_m: f64, vinf_m_s: f64) -> f64 {
    let circular_speed = circular_speed(mu_m3_s2, parking_radius_m);
    let hyperbolic_speed = (vinf_m_s * vinf_m_s + 2.0 * mu_m3_s2 / parking_radius_m).sqrt();
    (hyperbolic_speed - circular_speed).max(0.0)
}

/// Patched-conic capture delta-v for a rendezvous into a circular parking orbit.
pub fn capture_delta_v(mu_m3_s2: f64, parking_radius_m: f64, vinf_m_s: f64) -> f64 {
    // The capture burn mirrors the escape burn for a symmetric hyperbola.
    escape_delta_v(mu_m3_s2, parking_radius_m, vinf_m_s)
}

/// Eccentricity of the departure hyperbola leaving a periapsis at `radius_m` with excess `vinf_m_s`.
pub fn hyperbolic_eccentricity(mu_m3_s2: f64, radius_m: f64, vinf_m_s: f64) -> f64 {
    1.0 + radius_m * vinf_m_s * vinf_m_s / mu_m3_s2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_from_circular_orbit_with_zero_excess_is_parabolic_increment() {
        let mu = 3.5316e12;
        let r = 700_000.0;
        let dv = escape_delta_v(mu, r, 0.0);
        let expected = (2.0_f64.sqrt() - 1.0) * circular_speed(mu, r);
        assert!((dv - expected).abs() < 1e-9, "dv = {dv}");
    }

    #[test]
    fn negligible_gravity_reduces_burn_to_excess_speed() {
        let dv = escape_delta_v(1e-12, 1.0, 250.0);
        assert!((dv - 250.0).abs() < 1e-6);
        assert_eq!(capture_delta_v(1e-12, 1.0, 250.0), dv);
    }
}
