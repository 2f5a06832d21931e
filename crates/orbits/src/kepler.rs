//! Keplerian element sets and their evaluation at a universal time.

use std::f64::consts::TAU;

use twp_core::angle::wrap_two_pi;
use twp_core::vector::Vector3;

use crate::OrbitError;

const KEPLER_MAX_ITERATIONS: usize = 50;
const KEPLER_TOLERANCE: f64 = 1e-14;

/// Closed elliptic orbit around a primary, described by classical elements.
///
/// Angles are radians. `mean_anomaly_at_epoch_rad` is the mean anomaly at `epoch_ut`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub longitude_of_ascending_node_rad: f64,
    pub argument_of_periapsis_rad: f64,
    pub mean_anomaly_at_epoch_rad: f64,
    pub epoch_ut: f64,
    /// Gravitational parameter of the primary (m³/s²).
    pub mu_m3_s2: f64,
}

impl Orbit {
    /// Build a validated orbit. Only bound (elliptic) orbits are accepted.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis_m: f64,
        eccentricity: f64,
        inclination_rad: f64,
        longitude_of_ascending_node_rad: f64,
        argument_of_periapsis_rad: f64,
        mean_anomaly_at_epoch_rad: f64,
        epoch_ut: f64,
        mu_m3_s2: f64,
    ) -> Result<Self, OrbitError> {
        if !(semi_major_axis_m.is_finite() && semi_major_axis_m > 0.0) {
            return Err(OrbitError::InvalidElements(format!(
                "semi-major axis must be positive, got {semi_major_axis_m}"
            )));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::InvalidElements(format!(
                "eccentricity must lie in [0, 1), got {eccentricity}"
            )));
        }
        if !(mu_m3_s2.is_finite() && mu_m3_s2 > 0.0) {
            return Err(OrbitError::InvalidElements(format!(
                "primary gravitational parameter must be positive, got {mu_m3_s2}"
            )));
        }
        Ok(Self {
            semi_major_axis_m,
            eccentricity,
            inclination_rad,
            longitude_of_ascending_node_rad,
            argument_of_periapsis_rad,
            mean_anomaly_at_epoch_rad,
            epoch_ut,
            mu_m3_s2,
        })
    }

    /// Circular, equatorial orbit starting at `phase_rad` at UT 0.
    pub fn circular(radius_m: f64, phase_rad: f64, mu_m3_s2: f64) -> Result<Self, OrbitError> {
        Self::new(radius_m, 0.0, 0.0, 0.0, 0.0, phase_rad, 0.0, mu_m3_s2)
    }

    /// Mean motion (rad/s).
    pub fn mean_motion(&self) -> f64 {
        (self.mu_m3_s2 / self.semi_major_axis_m.powi(3)).sqrt()
    }

    /// Orbital period (s).
    pub fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    /// Unit normal of the orbital plane (direction of the angular momentum).
    pub fn normal(&self) -> Vector3 {
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();
        let (sin_o, cos_o) = self.longitude_of_ascending_node_rad.sin_cos();
        [sin_o * sin_i, -cos_o * sin_i, cos_i]
    }

    /// Mean anomaly at `ut`, wrapped to `[0, 2π)`.
    pub fn mean_anomaly_at(&self, ut: f64) -> f64 {
        wrap_two_pi(self.mean_anomaly_at_epoch_rad + self.mean_motion() * (ut - self.epoch_ut))
    }

    /// Position and velocity relative to the primary at `ut`.
    pub fn state_at(&self, ut: f64) -> Result<(Vector3, Vector3), OrbitError> {
        let e = self.eccentricity;
        let a = self.semi_major_axis_m;
        let eccentric = solve_kepler(self.mean_anomaly_at(ut), e)?;
        let (sin_e, cos_e) = eccentric.sin_cos();

        let b = a * (1.0 - e * e).sqrt();
        let r = a * (1.0 - e * cos_e);
        let edot = self.mean_motion() * a / r;

        // Perifocal frame: x towards periapsis, y along the direction of motion.
        let p = [a * (cos_e - e), b * sin_e];
        let v = [-a * sin_e * edot, b * cos_e * edot];

        Ok((self.rotate(p), self.rotate(v)))
    }

    fn rotate(&self, perifocal: [f64; 2]) -> Vector3 {
        let (sin_o, cos_o) = self.longitude_of_ascending_node_rad.sin_cos();
        let (sin_w, cos_w) = self.argument_of_periapsis_rad.sin_cos();
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();

        let r11 = cos_o * cos_w - sin_o * sin_w * cos_i;
        let r12 = -cos_o * sin_w - sin_o * cos_w * cos_i;
        let r21 = sin_o * cos_w + cos_o * sin_w * cos_i;
        let r22 = -sin_o * sin_w + cos_o * cos_w * cos_i;
        let r31 = sin_w * sin_i;
        let r32 = cos_w * sin_i;

        let [x, y] = perifocal;
        [r11 * x + r12 * y, r21 * x + r22 * y, r31 * x + r32 * y]
    }
}

/// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    let m = wrap_two_pi(mean_anomaly);
    let mut e_anom = if eccentricity > 0.8 { std::f64::consts::PI } else { m };

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - m;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let delta = f / f_prime;
        e_anom -= delta;
        if delta.abs() < KEPLER_TOLERANCE * e_anom.abs().max(1.0) {
            return Ok(e_anom);
        }
    }

    Err(OrbitError::NoConvergence {
        solver: "kepler equation",
        iterations: KEPLER_MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use twp_core::vector::{cross, dot, norm, unit};

    const MU: f64 = 1.172_332_8e18;

    #[test]
    fn circular_orbit_keeps_radius_and_speed() {
        let orbit = Orbit::circular(13_599_840_256.0, 1.0, MU).expect("orbit");
        for k in 0..8 {
            let ut = k as f64 * orbit.period() / 7.3;
            let (r, v) = orbit.state_at(ut).expect("state");
            assert!((norm(&r) / 13_599_840_256.0 - 1.0).abs() < 1e-12);
            assert!((norm(&v) / (MU / 13_599_840_256.0).sqrt() - 1.0).abs() < 1e-12);
            assert!(dot(&r, &v).abs() / (norm(&r) * norm(&v)) < 1e-12);
        }
    }

    #[test]
    fn eccentric_orbit_satisfies_vis_viva_and_plane() {
        let orbit = Orbit::new(
            5_263_138_304.0,
            0.2,
            7f64.to_radians(),
            70f64.to_radians(),
            15f64.to_radians(),
            3.0,
            0.0,
            MU,
        )
        .expect("orbit");
        let normal = orbit.normal();
        for k in 0..5 {
            let ut = 1.0e6 * k as f64;
            let (r, v) = orbit.state_at(ut).expect("state");
            let vis_viva = MU * (2.0 / norm(&r) - 1.0 / orbit.semi_major_axis_m);
            assert!((dot(&v, &v) / vis_viva - 1.0).abs() < 1e-10);
            assert!(dot(&r, &normal).abs() / norm(&r) < 1e-12);
        }
        let (r, v) = orbit.state_at(0.0).expect("state");
        let sampled = unit(&cross(&r, &v));
        assert!((dot(&sampled, &normal) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hyperbolic_elements_are_rejected() {
        assert!(matches!(
            Orbit::new(1.0e9, 1.2, 0.0, 0.0, 0.0, 0.0, 0.0, MU),
            Err(OrbitError::InvalidElements(_))
        ));
    }
}
