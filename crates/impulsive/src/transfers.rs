//! Analytic estimators for impulsive transfers in the coplanar, circular limit.

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub dv1_m_s: f64,      // signed: negative for inward (retro) burn
    pub dv2_m_s: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total_m_s: f64, // |dv1| + |dv2|
    pub tof_seconds: f64,
}

/// Compute the classical Hohmann transfer between two circular coplanar orbits.
///
/// Inputs:
/// - `r1_m`: initial circular orbit radius (m)
/// - `r2_m`: target circular orbit radius (m)
/// - `mu_m3_s2`: gravitational parameter of central body (m^3/s^2)
///
/// Returns `None` unless all inputs are positive and finite.
pub fn hohmann(r1_m: f64, r2_m: f64, mu_m3_s2: f64) -> Option<HohmannResult> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !(valid(r1_m) && valid(r2_m) && valid(mu_m3_s2)) {
        return None;
    }

    let v1 = (mu_m3_s2 / r1_m).sqrt();
    let v2 = (mu_m3_s2 / r2_m).sqrt();
    let a_t = 0.5 * (r1_m + r2_m);

    // Transfer periapsis speed (at r1) and apoapsis speed (at r2)
    let v_t1 = (mu_m3_s2 * (2.0 / r1_m - 1.0 / a_t)).sqrt();
    let v_t2 = (mu_m3_s2 * (2.0 / r2_m - 1.0 / a_t)).sqrt();

    let dv1 = v_t1 - v1;
    let dv2 = v2 - v_t2;

    Some(HohmannResult {
        dv1_m_s: dv1,
        dv2_m_s: dv2,
        dv_total_m_s: dv1.abs() + dv2.abs(),
        tof_seconds: hohmann_time_of_flight(r1_m, r2_m, mu_m3_s2),
    })
}

/// Half the period of the ellipse tangent to both circular orbits.
pub fn hohmann_time_of_flight(r1_m: f64, r2_m: f64, mu_m3_s2: f64) -> f64 {
    let a_t = 0.5 * (r1_m + r2_m);
    std::f64::consts::PI * (a_t.powi(3) / mu_m3_s2).sqrt()
}
