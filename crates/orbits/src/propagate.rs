//! Universal-variable two-body propagation.
//!
//! Propagates a state (r, v) by `dt` seconds using Stumpff functions, valid for
//! elliptic, parabolic, and hyperbolic motion alike. The root of the universal
//! Kepler equation is found with Laguerre's method, which converges from the
//! standard initial guesses where plain Newton iteration can overshoot.

use std::f64::consts::TAU;

use twp_core::vector::{Vector3, add, dot, norm, scale};

use crate::OrbitError;

const MAX_ITERATIONS: usize = 200;
const LAGUERRE_ORDER: f64 = 5.0;
const TOLERANCE: f64 = 1e-14;

/// Propagate (r, v) forward by `dt` under two-body dynamics with gravitational parameter `mu`.
/// Returns (r_final, v_final).
pub fn propagate(
    r0: &Vector3,
    v0: &Vector3,
    dt: f64,
    mu: f64,
) -> Result<(Vector3, Vector3), OrbitError> {
    if !(mu > 0.0) || !dt.is_finite() {
        return Err(OrbitError::InvalidElements(format!(
            "cannot propagate with mu = {mu}, dt = {dt}"
        )));
    }
    let r0_mag = norm(r0);
    if r0_mag == 0.0 {
        return Err(OrbitError::InvalidElements(
            "cannot propagate from the origin".to_string(),
        ));
    }
    let sqrt_mu = mu.sqrt();
    let sigma0 = dot(r0, v0) / sqrt_mu;
    let alpha = 2.0 / r0_mag - dot(v0, v0) / mu; // = 1/a

    let mut dt = dt;
    let mut chi = if alpha > 1e-12 {
        // Whole revolutions return to the same state.
        let period = TAU / (mu * alpha.powi(3)).sqrt();
        dt %= period;
        sqrt_mu * dt * alpha
    } else if alpha < -1e-12 {
        hyperbolic_guess(r0_mag, sigma0 * sqrt_mu, dt, alpha, mu)
    } else {
        sqrt_mu * dt / r0_mag
    };

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let chi2 = chi * chi;
        let psi = alpha * chi2;
        let (c2, c3) = stumpff_c2c3(psi);

        let f = r0_mag * chi * (1.0 - psi * c3) + sigma0 * chi2 * c2 + chi2 * chi * c3
            - sqrt_mu * dt;
        let df = chi2 * c2 + sigma0 * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);
        let ddf = sigma0 * (1.0 - psi * c2) + (1.0 - r0_mag * alpha) * chi * (1.0 - psi * c3);

        let n = LAGUERRE_ORDER;
        let disc = ((n - 1.0).powi(2) * df * df - n * (n - 1.0) * f * ddf).abs();
        let denom = df + disc.sqrt().copysign(df);
        if denom == 0.0 || !denom.is_finite() {
            break;
        }
        let delta = n * f / denom;
        chi -= delta;
        if delta.abs() < TOLERANCE * chi.abs().max(1.0) {
            converged = true;
            break;
        }
    }
    if !converged || !chi.is_finite() {
        return Err(OrbitError::NoConvergence {
            solver: "universal kepler equation",
            iterations: MAX_ITERATIONS,
        });
    }

    let chi2 = chi * chi;
    let psi = alpha * chi2;
    let (c2, c3) = stumpff_c2c3(psi);
    let r_mag = chi2 * c2 + sigma0 * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);

    let f = 1.0 - chi2 / r0_mag * c2;
    let g = dt - chi2 * chi / sqrt_mu * c3;
    let g_dot = 1.0 - chi2 / r_mag * c2;
    let f_dot = sqrt_mu / (r_mag * r0_mag) * chi * (psi * c3 - 1.0);

    let r_final = add(&scale(r0, f), &scale(v0, g));
    let v_final = add(&scale(r0, f_dot), &scale(v0, g_dot));
    Ok((r_final, v_final))
}

fn hyperbolic_guess(r0_mag: f64, rdotv: f64, dt: f64, alpha: f64, mu: f64) -> f64 {
    let a = 1.0 / alpha;
    let sign_dt = if dt >= 0.0 { 1.0 } else { -1.0 };
    let denom = rdotv + sign_dt * (-mu * a).sqrt() * (1.0 - r0_mag * alpha);
    let arg = if denom != 0.0 {
        -2.0 * mu * alpha * dt * dt / denom
    } else {
        -1.0
    };
    if arg > 0.0 {
        sign_dt * (-a).sqrt() * arg.ln()
    } else {
        mu.sqrt() * dt / r0_mag
    }
}

/// Stumpff functions c2(psi) and c3(psi).
fn stumpff_c2c3(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let sqrt_psi = psi.sqrt();
        let c2 = (1.0 - sqrt_psi.cos()) / psi;
        let c3 = (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi);
        (c2, c3)
    } else if psi < -1e-6 {
        let sqrt_neg_psi = (-psi).sqrt();
        let c2 = (1.0 - sqrt_neg_psi.cosh()) / psi;
        let c3 = (sqrt_neg_psi.sinh() - sqrt_neg_psi) / ((-psi) * sqrt_neg_psi);
        (c2, c3)
    } else {
        let c2 = 1.0 / 2.0 - psi / 24.0 + psi * psi / 720.0;
        let c3 = 1.0 / 6.0 - psi / 120.0 + psi * psi / 5040.0;
        (c2, c3)
    }
}
