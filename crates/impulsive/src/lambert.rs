//! Single-revolution Lambert solver (Izzo's formulation).
//!
//! Works in non-dimensional units scaled by the transfer's semi-perimeter, so the
//! same iteration serves parking-orbit distances and solar-system distances alike.
//! The root of the time-of-flight equation T(x) is found with a quartic
//! Householder iteration.

use std::f64::consts::PI;

use thiserror::Error;
use twp_core::vector::{Vector3, add, cross, dot, norm, scale, sub, unit};

/// Householder iteration cap. Convergence normally takes 2-5 steps.
pub const MAX_ITERATIONS: usize = 35;

/// Transfer angles this close to 0 or π (as |r̂1 × r̂2|) are treated as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Errors surfaced by the Lambert solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LambertError {
    #[error("invalid lambert input: {0}")]
    InvalidInput(String),
    #[error("degenerate transfer geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("lambert solver did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// Departure and arrival velocities of a Lambert arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    pub v1: Vector3,
    pub v2: Vector3,
    /// Householder iterations spent on the root find.
    pub iterations: usize,
}

/// Solve Lambert's problem for a single-revolution conic from `r1` to `r2`.
///
/// `long_way` selects the arc sweeping more than 180° about the focus. The
/// orbital plane is oriented by `r1 × r2`, so the short way is prograde about that
/// normal and the long way is prograde about its opposite.
pub fn solve(
    mu: f64,
    r1: &Vector3,
    r2: &Vector3,
    time_of_flight_s: f64,
    long_way: bool,
) -> Result<LambertSolution, LambertError> {
    if !(mu.is_finite() && mu > 0.0) {
        return Err(LambertError::InvalidInput(format!(
            "gravitational parameter must be positive, got {mu}"
        )));
    }
    if !(time_of_flight_s.is_finite() && time_of_flight_s > 0.0) {
        return Err(LambertError::InvalidInput(format!(
            "time of flight must be positive, got {time_of_flight_s}"
        )));
    }
    if !r1.iter().chain(r2.iter()).all(|c| c.is_finite()) {
        return Err(LambertError::InvalidInput(
            "position vectors must be finite".to_string(),
        ));
    }

    let r1_norm = norm(r1);
    let r2_norm = norm(r2);
    if r1_norm == 0.0 || r2_norm == 0.0 {
        return Err(LambertError::InvalidInput(
            "position vectors must be non-zero".to_string(),
        ));
    }

    let chord = norm(&sub(r2, r1));
    if chord <= 1e-12 * (r1_norm + r2_norm) {
        return Err(LambertError::DegenerateGeometry("coincident endpoints"));
    }
    let s = 0.5 * (r1_norm + r2_norm + chord);

    let i_r1 = scale(r1, 1.0 / r1_norm);
    let i_r2 = scale(r2, 1.0 / r2_norm);
    let i_h = transfer_normal(&i_r1, &i_r2, long_way)?;

    let mut lambda = (1.0 - chord / s).max(0.0).sqrt();
    let (i_t1, i_t2) = if long_way {
        lambda = -lambda;
        (unit(&cross(&i_r1, &i_h)), unit(&cross(&i_r2, &i_h)))
    } else {
        (unit(&cross(&i_h, &i_r1)), unit(&cross(&i_h, &i_r2)))
    };

    let t = (2.0 * mu / s.powi(3)).sqrt() * time_of_flight_s;
    let (x, iterations) = householder(initial_guess(t, lambda), t, lambda)?;
    let y = compute_y(x, lambda);

    let gamma = (mu * s / 2.0).sqrt();
    let rho = (r1_norm - r2_norm) / chord;
    let sigma = (1.0 - rho * rho).max(0.0).sqrt();

    let v_r1 = gamma * ((lambda * y - x) - rho * (lambda * y + x)) / r1_norm;
    let v_r2 = -gamma * ((lambda * y - x) + rho * (lambda * y + x)) / r2_norm;
    let v_t1 = gamma * sigma * (y + lambda * x) / r1_norm;
    let v_t2 = gamma * sigma * (y + lambda * x) / r2_norm;

    let v1 = add(&scale(&i_r1, v_r1), &scale(&i_t1, v_t1));
    let v2 = add(&scale(&i_r2, v_r2), &scale(&i_t2, v_t2));
    if !v1.iter().chain(v2.iter()).all(|c| c.is_finite()) {
        return Err(LambertError::NoConvergence { iterations });
    }

    Ok(LambertSolution { v1, v2, iterations })
}

/// Unit normal of the transfer plane, oriented along `r̂1 × r̂2`.
///
/// When the endpoints are collinear the plane is undetermined. A 180° transfer
/// picks the plane through r1 whose normal lies closest to the reference z axis
/// (the x axis if r1 is polar), so equatorial endpoints stay in the equatorial
/// plane. An aligned pair only admits the long way around.
fn transfer_normal(i_r1: &Vector3, i_r2: &Vector3, long_way: bool) -> Result<Vector3, LambertError> {
    let h = cross(i_r1, i_r2);
    let h_norm = norm(&h);
    if h_norm >= COLLINEAR_TOLERANCE {
        return Ok(scale(&h, 1.0 / h_norm));
    }
    if dot(i_r1, i_r2) > 0.0 && !long_way {
        return Err(LambertError::DegenerateGeometry("radial transfer"));
    }

    let z = [0.0, 0.0, 1.0];
    let mut normal = sub(&z, &scale(i_r1, dot(&z, i_r1)));
    if norm(&normal) < COLLINEAR_TOLERANCE {
        let x_axis = [1.0, 0.0, 0.0];
        normal = sub(&x_axis, &scale(i_r1, dot(&x_axis, i_r1)));
    }
    let normal = unit(&normal);
    Ok(if h[2] < 0.0 { scale(&normal, -1.0) } else { normal })
}

fn compute_y(x: f64, lambda: f64) -> f64 {
    (1.0 - lambda * lambda * (1.0 - x * x)).max(0.0).sqrt()
}

/// Non-dimensional time of flight T(x).
fn time_of_flight(x: f64, y: f64, lambda: f64) -> f64 {
    // Battin's series near the parabola, where the closed form cancels catastrophically.
    if x > 0.0 && x * x > 0.6 && x * x < 1.4 {
        let eta = y - lambda * x;
        let s1 = (1.0 - lambda - x * eta) * 0.5;
        let q = 4.0 / 3.0 * hyp2f1b(s1);
        return (eta.powi(3) * q + 4.0 * lambda * eta) * 0.5;
    }

    let psi = if x > 1.0 {
        ((y - x * lambda) * (x * x - 1.0).sqrt()).asinh()
    } else {
        (x * y + lambda * (1.0 - x * x)).clamp(-1.0, 1.0).acos()
    };
    let den = 1.0 - x * x;
    (psi / den.abs().sqrt() - x + lambda * y) / den
}

/// Hypergeometric function 2F1(3, 1, 5/2, x).
fn hyp2f1b(x: f64) -> f64 {
    if x >= 1.0 {
        return f64::INFINITY;
    }
    let mut res = 1.0;
    let mut term = 1.0;
    let mut ii = 0.0_f64;
    // The series converges geometrically for |x| < 1; the cap only guards x → 1.
    for _ in 0..10_000 {
        term *= (3.0 + ii) * (1.0 + ii) / (2.5 + ii) * x / (ii + 1.0);
        let res_old = res;
        res += term;
        if res == res_old {
            break;
        }
        ii += 1.0;
    }
    res
}

fn initial_guess(t: f64, lambda: f64) -> f64 {
    let t0 = lambda.acos() + lambda * (1.0 - lambda * lambda).sqrt();
    let t1 = 2.0 * (1.0 - lambda.powi(3)) / 3.0;
    if t >= t0 {
        (t0 / t).powf(2.0 / 3.0) - 1.0
    } else if t < t1 {
        2.5 * t1 / t * (t1 - t) / (1.0 - lambda.powi(5)) + 1.0
    } else {
        (2f64.ln() * (t / t0).ln() / (t1 / t0).ln()).exp() - 1.0
    }
}

fn householder(x0: f64, t_target: f64, lambda: f64) -> Result<(f64, usize), LambertError> {
    let l2 = lambda * lambda;
    let l3 = l2 * lambda;
    let l5 = l3 * l2;

    let mut x = x0;
    for iteration in 1..=MAX_ITERATIONS {
        let y = compute_y(x, lambda);
        let t = time_of_flight(x, y, lambda);
        let f = t - t_target;

        let den_x = 1.0 - x * x;
        let d1 = (3.0 * t * x - 2.0 + 2.0 * l3 * x / y) / den_x;
        let d2 = (3.0 * t + 5.0 * x * d1 + 2.0 * (1.0 - l2) * l3 / y.powi(3)) / den_x;
        let d3 = (7.0 * x * d2 + 8.0 * d1 - 6.0 * (1.0 - l2) * l5 * x / y.powi(5)) / den_x;

        let num = d1 * d1 - f * d2 / 2.0;
        let den = d1 * (d1 * d1 - f * d2) + d3 * f * f / 6.0;
        if den == 0.0 || !den.is_finite() {
            return Err(LambertError::NoConvergence {
                iterations: iteration,
            });
        }

        let mut x_new = x - f * num / den;
        if !x_new.is_finite() {
            return Err(LambertError::NoConvergence {
                iterations: iteration,
            });
        }
        if x_new <= -1.0 {
            x_new = 0.5 * (x - 1.0);
        }
        if f.abs() <= 1e-13 * t_target || (x_new - x).abs() <= 4.0 * f64::EPSILON * x.abs().max(1.0) {
            return Ok((x_new, iteration));
        }
        x = x_new;
    }

    Err(LambertError::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Angle swept by the transfer, in `(0, 2π)`.
pub fn transfer_angle(r1: &Vector3, r2: &Vector3, long_way: bool) -> f64 {
    let theta = twp_core::vector::angle_between(r1, r2);
    if long_way { 2.0 * PI - theta } else { theta }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battin_series_matches_closed_form_near_parabola() {
        let lambda = 0.3;
        let x = 1.01;
        let y = compute_y(x, lambda);
        let psi = ((y - x * lambda) * (x * x - 1.0).sqrt()).asinh();
        let den = 1.0 - x * x;
        let closed = (psi / den.abs().sqrt() - x + lambda * y) / den;
        assert!((time_of_flight(x, y, lambda) - closed).abs() < 1e-8);
    }

    #[test]
    fn antiparallel_equatorial_endpoints_stay_in_the_equator() {
        let r1 = [1.0, 0.0, 0.0];
        let r2 = [-2.0, 0.0, 0.0];
        let sol = solve(1.0, &r1, &r2, 5.0, false).expect("half revolution");
        assert_eq!(sol.v1[2], 0.0);
        assert_eq!(sol.v2[2], 0.0);
        assert!(cross(&r1, &sol.v1)[2] > 0.0, "v1 = {:?}", sol.v1);
        assert_eq!(
            transfer_normal(&r1, &unit(&r2), false).expect("normal"),
            [0.0, 0.0, 1.0]
        );

        let polar = [0.0, 0.0, 1.0];
        let normal = transfer_normal(&polar, &[0.0, 0.0, -1.0], false).expect("polar normal");
        assert_eq!(normal, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn minimum_energy_time_maps_to_x_zero() {
        let lambda: f64 = 0.4;
        let t0 = lambda.acos() + lambda * (1.0 - lambda * lambda).sqrt();
        let (x, _) = householder(initial_guess(t0, lambda), t0, lambda).expect("converges");
        assert!(x.abs() < 1e-10, "x = {x}");
    }
}
