#![allow(dead_code)]

use std::f64::consts::TAU;

use transfer_window_planner::ephemeris::{Body, Ephemeris, EphemerisError, StateVector};
use transfer_window_planner::orbits::Orbit;
use transfer_window_planner::transfer::{TransferEvaluator, TransferSpec};

/// Gravitational parameter of the idealised parent star.
pub const STAR_MU: f64 = 1.0;

pub fn radius_for_period(period: f64, mu: f64) -> f64 {
    (mu * (period / TAU).powi(2)).cbrt()
}

pub fn star() -> Body {
    Body {
        name: "Sun".to_string(),
        parent: None,
        mu_m3_s2: STAR_MU,
        radius_m: 1e-3,
        default_parking_altitude_m: 1e-3,
        orbit: None,
    }
}

/// Tiny, nearly massless planet on a circular equatorial orbit.
pub fn planet(name: &str, period: f64, phase: f64) -> Body {
    Body {
        name: name.to_string(),
        parent: Some("Sun".to_string()),
        mu_m3_s2: 1e-10,
        radius_m: 1e-3,
        default_parking_altitude_m: 1e-3,
        orbit: Some(
            Orbit::circular(radius_for_period(period, STAR_MU), phase, STAR_MU)
                .expect("circular orbit"),
        ),
    }
}

/// Inner (period 100) and outer (period 200) planets, both at phase 0 at UT 0.
pub fn inner_outer() -> (Body, Body) {
    (planet("Inner", 100.0, 0.0), planet("Outer", 200.0, 0.0))
}

pub fn inner_outer_spec() -> TransferSpec {
    let (inner, outer) = inner_outer();
    TransferSpec::new(inner, outer)
}

pub fn evaluator<E: Ephemeris>(ephemeris: E) -> TransferEvaluator<E> {
    TransferEvaluator::new(ephemeris, STAR_MU).expect("evaluator")
}

/// Fixed-geometry ephemeris: the origin sits still, and the destination sits on
/// top of it whenever `ut` falls inside the blackout interval.
#[derive(Debug, Clone, Copy)]
pub struct BlackoutEphemeris {
    pub origin: &'static str,
    pub start: f64,
    pub end: f64,
}

impl Ephemeris for BlackoutEphemeris {
    fn state_at(&self, body: &Body, ut: f64) -> Result<StateVector, EphemerisError> {
        let at_origin = StateVector {
            position_m: [1.0, 0.0, 0.0],
            velocity_m_s: [0.0, 1.0, 0.0],
        };
        if body.name == self.origin || (self.start..=self.end).contains(&ut) {
            Ok(at_origin)
        } else {
            Ok(StateVector {
                position_m: [0.0, 1.5, 0.0],
                velocity_m_s: [-0.8, 0.0, 0.0],
            })
        }
    }
}

pub fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
