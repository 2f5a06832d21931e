//! Ephemeris queries over a read-only snapshot of orbiting bodies.
//!
//! Bodies carry their gravitational parameter and, except for the root star,
//! Keplerian elements about their parent. An [`Ephemeris`] turns a body and a
//! universal time into a parent-relative state vector.

use std::sync::Arc;

use thiserror::Error;
use twp_core::vector::Vector3;
use twp_orbits::{Orbit, OrbitError};

pub mod system;

pub use system::SolarSystem;

/// Position and velocity of a body relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_m: Vector3,
    pub velocity_m_s: Vector3,
}

/// An orbiting (or root) body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Name of the body this one orbits; `None` for the root star.
    pub parent: Option<String>,
    pub mu_m3_s2: f64,
    pub radius_m: f64,
    pub default_parking_altitude_m: f64,
    pub orbit: Option<Orbit>,
}

impl Body {
    /// Radius of a circular parking orbit at `altitude_m`.
    pub fn parking_radius(&self, altitude_m: f64) -> f64 {
        self.radius_m + altitude_m
    }

    /// The body's orbit, or an error for the root star.
    pub fn orbit(&self) -> Result<&Orbit, EphemerisError> {
        self.orbit
            .as_ref()
            .ok_or_else(|| EphemerisError::MissingOrbit(self.name.clone()))
    }
}

/// Errors surfaced while querying body states.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error("body `{0}` has no orbit")]
    MissingOrbit(String),
    #[error("orbit evaluation failed: {0}")]
    Orbit(#[from] OrbitError),
}

/// Source of parent-relative body states.
pub trait Ephemeris {
    /// State of `body` relative to its parent at `ut` (seconds).
    fn state_at(&self, body: &Body, ut: f64) -> Result<StateVector, EphemerisError>;
}

impl<T: Ephemeris + ?Sized> Ephemeris for &T {
    fn state_at(&self, body: &Body, ut: f64) -> Result<StateVector, EphemerisError> {
        (**self).state_at(body, ut)
    }
}

impl<T: Ephemeris + ?Sized> Ephemeris for Arc<T> {
    fn state_at(&self, body: &Body, ut: f64) -> Result<StateVector, EphemerisError> {
        (**self).state_at(body, ut)
    }
}

/// Analytic two-body ephemeris evaluated from each body's own elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeplerianEphemeris;

impl Ephemeris for KeplerianEphemeris {
    fn state_at(&self, body: &Body, ut: f64) -> Result<StateVector, EphemerisError> {
        let (position_m, velocity_m_s) = body.orbit()?.state_at(ut)?;
        Ok(StateVector {
            position_m,
            velocity_m_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_body_has_no_state() {
        let star = Body {
            name: "Kerbol".to_string(),
            parent: None,
            mu_m3_s2: 1.172_332_8e18,
            radius_m: 261_600_000.0,
            default_parking_altitude_m: 0.0,
            orbit: None,
        };
        assert_eq!(
            KeplerianEphemeris.state_at(&star, 0.0),
            Err(EphemerisError::MissingOrbit("Kerbol".to_string()))
        );
    }
}
