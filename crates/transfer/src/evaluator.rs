//! Transfer evaluation: ephemeris states + Lambert arc reduced to burns and geometry.

use std::f64::consts::FRAC_PI_2;

use thiserror::Error;
use twp_core::angle::{wrap_pi, wrap_two_pi};
use twp_core::vector::{Vector3, add, cross, dot, norm, scale, sub, unit};
use twp_ephemeris::{Body, Ephemeris, EphemerisError, SolarSystem, StateVector};
use twp_impulsive::lambert::{self, LambertError};
use twp_orbits::{capture_delta_v, escape_delta_v, hyperbolic_eccentricity};

/// Errors surfaced while evaluating a single transfer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("invalid transfer request: {0}")]
    InvalidRequest(String),
    /// The Lambert arc could not be solved for this sample.
    #[error("no lambert solution: {0}")]
    NoConvergence(LambertError),
    #[error("ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),
}

/// A single transfer query. Borrowed from a [`TransferSpec`] for each sample.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub origin: &'a Body,
    pub destination: &'a Body,
    pub departure_ut: f64,
    pub travel_time_s: f64,
    pub origin_parking_altitude_m: f64,
    /// `None` for a flyby: no insertion burn at the destination.
    pub destination_parking_altitude_m: Option<f64>,
}

/// Owned description of the transfer being searched; the fixed half of every request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSpec {
    pub origin: Body,
    pub destination: Body,
    pub origin_parking_altitude_m: f64,
    pub destination_parking_altitude_m: Option<f64>,
}

impl TransferSpec {
    /// Spec using each body's default parking altitude.
    pub fn new(origin: Body, destination: Body) -> Self {
        let origin_parking_altitude_m = origin.default_parking_altitude_m;
        let destination_parking_altitude_m = Some(destination.default_parking_altitude_m);
        Self {
            origin,
            destination,
            origin_parking_altitude_m,
            destination_parking_altitude_m,
        }
    }

    /// Override the parking altitudes; `None` at the destination plans a flyby.
    pub fn with_parking_altitudes(mut self, origin_m: f64, destination_m: Option<f64>) -> Self {
        self.origin_parking_altitude_m = origin_m;
        self.destination_parking_altitude_m = destination_m;
        self
    }

    pub fn request(&self, departure_ut: f64, travel_time_s: f64) -> TransferRequest<'_> {
        TransferRequest {
            origin: &self.origin,
            destination: &self.destination,
            departure_ut,
            travel_time_s,
            origin_parking_altitude_m: self.origin_parking_altitude_m,
            destination_parking_altitude_m: self.destination_parking_altitude_m,
        }
    }
}

/// Full geometry of one transfer. Built once per selection and never updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSolution {
    pub origin: String,
    pub destination: String,
    pub departure_ut: f64,
    pub travel_time_s: f64,
    pub arrival_ut: f64,
    pub long_way: bool,
    /// Angle swept about the parent, in (0, 2π).
    pub transfer_angle: f64,

    pub origin_velocity: Vector3,
    pub destination_velocity: Vector3,
    pub transfer_departure_velocity: Vector3,
    pub transfer_arrival_velocity: Vector3,

    /// Hyperbolic excess leaving the origin (parent frame).
    pub ejection_excess: Vector3,
    /// Hyperbolic excess arriving at the destination (parent frame).
    pub insertion_excess: Vector3,

    pub ejection_delta_v: f64,
    pub insertion_delta_v: f64,
    pub total_delta_v: f64,
    /// Ejection burn, split along the origin's prograde and orbit-normal directions.
    pub ejection_burn: Vector3,
    /// Insertion burn, opposing the arrival excess.
    pub insertion_burn: Vector3,
    pub ejection_dv_prograde: f64,
    pub ejection_dv_normal: f64,

    /// Burn point on the parking orbit, measured from the origin's prograde direction, in [0, 2π).
    pub ejection_angle: f64,
    pub ejection_inclination: f64,
    pub insertion_inclination: f64,
    pub ejection_heading: f64,
    /// Destination lead over the origin at departure, in (-π, π].
    pub phase_angle: f64,
}

/// Lambert arc between the two bodies plus the burns needed to ride it.
struct Leg {
    departure: StateVector,
    arrival: StateVector,
    long_way: bool,
    v1: Vector3,
    v2: Vector3,
    ejection_excess: Vector3,
    insertion_excess: Vector3,
    ejection_delta_v: f64,
    insertion_delta_v: f64,
}

/// Evaluates transfers between two bodies orbiting the same parent.
#[derive(Debug, Clone)]
pub struct TransferEvaluator<E> {
    ephemeris: E,
    central_mu: f64,
}

impl<E: Ephemeris> TransferEvaluator<E> {
    pub fn new(ephemeris: E, central_mu: f64) -> Result<Self, TransferError> {
        if !(central_mu.is_finite() && central_mu > 0.0) {
            return Err(TransferError::InvalidRequest(format!(
                "central gravitational parameter must be positive, got {central_mu}"
            )));
        }
        Ok(Self {
            ephemeris,
            central_mu,
        })
    }

    /// Evaluator for transfers around `origin`'s parent in `system`.
    pub fn for_origin(ephemeris: E, system: &SolarSystem, origin: &Body) -> Result<Self, TransferError> {
        let parent = system.parent_of(origin)?.ok_or_else(|| {
            TransferError::InvalidRequest(format!("`{}` does not orbit another body", origin.name))
        })?;
        Self::new(ephemeris, parent.mu_m3_s2)
    }

    pub fn central_mu(&self) -> f64 {
        self.central_mu
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Reject requests no transfer can satisfy.
    pub fn validate(&self, request: &TransferRequest<'_>) -> Result<(), TransferError> {
        if !request.departure_ut.is_finite() {
            return Err(TransferError::InvalidRequest(format!(
                "departure time must be finite, got {}",
                request.departure_ut
            )));
        }
        if !(request.travel_time_s.is_finite() && request.travel_time_s > 0.0) {
            return Err(TransferError::InvalidRequest(format!(
                "travel time must be positive, got {}",
                request.travel_time_s
            )));
        }
        if request.origin.name.eq_ignore_ascii_case(&request.destination.name) {
            return Err(TransferError::InvalidRequest(format!(
                "origin and destination are both `{}`",
                request.origin.name
            )));
        }
        let shared_parent = match (&request.origin.parent, &request.destination.parent) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        if !shared_parent {
            return Err(TransferError::InvalidRequest(format!(
                "`{}` and `{}` do not orbit the same body",
                request.origin.name, request.destination.name
            )));
        }
        for body in [request.origin, request.destination] {
            if !(body.mu_m3_s2.is_finite() && body.mu_m3_s2 > 0.0) {
                return Err(TransferError::InvalidRequest(format!(
                    "`{}` has non-positive gravitational parameter",
                    body.name
                )));
            }
        }
        if request.origin.parking_radius(request.origin_parking_altitude_m) <= 0.0 {
            return Err(TransferError::InvalidRequest(
                "origin parking orbit radius must be positive".to_string(),
            ));
        }
        if let Some(altitude) = request.destination_parking_altitude_m {
            if request.destination.parking_radius(altitude) <= 0.0 {
                return Err(TransferError::InvalidRequest(
                    "destination parking orbit radius must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Total delta-v (ejection + insertion) of the transfer; the porkchop cost metric.
    pub fn total_delta_v(&self, request: &TransferRequest<'_>) -> Result<f64, TransferError> {
        let leg = self.leg(request)?;
        Ok(leg.ejection_delta_v + leg.insertion_delta_v)
    }

    /// Evaluate the transfer with its full ejection and insertion geometry.
    pub fn solve(&self, request: &TransferRequest<'_>) -> Result<TransferSolution, TransferError> {
        let leg = self.leg(request)?;
        let origin_at_departure = leg.departure;
        let destination_at_departure = self
            .ephemeris
            .state_at(request.destination, request.departure_ut)?;

        let r1 = origin_at_departure.position_m;
        let prograde = unit(&origin_at_departure.velocity_m_s);
        let origin_normal = unit(&cross(&r1, &origin_at_departure.velocity_m_s));
        let destination_normal =
            unit(&cross(&leg.arrival.position_m, &leg.arrival.velocity_m_s));

        let ejection_inclination = out_of_plane_angle(&leg.ejection_excess, &origin_normal);
        let insertion_inclination = out_of_plane_angle(&leg.insertion_excess, &destination_normal);

        let ejection_dv_prograde = leg.ejection_delta_v * ejection_inclination.cos();
        let ejection_dv_normal = leg.ejection_delta_v * ejection_inclination.sin();
        let ejection_burn = add(
            &scale(&prograde, ejection_dv_prograde),
            &scale(&origin_normal, ejection_dv_normal),
        );
        let insertion_burn = scale(&unit(&leg.insertion_excess), -leg.insertion_delta_v);

        // The burn happens at periapsis, one asymptote angle before the excess direction.
        let vinf = norm(&leg.ejection_excess);
        let parking_radius = request
            .origin
            .parking_radius(request.origin_parking_altitude_m);
        let eccentricity = hyperbolic_eccentricity(request.origin.mu_m3_s2, parking_radius, vinf);
        let asymptote = (-1.0 / eccentricity).acos();
        let in_plane = dot(&leg.ejection_excess, &cross(&origin_normal, &prograde))
            .atan2(dot(&leg.ejection_excess, &prograde));
        let ejection_angle = wrap_two_pi(in_plane - asymptote);

        let r_dest = destination_at_departure.position_m;
        let phase_angle = wrap_pi(dot(&cross(&r1, &r_dest), &origin_normal).atan2(dot(&r1, &r_dest)));

        Ok(TransferSolution {
            origin: request.origin.name.clone(),
            destination: request.destination.name.clone(),
            departure_ut: request.departure_ut,
            travel_time_s: request.travel_time_s,
            arrival_ut: request.departure_ut + request.travel_time_s,
            long_way: leg.long_way,
            transfer_angle: lambert::transfer_angle(&r1, &leg.arrival.position_m, leg.long_way),
            origin_velocity: origin_at_departure.velocity_m_s,
            destination_velocity: leg.arrival.velocity_m_s,
            transfer_departure_velocity: leg.v1,
            transfer_arrival_velocity: leg.v2,
            ejection_excess: leg.ejection_excess,
            insertion_excess: leg.insertion_excess,
            ejection_delta_v: leg.ejection_delta_v,
            insertion_delta_v: leg.insertion_delta_v,
            total_delta_v: leg.ejection_delta_v + leg.insertion_delta_v,
            ejection_burn,
            insertion_burn,
            ejection_dv_prograde,
            ejection_dv_normal,
            ejection_angle,
            ejection_inclination,
            insertion_inclination,
            ejection_heading: wrap_two_pi(FRAC_PI_2 - ejection_inclination),
            phase_angle,
        })
    }

    fn leg(&self, request: &TransferRequest<'_>) -> Result<Leg, TransferError> {
        self.validate(request)?;
        let arrival_ut = request.departure_ut + request.travel_time_s;
        let departure = self.ephemeris.state_at(request.origin, request.departure_ut)?;
        let arrival = self.ephemeris.state_at(request.destination, arrival_ut)?;

        let r1 = departure.position_m;
        let r2 = arrival.position_m;
        let long_way = cross(&r1, &r2)[2] < 0.0;

        let arc = lambert::solve(self.central_mu, &r1, &r2, request.travel_time_s, long_way)
            .map_err(TransferError::NoConvergence)?;

        let ejection_excess = sub(&arc.v1, &departure.velocity_m_s);
        let insertion_excess = sub(&arc.v2, &arrival.velocity_m_s);

        let ejection_delta_v = escape_delta_v(
            request.origin.mu_m3_s2,
            request
                .origin
                .parking_radius(request.origin_parking_altitude_m),
            norm(&ejection_excess),
        );
        let insertion_delta_v = match request.destination_parking_altitude_m {
            Some(altitude) => capture_delta_v(
                request.destination.mu_m3_s2,
                request.destination.parking_radius(altitude),
                norm(&insertion_excess),
            ),
            None => 0.0,
        };

        Ok(Leg {
            departure,
            arrival,
            long_way,
            v1: arc.v1,
            v2: arc.v2,
            ejection_excess,
            insertion_excess,
            ejection_delta_v,
            insertion_delta_v,
        })
    }
}

/// Signed angle between `v` and the plane with unit normal `normal`.
fn out_of_plane_angle(v: &Vector3, normal: &Vector3) -> f64 {
    let magnitude = norm(v);
    if magnitude == 0.0 {
        return 0.0;
    }
    (dot(v, normal) / magnitude).clamp(-1.0, 1.0).asin()
}
