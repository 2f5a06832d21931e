//! Default search windows seeded from the synodic period and Hohmann time of flight.

use twp_ephemeris::Body;
use twp_impulsive::transfers::hohmann_time_of_flight;

use crate::evaluator::TransferError;

/// Departure and travel-time ranges of a porkchop search (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBounds {
    pub departure_min: f64,
    pub departure_max: f64,
    pub travel_min: f64,
    pub travel_max: f64,
}

impl WindowBounds {
    pub fn new(
        departure_min: f64,
        departure_max: f64,
        travel_min: f64,
        travel_max: f64,
    ) -> Result<Self, TransferError> {
        let bounds = Self {
            departure_min,
            departure_max,
            travel_min,
            travel_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), TransferError> {
        let all_finite = [
            self.departure_min,
            self.departure_max,
            self.travel_min,
            self.travel_max,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(TransferError::InvalidRequest(format!(
                "window bounds must be finite: {self:?}"
            )));
        }
        if self.departure_max < self.departure_min {
            return Err(TransferError::InvalidRequest(format!(
                "departure window ends ({}) before it starts ({})",
                self.departure_max, self.departure_min
            )));
        }
        if self.travel_min <= 0.0 {
            return Err(TransferError::InvalidRequest(format!(
                "minimum travel time must be positive, got {}",
                self.travel_min
            )));
        }
        if self.travel_max < self.travel_min {
            return Err(TransferError::InvalidRequest(format!(
                "maximum travel time ({}) is below the minimum ({})",
                self.travel_max, self.travel_min
            )));
        }
        Ok(())
    }

    pub fn departure_range(&self) -> f64 {
        self.departure_max - self.departure_min
    }

    pub fn travel_range(&self) -> f64 {
        self.travel_max - self.travel_min
    }

    /// Same window with the departure range shifted to begin at `ut`.
    pub fn starting_at(&self, ut: f64) -> Self {
        Self {
            departure_min: ut,
            departure_max: ut + self.departure_range(),
            ..*self
        }
    }
}

/// Advisory default window together with the quantities it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEstimate {
    pub bounds: WindowBounds,
    pub synodic_period: f64,
    pub hohmann_time_of_flight: f64,
}

/// Estimate a default search window for transfers from `origin` to `destination`.
///
/// The departure range covers at most two synodic periods and never more than two
/// origin periods, starting at UT 0. The travel range brackets the Hohmann time of
/// flight between the bodies' semi-major axes.
pub fn estimate_default_window(
    origin: &Body,
    destination: &Body,
) -> Result<WindowEstimate, TransferError> {
    let origin_orbit = origin.orbit()?;
    let destination_orbit = destination.orbit()?;
    let shared_parent = match (&origin.parent, &destination.parent) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    if !shared_parent {
        return Err(TransferError::InvalidRequest(format!(
            "`{}` and `{}` do not orbit the same body",
            origin.name, destination.name
        )));
    }

    let origin_period = origin_orbit.period();
    let destination_period = destination_orbit.period();
    // Equal periods never realign; fall back to the origin-period cap.
    let synodic_period = (1.0 / (1.0 / destination_period - 1.0 / origin_period)).abs();
    let departure_range = (2.0 * synodic_period).min(2.0 * origin_period);

    let hohmann = hohmann_time_of_flight(
        origin_orbit.semi_major_axis_m,
        destination_orbit.semi_major_axis_m,
        origin_orbit.mu_m3_s2,
    );
    let travel_min = (hohmann - destination_period).max(hohmann / 2.0);
    let travel_max = travel_min + (2.0 * destination_period).min(hohmann);

    log::debug!(
        "default window {} -> {}: synodic {:.1}s, hohmann {:.1}s",
        origin.name,
        destination.name,
        synodic_period,
        hohmann
    );

    Ok(WindowEstimate {
        bounds: WindowBounds::new(0.0, departure_range, travel_min, travel_max)?,
        synodic_period,
        hohmann_time_of_flight: hohmann,
    })
}

/// Porkchop grid dimensions (cells along departure and travel axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Size the grid so each axis carries a fixed number of samples per day.
    pub fn from_points_per_day(
        bounds: &WindowBounds,
        departure_points_per_day: f64,
        travel_points_per_day: f64,
        seconds_per_day: f64,
    ) -> Self {
        let cells = |range: f64, per_day: f64| {
            ((range / seconds_per_day * per_day).floor() as usize).saturating_add(1)
        };
        Self {
            width: cells(bounds.departure_range(), departure_points_per_day),
            height: cells(bounds.travel_range(), travel_points_per_day),
        }
    }
}
