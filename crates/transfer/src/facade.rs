//! Re-exported APIs for consumers of the transfer crate.

pub use crate::evaluator::{
    TransferError, TransferEvaluator, TransferRequest, TransferSolution, TransferSpec,
};
pub use crate::porkchop::{
    GridError, GridRequest, GridStatistics, Palette, PorkchopGrid, compute_grid,
    compute_grid_with_progress,
};
pub use crate::selector::{refine, select_at, select_best};
pub use crate::window::{GridSize, WindowBounds, WindowEstimate, estimate_default_window};
pub use crate::worker::{PorkchopJob, PorkchopWorker, WorkerError, WorkerState};
pub use twp_ephemeris::{Body, Ephemeris, KeplerianEphemeris, SolarSystem, StateVector};

pub mod catalog {
    use std::collections::HashSet;

    use twp_config::{BodyConfig, OrbitConfig};
    use twp_core::units::deg_to_rad;
    use twp_ephemeris::{Body, SolarSystem};
    use twp_orbits::{Orbit, OrbitError};
    use thiserror::Error;

    /// Errors surfaced when turning catalog records into a runtime system.
    #[derive(Debug, Error)]
    pub enum CatalogError {
        #[error("body '{0}' appears more than once in the catalog")]
        DuplicateBody(String),
        #[error("body '{body}' orbits unknown parent '{parent}'")]
        UnknownParent { body: String, parent: String },
        #[error("body '{0}' has a non-positive gravitational parameter")]
        InvalidMu(String),
        #[error("body '{0}' has orbital elements but no parent")]
        OrbitWithoutParent(String),
        #[error("body '{0}' has a parent but no orbital elements")]
        MissingOrbit(String),
        #[error("invalid orbit for '{body}': {source}")]
        Orbit { body: String, source: OrbitError },
    }

    /// Build a read-only [`SolarSystem`] from catalog records.
    pub fn from_configs(configs: &[BodyConfig]) -> Result<SolarSystem, CatalogError> {
        let mut seen = HashSet::new();
        for config in configs {
            if !seen.insert(config.name.to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateBody(config.name.clone()));
            }
            if !(config.mu_m3_s2.is_finite() && config.mu_m3_s2 > 0.0) {
                return Err(CatalogError::InvalidMu(config.name.clone()));
            }
        }

        let mut bodies = Vec::with_capacity(configs.len());
        for config in configs {
            let orbit = match (&config.parent, &config.orbit) {
                (None, Some(_)) => return Err(CatalogError::OrbitWithoutParent(config.name.clone())),
                (None, None) => None,
                (Some(_), None) => return Err(CatalogError::MissingOrbit(config.name.clone())),
                (Some(parent), Some(elements)) => {
                    let primary = configs
                        .iter()
                        .find(|c| c.name.eq_ignore_ascii_case(parent))
                        .ok_or_else(|| CatalogError::UnknownParent {
                            body: config.name.clone(),
                            parent: parent.clone(),
                        })?;
                    Some(orbit_from_config(elements, primary.mu_m3_s2).map_err(|source| {
                        CatalogError::Orbit {
                            body: config.name.clone(),
                            source,
                        }
                    })?)
                }
            };
            bodies.push(Body {
                name: config.name.clone(),
                parent: config.parent.clone(),
                mu_m3_s2: config.mu_m3_s2,
                radius_m: config.radius_m,
                default_parking_altitude_m: config.default_parking_altitude_m,
                orbit,
            });
        }
        Ok(SolarSystem::new(bodies))
    }

    fn orbit_from_config(config: &OrbitConfig, parent_mu: f64) -> Result<Orbit, OrbitError> {
        Orbit::new(
            config.semi_major_axis_m,
            config.eccentricity,
            deg_to_rad(config.inclination_deg),
            deg_to_rad(config.longitude_of_ascending_node_deg),
            deg_to_rad(config.argument_of_periapsis_deg),
            config.mean_anomaly_at_epoch_rad,
            config.epoch_ut,
            parent_mu,
        )
    }
}

pub mod planner {
    use twp_config::PlannerConfig;

    use crate::porkchop::{GridError, Palette};
    use crate::window::{GridSize, WindowBounds};

    /// Palette described by the planner settings; the default ramp when no stops are given.
    pub fn palette(config: &PlannerConfig) -> Result<Palette, GridError> {
        match &config.palette_stops {
            Some(stops) => Palette::from_stops(stops, config.palette_steps),
            None => Palette::from_stops(&crate::porkchop::palette::PORKCHOP_STOPS, config.palette_steps),
        }
    }

    /// Grid dimensions for `bounds`: fixed plot size, or sampled per day when configured.
    pub fn grid_size(config: &PlannerConfig, bounds: &WindowBounds) -> GridSize {
        match config.points_per_day {
            Some(ppd) => GridSize::from_points_per_day(bounds, ppd, ppd, config.seconds_per_day),
            None => GridSize::new(config.plot_width, config.plot_height),
        }
    }
}
