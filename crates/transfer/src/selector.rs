//! Turn a grid cell back into a full transfer solution.
//!
//! The grid only stores scalar costs; the geometry is recomputed for the one
//! cell the caller picks.

use twp_ephemeris::Ephemeris;

use crate::evaluator::{TransferError, TransferEvaluator, TransferSolution, TransferSpec};
use crate::porkchop::PorkchopGrid;

/// Full solution at cell (x, y).
pub fn select_at<E: Ephemeris>(
    evaluator: &TransferEvaluator<E>,
    spec: &TransferSpec,
    grid: &PorkchopGrid,
    x: usize,
    y: usize,
) -> Result<TransferSolution, TransferError> {
    if x >= grid.width() || y >= grid.height() {
        return Err(TransferError::InvalidRequest(format!(
            "cell ({x}, {y}) outside {}x{} grid",
            grid.width(),
            grid.height()
        )));
    }
    let (departure, travel) = grid.cell_times(x, y);
    evaluator.solve(&spec.request(departure, travel))
}

/// Full solution at the grid's cheapest cell.
pub fn select_best<E: Ephemeris>(
    evaluator: &TransferEvaluator<E>,
    spec: &TransferSpec,
    grid: &PorkchopGrid,
) -> Result<TransferSolution, TransferError> {
    let (x, y) = grid.best_cell();
    select_at(evaluator, spec, grid, x, y)
}

/// Coarse-to-fine search around cell (x, y), kept inside the grid's window.
///
/// Each pass samples a 5x5 neighbourhood at the current step (one grid
/// resolution at first) and halves the step around the cheapest point. The
/// result is never more expensive than the starting cell.
pub fn refine<E: Ephemeris>(
    evaluator: &TransferEvaluator<E>,
    spec: &TransferSpec,
    grid: &PorkchopGrid,
    x: usize,
    y: usize,
    passes: usize,
) -> Result<TransferSolution, TransferError> {
    let start = select_at(evaluator, spec, grid, x, y)?;
    let bounds = grid.bounds();

    let mut best = (start.departure_ut, start.travel_time_s, start.total_delta_v);
    let mut step_departure = grid.x_resolution();
    let mut step_travel = grid.y_resolution();

    for pass in 0..passes {
        let (center_departure, center_travel, _) = best;
        for i in -2..=2 {
            for j in -2..=2 {
                if i == 0 && j == 0 {
                    continue;
                }
                let departure = (center_departure + i as f64 * step_departure)
                    .clamp(bounds.departure_min, bounds.departure_max);
                let travel = (center_travel + j as f64 * step_travel)
                    .clamp(bounds.travel_min, bounds.travel_max);
                match evaluator.total_delta_v(&spec.request(departure, travel)) {
                    Ok(dv) if dv.is_finite() && dv < best.2 => best = (departure, travel, dv),
                    Ok(_) | Err(TransferError::NoConvergence(_)) => {}
                    Err(err) => return Err(err),
                }
            }
        }
        log::debug!(
            "refine pass {}: departure {:.1}s, travel {:.1}s, {:.3} m/s",
            pass + 1,
            best.0,
            best.1,
            best.2
        );
        step_departure /= 2.0;
        step_travel /= 2.0;
    }

    if best.0 == start.departure_ut && best.1 == start.travel_time_s {
        return Ok(start);
    }
    evaluator.solve(&spec.request(best.0, best.1))
}
