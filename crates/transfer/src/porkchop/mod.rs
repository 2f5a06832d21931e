//! Porkchop grid engine: total delta-v over a (departure, travel time) raster.
//!
//! Cell (x, y) departs at `departure_min + x * x_resolution` and travels for
//! `travel_max - y * y_resolution`, so row 0 holds the longest transfers. Cells
//! whose Lambert arc cannot be solved are kept as invalid samples and excluded
//! from the statistics; only a window with no valid cell at all is an error.

pub mod palette;
mod statistics;

pub use palette::{Palette, Rgb};
pub use statistics::GridStatistics;

use thiserror::Error;
use twp_core::constants::MIN_DELTA_V;
use twp_ephemeris::Ephemeris;

use crate::evaluator::{TransferError, TransferEvaluator, TransferSpec};
use crate::window::{GridSize, WindowBounds};

/// Errors surfaced by a whole-grid computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid request: {0}")]
    InvalidRequest(String),
    #[error("no transfer found in the selected window")]
    NoSolutionInWindow,
    #[error("transfer evaluation failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Bounds and resolution of one grid computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRequest {
    pub bounds: WindowBounds,
    pub size: GridSize,
}

impl GridRequest {
    pub fn new(bounds: WindowBounds, size: GridSize) -> Self {
        Self { bounds, size }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(GridError::InvalidRequest(format!(
                "grid dimensions must be positive, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        if self.size.width.checked_mul(self.size.height).is_none() {
            return Err(GridError::InvalidRequest(format!(
                "grid of {}x{} cells is too large",
                self.size.width, self.size.height
            )));
        }
        self.bounds.validate().map_err(|err| match err {
            TransferError::InvalidRequest(msg) => GridError::InvalidRequest(msg),
            other => GridError::Transfer(other),
        })
    }

    /// Seconds between neighbouring departure columns.
    pub fn x_resolution(&self) -> f64 {
        resolution(self.bounds.departure_range(), self.size.width)
    }

    /// Seconds between neighbouring travel-time rows.
    pub fn y_resolution(&self) -> f64 {
        resolution(self.bounds.travel_range(), self.size.height)
    }

    /// (departure UT, travel time) sampled by cell (x, y).
    pub fn cell_times(&self, x: usize, y: usize) -> (f64, f64) {
        (
            self.bounds.departure_min + x as f64 * self.x_resolution(),
            self.bounds.travel_max - y as f64 * self.y_resolution(),
        )
    }
}

fn resolution(range: f64, cells: usize) -> f64 {
    if cells > 1 { range / (cells - 1) as f64 } else { 0.0 }
}

/// Completed porkchop raster. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct PorkchopGrid {
    request: GridRequest,
    delta_v: Vec<Option<f64>>,
    color_index: Vec<Option<usize>>,
    palette_size: usize,
    statistics: GridStatistics,
}

impl PorkchopGrid {
    pub fn request(&self) -> &GridRequest {
        &self.request
    }

    pub fn bounds(&self) -> &WindowBounds {
        &self.request.bounds
    }

    pub fn width(&self) -> usize {
        self.request.size.width
    }

    pub fn height(&self) -> usize {
        self.request.size.height
    }

    pub fn x_resolution(&self) -> f64 {
        self.request.x_resolution()
    }

    pub fn y_resolution(&self) -> f64 {
        self.request.y_resolution()
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    pub fn statistics(&self) -> &GridStatistics {
        &self.statistics
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width() && y < self.height()).then(|| y * self.width() + x)
    }

    /// Total delta-v of cell (x, y); `None` for invalid or out-of-range cells.
    pub fn delta_v(&self, x: usize, y: usize) -> Option<f64> {
        self.index(x, y).and_then(|i| self.delta_v[i])
    }

    /// Palette bucket of cell (x, y); `None` for invalid or out-of-range cells.
    pub fn color_index(&self, x: usize, y: usize) -> Option<usize> {
        self.index(x, y).and_then(|i| self.color_index[i])
    }

    /// Row-major cost values.
    pub fn delta_v_values(&self) -> &[Option<f64>] {
        &self.delta_v
    }

    /// Row-major palette indices.
    pub fn color_indices(&self) -> &[Option<usize>] {
        &self.color_index
    }

    pub fn cell_times(&self, x: usize, y: usize) -> (f64, f64) {
        self.request.cell_times(x, y)
    }

    /// Cell closest to a picked (departure, travel time) point, clamped to the grid.
    pub fn cell_nearest(&self, departure_ut: f64, travel_time_s: f64) -> (usize, usize) {
        let nearest = |offset: f64, step: f64, cells: usize| {
            if step <= 0.0 || !offset.is_finite() {
                return 0;
            }
            let idx = (offset / step).round();
            if idx <= 0.0 {
                0
            } else {
                (idx as usize).min(cells - 1)
            }
        };
        let bounds = self.bounds();
        (
            nearest(
                departure_ut - bounds.departure_min,
                self.x_resolution(),
                self.width(),
            ),
            nearest(
                bounds.travel_max - travel_time_s,
                self.y_resolution(),
                self.height(),
            ),
        )
    }

    /// Cell with the lowest total delta-v.
    pub fn best_cell(&self) -> (usize, usize) {
        self.statistics.min_cell
    }

    pub fn invalid_cells(&self) -> usize {
        self.statistics.invalid_count
    }
}

/// Evaluate every cell of `request` on the calling thread.
pub fn compute_grid<E: Ephemeris>(
    evaluator: &TransferEvaluator<E>,
    spec: &TransferSpec,
    request: &GridRequest,
    palette: &Palette,
) -> Result<PorkchopGrid, GridError> {
    compute_grid_with_progress(evaluator, spec, request, palette, |_| {})
}

/// As [`compute_grid`], calling `on_row` with the number of finished rows after each row.
pub fn compute_grid_with_progress<E, F>(
    evaluator: &TransferEvaluator<E>,
    spec: &TransferSpec,
    request: &GridRequest,
    palette: &Palette,
    mut on_row: F,
) -> Result<PorkchopGrid, GridError>
where
    E: Ephemeris,
    F: FnMut(usize),
{
    request.validate()?;
    if palette.is_empty() {
        return Err(GridError::InvalidRequest("palette has no colours".to_string()));
    }
    let probe = spec.request(request.bounds.departure_min, request.bounds.travel_min);
    evaluator.validate(&probe).map_err(|err| match err {
        TransferError::InvalidRequest(msg) => GridError::InvalidRequest(msg),
        other => GridError::Transfer(other),
    })?;

    let GridSize { width, height } = request.size;
    let mut delta_v = Vec::with_capacity(width * height);
    let mut stats = statistics::Accumulator::default();

    for y in 0..height {
        for x in 0..width {
            let (departure, travel) = request.cell_times(x, y);
            let cell = match evaluator.total_delta_v(&spec.request(departure, travel)) {
                Ok(dv) if dv.is_finite() => Some(dv.max(MIN_DELTA_V)),
                Ok(_) => None,
                Err(TransferError::NoConvergence(err)) => {
                    log::trace!("cell ({x}, {y}) invalid: {err}");
                    None
                }
                Err(err) => return Err(err.into()),
            };
            match cell {
                Some(dv) => stats.push(dv, (x, y)),
                None => stats.push_invalid(),
            }
            delta_v.push(cell);
        }
        on_row(y + 1);
    }

    let statistics = stats.finish().ok_or(GridError::NoSolutionInWindow)?;
    if statistics.invalid_count > 0 {
        log::warn!(
            "{} of {} porkchop cells have no transfer",
            statistics.invalid_count,
            width * height
        );
    }
    log::debug!(
        "porkchop {}x{}: min {:.3} at {:?}, max {:.3}, log range [{:.4}, {:.4}]",
        width,
        height,
        statistics.min,
        statistics.min_cell,
        statistics.max,
        statistics.log_min,
        statistics.log_max
    );

    let color_index = delta_v
        .iter()
        .map(|cell| cell.map(|dv| palette.bucket(statistics.normalize(dv))))
        .collect();

    Ok(PorkchopGrid {
        request: *request,
        delta_v,
        color_index,
        palette_size: palette.len(),
        statistics,
    })
}
