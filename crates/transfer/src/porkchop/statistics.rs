//! One-pass log-domain statistics used to colour a porkchop grid.

/// Summary of the valid cells of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub min: f64,
    pub min_cell: (usize, usize),
    pub max: f64,
    pub sum_log: f64,
    pub sum_log_sq: f64,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// ln(min).
    pub log_min: f64,
    /// Upper end of the colour scale: min(ln(max), mean + 2σ) of the log costs.
    pub log_max: f64,
}

impl GridStatistics {
    pub fn mean_log(&self) -> f64 {
        self.sum_log / self.valid_count as f64
    }

    pub fn stddev_log(&self) -> f64 {
        let mean = self.mean_log();
        (self.sum_log_sq / self.valid_count as f64 - mean * mean)
            .max(0.0)
            .sqrt()
    }

    /// Position of `delta_v` on the clamped log scale, in [0, 1].
    pub fn normalize(&self, delta_v: f64) -> f64 {
        let span = self.log_max - self.log_min;
        if !(span > 0.0) {
            return 0.0;
        }
        ((delta_v.ln() - self.log_min) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    min: Option<(f64, (usize, usize))>,
    max: f64,
    sum_log: f64,
    sum_log_sq: f64,
    valid: usize,
    invalid: usize,
}

impl Accumulator {
    pub(crate) fn push(&mut self, delta_v: f64, cell: (usize, usize)) {
        // Strict comparison keeps the first cell on ties.
        if self.min.is_none_or(|(min, _)| delta_v < min) {
            self.min = Some((delta_v, cell));
        }
        self.max = self.max.max(delta_v);
        let log = delta_v.ln();
        self.sum_log += log;
        self.sum_log_sq += log * log;
        self.valid += 1;
    }

    pub(crate) fn push_invalid(&mut self) {
        self.invalid += 1;
    }

    /// `None` when no valid cell was pushed.
    pub(crate) fn finish(self) -> Option<GridStatistics> {
        let (min, min_cell) = self.min?;
        let mut stats = GridStatistics {
            min,
            min_cell,
            max: self.max,
            sum_log: self.sum_log,
            sum_log_sq: self.sum_log_sq,
            valid_count: self.valid,
            invalid_count: self.invalid,
            log_min: min.ln(),
            log_max: 0.0,
        };
        stats.log_max = self
            .max
            .ln()
            .min(stats.mean_log() + 2.0 * stats.stddev_log());
        Some(stats)
    }
}
