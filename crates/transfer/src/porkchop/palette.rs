//! Colour ramp used to bucket normalised porkchop costs.

use crate::porkchop::GridError;

/// RGB triple.
pub type Rgb = [u8; 3];

/// Stops of the default ramp: blue, cyan, green, yellow, red.
pub const PORKCHOP_STOPS: [Rgb; 5] = [
    [0, 0, 255],
    [0, 255, 255],
    [0, 255, 0],
    [255, 255, 0],
    [255, 0, 0],
];

const DEFAULT_STEPS_PER_SEGMENT: usize = 64;

/// Ordered colour buckets; index 0 is the cheapest transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// The default multi-segment hue ramp.
    pub fn porkchop() -> Self {
        Self::linear(&PORKCHOP_STOPS, DEFAULT_STEPS_PER_SEGMENT)
    }

    /// Linear ramp through `stops`, with `steps_per_segment` colours between consecutive stops.
    pub fn from_stops(stops: &[Rgb], steps_per_segment: usize) -> Result<Self, GridError> {
        if stops.len() < 2 || steps_per_segment == 0 {
            return Err(GridError::InvalidRequest(format!(
                "palette needs at least two stops and one step, got {} stops and {} steps",
                stops.len(),
                steps_per_segment
            )));
        }
        Ok(Self::linear(stops, steps_per_segment))
    }

    fn linear(stops: &[Rgb], steps: usize) -> Self {
        let mut colors = Vec::with_capacity((stops.len() - 1) * steps + 1);
        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            for step in 0..steps {
                let t = step as f64 / steps as f64;
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
                colors.push([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])]);
            }
        }
        if let Some(last) = stops.last() {
            colors.push(*last);
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Bucket index for a normalised value in [0, 1].
    pub fn bucket(&self, normalized: f64) -> usize {
        bucket_index(normalized, self.colors.len())
    }
}

/// `min(floor(normalized * size), size - 1)`, with the input clamped to [0, 1].
pub fn bucket_index(normalized: f64, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let n = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
    ((n * size as f64).floor() as usize).min(size - 1)
}
