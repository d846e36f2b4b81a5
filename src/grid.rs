use crate::transmitter::{Bounds, Transmitter};
use serde::Serialize;

/// Regular lattice of sample points over a rectangle.
///
/// Sample points start at the minimum corner and step by `resolution_m`
/// while strictly below the maximum, so each axis holds
/// `ceil(extent / resolution)` points (at least one). Cells are stored
/// row-major with `y` as the outer index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub bounds: Bounds,
    pub resolution_m: f64,
    pub nx: usize,
    pub ny: usize,
}

// float slack so 60.0 / 0.1 does not produce an extra column
const AXIS_EPSILON: f64 = 1e-9;

fn axis_len(extent: f64, resolution: f64) -> usize {
    let steps = (extent / resolution - AXIS_EPSILON).ceil();
    if steps >= 1.0 {
        // saturates at usize::MAX for huge or infinite extents
        steps as usize
    } else {
        1
    }
}

impl Grid {
    /// Builds a grid over explicit bounds. `resolution_m` must be positive.
    pub fn new(bounds: Bounds, resolution_m: f64) -> Self {
        Self {
            bounds,
            resolution_m,
            nx: axis_len(bounds.width(), resolution_m),
            ny: axis_len(bounds.height(), resolution_m),
        }
    }

    /// Grid over the transmitters' x/y bounding box expanded by `margin_m`
    pub fn around_transmitters(
        transmitters: &[Transmitter],
        margin_m: f64,
        resolution_m: f64,
    ) -> Option<Self> {
        Bounds::of_transmitters(transmitters)
            .map(|b| Grid::new(b.expanded(margin_m), resolution_m))
    }

    /// Cell count, saturating at `usize::MAX`; see [`Grid::cell_count`]
    pub fn len(&self) -> usize {
        self.nx.saturating_mul(self.ny)
    }

    /// Cell count, or `None` when `nx * ny` does not fit in a `usize`
    pub fn cell_count(&self) -> Option<usize> {
        self.nx.checked_mul(self.ny)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    pub fn x_at(&self, ix: usize) -> f64 {
        self.bounds.x_min + ix as f64 * self.resolution_m
    }

    pub fn y_at(&self, iy: usize) -> f64 {
        self.bounds.y_min + iy as f64 * self.resolution_m
    }

    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    /// Sample point of a flat cell index
    pub fn point(&self, index: usize) -> (f64, f64) {
        (self.x_at(index % self.nx), self.y_at(index / self.nx))
    }

    /// Flat index of the sample point nearest to `(x, y)`, clamped to the grid
    pub fn nearest_index(&self, x: f64, y: f64) -> usize {
        let clamp_axis = |v: f64, min: f64, n: usize| -> usize {
            let i = ((v - min) / self.resolution_m).round();
            if i <= 0.0 {
                0
            } else {
                (i as usize).min(n - 1)
            }
        };
        let ix = clamp_axis(x, self.bounds.x_min, self.nx);
        let iy = clamp_axis(y, self.bounds.y_min, self.ny);
        self.index(ix, iy)
    }
}
