//! Best-AP coverage aggregation.
//!
//! Every grid cell keeps the strongest estimate over all transmitters and the
//! index of the transmitter providing it. This models a client associating
//! with the best AP; signals are never summed or averaged.

use crate::grid::Grid;
use crate::path_loss::PathLossEstimator;
use crate::transmitter::Transmitter;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMap {
    pub grid: Grid,
    /// Best received power per cell (dBm), row-major
    pub signal_dbm: Vec<f64>,
    /// Index into the transmitter list of the winning AP per cell
    pub best_tx: Vec<usize>,
}

impl CoverageMap {
    /// Assembles a map from precomputed cell values.
    ///
    /// Returns `None` when either vector does not match the grid size.
    pub fn from_parts(grid: Grid, signal_dbm: Vec<f64>, best_tx: Vec<usize>) -> Option<Self> {
        if signal_dbm.len() != grid.len() || best_tx.len() != grid.len() {
            return None;
        }
        Some(Self {
            grid,
            signal_dbm,
            best_tx,
        })
    }

    pub fn signal_at(&self, ix: usize, iy: usize) -> f64 {
        self.signal_dbm[self.grid.index(ix, iy)]
    }

    pub fn best_tx_at(&self, ix: usize, iy: usize) -> usize {
        self.best_tx[self.grid.index(ix, iy)]
    }

    /// Winner at the sample point nearest to `(x, y)`
    pub fn best_tx_near(&self, x: f64, y: f64) -> usize {
        self.best_tx[self.grid.nearest_index(x, y)]
    }

    /// Number of cells each transmitter wins
    pub fn cells_per_transmitter(&self, transmitter_count: usize) -> Vec<usize> {
        let mut counts = vec![0; transmitter_count];
        for &winner in &self.best_tx {
            if let Some(slot) = counts.get_mut(winner) {
                *slot += 1;
            }
        }
        counts
    }
}

/// Builds the coverage map for `transmitters` over `grid`.
///
/// Ties keep the transmitter that appears first in `transmitters`, so the
/// result depends only on the input order, never on evaluation order.
/// An empty transmitter list yields a map of `-inf` with winner index 0.
pub fn aggregate(transmitters: &[Transmitter], grid: &Grid, estimator: &PathLossEstimator) -> CoverageMap {
    let mut signal_dbm = vec![f64::NEG_INFINITY; grid.len()];
    let mut best_tx = vec![0usize; grid.len()];

    for (tx_index, tx) in transmitters.iter().enumerate() {
        debug!(name = tx.name(), "processing transmitter");
        let position = tx.position();
        for iy in 0..grid.ny {
            let y = grid.y_at(iy);
            for ix in 0..grid.nx {
                let cell = grid.index(ix, iy);
                let received = estimator.received_dbm_at(position, grid.x_at(ix), y);
                if received > signal_dbm[cell] {
                    signal_dbm[cell] = received;
                    best_tx[cell] = tx_index;
                }
            }
        }
    }

    CoverageMap {
        grid: grid.clone(),
        signal_dbm,
        best_tx,
    }
}

/// Received power from a single transmitter over the grid (row-major dBm).
pub fn single_source(tx: &Transmitter, grid: &Grid, estimator: &PathLossEstimator) -> Vec<f64> {
    let position = tx.position();
    (0..grid.len())
        .map(|cell| {
            let (x, y) = grid.point(cell);
            estimator.received_dbm_at(position, x, y)
        })
        .collect()
}
