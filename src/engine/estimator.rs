use super::PropagationEngine;
use crate::coverage::{self, CoverageMap};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::path_loss::PathLossEstimator;
use crate::transmitter::Transmitter;

/// Built-in engine: free-space loss plus stepped walls, best AP per cell.
/// Not a ray tracer; see [`crate::path_loss`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatorEngine;

impl PropagationEngine for EstimatorEngine {
    fn name(&self) -> &str {
        "estimator"
    }

    fn compute(
        &mut self,
        transmitters: &[Transmitter],
        grid: &Grid,
        model: &PathLossEstimator,
    ) -> Result<CoverageMap, EngineError> {
        Ok(coverage::aggregate(transmitters, grid, model))
    }
}
