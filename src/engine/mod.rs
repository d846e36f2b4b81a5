//! Propagation engines.
//!
//! An engine turns transmitters and a grid into a [`CoverageMap`]. The
//! built-in [`EstimatorEngine`] runs the coarse path-loss model; the
//! [`ExternalRayTracer`] hands the job to an external ray-tracing program,
//! speaking the argument convention of whichever API generation its version
//! check detected.

mod estimator;
mod external;

pub use estimator::EstimatorEngine;
pub use external::{parse_version, ApiGeneration, ExternalRayTracer};

use crate::config::{EngineConfig, EngineKind};
use crate::coverage::CoverageMap;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::path_loss::PathLossEstimator;
use crate::transmitter::Transmitter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub trait PropagationEngine {
    /// Engine name for logs and reports
    fn name(&self) -> &str;

    /// Computes the full coverage map. Called once per run.
    fn compute(
        &mut self,
        transmitters: &[Transmitter],
        grid: &Grid,
        model: &PathLossEstimator,
    ) -> Result<CoverageMap, EngineError>;
}

/// Picks the engine for a run.
///
/// `External` fails if version detection fails; `Auto` falls back to the estimator.
pub fn select_engine(
    config: &EngineConfig,
    scene: Option<&Path>,
    work_dir: &Path,
) -> Result<Box<dyn PropagationEngine>, EngineError> {
    match config.kind {
        EngineKind::Estimator => Ok(Box::new(EstimatorEngine)),
        EngineKind::External => {
            let engine = ExternalRayTracer::detect(config, scene.map(PathBuf::from), work_dir)?;
            info!("Using external ray tracer {} ({:?})", engine.version(), engine.generation());
            Ok(Box::new(engine))
        }
        EngineKind::Auto => match ExternalRayTracer::detect(config, scene.map(PathBuf::from), work_dir) {
            Ok(engine) => {
                info!("Using external ray tracer {} ({:?})", engine.version(), engine.generation());
                Ok(Box::new(engine))
            }
            Err(e) => {
                warn!("{}; falling back to the built-in estimator", e);
                Ok(Box::new(EstimatorEngine))
            }
        },
    }
}
