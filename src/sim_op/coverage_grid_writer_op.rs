use crate::constants::COVERAGE_GRID_FILE;
use crate::error::SimError;
use crate::grid_csv::write_grid_csv;
use crate::sim::simulation::Simulation;
use crate::sim_op::{ensure_output_dir, SimOp, SimOpHandle};
use tracing::info;

/// Writes the coverage grid as plain CSV, one line per grid row
pub struct CoverageGridWriterOp {
    file_name: String,
}

impl CoverageGridWriterOp {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(COVERAGE_GRID_FILE)))
    }
}

impl SimOp for CoverageGridWriterOp {
    fn name(&self) -> &str {
        "CoverageGridWriterOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        ensure_output_dir(sim)
    }

    fn after_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        let path = sim.output_path(&self.file_name);
        let coverage = sim.require_coverage(self.name())?;
        write_grid_csv(&path, &coverage.grid, &coverage.signal_dbm).map_err(|e| SimError::io(&path, e))?;
        info!("Coverage grid written to {}", path.display());
        sim.artifacts.push(path);
        Ok(())
    }
}
