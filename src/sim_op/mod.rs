// Operators for a coverage run, in pipeline order
pub mod coverage_op;
pub mod coverage_grid_writer_op;
pub mod heat_map_op;
pub mod report_op;

pub use coverage_op::CoverageOp;
pub use coverage_grid_writer_op::CoverageGridWriterOp;
pub use heat_map_op::HeatMapOp;
pub use report_op::ReportOp;

use crate::error::SimError;
use crate::sim::simulation::Simulation;
use std::fs;

pub trait SimOp {
    /// The name of this operator (for identification and lookup)
    fn name(&self) -> &str;

    /// Called once before any update
    fn init_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }

    /// Called once per run, after every operator's init
    fn update_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }

    /// Called once at the end of the run
    fn after_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }
}

pub struct SimOpHandle {
    pub op: Box<dyn SimOp>,
}

impl SimOpHandle {
    pub fn new(op: Box<dyn SimOp>) -> Self {
        SimOpHandle { op }
    }
}

/// The standard pipeline after the coverage operator: grid data, PNGs, reports
pub fn output_ops() -> Vec<SimOpHandle> {
    vec![
        CoverageGridWriterOp::handle(),
        HeatMapOp::handle(),
        ReportOp::handle(),
    ]
}

/// Creates the output directory; shared by the writer operators
pub(crate) fn ensure_output_dir(sim: &Simulation) -> Result<(), SimError> {
    fs::create_dir_all(sim.output_dir()).map_err(|e| SimError::io(sim.output_dir(), e))
}
