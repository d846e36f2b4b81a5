use crate::engine::PropagationEngine;
use crate::error::SimError;
use crate::sim::simulation::Simulation;
use crate::sim_op::{SimOp, SimOpHandle};
use tracing::info;

/// Runs the propagation engine once and publishes the finished coverage map.
pub struct CoverageOp {
    engine: Box<dyn PropagationEngine>,
}

impl CoverageOp {
    pub fn new(engine: Box<dyn PropagationEngine>) -> Self {
        Self { engine }
    }

    pub fn handle(engine: Box<dyn PropagationEngine>) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(engine)))
    }
}

impl SimOp for CoverageOp {
    fn name(&self) -> &str {
        "CoverageOp"
    }

    fn update_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        info!(
            "Computing coverage with '{}' over {} cells",
            self.engine.name(),
            sim.grid.len()
        );
        let coverage = self.engine.compute(&sim.transmitters, &sim.grid, &sim.model)?;
        sim.coverage = Some(coverage);
        sim.engine_name = Some(self.engine.name().to_string());
        Ok(())
    }
}
