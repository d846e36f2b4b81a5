use crate::constants::{AP_ZONES_PNG, COVERAGE_MAP_PNG, INDIVIDUAL_COVERAGE_PNG};
use crate::coverage::single_source;
use crate::error::SimError;
use crate::heat_map_png::{save_png, HeatMapRenderer};
use crate::sim::simulation::Simulation;
use crate::sim_op::{ensure_output_dir, SimOp, SimOpHandle};
use tracing::info;

/// Renders the signal map, the AP zone map and the per-AP panels.
///
/// Per-AP panels always come from the built-in estimator, whatever engine
/// produced the combined map.
pub struct HeatMapOp;

impl HeatMapOp {
    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(HeatMapOp))
    }
}

impl SimOp for HeatMapOp {
    fn name(&self) -> &str {
        "HeatMapOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        ensure_output_dir(sim)
    }

    fn after_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        let coverage = sim.require_coverage(self.name())?;
        let renderer = HeatMapRenderer::new(&coverage.grid, &sim.config.image);

        let signal = renderer.render_signal(coverage, &sim.transmitters);
        let zones = renderer.render_zones(coverage, &sim.transmitters, sim.config.thresholds.zone_mask_dbm);
        let panels: Vec<Vec<f64>> = sim
            .transmitters
            .iter()
            .map(|tx| single_source(tx, &coverage.grid, &sim.model))
            .collect();
        let individual = renderer.render_panels(&panels, &sim.transmitters);

        for (file, image) in [
            (COVERAGE_MAP_PNG, &signal),
            (AP_ZONES_PNG, &zones),
            (INDIVIDUAL_COVERAGE_PNG, &individual),
        ] {
            let path = sim.output_path(file);
            save_png(image, &path)?;
            info!("Saved {}", path.display());
            sim.artifacts.push(path);
        }
        Ok(())
    }
}
