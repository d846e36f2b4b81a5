use crate::constants::{REPORT_JSON, REPORT_TXT};
use crate::error::SimError;
use crate::report::CoverageReport;
use crate::sim::simulation::Simulation;
use crate::sim_op::{ensure_output_dir, SimOp, SimOpHandle};
use colored::Colorize;
use tracing::info;

/// Writes the text and JSON reports and prints a console summary
pub struct ReportOp {
    pub print_summary: bool,
}

impl ReportOp {
    pub fn handle() -> SimOpHandle {
        SimOpHandle::new(Box::new(ReportOp { print_summary: true }))
    }
}

impl SimOp for ReportOp {
    fn name(&self) -> &str {
        "ReportOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        ensure_output_dir(sim)
    }

    fn after_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        let coverage = sim.require_coverage(self.name())?;
        let engine = sim.engine_name.as_deref().unwrap_or("unknown");
        let report = CoverageReport::build(
            engine,
            &sim.config,
            sim.model.params.wall_attenuation_db,
            &sim.transmitters,
            coverage,
            sim.scene.as_ref(),
        );

        let txt = sim.output_path(REPORT_TXT);
        report.write_text(&txt, &sim.config.thresholds)?;
        let json = sim.output_path(REPORT_JSON);
        report.write_json(&json)?;
        info!("Reports written to {} and {}", txt.display(), json.display());

        if self.print_summary {
            let s = &report.statistics;
            println!("\n📊 {}", "Coverage summary".bold());
            println!("   🟢 Excellent: {:>5.1}%", s.excellent_pct);
            println!("   🟡 Good:      {:>5.1}%", s.good_pct);
            println!("   🟠 Fair:      {:>5.1}%", s.fair_pct);
            println!("   🔴 Poor:      {:>5.1}%", s.poor_pct);
            let usable = format!("{:.1}%", s.usable_pct);
            let usable = if s.usable_pct >= 80.0 { usable.green() } else { usable.yellow() };
            println!("   📶 Usable coverage: {}", usable);
            println!("   📉 Signal range: {:.1} to {:.1} dBm", s.min_dbm, s.max_dbm);
        }

        sim.artifacts.push(txt);
        sim.artifacts.push(json);
        Ok(())
    }
}
