use crate::config::{GridExtent, SimConfig};
use crate::constants::MAX_GRID_CELLS;
use crate::coverage::CoverageMap;
use crate::error::SimError;
use crate::grid::Grid;
use crate::path_loss::PathLossEstimator;
use crate::scene::{self, SceneDescriptor};
use crate::sim_op::{SimOp, SimOpHandle};
use crate::transmitter::Transmitter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct OpTiming {
    pub op_name: String,
    pub init_time: Duration,
    pub update_time: Duration,
    pub after_time: Duration,
}

impl OpTiming {
    pub fn new(op_name: String) -> Self {
        Self {
            op_name,
            init_time: Duration::ZERO,
            update_time: Duration::ZERO,
            after_time: Duration::ZERO,
        }
    }

    pub fn total_time(&self) -> Duration {
        self.init_time + self.update_time + self.after_time
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Init,
    Update,
    After,
}

/// One coverage run: inputs, derived grid and model, and the ordered operators
/// that compute and publish the coverage map.
pub struct Simulation {
    pub name: String,
    pub config: SimConfig,
    pub transmitters: Vec<Transmitter>,
    pub scene: Option<SceneDescriptor>,
    pub grid: Grid,
    pub model: PathLossEstimator,
    pub output_dir: PathBuf,
    /// Set once by the coverage operator; never partially filled
    pub coverage: Option<CoverageMap>,
    pub engine_name: Option<String>,
    /// Files written by operators, in order
    pub artifacts: Vec<PathBuf>,
    pub ops: Vec<Box<dyn SimOp>>,
    pub op_timings: Vec<OpTiming>,
    has_run: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("transmitters", &self.transmitters)
            .field("scene", &self.scene)
            .field("grid", &self.grid)
            .field("model", &self.model)
            .field("output_dir", &self.output_dir)
            .field("coverage", &self.coverage)
            .field("engine_name", &self.engine_name)
            .field("artifacts", &self.artifacts)
            .field("op_timings", &self.op_timings)
            .field("has_run", &self.has_run)
            .finish_non_exhaustive()
    }
}

pub struct SimProps {
    pub name: String,
    pub config: SimConfig,
    pub transmitters: Vec<Transmitter>,
    pub scene: Option<SceneDescriptor>,
    pub output_dir: PathBuf,
    pub ops: Vec<SimOpHandle>,
}

/// Grid for a run, following `config.grid_extent`.
///
/// Grids above [`MAX_GRID_CELLS`] are rejected before anything is allocated.
pub fn grid_for(
    config: &SimConfig,
    transmitters: &[Transmitter],
    scene: Option<&SceneDescriptor>,
) -> Result<Grid, SimError> {
    let grid = match config.grid_extent {
        GridExtent::Transmitters => {
            Grid::around_transmitters(transmitters, config.grid_margin_m, config.grid_resolution_m)
                .ok_or(SimError::NoTransmitters)?
        }
        GridExtent::Scene => {
            let bounds = scene.map_or_else(scene::default_bounds, |s| s.bounds);
            Grid::new(bounds, config.grid_resolution_m)
        }
    };
    match grid.cell_count() {
        Some(0) => Err(SimError::EmptyGrid),
        Some(cells) if cells <= MAX_GRID_CELLS => Ok(grid),
        _ => Err(SimError::GridTooLarge {
            nx: grid.nx,
            ny: grid.ny,
            max: MAX_GRID_CELLS,
        }),
    }
}

impl Simulation {
    pub fn new(props: SimProps) -> Result<Simulation, SimError> {
        if props.transmitters.is_empty() {
            return Err(SimError::NoTransmitters);
        }
        props.config.validate()?;

        let grid = grid_for(&props.config, &props.transmitters, props.scene.as_ref())?;
        let model = PathLossEstimator::new(
            props.config.radio(),
            props.config.path_loss_params(props.scene.as_ref()),
        );
        let ops: Vec<Box<dyn SimOp>> = props.ops.into_iter().map(|handle| handle.op).collect();
        let op_timings = ops
            .iter()
            .map(|op| OpTiming::new(op.name().to_string()))
            .collect();

        info!(
            "Simulation '{}': {} transmitters, {}x{} grid at {} m, wall loss {} dB",
            props.name,
            props.transmitters.len(),
            grid.nx,
            grid.ny,
            grid.resolution_m,
            model.params.wall_attenuation_db
        );

        Ok(Simulation {
            name: props.name,
            config: props.config,
            transmitters: props.transmitters,
            scene: props.scene,
            grid,
            model,
            output_dir: props.output_dir,
            coverage: None,
            engine_name: None,
            artifacts: Vec::new(),
            ops,
            op_timings,
            has_run: false,
        })
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Coverage map, or `MissingCoverage` naming the operator that asked
    pub fn require_coverage(&self, op_name: &str) -> Result<&CoverageMap, SimError> {
        self.coverage
            .as_ref()
            .ok_or_else(|| SimError::MissingCoverage(op_name.to_string()))
    }

    /// Runs every operator through init, a single update, then after.
    ///
    /// A simulation runs at most once. The first operator error stops the run.
    pub fn run(&mut self) -> Result<(), SimError> {
        if self.has_run {
            return Err(SimError::AlreadyRun(self.name.clone()));
        }
        self.has_run = true;

        self.run_phase(Phase::Init)?;
        self.run_phase(Phase::Update)?;
        self.run_phase(Phase::After)?;
        self.log_timing_report();
        Ok(())
    }

    fn run_phase(&mut self, phase: Phase) -> Result<(), SimError> {
        let mut ops = std::mem::take(&mut self.ops);
        let mut result = Ok(());

        for (i, op) in ops.iter_mut().enumerate() {
            let start = Instant::now();
            result = match phase {
                Phase::Init => op.init_sim(self),
                Phase::Update => op.update_sim(self),
                Phase::After => op.after_sim(self),
            };
            let elapsed = start.elapsed();
            let timing = &mut self.op_timings[i];
            match phase {
                Phase::Init => timing.init_time = elapsed,
                Phase::Update => timing.update_time = elapsed,
                Phase::After => timing.after_time = elapsed,
            }
            if result.is_err() {
                break;
            }
        }

        self.ops = ops;
        result
    }

    pub fn log_timing_report(&self) {
        let total: Duration = self.op_timings.iter().map(OpTiming::total_time).sum();
        for timing in &self.op_timings {
            let share = if total.as_nanos() > 0 {
                timing.total_time().as_secs_f64() / total.as_secs_f64() * 100.0
            } else {
                0.0
            };
            debug!(
                "{:<24} | init {:>8.2}ms | update {:>8.2}ms | after {:>8.2}ms | {:>5.1}%",
                timing.op_name,
                timing.init_time.as_secs_f64() * 1000.0,
                timing.update_time.as_secs_f64() * 1000.0,
                timing.after_time.as_secs_f64() * 1000.0,
                share
            );
        }
        info!(
            "Simulation '{}' finished in {:.2}ms",
            self.name,
            total.as_secs_f64() * 1000.0
        );
    }
}
