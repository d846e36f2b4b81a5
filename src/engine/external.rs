use super::PropagationEngine;
use crate::ap_loader::write_transmitters;
use crate::config::EngineConfig;
use crate::constants::{BEST_AP_GRID_FILE, COVERAGE_GRID_FILE, TRANSMITTERS_FILE};
use crate::coverage::CoverageMap;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::grid_csv::read_grid_csv;
use crate::path_loss::PathLossEstimator;
use crate::transmitter::Transmitter;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, error, info};

/// Argument convention of an external ray tracer.
///
/// Pre-1.0 tools take snake_case flags and a coverage-map cell size;
/// 1.x tools take kebab-case flags and a radio-map cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    Legacy,
    RadioMap,
}

impl ApiGeneration {
    pub fn from_version(major: u32, _minor: u32) -> Self {
        if major >= 1 {
            ApiGeneration::RadioMap
        } else {
            ApiGeneration::Legacy
        }
    }

    /// Arguments for one coverage run
    pub fn run_args(
        &self,
        transmitters: &Path,
        scene: Option<&Path>,
        output_dir: &Path,
        grid: &Grid,
        frequency_hz: f64,
    ) -> Vec<String> {
        let b = &grid.bounds;
        let bounds = format!("{},{},{},{}", b.x_min, b.y_min, b.x_max, b.y_max);
        let (tx_flag, scene_flag, out_flag, cell_flag, bounds_flag, freq_flag) = match self {
            ApiGeneration::Legacy => (
                "--transmitter_file",
                "--mitsuba_file",
                "--output_dir",
                "--cm_cell_size",
                "--cm_bounds",
                "--frequency",
            ),
            ApiGeneration::RadioMap => (
                "--transmitters",
                "--scene",
                "--output-dir",
                "--cell-size",
                "--bounds",
                "--frequency",
            ),
        };

        let mut args = vec![tx_flag.to_string(), transmitters.display().to_string()];
        if let Some(scene) = scene {
            args.push(scene_flag.to_string());
            args.push(scene.display().to_string());
        }
        args.extend([
            out_flag.to_string(),
            output_dir.display().to_string(),
            cell_flag.to_string(),
            grid.resolution_m.to_string(),
            bounds_flag.to_string(),
            bounds,
            freq_flag.to_string(),
            frequency_hz.to_string(),
        ]);
        args
    }
}

/// First `major.minor[.patch]` number found in `text`
pub fn parse_version(text: &str) -> Option<(u32, u32, u32)> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let end = bytes[start..]
            .iter()
            .position(|b| !(b.is_ascii_digit() || *b == b'.'))
            .map_or(bytes.len(), |p| start + p);
        let parts: Vec<u32> = text[start..end]
            .split('.')
            .take(3)
            .map_while(|p| p.parse().ok())
            .collect();
        if parts.len() >= 2 {
            return Some((parts[0], parts[1], parts.get(2).copied().unwrap_or(0)));
        }
        start = end;
    }
    None
}

/// Adapter around an external ray-tracing program.
///
/// The program receives `transmitters.csv`, the optional scene, the grid
/// bounds and cell size, and must leave `coverage_grid.csv` (dBm) and
/// `best_ap_grid.csv` (transmitter indices) in the output directory.
#[derive(Debug, Clone)]
pub struct ExternalRayTracer {
    name: String,
    program: String,
    args: Vec<String>,
    version: String,
    generation: ApiGeneration,
    scene: Option<PathBuf>,
    work_dir: PathBuf,
}

fn run_once(engine: &str, program: &str, args: &[String]) -> Result<Output, EngineError> {
    debug!(program, ?args, "spawning external engine");
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| EngineError::Unavailable {
            engine: engine.to_string(),
            reason: format!("cannot run '{}': {}", program, e),
        })
}

impl ExternalRayTracer {
    /// Asks the program for its version and picks the API generation.
    pub fn detect(
        config: &EngineConfig,
        scene: Option<PathBuf>,
        work_dir: &Path,
    ) -> Result<Self, EngineError> {
        let name = format!("external:{}", config.program);
        let mut version_args = config.args.clone();
        version_args.push(config.version_flag.clone());

        let output = run_once(&name, &config.program, &version_args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(EngineError::Unavailable {
                engine: name,
                reason: format!("version check failed: {}", stderr.trim()),
            });
        }

        let (major, minor, patch) = parse_version(&stdout)
            .or_else(|| parse_version(&stderr))
            .ok_or_else(|| EngineError::Unavailable {
                engine: name.clone(),
                reason: format!("no version in output '{}'", stdout.trim()),
            })?;

        let generation = ApiGeneration::from_version(major, minor);
        info!("Detected {}: version {}.{}.{} -> {:?}", name, major, minor, patch, generation);

        Ok(Self {
            name,
            program: config.program.clone(),
            args: config.args.clone(),
            version: format!("{}.{}.{}", major, minor, patch),
            generation,
            scene,
            work_dir: work_dir.to_path_buf(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn generation(&self) -> ApiGeneration {
        self.generation
    }

    fn bad_output(&self, reason: impl Into<String>) -> EngineError {
        EngineError::BadOutput {
            engine: self.name.clone(),
            reason: reason.into(),
        }
    }
}

impl PropagationEngine for ExternalRayTracer {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(
        &mut self,
        transmitters: &[Transmitter],
        grid: &Grid,
        model: &PathLossEstimator,
    ) -> Result<CoverageMap, EngineError> {
        let output_dir = self.work_dir.join("external_engine");
        fs::create_dir_all(&output_dir)?;
        let tx_file = output_dir.join(TRANSMITTERS_FILE);
        write_transmitters(&tx_file, transmitters)?;

        let mut args = self.args.clone();
        args.extend(self.generation.run_args(
            &tx_file,
            self.scene.as_deref(),
            &output_dir,
            grid,
            model.radio.frequency_hz,
        ));

        let output = run_once(&self.name, &self.program, &args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} failed: {}", self.name, stderr);
            return Err(EngineError::Failed {
                engine: self.name.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        let signal_dbm: Vec<f64> = read_grid_csv(output_dir.join(COVERAGE_GRID_FILE), grid)
            .map_err(|e| self.bad_output(e))?;
        let best_tx: Vec<usize> = read_grid_csv(output_dir.join(BEST_AP_GRID_FILE), grid)
            .map_err(|e| self.bad_output(e))?;

        if let Some(bad) = best_tx.iter().find(|&&i| i >= transmitters.len()) {
            return Err(self.bad_output(format!(
                "transmitter index {} out of range ({} transmitters)",
                bad,
                transmitters.len()
            )));
        }

        CoverageMap::from_parts(grid.clone(), signal_dbm, best_tx)
            .ok_or_else(|| self.bad_output("grid size mismatch"))
    }
}
