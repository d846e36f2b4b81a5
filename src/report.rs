//! Coverage statistics plus the text and JSON reports.

use crate::config::{SimConfig, ThresholdConfig};
use crate::coverage::CoverageMap;
use crate::error::SimError;
use crate::material::MaterialType;
use crate::scene::SceneDescriptor;
use crate::transmitter::{Bounds, Transmitter};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn classify(dbm: f64, thresholds: &ThresholdConfig) -> Self {
        if dbm > thresholds.excellent_dbm {
            SignalQuality::Excellent
        } else if dbm > thresholds.good_dbm {
            SignalQuality::Good
        } else if dbm > thresholds.fair_dbm {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageStats {
    pub total_cells: usize,
    pub excellent_cells: usize,
    pub good_cells: usize,
    pub fair_cells: usize,
    pub poor_cells: usize,
    pub excellent_pct: f64,
    pub good_pct: f64,
    pub fair_pct: f64,
    pub poor_pct: f64,
    /// Excellent plus good
    pub usable_pct: f64,
    pub min_dbm: f64,
    pub max_dbm: f64,
    pub mean_dbm: f64,
    pub median_dbm: f64,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

impl CoverageStats {
    pub fn compute(signal_dbm: &[f64], thresholds: &ThresholdConfig) -> Self {
        let total = signal_dbm.len();
        let mut counts = [0usize; 4];
        for &dbm in signal_dbm {
            let slot = match SignalQuality::classify(dbm, thresholds) {
                SignalQuality::Excellent => 0,
                SignalQuality::Good => 1,
                SignalQuality::Fair => 2,
                SignalQuality::Poor => 3,
            };
            counts[slot] += 1;
        }

        let (min_dbm, max_dbm, mean_dbm, median_dbm) = if total == 0 {
            (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
        } else {
            let mut sorted = signal_dbm.to_vec();
            sorted.sort_by(f64::total_cmp);
            let median = if total % 2 == 1 {
                sorted[total / 2]
            } else {
                (sorted[total / 2 - 1] + sorted[total / 2]) / 2.0
            };
            let mean = sorted.iter().sum::<f64>() / total as f64;
            (sorted[0], sorted[total - 1], mean, median)
        };

        Self {
            total_cells: total,
            excellent_cells: counts[0],
            good_cells: counts[1],
            fair_cells: counts[2],
            poor_cells: counts[3],
            excellent_pct: percent(counts[0], total),
            good_pct: percent(counts[1], total),
            fair_pct: percent(counts[2], total),
            poor_pct: percent(counts[3], total),
            usable_pct: percent(counts[0] + counts[1], total),
            min_dbm,
            max_dbm,
            mean_dbm,
            median_dbm,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApEntry {
    pub name: String,
    pub position: [f64; 3],
    /// Cells this AP serves best
    pub cells_won: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub path: String,
    pub valid_format: bool,
    pub shape_count: usize,
    pub material_tags: Vec<MaterialType>,
    pub dominant_material: Option<MaterialType>,
    pub used_default_bounds: bool,
}

impl SceneSummary {
    pub fn of(scene: &SceneDescriptor) -> Self {
        Self {
            path: scene.path.display().to_string(),
            valid_format: scene.valid_format,
            shape_count: scene.shape_count,
            material_tags: scene.material_tags.clone(),
            dominant_material: scene.dominant_material(),
            used_default_bounds: scene.used_default_bounds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportParameters {
    pub frequency_hz: f64,
    pub tx_power_dbm: f64,
    pub rx_height_m: f64,
    pub grid_resolution_m: f64,
    pub near_threshold_m: f64,
    pub far_threshold_m: f64,
    pub wall_attenuation_db: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub nx: usize,
    pub ny: usize,
    pub bounds: Bounds,
}

/// Everything written to `coverage_data.json`
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub engine: String,
    pub parameters: ReportParameters,
    pub access_points: Vec<ApEntry>,
    pub statistics: CoverageStats,
    pub grid: GridSummary,
    pub scene: Option<SceneSummary>,
}

impl CoverageReport {
    pub fn build(
        engine: &str,
        config: &SimConfig,
        wall_attenuation_db: f64,
        transmitters: &[Transmitter],
        coverage: &CoverageMap,
        scene: Option<&SceneDescriptor>,
    ) -> Self {
        let won = coverage.cells_per_transmitter(transmitters.len());
        let access_points = transmitters
            .iter()
            .zip(won)
            .map(|(tx, cells_won)| ApEntry {
                name: tx.name().to_string(),
                position: tx.position().to_array(),
                cells_won,
            })
            .collect();

        Self {
            engine: engine.to_string(),
            parameters: ReportParameters {
                frequency_hz: config.frequency_hz,
                tx_power_dbm: config.tx_power_dbm,
                rx_height_m: config.rx_height_m,
                grid_resolution_m: coverage.grid.resolution_m,
                near_threshold_m: config.path_loss.near_threshold_m,
                far_threshold_m: config.path_loss.far_threshold_m,
                wall_attenuation_db,
            },
            access_points,
            statistics: CoverageStats::compute(&coverage.signal_dbm, &config.thresholds),
            grid: GridSummary {
                nx: coverage.grid.nx,
                ny: coverage.grid.ny,
                bounds: coverage.grid.bounds,
            },
            scene: scene.map(SceneSummary::of),
        }
    }

    pub fn to_text(&self, thresholds: &ThresholdConfig) -> String {
        TextReport {
            report: self,
            thresholds,
        }
        .to_string()
    }

    pub fn write_text(&self, path: &Path, thresholds: &ThresholdConfig) -> Result<(), SimError> {
        fs::write(path, self.to_text(thresholds)).map_err(|e| SimError::io(path, e))
    }

    pub fn write_json(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SimError::io(path, e))
    }
}

/// Human-readable rendering of a [`CoverageReport`]
pub struct TextReport<'a> {
    pub report: &'a CoverageReport,
    pub thresholds: &'a ThresholdConfig,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let thresholds = self.thresholds;
        let p = &report.parameters;
        let s = &report.statistics;
        let rule = "=".repeat(50);

        writeln!(f, "WiFi Coverage Analysis Report")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "Engine: {}", report.engine)?;
        writeln!(f, "Frequency: {:.3} GHz", p.frequency_hz / 1e9)?;
        writeln!(f, "TX power: {:.1} dBm", p.tx_power_dbm)?;
        writeln!(f, "Receiver height: {:.2} m", p.rx_height_m)?;
        writeln!(
            f,
            "Grid resolution: {} m ({} x {} cells)",
            p.grid_resolution_m, report.grid.nx, report.grid.ny
        )?;
        let b = &report.grid.bounds;
        writeln!(
            f,
            "Area: x {:.1} to {:.1} m, y {:.1} to {:.1} m",
            b.x_min, b.x_max, b.y_min, b.y_max
        )?;
        writeln!(
            f,
            "Wall model: +{:.1} dB beyond {:.1} m, +{:.1} dB beyond {:.1} m",
            p.wall_attenuation_db,
            p.near_threshold_m,
            p.wall_attenuation_db,
            p.far_threshold_m
        )?;
        if let Some(scene) = &report.scene {
            writeln!(
                f,
                "Scene: {} ({} shapes{})",
                scene.path,
                scene.shape_count,
                if scene.valid_format { "" } else { ", not a recognised scene" }
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Access points ({}):", report.access_points.len())?;
        for ap in &report.access_points {
            writeln!(
                f,
                "  {}: ({:.1}, {:.1}, {:.1}) serves {} cells",
                ap.name, ap.position[0], ap.position[1], ap.position[2], ap.cells_won
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Coverage quality ({} cells):", s.total_cells)?;
        writeln!(
            f,
            "  Excellent (> {} dBm): {:.1}% ({} cells)",
            thresholds.excellent_dbm, s.excellent_pct, s.excellent_cells
        )?;
        writeln!(
            f,
            "  Good ({} to {} dBm): {:.1}% ({} cells)",
            thresholds.good_dbm, thresholds.excellent_dbm, s.good_pct, s.good_cells
        )?;
        writeln!(
            f,
            "  Fair ({} to {} dBm): {:.1}% ({} cells)",
            thresholds.fair_dbm, thresholds.good_dbm, s.fair_pct, s.fair_cells
        )?;
        writeln!(
            f,
            "  Poor (<= {} dBm): {:.1}% ({} cells)",
            thresholds.fair_dbm, s.poor_pct, s.poor_cells
        )?;
        writeln!(f, "  Usable coverage: {:.1}%", s.usable_pct)?;
        writeln!(f)?;
        writeln!(f, "Signal range: {:.1} to {:.1} dBm", s.min_dbm, s.max_dbm)?;
        writeln!(f, "Mean signal: {:.1} dBm (median {:.1} dBm)", s.mean_dbm, s.median_dbm)?;
        writeln!(f)?;
        writeln!(
            f,
            "Note: values come from a coarse free-space plus stepped-wall estimate, \
             not from ray tracing. Use them for relative comparison only."
        )?;
        Ok(())
    }
}
