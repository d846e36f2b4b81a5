//! Run configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! { "grid_resolution_m": 1.0, "path_loss": { "wall_attenuation_db": 15.0 } }
//! ```

use crate::constants::{
    DEFAULT_FAR_WALL_THRESHOLD_M, DEFAULT_FREQUENCY_HZ, DEFAULT_GRID_MARGIN_M,
    DEFAULT_GRID_RESOLUTION_M, DEFAULT_NEAR_WALL_THRESHOLD_M, DEFAULT_RX_HEIGHT_M,
    DEFAULT_TX_POWER_DBM, DEFAULT_WALL_ATTENUATION_DB, EXCELLENT_SIGNAL_DBM, FAIR_SIGNAL_DBM,
    GOOD_SIGNAL_DBM, ZONE_MASK_DBM,
};
use crate::error::ConfigError;
use crate::material;
use crate::path_loss::{PathLossParams, RadioParams};
use crate::scene::SceneDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridExtent {
    /// AP bounding box plus margin
    Transmitters,
    /// Scene bounds (default building bounds when the scene has none)
    Scene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Estimator,
    External,
    /// Try the external ray tracer, fall back to the estimator
    Auto,
}

impl EngineKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "estimator" => Some(EngineKind::Estimator),
            "external" => Some(EngineKind::External),
            "auto" => Some(EngineKind::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLossConfig {
    pub near_threshold_m: f64,
    pub far_threshold_m: f64,
    /// Explicit per-wall loss. When unset the scene's dominant material decides,
    /// then the built-in default.
    pub wall_attenuation_db: Option<f64>,
}

impl Default for PathLossConfig {
    fn default() -> Self {
        Self {
            near_threshold_m: DEFAULT_NEAR_WALL_THRESHOLD_M,
            far_threshold_m: DEFAULT_FAR_WALL_THRESHOLD_M,
            wall_attenuation_db: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub excellent_dbm: f64,
    pub good_dbm: f64,
    pub fair_dbm: f64,
    pub zone_mask_dbm: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            excellent_dbm: EXCELLENT_SIGNAL_DBM,
            good_dbm: GOOD_SIGNAL_DBM,
            fair_dbm: FAIR_SIGNAL_DBM,
            zone_mask_dbm: ZONE_MASK_DBM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// External ray tracer executable
    pub program: String,
    /// Arguments placed before the generated ones (e.g. a script path)
    pub args: Vec<String>,
    /// Argument appended to `args` to ask the program for its version
    pub version_flag: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Estimator,
            program: "python3".to_string(),
            args: vec!["sionna_coverage_map.py".to_string()],
            version_flag: "--version".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub pixels_per_cell: u32,
    /// Longest image side; pixels_per_cell shrinks to fit
    pub max_dimension_px: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            pixels_per_cell: 4,
            max_dimension_px: 2400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub frequency_hz: f64,
    pub tx_power_dbm: f64,
    pub rx_height_m: f64,
    pub grid_resolution_m: f64,
    pub grid_margin_m: f64,
    pub grid_extent: GridExtent,
    pub path_loss: PathLossConfig,
    pub thresholds: ThresholdConfig,
    pub engine: EngineConfig,
    pub image: ImageConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            rx_height_m: DEFAULT_RX_HEIGHT_M,
            grid_resolution_m: DEFAULT_GRID_RESOLUTION_M,
            grid_margin_m: DEFAULT_GRID_MARGIN_M,
            grid_extent: GridExtent::Transmitters,
            path_loss: PathLossConfig::default(),
            thresholds: ThresholdConfig::default(),
            engine: EngineConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl SimConfig {
    /// Loads a JSON config file and validates it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json_str = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json_str)
    }

    pub fn from_json_str(json_str: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frequency_hz > 0.0) || !self.frequency_hz.is_finite() {
            return Err(invalid("frequency_hz", format!("must be positive, got {}", self.frequency_hz)));
        }
        if !self.tx_power_dbm.is_finite() {
            return Err(invalid("tx_power_dbm", "must be finite"));
        }
        if !self.rx_height_m.is_finite() {
            return Err(invalid("rx_height_m", "must be finite"));
        }
        if !(self.grid_resolution_m > 0.0) || !self.grid_resolution_m.is_finite() {
            return Err(invalid(
                "grid_resolution_m",
                format!("must be positive, got {}", self.grid_resolution_m),
            ));
        }
        if !(self.grid_margin_m >= 0.0) {
            return Err(invalid("grid_margin_m", format!("must be >= 0, got {}", self.grid_margin_m)));
        }

        let pl = &self.path_loss;
        if !(pl.near_threshold_m >= 0.0) || !(pl.near_threshold_m <= pl.far_threshold_m) {
            return Err(invalid(
                "path_loss",
                format!(
                    "need 0 <= near_threshold_m <= far_threshold_m, got {} and {}",
                    pl.near_threshold_m, pl.far_threshold_m
                ),
            ));
        }
        if let Some(db) = pl.wall_attenuation_db {
            if !(db >= 0.0) {
                return Err(invalid("path_loss.wall_attenuation_db", format!("must be >= 0, got {}", db)));
            }
        }

        let t = &self.thresholds;
        if !(t.excellent_dbm > t.good_dbm && t.good_dbm > t.fair_dbm) {
            return Err(invalid(
                "thresholds",
                "need excellent_dbm > good_dbm > fair_dbm",
            ));
        }

        if self.image.pixels_per_cell == 0 || self.image.max_dimension_px == 0 {
            return Err(invalid("image", "sizes must be positive"));
        }
        if self.engine.kind != EngineKind::Estimator && self.engine.program.trim().is_empty() {
            return Err(invalid("engine.program", "required for external engines"));
        }
        Ok(())
    }

    pub fn radio(&self) -> RadioParams {
        RadioParams {
            frequency_hz: self.frequency_hz,
            tx_power_dbm: self.tx_power_dbm,
            rx_height_m: self.rx_height_m,
        }
    }

    /// Wall model parameters, taking the per-wall loss from (in order) the
    /// explicit setting, the scene's dominant material, or the default.
    pub fn path_loss_params(&self, scene: Option<&SceneDescriptor>) -> PathLossParams {
        let wall_attenuation_db = self
            .path_loss
            .wall_attenuation_db
            .or_else(|| {
                scene
                    .and_then(SceneDescriptor::dominant_material)
                    .map(material::wall_attenuation_db)
            })
            .unwrap_or(DEFAULT_WALL_ATTENUATION_DB);

        PathLossParams {
            near_threshold_m: self.path_loss.near_threshold_m,
            far_threshold_m: self.path_loss.far_threshold_m,
            wall_attenuation_db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::parse_scene_str;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.frequency_hz, 2.4e9);
        assert_eq!(config.grid_resolution_m, 0.5);
        assert_eq!(config.path_loss_params(None), PathLossParams::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "grid_resolution_m": 1.0, "path_loss": { "wall_attenuation_db": 15.0 },
                 "engine": { "kind": "auto" } }"#,
        )
        .unwrap();
        assert_eq!(config.grid_resolution_m, 1.0);
        assert_eq!(config.tx_power_dbm, 20.0);
        assert_eq!(config.path_loss.near_threshold_m, 15.0);
        assert_eq!(config.path_loss_params(None).wall_attenuation_db, 15.0);
        assert_eq!(config.engine.kind, EngineKind::Auto);
        assert_eq!(config.engine.version_flag, "--version");
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            r#"{ "frequency_hz": 0 }"#,
            r#"{ "grid_resolution_m": -1 }"#,
            r#"{ "grid_margin_m": -5 }"#,
            r#"{ "path_loss": { "near_threshold_m": 40, "far_threshold_m": 30 } }"#,
            r#"{ "thresholds": { "excellent_dbm": -90 } }"#,
            r#"{ "image": { "pixels_per_cell": 0 } }"#,
        ];
        for case in cases {
            assert!(
                matches!(SimConfig::from_json_str(case), Err(ConfigError::Invalid { .. })),
                "accepted {}",
                case
            );
        }
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn wall_loss_follows_scene_material_unless_set() {
        let scene = parse_scene_str(
            r#"<scene version="2.0"><shape id="door"><ref id="metal"/></shape></scene>"#,
        )
        .unwrap();
        let mut config = SimConfig::default();
        assert_eq!(config.path_loss_params(Some(&scene)).wall_attenuation_db, 25.0);

        config.path_loss.wall_attenuation_db = Some(12.0);
        assert_eq!(config.path_loss_params(Some(&scene)).wall_attenuation_db, 12.0);
    }

    #[test]
    fn engine_kind_names() {
        assert_eq!(EngineKind::from_str("auto"), Some(EngineKind::Auto));
        assert_eq!(EngineKind::from_str("sionna"), None);
    }
}
