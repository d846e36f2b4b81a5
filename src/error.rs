//! Error types for loading, scene parsing, configuration, engines and the
//! simulation pipeline.

use crate::ap_loader::RowDiagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the AP coordinate loader that abort the whole load.
///
/// Single bad rows are never errors; they become [`RowDiagnostic`]s.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The coordinate file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("Error reading file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every row was rejected
    #[error("No valid AP coordinates found in {} ({} rejected rows)", .path.display(), .diagnostics.len())]
    NoValidRows {
        path: PathBuf,
        diagnostics: Vec<RowDiagnostic>,
    },
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed scene XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures of a propagation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine cannot be used on this machine (binary missing, version check failed)
    #[error("Engine '{engine}' unavailable: {reason}")]
    Unavailable { engine: String, reason: String },

    /// The engine ran and exited unsuccessfully
    #[error("Engine '{engine}' failed (exit code {code:?}): {stderr}")]
    Failed {
        engine: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The engine finished but its output is unusable
    #[error("Engine '{engine}' produced unusable output: {reason}")]
    BadOutput { engine: String, reason: String },

    #[error("Engine I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while running the simulation pipeline
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Simulation '{0}' has already run")]
    AlreadyRun(String),

    #[error("Operator '{0}' needs a coverage map but none was computed")]
    MissingCoverage(String),

    #[error("Grid has no cells")]
    EmptyGrid,

    #[error("Grid of {nx} x {ny} cells exceeds the limit of {max} cells; use a coarser resolution")]
    GridTooLarge { nx: usize, ny: usize, max: usize },

    #[error("No transmitters to simulate")]
    NoTransmitters,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image error writing {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
