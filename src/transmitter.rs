use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A named access point at a fixed position in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmitter {
    name: String,
    position: DVec3,
}

impl Transmitter {
    pub fn new(name: impl Into<String>, position: DVec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }
}

/// Axis-aligned x/y rectangle in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Smallest rectangle holding every transmitter's x/y, or `None` for an empty slice
    pub fn of_transmitters(transmitters: &[Transmitter]) -> Option<Self> {
        let first = transmitters.first()?.position();
        let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
        for tx in &transmitters[1..] {
            bounds.include(tx.position().x, tx.position().y);
        }
        Some(bounds)
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Bounds::new(
            self.x_min - margin,
            self.y_min - margin,
            self.x_max + margin,
            self.y_max + margin,
        )
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}
