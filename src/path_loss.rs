//! Coarse indoor path-loss estimate: free-space loss plus a stepped wall penalty.
//!
//! This is a placeholder for real ray tracing. Wall count is guessed from
//! distance alone (no geometry, no multipath, no antenna pattern), so results
//! are only good for comparing AP layouts, never for predicting measured RSSI.
//!
//! ```
//! use ap_coverage::path_loss::{free_space_path_loss, PathLossParams, path_loss};
//!
//! // 1 m at 2.4 GHz is about 40 dB
//! assert!((free_space_path_loss(1.0, 2.4e9) - 40.05).abs() < 0.01);
//!
//! // 20 m crosses one wall with the default 10 dB attenuation
//! let result = path_loss(20.0, 2.4e9, &PathLossParams::default());
//! assert_eq!(result.walls, 1);
//! ```

use crate::constants::{
    DEFAULT_FAR_WALL_THRESHOLD_M, DEFAULT_FREQUENCY_HZ, DEFAULT_NEAR_WALL_THRESHOLD_M,
    DEFAULT_RX_HEIGHT_M, DEFAULT_TX_POWER_DBM, DEFAULT_WALL_ATTENUATION_DB, SPEED_OF_LIGHT_M_S,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tunable constants of the stepped wall model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossParams {
    /// Beyond this distance one wall is assumed
    pub near_threshold_m: f64,
    /// Beyond this distance two walls are assumed
    pub far_threshold_m: f64,
    /// Loss per wall
    pub wall_attenuation_db: f64,
}

impl Default for PathLossParams {
    fn default() -> Self {
        Self {
            near_threshold_m: DEFAULT_NEAR_WALL_THRESHOLD_M,
            far_threshold_m: DEFAULT_FAR_WALL_THRESHOLD_M,
            wall_attenuation_db: DEFAULT_WALL_ATTENUATION_DB,
        }
    }
}

/// Transmit side of the link, shared by every AP in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadioParams {
    pub frequency_hz: f64,
    pub tx_power_dbm: f64,
    /// Height of the receiver plane the grid is sampled on
    pub rx_height_m: f64,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            rx_height_m: DEFAULT_RX_HEIGHT_M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossResult {
    /// Total loss in dB (positive)
    pub path_loss_db: f64,
    pub free_space_db: f64,
    pub walls: u32,
    pub distance_m: f64,
}

/// Free-space path loss (Friis).
///
/// FSPL = 20·log10(d) + 20·log10(f) + 20·log10(4π/c)
///
/// Returns 0 for a zero (or negative, or non-finite) distance, and is floored
/// at 0 dB inside the near field where the far-field formula would go negative.
/// `frequency_hz` must be positive.
pub fn free_space_path_loss(distance_m: f64, frequency_hz: f64) -> f64 {
    if !(distance_m > 0.0) || !distance_m.is_finite() {
        return 0.0;
    }
    let fspl = 20.0 * distance_m.log10()
        + 20.0 * frequency_hz.log10()
        + 20.0 * (4.0 * PI / SPEED_OF_LIGHT_M_S).log10();
    fspl.max(0.0)
}

/// Number of walls assumed between AP and client at `distance_m`
pub fn walls_crossed(distance_m: f64, params: &PathLossParams) -> u32 {
    if distance_m > params.far_threshold_m {
        2
    } else if distance_m > params.near_threshold_m {
        1
    } else {
        0
    }
}

pub fn path_loss(distance_m: f64, frequency_hz: f64, params: &PathLossParams) -> PathLossResult {
    if !(distance_m > 0.0) {
        return PathLossResult {
            path_loss_db: 0.0,
            free_space_db: 0.0,
            walls: 0,
            distance_m: 0.0,
        };
    }
    let free_space_db = free_space_path_loss(distance_m, frequency_hz);
    let walls = walls_crossed(distance_m, params);
    PathLossResult {
        path_loss_db: free_space_db + walls as f64 * params.wall_attenuation_db,
        free_space_db,
        walls,
        distance_m,
    }
}

/// Received power in dBm, `tx_power - path_loss`
pub fn received_power(tx_power_dbm: f64, path_loss_db: f64) -> f64 {
    tx_power_dbm - path_loss_db
}

/// Received power at `query` from an AP at `tx_position`.
pub fn estimate_received_dbm(
    tx_position: DVec3,
    tx_power_dbm: f64,
    frequency_hz: f64,
    query: DVec3,
    params: &PathLossParams,
) -> f64 {
    let distance = tx_position.distance(query);
    received_power(tx_power_dbm, path_loss(distance, frequency_hz, params).path_loss_db)
}

/// Radio and wall parameters bundled for evaluating many grid points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossEstimator {
    pub radio: RadioParams,
    pub params: PathLossParams,
}

impl PathLossEstimator {
    pub fn new(radio: RadioParams, params: PathLossParams) -> Self {
        Self { radio, params }
    }

    /// Received power at grid point `(x, y)` on the receiver plane
    pub fn received_dbm_at(&self, tx_position: DVec3, x: f64, y: f64) -> f64 {
        estimate_received_dbm(
            tx_position,
            self.radio.tx_power_dbm,
            self.radio.frequency_hz,
            DVec3::new(x, y, self.radio.rx_height_m),
            &self.params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_ge;
    use rand::Rng;

    #[test]
    fn zero_distance_is_zero_loss() {
        assert_eq!(free_space_path_loss(0.0, 2.4e9), 0.0);
        let r = path_loss(0.0, 2.4e9, &PathLossParams::default());
        assert_eq!(r.path_loss_db, 0.0);
        assert!(!r.path_loss_db.is_nan());

        let p = DVec3::new(1.0, 2.0, 3.0);
        let rx = estimate_received_dbm(p, 20.0, 2.4e9, p, &PathLossParams::default());
        assert_eq!(rx, 20.0);
    }

    #[test]
    fn fspl_known_values() {
        // ~91.53 dB at 1 km, 900 MHz
        assert_abs_diff_eq!(free_space_path_loss(1000.0, 900e6), 91.53, epsilon = 0.05);
        // doubling distance adds ~6.02 dB
        let delta = free_space_path_loss(20.0, 2.4e9) - free_space_path_loss(10.0, 2.4e9);
        assert_abs_diff_eq!(delta, 6.02, epsilon = 0.01);
    }

    #[test]
    fn near_field_is_floored() {
        assert_eq!(free_space_path_loss(1e-4, 2.4e9), 0.0);
    }

    #[test]
    fn wall_steps() {
        let params = PathLossParams::default();
        assert_eq!(walls_crossed(10.0, &params), 0);
        assert_eq!(walls_crossed(15.0, &params), 0);
        assert_eq!(walls_crossed(15.01, &params), 1);
        assert_eq!(walls_crossed(30.0, &params), 1);
        assert_eq!(walls_crossed(45.0, &params), 2);

        let r = path_loss(20.0, 2.4e9, &params);
        assert_abs_diff_eq!(r.path_loss_db, r.free_space_db + 10.0, epsilon = 1e-12);

        let heavy = PathLossParams {
            wall_attenuation_db: 25.0,
            ..params
        };
        let r = path_loss(40.0, 2.4e9, &heavy);
        assert_eq!(r.walls, 2);
        assert_abs_diff_eq!(r.path_loss_db, r.free_space_db + 50.0, epsilon = 1e-12);
    }

    #[test]
    fn loss_is_non_decreasing_in_distance() {
        let mut rng = rand::rng();
        let params = PathLossParams::default();
        for _ in 0..2000 {
            let a: f64 = rng.random_range(0.0..100.0);
            let b: f64 = rng.random_range(0.0..100.0);
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            assert_ge!(
                path_loss(far, 2.4e9, &params).path_loss_db,
                path_loss(near, 2.4e9, &params).path_loss_db
            );
        }
        // exact steps, including zero
        let mut last = 0.0;
        for step in 0..1000 {
            let loss = path_loss(step as f64 * 0.05, 5.0e9, &params).path_loss_db;
            assert_ge!(loss, last);
            last = loss;
        }
    }

    #[test]
    fn estimator_uses_receiver_height() {
        let est = PathLossEstimator::new(RadioParams::default(), PathLossParams::default());
        let tx = DVec3::new(0.0, 0.0, 3.0);
        // directly below the AP the client is 1.5 m away
        let expected = 20.0 - free_space_path_loss(1.5, 2.4e9);
        assert_abs_diff_eq!(est.received_dbm_at(tx, 0.0, 0.0), expected, epsilon = 1e-9);
    }
}
