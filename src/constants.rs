// Physical constants
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

// default radio settings (2.4 GHz Wi-Fi AP at 100 mW):
pub const DEFAULT_FREQUENCY_HZ: f64 = 2.4e9;
pub const DEFAULT_TX_POWER_DBM: f64 = 20.0;
pub const DEFAULT_RX_HEIGHT_M: f64 = 1.5; // handheld client height

// Grid defaults
pub const DEFAULT_GRID_RESOLUTION_M: f64 = 0.5;
pub const DEFAULT_GRID_MARGIN_M: f64 = 20.0;
// runs refuse grids above this (5 km x 5 km at 1 m)
pub const MAX_GRID_CELLS: usize = 25_000_000;

// Scene fallback when no geometry hints are found (meters)
pub const DEFAULT_BUILDING_MIN_XY: (f64, f64) = (0.0, 0.0);
pub const DEFAULT_BUILDING_MAX_XY: (f64, f64) = (100.0, 100.0);

// Stepped wall model: 0 walls up to near, 1 wall up to far, 2 beyond
pub const DEFAULT_NEAR_WALL_THRESHOLD_M: f64 = 15.0;
pub const DEFAULT_FAR_WALL_THRESHOLD_M: f64 = 30.0;
pub const DEFAULT_WALL_ATTENUATION_DB: f64 = 10.0;

// === Coverage quality buckets (dBm) ===

pub const EXCELLENT_SIGNAL_DBM: f64 = -50.0;
pub const GOOD_SIGNAL_DBM: f64 = -70.0;
pub const FAIR_SIGNAL_DBM: f64 = -85.0;
// AP zone maps hide cells weaker than this
pub const ZONE_MASK_DBM: f64 = -80.0;

// Output artifact names
pub const COVERAGE_GRID_FILE: &str = "coverage_grid.csv";
pub const BEST_AP_GRID_FILE: &str = "best_ap_grid.csv";
pub const TRANSMITTERS_FILE: &str = "transmitters.csv";
pub const COVERAGE_MAP_PNG: &str = "wifi_coverage_map.png";
pub const AP_ZONES_PNG: &str = "ap_coverage_zones.png";
pub const INDIVIDUAL_COVERAGE_PNG: &str = "individual_ap_coverage.png";
pub const REPORT_TXT: &str = "coverage_analysis_report.txt";
pub const REPORT_JSON: &str = "coverage_data.json";
