pub mod constants;
pub mod error;
pub mod material;
pub mod transmitter;
pub mod ap_loader;
pub mod scene;
pub mod grid;
pub mod grid_csv;
pub mod path_loss;
pub mod coverage;
pub mod config;
pub mod engine;
pub mod report;
pub mod heat_map_png;
pub mod sim;
pub mod sim_op;
pub mod cli;
