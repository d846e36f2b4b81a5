pub mod simulation;

pub use simulation::{grid_for, OpTiming, SimProps, Simulation};
