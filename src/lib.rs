pub mod components;
pub mod config;
pub mod errors;
pub mod pathfinding;
pub mod plugins;
pub mod resources;
pub mod steering;
pub mod tactics;

// Selective re-exports for external consumers

// The plugin wires the whole pipeline into an App
pub use plugins::NavigationPlugin;

// Error types shared across the crate
pub use errors::{NavError, NavResult};

// Core navigation types most consumers need
pub use components::{NavAgent, NavTarget, Speed, SteeringMode, TacticalUnit};
pub use pathfinding::{CellCoord, NavGrid, PathPlanner};
pub use resources::NavConfig;
pub use tactics::Tactic;
