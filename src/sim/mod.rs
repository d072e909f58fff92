//! Simulation core
//!
//! Compiles track plans into a queryable slice grid, steers the AI roster
//! over it, and drives the race to a terminal state.

pub mod ai;
pub mod geom;
pub mod index;
pub mod level;
pub mod physics;
pub mod rng;
pub mod runner;
pub mod session;
pub mod template;
pub mod track;

pub use ai::{SteeringController, TargetBlock};
pub use level::{Level, RaceConfig, RaceStatus};
pub use runner::Runner;
pub use session::RaceSession;
pub use track::{compile, Track};
