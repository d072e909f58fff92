//! Cutline - elimination-race simulation core
//!
//! Compiles declarative slice plans into a nine-column walkability grid,
//! steers a roster of autonomous runners over it, and drives a rank-cutoff
//! race to its terminal state. Rendering, audio, and input live behind
//! collaborator seams; for a fixed seed the whole race is deterministic.

pub mod sim;

pub mod consts {
    //! Shared tuning constants.

    /// Grid cells per slice
    pub const BLOCK_COUNT: usize = 9;
    /// Width of one grid cell, world units
    pub const BLOCK_WIDTH: f32 = 40.0;
    /// Full track width
    pub const TRACK_WIDTH: f32 = BLOCK_COUNT as f32 * BLOCK_WIDTH;
    /// Height of one slice
    pub const SLICE_HEIGHT: f32 = 64.0;

    /// Runner footprint
    pub const RUNNER_WIDTH: f32 = 24.0;
    pub const RUNNER_HEIGHT: f32 = 32.0;

    /// Roster slots in a standard round
    pub const DEFAULT_ROSTER: u32 = 40;
    /// Racers removed per round
    pub const ELIMINATION_QUOTA: u32 = 13;
    /// The rank that eliminates at a checkpoint or the finish line
    pub const UNLUCKY_RANK: u32 = 13;

    /// Seconds of falling before respawn attempts begin
    pub const FALL_DURATION: f32 = 1.2;
    /// Delay between a fall starting and its camera cue
    pub const CAMERA_CUE_DELAY: f32 = 0.45;
    /// Respawn x stays this far inside the track edges
    pub const RESPAWN_MARGIN: f32 = 30.0;
    /// Lateral jitter within a spawn formation cell
    pub const SPAWN_JITTER: f32 = 6.0;

    /// Raft travel speed, world units per second
    pub const RAFT_SPEED: f32 = 40.0;
    /// Dock dwell before a raft departs
    pub const RAFT_DWELL: f32 = 1.25;
    /// Vertical tolerance for a raft to serve a band
    pub const RAFT_ALIGN: f32 = 6.0;
    /// Boarding window under a nearly arrived raft
    pub const BOARD_WINDOW: f32 = 12.0;
    /// Compile-time desync between raft cycles
    pub const RAFT_JITTER: f32 = 5.0;

    /// Fixed simulation step
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest step one tick will integrate after a stall
    pub const MAX_STEP: f32 = 0.1;
}

pub use sim::ai::{SteeringController, TargetBlock};
pub use sim::geom::{Rect, Vec2};
pub use sim::level::{
    Level, NoHooks, RaceConfig, RaceHooks, RaceResult, RaceSnapshot, RaceStatus, Renderer,
};
pub use sim::physics::{Integrator, Physics};
pub use sim::rng::RaceRng;
pub use sim::runner::{Runner, RunnerSnapshot};
pub use sim::session::{RaceSession, SessionStats};
pub use sim::template::{race_plan, standard_plan, TemplateTag};
pub use sim::track::{compile, Block, BlockKind, Element, ElementKind, Track};
