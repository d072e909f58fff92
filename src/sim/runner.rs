//! Runner - per-racer state
//!
//! Position, velocity, rank, and fall/checkpoint bookkeeping, mutated every
//! tick by the orchestrator. Steering state lives with the controllers.

use serde::{Deserialize, Serialize};

use crate::consts::{RUNNER_HEIGHT, RUNNER_WIDTH};
use crate::sim::geom::{Rect, Vec2};

/// Complete state for a single runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    /// Unique runner ID
    pub id: u32,
    /// Display name
    pub name: String,
    /// True for the player-controlled slot
    pub is_player: bool,
    /// World position of the footprint center
    pub pos: Vec2,
    /// Footprint size
    pub size: Vec2,
    /// Current velocity
    pub vel: Vec2,
    /// 1-based standing, 1 = leader
    pub rank: u32,
    pub finished: bool,
    pub eliminated: bool,
    /// When the current fall began; None while grounded
    pub fall_started: Option<f32>,
    /// Latest checkpoint reached (0 = start line)
    pub checkpoint: Option<usize>,
}

impl Runner {
    pub fn new(id: u32, name: String, is_player: bool) -> Self {
        Self {
            id,
            name,
            is_player,
            pos: Vec2::ZERO,
            size: Vec2::new(RUNNER_WIDTH, RUNNER_HEIGHT),
            vel: Vec2::ZERO,
            rank: id + 1,
            finished: false,
            eliminated: false,
            fall_started: None,
            checkpoint: None,
        }
    }

    /// Footprint rectangle
    pub fn area(&self) -> Rect {
        Rect::centered(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn is_falling(&self) -> bool {
        self.fall_started.is_some()
    }

    /// Ghosts take no part in collisions: finished, eliminated, or mid-fall
    pub fn does_not_collide(&self) -> bool {
        self.finished || self.eliminated || self.is_falling()
    }

    /// Front edge in the direction of travel (forward is -y)
    pub fn leading_edge(&self) -> f32 {
        self.pos.y - self.size.y * 0.5
    }

    /// Rear edge, behind the runner
    pub fn trailing_edge(&self) -> f32 {
        self.pos.y + self.size.y * 0.5
    }

    /// Halt in place
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}

/// Compact runner state for snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rank: u32,
    pub finished: bool,
    pub eliminated: bool,
    pub falling: bool,
}

impl From<&Runner> for RunnerSnapshot {
    fn from(runner: &Runner) -> Self {
        Self {
            id: runner.id,
            name: runner.name.clone(),
            x: runner.pos.x,
            y: runner.pos.y,
            rank: runner.rank,
            finished: runner.finished,
            eliminated: runner.eliminated,
            falling: runner.is_falling(),
        }
    }
}
