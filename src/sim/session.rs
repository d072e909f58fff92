//! Session - fixed-step race driver
//!
//! Wraps a [`Level`] behind a wall-clock driver: real time accumulates and
//! the simulation advances in fixed steps, with the stall cap keeping a long
//! pause from turning into a catch-up burst. Tick timings are averaged for
//! the stats surface.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_STEP, SIM_DT};
use crate::sim::level::{Level, RaceConfig, RaceHooks, RaceResult, RaceSnapshot, RaceStatus};

/// Driver statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub tick_rate: f32,
    pub avg_tick_time_ms: f32,
    pub runner_count: u32,
    pub status: RaceStatus,
}

/// One race from construction to its terminal state
pub struct RaceSession {
    level: Level,
    last_tick: Instant,
    tick_times: Vec<f32>,
    accumulator: f32,
}

impl RaceSession {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            level: Level::new(config),
            last_tick: Instant::now(),
            tick_times: Vec::with_capacity(60),
            accumulator: 0.0,
        }
    }

    /// Advance by the wall-clock time since the last call, in fixed steps
    pub fn tick(&mut self, hooks: &mut dyn RaceHooks) -> RaceSnapshot {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        // A stall never integrates more than the cap
        self.accumulator = (self.accumulator + elapsed).min(MAX_STEP);

        let tick_start = Instant::now();
        while self.accumulator >= SIM_DT {
            self.level.update(SIM_DT, hooks);
            self.accumulator -= SIM_DT;
        }

        let tick_time = tick_start.elapsed().as_secs_f32() * 1000.0;
        self.tick_times.push(tick_time);
        if self.tick_times.len() > 60 {
            self.tick_times.remove(0);
        }

        self.level.snapshot()
    }

    /// Step exactly one fixed tick regardless of wall time (headless runs,
    /// tests)
    pub fn step(&mut self, hooks: &mut dyn RaceHooks) {
        self.level.update(SIM_DT, hooks);
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn is_over(&self) -> bool {
        self.level.status != RaceStatus::Running
    }

    pub fn results(&self) -> &[RaceResult] {
        self.level.results()
    }

    pub fn stats(&self) -> SessionStats {
        let avg_tick_time_ms = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        SessionStats {
            tick_rate: 1.0 / SIM_DT,
            avg_tick_time_ms,
            runner_count: self.level.runners.len() as u32,
            status: self.level.status,
        }
    }
}
