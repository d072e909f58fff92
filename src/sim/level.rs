//! Level - race orchestrator
//!
//! Owns the compiled track and the roster. Each tick it advances raft
//! surfaces, drives steering and physics, resolves falls and respawns,
//! reports collisions, recomputes ranks, and enforces the elimination
//! cutoff state machine. Side effects go out through [`RaceHooks`]; the
//! orchestrator never depends on their results.

use serde::{Deserialize, Serialize};

use crate::consts::{
    BLOCK_COUNT, BLOCK_WIDTH, CAMERA_CUE_DELAY, DEFAULT_ROSTER, ELIMINATION_QUOTA, FALL_DURATION,
    MAX_STEP, RESPAWN_MARGIN, SLICE_HEIGHT, SPAWN_JITTER, TRACK_WIDTH, UNLUCKY_RANK,
};
use crate::sim::ai::SteeringController;
use crate::sim::geom::{Rect, Vec2};
use crate::sim::physics::{Integrator, Physics};
use crate::sim::rng::RaceRng;
use crate::sim::runner::{Runner, RunnerSnapshot};
use crate::sim::template::race_plan;
use crate::sim::track::{compile, Element, Track};

/// Race configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of runners in the roster
    pub runner_count: u32,
    /// Seed for the shared random source
    pub seed: u64,
    /// Roster slot driven by player input; None runs every slot on AI
    pub player_slot: Option<u32>,
    /// World y of the start line
    pub start_y: f32,
    /// Hazard segments in the plan (clamped to 3..=4)
    pub segments: u32,
    /// Largest dt a single tick will integrate after a stall
    pub max_step: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            runner_count: DEFAULT_ROSTER,
            seed: 0,
            player_slot: None,
            start_y: 0.0,
            segments: 3,
            max_step: MAX_STEP,
        }
    }
}

impl RaceConfig {
    /// A roster no bigger than the quota cannot produce a qualifying field
    fn validated(mut self) -> Self {
        if self.runner_count <= ELIMINATION_QUOTA {
            log::warn!(
                "roster of {} cannot satisfy the quota of {}, clamping to {}",
                self.runner_count,
                ELIMINATION_QUOTA,
                ELIMINATION_QUOTA + 1
            );
            self.runner_count = ELIMINATION_QUOTA + 1;
        }
        if self.max_step <= 0.0 {
            self.max_step = MAX_STEP;
        }
        self
    }
}

/// Race outcome state machine; both end states are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Running,
    /// The player was eliminated
    GameOver,
    /// The player finished or the qualification cutoff was reached
    Finished,
}

/// One finish record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub runner_id: u32,
    pub runner_name: String,
    pub finish_time: f32,
    pub position: u32,
}

/// Compact race state for an embedding frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub elapsed_time: f32,
    pub runners: Vec<RunnerSnapshot>,
    pub finisher_count: u32,
    pub eliminated_count: u32,
}

/// Side-effect reports for rendering and audio collaborators. Every method
/// defaults to a no-op; the orchestrator never reads a result back.
pub trait RaceHooks {
    fn on_collision(&mut self, _a: &Runner, _b: &Runner, _volume: f32) {}
    fn on_obstacle_contact(&mut self, _runner: &Runner) {}
    fn on_fall(&mut self, _runner: &Runner) {}
    fn on_respawn(&mut self, _runner: &Runner) {}
    fn on_camera_cue(&mut self, _runner: &Runner) {}
    fn on_elimination(&mut self, _runner: &Runner) {}
    fn on_finish(&mut self, _runner: &Runner) {}
}

/// Hook sink that ignores every event
pub struct NoHooks;

impl RaceHooks for NoHooks {}

/// Drawing collaborator fed by [`Level::draw`]
pub trait Renderer {
    fn draw_element(&mut self, element: &Element);
    fn draw_runner(&mut self, runner: &Runner);
}

/// Delayed camera transition scheduled when a fall begins. Fires
/// best-effort: only while the runner is still falling and the race still
/// running.
#[derive(Debug, Clone)]
struct CameraCue {
    runner_id: u32,
    due_at: f32,
}

/// Per-runner outcome of the movement phase
enum Motion {
    BeginFall,
    Step { intent: Vec2, slope: f32, carry: f32 },
}

/// Race orchestrator: one instance per race, rebuilt wholesale on restart
pub struct Level {
    pub config: RaceConfig,
    pub status: RaceStatus,
    pub track: Track,
    pub runners: Vec<Runner>,
    pub elapsed_time: f32,
    pub finish_order: Vec<RaceResult>,
    controllers: Vec<Option<SteeringController>>,
    physics: Box<dyn Physics>,
    rng: RaceRng,
    eliminated_count: u32,
    cues: Vec<CameraCue>,
    player_input: Vec2,
}

impl Level {
    /// Constants
    const COLLISION_FALLOFF: f32 = 600.0;
    const CONTACT_DAMPING: f32 = 0.25;

    pub fn new(config: RaceConfig) -> Self {
        let config = config.validated();
        let mut rng = RaceRng::from_seed(config.seed);
        let track = compile(&race_plan(config.segments), config.start_y, &mut rng);

        // Spawn formation: nine wide across the apron rows behind the first
        // hazard, jittered within each cell
        let mut runners = Vec::with_capacity(config.runner_count as usize);
        let mut controllers = Vec::with_capacity(config.runner_count as usize);
        for i in 0..config.runner_count {
            let is_player = config.player_slot == Some(i);
            let mut runner = Runner::new(i, format!("Runner {}", i + 1), is_player);
            let col = (i % BLOCK_COUNT as u32) as f32;
            let formation_row = (i / BLOCK_COUNT as u32) as f32;
            runner.pos = Vec2::new(
                (col + 0.5) * BLOCK_WIDTH + rng.range_f32(-SPAWN_JITTER, SPAWN_JITTER),
                config.start_y - SLICE_HEIGHT * (formation_row + 1.5),
            );
            runners.push(runner);
            controllers.push(if is_player {
                None
            } else {
                Some(SteeringController::new())
            });
        }

        log::info!(
            "race initialized: {} runners over {} slices, seed {}",
            runners.len(),
            track.len(),
            config.seed
        );

        Self {
            config,
            status: RaceStatus::Running,
            track,
            runners,
            elapsed_time: 0.0,
            finish_order: Vec::new(),
            controllers,
            physics: Box::new(Integrator::default()),
            rng,
            eliminated_count: 0,
            cues: Vec::new(),
            player_input: Vec2::ZERO,
        }
    }

    /// Swap the motion integration seam
    pub fn with_physics(mut self, physics: Box<dyn Physics>) -> Self {
        self.physics = physics;
        self
    }

    /// Movement intent for the player slot, applied on the next tick
    pub fn set_player_input(&mut self, intent: Vec2) {
        self.player_input = intent.clamp_unit();
    }

    /// Advance one tick. Terminal states freeze the simulation.
    pub fn update(&mut self, dt: f32, hooks: &mut dyn RaceHooks) {
        if self.status != RaceStatus::Running {
            return;
        }
        let dt = dt.clamp(0.0, self.config.max_step);
        self.elapsed_time += dt;

        self.track.advance_rafts(self.elapsed_time, dt);
        self.move_runners(dt, hooks);
        self.respawn_fallen(hooks);
        self.resolve_collisions(hooks);
        self.recompute_ranks();
        self.sweep_progress(hooks);
        self.fire_due_cues(hooks);
    }

    /// Support check, steering, and integration for every active runner.
    /// Steering reads the roster immutably, so intents are collected first
    /// and applied after.
    fn move_runners(&mut self, dt: f32, hooks: &mut dyn RaceHooks) {
        let mut motions: Vec<Option<Motion>> = Vec::with_capacity(self.runners.len());
        for (runner, controller) in self.runners.iter().zip(self.controllers.iter_mut()) {
            if runner.finished || runner.eliminated || runner.is_falling() {
                motions.push(None);
                continue;
            }

            let area = runner.area();
            // One extra row ahead so a serving raft's home element is in scope
            let rows = self.track.get_between(area.bottom() - SLICE_HEIGHT, area.top());
            if !self.track.is_on_platform(rows.clone(), &area) {
                motions.push(Some(Motion::BeginFall));
                continue;
            }

            let intent = match controller {
                Some(controller) => controller.steer(runner, &self.track, &mut self.rng),
                None => self.player_input,
            };
            motions.push(Some(Motion::Step {
                intent,
                slope: self.track.slope_force_at(rows.clone(), runner.pos),
                carry: self.track.raft_carry(rows, runner.pos),
            }));
        }

        for (i, motion) in motions.into_iter().enumerate() {
            match motion {
                None => {}
                Some(Motion::BeginFall) => {
                    let runner = &mut self.runners[i];
                    runner.fall_started = Some(self.elapsed_time);
                    runner.stop();
                    self.cues.push(CameraCue {
                        runner_id: runner.id,
                        due_at: self.elapsed_time + CAMERA_CUE_DELAY,
                    });
                    log::debug!("{} lost its footing", runner.name);
                    hooks.on_fall(&self.runners[i]);
                }
                Some(Motion::Step { intent, slope, carry }) => {
                    let runner = &mut self.runners[i];
                    runner.pos.y += carry;
                    let (pos, vel) = self.physics.integrate(
                        runner.pos,
                        runner.vel,
                        intent,
                        Vec2::new(slope, 0.0),
                        dt,
                    );
                    runner.pos = pos;
                    runner.vel = vel;
                    clamp_to_walls(runner);
                }
            }
        }
    }

    /// Return runners past the fall duration to their latest checkpoint.
    /// An occupied drop spot leaves the runner falling until the next tick.
    fn respawn_fallen(&mut self, hooks: &mut dyn RaceHooks) {
        for i in 0..self.runners.len() {
            let runner = &self.runners[i];
            if runner.finished || runner.eliminated {
                continue;
            }
            let Some(started) = runner.fall_started else {
                continue;
            };
            if self.elapsed_time - started < FALL_DURATION {
                continue;
            }

            let size = runner.size;
            let checkpoint = runner.checkpoint.unwrap_or(0);
            let Some(element) = self.track.get_checkpoint(checkpoint) else {
                continue;
            };
            let drop = Vec2::new(
                self.rng.range_f32(RESPAWN_MARGIN, TRACK_WIDTH - RESPAWN_MARGIN),
                element.y + SLICE_HEIGHT * 0.5,
            );
            let footprint = Rect::centered(drop.x, drop.y, size.x, size.y);
            let blocked = self.runners.iter().enumerate().any(|(j, other)| {
                j != i && !other.does_not_collide() && other.area().overlaps(&footprint)
            });
            if blocked {
                continue;
            }

            let runner = &mut self.runners[i];
            runner.pos = drop;
            runner.stop();
            runner.fall_started = None;
            log::debug!("{} respawned at checkpoint {}", runner.name, checkpoint);
            hooks.on_respawn(&self.runners[i]);
        }
    }

    /// Runner-vs-runner contact is informational; obstacle contact is the
    /// authoritative check and resolves by a shallow-axis push-out with
    /// damped velocity on that axis.
    fn resolve_collisions(&mut self, hooks: &mut dyn RaceHooks) {
        let listener_y = self.listener_y();
        for i in 0..self.runners.len() {
            if self.runners[i].does_not_collide() {
                continue;
            }
            for j in i + 1..self.runners.len() {
                if self.runners[j].does_not_collide() {
                    continue;
                }
                if self.runners[i].area().overlaps(&self.runners[j].area()) {
                    let at = (self.runners[i].pos.y + self.runners[j].pos.y) * 0.5;
                    let volume =
                        (1.0 - (at - listener_y).abs() / Self::COLLISION_FALLOFF).clamp(0.0, 1.0);
                    hooks.on_collision(&self.runners[i], &self.runners[j], volume);
                }
            }
        }

        for i in 0..self.runners.len() {
            if self.runners[i].does_not_collide() {
                continue;
            }
            let area = self.runners[i].area();
            let rows = self.track.get_between(area.bottom(), area.top());
            let contact = rows
                .flat_map(|row| &self.track.elements[row].obstacles)
                .find_map(|obstacle| push_out(&area, &obstacle.rect));
            if let Some(push) = contact {
                let runner = &mut self.runners[i];
                runner.pos += push;
                if push.x != 0.0 {
                    runner.vel.x = -runner.vel.x * Self::CONTACT_DAMPING;
                }
                if push.y != 0.0 {
                    runner.vel.y = -runner.vel.y * Self::CONTACT_DAMPING;
                }
                hooks.on_obstacle_contact(&self.runners[i]);
            }
        }
    }

    /// Collision audio attenuates by y-distance from the player, or from the
    /// current leader in an all-AI race
    fn listener_y(&self) -> f32 {
        self.runners
            .iter()
            .find(|r| r.is_player)
            .or_else(|| {
                self.runners
                    .iter()
                    .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            })
            .map(|r| r.pos.y)
            .unwrap_or(self.config.start_y)
    }

    /// Finished runners rank by finish order, then everyone else (eliminated
    /// included) by progress toward the finish line
    fn recompute_ranks(&mut self) {
        let mut order: Vec<usize> = Vec::with_capacity(self.runners.len());
        for result in &self.finish_order {
            if let Some(i) = self.runners.iter().position(|r| r.id == result.runner_id) {
                order.push(i);
            }
        }
        let mut rest: Vec<usize> = (0..self.runners.len())
            .filter(|&i| !self.runners[i].finished)
            .collect();
        rest.sort_by(|&a, &b| self.runners[a].pos.y.total_cmp(&self.runners[b].pos.y));
        order.extend(rest);

        for (rank, i) in order.into_iter().enumerate() {
            self.runners[i].rank = rank as u32 + 1;
        }
    }

    /// Checkpoint, finish-line, and elimination bookkeeping, in roster order.
    /// The unlucky rank eliminates only while the quota is unmet; the start
    /// line seeds checkpoint 0 and never eliminates.
    fn sweep_progress(&mut self, hooks: &mut dyn RaceHooks) {
        let roster = self.runners.len() as u32;
        let cutoff = roster - ELIMINATION_QUOTA;

        for i in 0..self.runners.len() {
            if self.status != RaceStatus::Running {
                break;
            }
            {
                let runner = &self.runners[i];
                if runner.finished || runner.eliminated || runner.is_falling() {
                    continue;
                }
            }

            if let Some(latest) = self.track.find_latest_checkpoint(self.runners[i].pos.y) {
                let prior = self.runners[i].checkpoint;
                if prior.map_or(true, |p| latest > p) {
                    self.runners[i].checkpoint = Some(latest);
                    if latest > 0
                        && self.runners[i].rank == UNLUCKY_RANK
                        && self.eliminated_count < ELIMINATION_QUOTA
                    {
                        self.eliminate(i, hooks);
                        continue;
                    }
                }
            }

            if self.runners[i].leading_edge() <= self.track.finish_y {
                if self.runners[i].rank == UNLUCKY_RANK
                    && self.eliminated_count < ELIMINATION_QUOTA
                {
                    self.eliminate(i, hooks);
                    continue;
                }
                self.record_finish(i, hooks);
                let position = self.finish_order.len() as u32;
                if self.runners[i].is_player || position == cutoff {
                    self.terminal_sweep(hooks);
                }
            }
        }
    }

    fn eliminate(&mut self, i: usize, hooks: &mut dyn RaceHooks) {
        let runner = &mut self.runners[i];
        runner.eliminated = true;
        runner.stop();
        self.eliminated_count += 1;
        log::info!("{} eliminated at rank {}", runner.name, runner.rank);
        if runner.is_player {
            self.status = RaceStatus::GameOver;
            log::info!("player eliminated, race over");
        }
        hooks.on_elimination(&self.runners[i]);
    }

    fn record_finish(&mut self, i: usize, hooks: &mut dyn RaceHooks) {
        let position = self.finish_order.len() as u32 + 1;
        let runner = &mut self.runners[i];
        runner.finished = true;
        runner.stop();
        log::info!("{} finished in position {}", runner.name, position);
        self.finish_order.push(RaceResult {
            runner_id: runner.id,
            runner_name: runner.name.clone(),
            finish_time: self.elapsed_time,
            position,
        });
        hooks.on_finish(&self.runners[i]);
    }

    /// The race outcome is settled: top the eliminated count up to the quota
    /// from the worst rank below the cutoff, qualify everyone left, and land
    /// on the terminal state.
    fn terminal_sweep(&mut self, hooks: &mut dyn RaceHooks) {
        let roster = self.runners.len() as u32;
        let cutoff = roster - ELIMINATION_QUOTA;

        let mut remaining: Vec<usize> = (0..self.runners.len())
            .filter(|&i| !self.runners[i].finished && !self.runners[i].eliminated)
            .collect();
        remaining.sort_by(|&a, &b| self.runners[b].rank.cmp(&self.runners[a].rank));
        for &i in &remaining {
            if self.eliminated_count >= ELIMINATION_QUOTA {
                break;
            }
            if self.runners[i].rank > cutoff {
                self.eliminate(i, hooks);
            }
        }

        let mut qualifiers: Vec<usize> = (0..self.runners.len())
            .filter(|&i| !self.runners[i].finished && !self.runners[i].eliminated)
            .collect();
        qualifiers.sort_by(|&a, &b| self.runners[a].rank.cmp(&self.runners[b].rank));
        for i in qualifiers {
            self.record_finish(i, hooks);
        }

        let player_out = self.runners.iter().any(|r| r.is_player && r.eliminated);
        self.status = if player_out {
            RaceStatus::GameOver
        } else {
            RaceStatus::Finished
        };
        log::info!(
            "race over: {:?}, {} finished, {} eliminated",
            self.status,
            self.finish_order.len(),
            self.eliminated_count
        );
    }

    /// Fire camera cues that have come due. Best-effort: a runner that
    /// already respawned, or a race that already ended, drops the cue.
    fn fire_due_cues(&mut self, hooks: &mut dyn RaceHooks) {
        let now = self.elapsed_time;
        let mut due = Vec::new();
        self.cues.retain(|cue| {
            if cue.due_at <= now {
                due.push(cue.runner_id);
                false
            } else {
                true
            }
        });

        if self.status != RaceStatus::Running {
            return;
        }
        for id in due {
            if let Some(runner) = self.runners.iter().find(|r| r.id == id && r.is_falling()) {
                hooks.on_camera_cue(runner);
            }
        }
    }

    /// Defer drawing of the visible slice range and runners to the renderer
    pub fn draw(&self, y_min: f32, y_max: f32, renderer: &mut dyn Renderer) {
        for row in self.track.get_between(y_min, y_max) {
            renderer.draw_element(&self.track.elements[row]);
        }
        for runner in &self.runners {
            if runner.pos.y >= y_min && runner.pos.y <= y_max {
                renderer.draw_runner(runner);
            }
        }
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            elapsed_time: self.elapsed_time,
            runners: self.runners.iter().map(RunnerSnapshot::from).collect(),
            finisher_count: self.finish_order.len() as u32,
            eliminated_count: self.eliminated_count,
        }
    }

    pub fn results(&self) -> &[RaceResult] {
        &self.finish_order
    }

    pub fn get_leader(&self) -> Option<&Runner> {
        self.runners.iter().find(|r| r.rank == 1)
    }

    pub fn get_runner(&self, id: u32) -> Option<&Runner> {
        self.runners.iter().find(|r| r.id == id)
    }
}

/// The track has solid side walls; lateral motion stops at them
fn clamp_to_walls(runner: &mut Runner) {
    let half = runner.size.x * 0.5;
    let clamped = runner.pos.x.clamp(half, TRACK_WIDTH - half);
    if clamped != runner.pos.x {
        runner.pos.x = clamped;
        runner.vel.x = 0.0;
    }
}

/// Shallow-axis separation vector moving `area` out of `solid`; None when
/// they do not overlap
fn push_out(area: &Rect, solid: &Rect) -> Option<Vec2> {
    if !area.overlaps(solid) {
        return None;
    }
    let dx_left = solid.left() - area.right();
    let dx_right = solid.right() - area.left();
    let dy_down = solid.bottom() - area.top();
    let dy_up = solid.top() - area.bottom();

    let dx = if dx_right.abs() < dx_left.abs() { dx_right } else { dx_left };
    let dy = if dy_up.abs() < dy_down.abs() { dy_up } else { dy_down };
    Some(if dx.abs() <= dy.abs() {
        Vec2::new(dx, 0.0)
    } else {
        Vec2::new(0.0, dy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{RUNNER_WIDTH, SIM_DT};

    #[derive(Default)]
    struct RecordingHooks {
        collisions: Vec<(u32, u32, f32)>,
        contacts: Vec<u32>,
        falls: Vec<u32>,
    }

    impl RaceHooks for RecordingHooks {
        fn on_collision(&mut self, a: &Runner, b: &Runner, volume: f32) {
            self.collisions.push((a.id, b.id, volume));
        }

        fn on_obstacle_contact(&mut self, runner: &Runner) {
            self.contacts.push(runner.id);
        }

        fn on_fall(&mut self, runner: &Runner) {
            self.falls.push(runner.id);
        }
    }

    fn level_of(count: u32, seed: u64) -> Level {
        Level::new(RaceConfig {
            runner_count: count,
            seed,
            ..Default::default()
        })
    }

    // --- Construction ---

    #[test]
    fn undersized_rosters_clamp_above_the_quota() {
        let level = level_of(5, 1);
        assert_eq!(level.runners.len() as u32, ELIMINATION_QUOTA + 1);
    }

    #[test]
    fn the_formation_spawns_supported_behind_the_start_line() {
        let mut level = level_of(40, 2);

        for runner in &level.runners {
            let area = runner.area();
            let rows = level
                .track
                .get_between(area.bottom() - SLICE_HEIGHT, area.top());
            assert!(level.track.is_on_platform(rows, &area), "{}", runner.name);
            assert!(area.left() >= 0.0 && area.right() <= TRACK_WIDTH);
        }

        // First tick records the start line as checkpoint 0 without
        // eliminating anyone
        level.update(SIM_DT, &mut NoHooks);
        assert!(level.runners.iter().all(|r| r.checkpoint == Some(0)));
        assert!(level.runners.iter().all(|r| !r.eliminated));
    }

    #[test]
    fn player_slot_carries_no_controller() {
        let level = Level::new(RaceConfig {
            runner_count: 20,
            player_slot: Some(3),
            ..Default::default()
        });
        assert!(level.runners[3].is_player);
        assert!(level.controllers[3].is_none());
        assert!(level.controllers[0].is_some());
    }

    // --- Tick mechanics ---

    #[test]
    fn terminal_states_freeze_the_simulation() {
        let mut level = level_of(20, 3);
        level.status = RaceStatus::Finished;
        let elapsed = level.elapsed_time;
        let positions: Vec<Vec2> = level.runners.iter().map(|r| r.pos).collect();

        level.update(SIM_DT, &mut NoHooks);

        assert_eq!(level.elapsed_time, elapsed);
        let after: Vec<Vec2> = level.runners.iter().map(|r| r.pos).collect();
        assert_eq!(positions, after);
    }

    #[test]
    fn side_walls_stop_lateral_motion() {
        let mut level = Level::new(RaceConfig {
            runner_count: 20,
            player_slot: Some(0),
            ..Default::default()
        });
        level.runners[0].pos = Vec2::new(20.0, -96.0);
        level.set_player_input(Vec2::new(-1.0, 0.0));

        for _ in 0..30 {
            level.update(SIM_DT, &mut NoHooks);
        }

        assert_eq!(level.runners[0].pos.x, RUNNER_WIDTH * 0.5);
        assert_eq!(level.runners[0].vel.x, 0.0);
    }

    #[test]
    fn losing_support_starts_a_fall() {
        let mut level = level_of(20, 4);
        let chasm = level
            .track
            .elements
            .iter()
            .find(|e| e.surfaces.is_empty())
            .expect("plan contains a chasm")
            .y;
        level.runners[0].pos = Vec2::new(60.0, chasm + SLICE_HEIGHT * 0.5);

        let mut hooks = RecordingHooks::default();
        level.update(SIM_DT, &mut hooks);

        assert!(level.runners[0].is_falling());
        assert_eq!(level.runners[0].vel, Vec2::ZERO);
        assert_eq!(hooks.falls, vec![0]);
    }

    // --- Collisions ---

    #[test]
    fn push_out_separates_on_the_shallow_axis() {
        let solid = Rect::new(40.0, 0.0, 32.0, 36.0);

        // Deep vertically, shallow horizontally: push sideways
        let area = Rect::new(60.0, 2.0, 24.0, 32.0);
        let push = push_out(&area, &solid).expect("overlapping");
        assert_eq!(push.y, 0.0);
        assert!(push.x > 0.0);
        assert!(!area.offset(push.x, push.y).overlaps(&solid));

        assert_eq!(push_out(&Rect::new(200.0, 0.0, 24.0, 32.0), &solid), None);
    }

    #[test]
    fn obstacle_contact_pushes_the_runner_clear() {
        let mut level = level_of(20, 5);
        let bumper = level
            .track
            .elements
            .iter()
            .find_map(|e| e.obstacles.first())
            .expect("plan contains obstacles")
            .rect;
        level.runners[0].pos = Vec2::new(bumper.center_x() + 4.0, bumper.center_y());

        let mut hooks = RecordingHooks::default();
        level.update(SIM_DT, &mut hooks);

        // Contact is authoritative: the runner is shoved clear, not dropped
        // into a fall
        assert!(hooks.contacts.contains(&0));
        assert!(!level.runners[0].area().overlaps(&bumper));
        assert!(!level.runners[0].is_falling());
        assert!(hooks.falls.is_empty());
    }

    #[test]
    fn runner_contact_reports_with_attenuated_volume() {
        let mut level = level_of(20, 6);
        level.runners[0].pos = Vec2::new(100.0, -100.0);
        level.runners[1].pos = Vec2::new(110.0, -100.0);

        let mut hooks = RecordingHooks::default();
        level.update(SIM_DT, &mut hooks);

        let (a, b, volume) = hooks.collisions[0];
        assert_eq!((a, b), (0, 1));
        assert!(volume > 0.0 && volume <= 1.0);
    }

    // --- Lookups ---

    #[test]
    fn leader_and_id_lookups_resolve() {
        let mut level = level_of(20, 7);
        for (i, runner) in level.runners.iter_mut().enumerate() {
            runner.pos = Vec2::new(180.0, -80.0 - 8.0 * i as f32);
        }
        level.update(SIM_DT, &mut NoHooks);

        assert_eq!(level.get_leader().expect("leader").id, 19);
        assert_eq!(level.get_runner(7).expect("runner").id, 7);
        assert!(level.get_runner(99).is_none());

        let snapshot = level.snapshot();
        assert_eq!(snapshot.runners.len(), 20);
        assert_eq!(snapshot.finisher_count, 0);
        assert_eq!(snapshot.status, RaceStatus::Running);
    }
}
