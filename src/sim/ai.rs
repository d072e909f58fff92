//! Ai - steering controller
//!
//! One controller per AI runner. Each tick it refreshes its target if
//! needed, then walks a fixed priority pipeline: raft boarding/alighting,
//! obstacle avoidance, track following. The first stage with an opinion
//! wins. Intents are unit-space per axis; y = -1 is full forward.

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_COUNT, BOARD_WINDOW, SLICE_HEIGHT};
use crate::sim::geom::{Rect, Vec2};
use crate::sim::rng::RaceRng;
use crate::sim::runner::Runner;
use crate::sim::track::{BlockKind, Track};

/// Navigation goal: a walkable cell one row ahead, with a per-target lateral
/// tolerance so runners don't converge on pixel-identical paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBlock {
    pub row: i32,
    pub col: i32,
    pub rect: Rect,
    pub tolerance: f32,
}

/// Per-runner steering state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteeringController {
    target: Option<TargetBlock>,
}

impl SteeringController {
    /// Constants
    const FULL_FORWARD: f32 = -1.0;
    const BACK_OFF: f32 = 0.45;
    const LOOKAHEAD_ROWS: i32 = 3;
    const CLEARANCE_FACTOR: f32 = 3.0;
    const SLOWDOWN_SPEED: f32 = 80.0;
    const TOLERANCE_MIN: f32 = 2.0;
    const TOLERANCE_MAX: f32 = 10.0;

    pub fn new() -> Self {
        Self { target: None }
    }

    pub fn target(&self) -> Option<&TargetBlock> {
        self.target.as_ref()
    }

    /// Produce this tick's movement intent
    pub fn steer(&mut self, runner: &Runner, track: &Track, rng: &mut RaceRng) -> Vec2 {
        self.refresh_target(runner, track, rng);

        let Some(target) = self.target else {
            // Nothing walkable in the row ahead; wait for the track to clear
            return Vec2::ZERO;
        };

        let row = track.row_of(runner.pos.y);
        let col = track.col_of(runner.pos.x);

        if let Some(intent) = self.raft_stage(runner, track, row, col) {
            return intent;
        }
        if let Some(intent) = self.obstacle_stage(runner, track, row, col, &target) {
            return intent;
        }
        self.follow_stage(runner, track, row, col, &target)
    }

    /// Acquire a fresh target when none exists, the current one has been
    /// passed (trailing edge beyond its leading edge), or it sits
    /// implausibly far from the runner's row (respawn jumps).
    fn refresh_target(&mut self, runner: &Runner, track: &Track, rng: &mut RaceRng) {
        let row = track.row_of(runner.pos.y);

        if let Some(target) = &self.target {
            let passed = runner.trailing_edge() < target.rect.y;
            let behind = target.row < row;
            let far_ahead = target.row > row + 2;
            if !(passed || behind || far_ahead) {
                return;
            }
        }
        self.target = Self::acquire(row, track.col_of(runner.pos.x), track, rng);
    }

    /// Scan the next row outward from straight ahead, sides alternating in a
    /// random order, and take the first walkable cell.
    fn acquire(row: i32, col: i32, track: &Track, rng: &mut RaceRng) -> Option<TargetBlock> {
        let target_row = row + 1;
        let first: i32 = if rng.coin() { 1 } else { -1 };

        for offset in 0..BLOCK_COUNT as i32 {
            for side in [first, -first] {
                let candidate = col + offset * side;
                if track.get_block(target_row, candidate).is_walkable() {
                    return Some(TargetBlock {
                        row: target_row,
                        col: candidate,
                        rect: track.block_rect(target_row, candidate),
                        tolerance: rng.range_f32(Self::TOLERANCE_MIN, Self::TOLERANCE_MAX),
                    });
                }
                if offset == 0 {
                    // Straight ahead has a single candidate
                    break;
                }
            }
        }
        None
    }

    /// Raft boarding and alighting. Riding a raft cell, step off only once
    /// the current and next cells are free together; otherwise hold and let
    /// the raft carry. From a ledge, board when the next row is served by a
    /// raft that is aligned or nearly arrived under the leading edge, and
    /// hold while it is on its way.
    fn raft_stage(&self, runner: &Runner, track: &Track, row: i32, col: i32) -> Option<Vec2> {
        // The riding check comes first: from an arrival cell the home cell
        // below also reads as Raft, and the boarding window is trivially met
        // by a raft the runner is standing on
        if track.get_block(row, col).kind == BlockKind::Raft {
            let here_free = track.is_free(row, col);
            let ahead_free = track.is_free(row + 1, col);
            if here_free && ahead_free {
                return Some(Vec2::new(0.0, Self::FULL_FORWARD));
            }
            return Some(Vec2::ZERO);
        }

        if track.get_block(row + 1, col).kind == BlockKind::Raft {
            let boardable = track.is_free(row + 1, col)
                || track
                    .serving_raft(row + 1, col)
                    .map(|raft| raft.rect.top() + BOARD_WINDOW >= runner.leading_edge())
                    .unwrap_or(false);

            if boardable {
                return Some(Vec2::new(0.0, Self::FULL_FORWARD));
            }
            return Some(Vec2::ZERO);
        }

        None
    }

    /// Obstacle avoidance between the runner and its target
    fn obstacle_stage(
        &self,
        runner: &Runner,
        track: &Track,
        row: i32,
        col: i32,
        target: &TargetBlock,
    ) -> Option<Vec2> {
        let side: i32 = if target.rect.center_x() >= runner.pos.x { 1 } else { -1 };

        // Standing on an obstacle cell: slide off diagonally, target side
        if track.get_block(row, col).kind == BlockKind::Obstacle {
            return Some(Vec2::new(side as f32, Self::FULL_FORWARD));
        }

        if target.col != col && track.get_block(row, col + side).kind == BlockKind::Obstacle {
            let clearance = self.forward_clearance(track, row, col);
            if clearance >= Self::CLEARANCE_FACTOR * runner.size.y {
                // Enough room ahead to pass it in this column
                return Some(Vec2::new(0.0, Self::FULL_FORWARD));
            }
            // Swing wide around it
            return Some(Vec2::new(-side as f32, Self::FULL_FORWARD));
        }

        None
    }

    /// Default motion toward the target
    fn follow_stage(
        &self,
        runner: &Runner,
        track: &Track,
        row: i32,
        col: i32,
        target: &TargetBlock,
    ) -> Vec2 {
        let offset = target.rect.center_x() - runner.pos.x;

        let mut dx = 0.0;
        if offset.abs() > target.tolerance {
            let side: i32 = if offset > 0.0 { 1 } else { -1 };
            if track.get_block(row, col + side).kind == BlockKind::Free {
                dx = side as f32;
            }
        }

        let speed = runner.vel.y.abs();
        let dy = if speed > Self::SLOWDOWN_SPEED && self.forward_visibility(track, row, col) == 0 {
            Self::BACK_OFF
        } else if track.get_block(row + 1, col).kind == BlockKind::Empty {
            // Never walk into a gap; sidestep along the ledge instead
            0.0
        } else {
            Self::FULL_FORWARD
        };

        Vec2::new(dx, dy)
    }

    /// Walkable run ahead in the runner's own column, in world units
    fn forward_clearance(&self, track: &Track, row: i32, col: i32) -> f32 {
        let mut rows = 0;
        while rows < Self::LOOKAHEAD_ROWS && track.get_block(row + 1 + rows, col).is_walkable() {
            rows += 1;
        }
        rows as f32 * SLICE_HEIGHT
    }

    /// Consecutive Free rows ahead in the runner's column, capped at the
    /// look-ahead horizon
    fn forward_visibility(&self, track: &Track, row: i32, col: i32) -> i32 {
        let mut rows = 0;
        while rows < Self::LOOKAHEAD_ROWS
            && track.get_block(row + 1 + rows, col).kind == BlockKind::Free
        {
            rows += 1;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::template::TemplateTag;
    use crate::sim::track::compile;

    fn track_of(tags: &[TemplateTag]) -> Track {
        let mut rng = RaceRng::from_seed(11);
        compile(tags, 0.0, &mut rng)
    }

    fn runner_at(x: f32, y: f32) -> Runner {
        let mut runner = Runner::new(0, "Runner 1".into(), false);
        runner.pos = Vec2::new(x, y);
        runner
    }

    fn pinned_target(track: &Track, row: i32, col: i32) -> TargetBlock {
        TargetBlock {
            row,
            col,
            rect: track.block_rect(row, col),
            tolerance: 4.0,
        }
    }

    // --- Target acquisition ---

    #[test]
    fn acquires_the_cell_straight_ahead_when_free() {
        let track = track_of(&[TemplateTag::Full, TemplateTag::Full, TemplateTag::Full]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let intent = controller.steer(&runner, &track, &mut rng);

        let target = controller.target().expect("target acquired");
        assert_eq!((target.row, target.col), (1, 4));
        assert_eq!(intent, Vec2::new(0.0, SteeringController::FULL_FORWARD));
    }

    #[test]
    fn scans_outward_to_the_nearest_walkable_cell() {
        let track = track_of(&[TemplateTag::Full, TemplateTag::NarrowLeft, TemplateTag::Full]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let intent = controller.steer(&runner, &track, &mut rng);

        // Nearest walkable cell in row 1 from column 4 is column 2
        let target = controller.target().expect("target acquired");
        assert_eq!((target.row, target.col), (1, 2));
        assert_eq!(intent.x, -1.0);
    }

    #[test]
    fn waits_with_zero_intent_when_the_row_ahead_is_blocked() {
        let track = track_of(&[TemplateTag::Full, TemplateTag::Chasm, TemplateTag::Full]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        // Row 1 is all Empty and no raft serves it
        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent, Vec2::ZERO);
        assert!(controller.target().is_none());
    }

    #[test]
    fn same_seed_reproduces_the_same_decisions() {
        let track = track_of(&[
            TemplateTag::Full,
            TemplateTag::DualPassage,
            TemplateTag::Full,
            TemplateTag::NarrowLeft,
            TemplateTag::Full,
        ]);
        let waypoints = [(180.0, -32.0), (100.0, -96.0), (60.0, -160.0), (60.0, -224.0)];

        let mut trace_a = Vec::new();
        let mut trace_b = Vec::new();
        for trace in [&mut trace_a, &mut trace_b] {
            let mut controller = SteeringController::new();
            let mut rng = RaceRng::from_seed(31);
            for (x, y) in waypoints {
                let runner = runner_at(x, y);
                let intent = controller.steer(&runner, &track, &mut rng);
                trace.push((intent, controller.target().map(|t| (t.row, t.col))));
            }
        }
        assert_eq!(trace_a, trace_b);
    }

    // --- Track following ---

    #[test]
    fn holds_at_a_gap_and_sidesteps_along_the_ledge() {
        let track = track_of(&[TemplateTag::Full, TemplateTag::DualPassage, TemplateTag::Full]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let intent = controller.steer(&runner, &track, &mut rng);

        // Straight ahead is Empty: no forward step, lateral motion toward
        // whichever passage was targeted
        assert_eq!(intent.y, 0.0);
        assert_eq!(intent.x.abs(), 1.0);
    }

    #[test]
    fn backs_off_when_fast_with_no_visibility() {
        let track = track_of(&[TemplateTag::Full, TemplateTag::DualPassage, TemplateTag::Full]);
        let mut runner = runner_at(180.0, -32.0);
        runner.vel = Vec2::new(0.0, -120.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent.y, SteeringController::BACK_OFF);
    }

    #[test]
    fn keeps_its_target_until_fully_past_it() {
        let track = track_of(&[
            TemplateTag::Full,
            TemplateTag::Full,
            TemplateTag::Full,
            TemplateTag::Full,
        ]);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let runner = runner_at(180.0, -32.0);
        controller.steer(&runner, &track, &mut rng);
        let first = *controller.target().expect("target acquired");
        assert_eq!(first.row, 1);

        // Still crossing the target band: no re-acquisition
        let crossing = runner_at(180.0, -100.0);
        controller.steer(&crossing, &track, &mut rng);
        assert_eq!(*controller.target().expect("kept"), first);

        // Fully past its band means the trailing edge has cleared it, which
        // puts the runner a full row beyond; the new target is one row ahead
        let past = runner_at(180.0, -150.0);
        controller.steer(&past, &track, &mut rng);
        assert_eq!(controller.target().expect("reacquired").row, 3);
    }

    // --- Obstacle avoidance ---

    #[test]
    fn slides_off_an_obstacle_diagonally_toward_the_target() {
        let track = track_of(&[TemplateTag::ObstacleField, TemplateTag::Full, TemplateTag::Full]);
        // Standing on the bumper cell in column 1
        let runner = runner_at(60.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent.y, SteeringController::FULL_FORWARD);
        assert_eq!(intent.x.abs(), 1.0);
    }

    #[test]
    fn pushes_past_an_adjacent_obstacle_given_clearance() {
        let track = track_of(&[
            TemplateTag::ObstacleStagger,
            TemplateTag::Full,
            TemplateTag::Full,
            TemplateTag::Full,
        ]);
        let runner = runner_at(60.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);
        // Target beyond the bumper in column 2
        controller.target = Some(pinned_target(&track, 1, 4));

        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent, Vec2::new(0.0, SteeringController::FULL_FORWARD));
    }

    #[test]
    fn swings_wide_around_an_adjacent_obstacle_without_clearance() {
        let track = track_of(&[
            TemplateTag::ObstacleStagger,
            TemplateTag::NarrowRight,
            TemplateTag::Full,
            TemplateTag::Full,
        ]);
        let runner = runner_at(60.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);
        controller.target = Some(pinned_target(&track, 1, 6));

        // Column 1 dead-ends into the narrow row: swing away from the bumper
        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent, Vec2::new(-1.0, SteeringController::FULL_FORWARD));
    }

    // --- Rafts ---

    #[test]
    fn holds_at_the_ledge_until_the_raft_arrives() {
        let track = track_of(&[
            TemplateTag::Full,
            TemplateTag::Chasm,
            TemplateTag::Raft,
            TemplateTag::Full,
        ]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        // The raft sits at its home dock, a full band below the ledge
        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent, Vec2::ZERO);
        // The arrival cell is still the navigation goal
        assert_eq!(controller.target().expect("target").col, 4);
    }

    #[test]
    fn boards_once_the_raft_docks_at_the_arrival_band() {
        let mut track = track_of(&[
            TemplateTag::Full,
            TemplateTag::Chasm,
            TemplateTag::Raft,
            TemplateTag::Full,
        ]);
        let runner = runner_at(180.0, -32.0);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        let dt = 0.05;
        let mut time = 0.0;
        while !track.is_free(1, 4) {
            time += dt;
            track.advance_rafts(time, dt);
            assert!(time < 20.0, "raft never arrived");
        }

        let intent = controller.steer(&runner, &track, &mut rng);
        assert_eq!(intent, Vec2::new(0.0, SteeringController::FULL_FORWARD));
    }

    #[test]
    fn rides_the_raft_and_steps_off_when_both_bands_are_free() {
        let mut track = track_of(&[
            TemplateTag::Full,
            TemplateTag::Chasm,
            TemplateTag::Raft,
            TemplateTag::Full,
        ]);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);

        // Mid-travel: a rider in the arrival band holds
        let dt = 0.05;
        let mut time = 0.0;
        while !track.is_free(1, 4) {
            time += dt;
            track.advance_rafts(time, dt);
        }
        let rider = runner_at(180.0, -96.0);
        let intent = controller.steer(&rider, &track, &mut rng);
        assert_eq!(intent, Vec2::ZERO, "next band is not yet free");

        // Raft back at home with the rider carried into its band: step off
        while !track.is_free(2, 4) {
            time += dt;
            track.advance_rafts(time, dt);
            assert!(time < 40.0, "raft never returned home");
        }
        let carried = runner_at(180.0, -160.0);
        let intent = controller.steer(&carried, &track, &mut rng);
        assert_eq!(intent, Vec2::new(0.0, SteeringController::FULL_FORWARD));
    }

    #[test]
    fn a_rider_keeps_support_for_the_whole_crossing() {
        use crate::sim::physics::{Integrator, Physics};

        let mut track = track_of(&[
            TemplateTag::Full,
            TemplateTag::Chasm,
            TemplateTag::Raft,
            TemplateTag::Full,
        ]);
        let mut controller = SteeringController::new();
        let mut rng = RaceRng::from_seed(4);
        let physics = Integrator::default();

        // Dock the raft at the arrival band and put a rider on it
        let dt = 0.05;
        let mut time = 0.0;
        while !track.is_free(1, 4) {
            time += dt;
            track.advance_rafts(time, dt);
            assert!(time < 20.0, "raft never arrived");
        }
        let mut rider = runner_at(180.0, -96.0);

        // Steer and integrate through the return trip; the rider must stay
        // on the raft the whole way back to the home dock
        while !track.is_free(2, 4) {
            time += dt;
            track.advance_rafts(time, dt);

            let rows = track
                .get_between(rider.area().bottom() - SLICE_HEIGHT, rider.area().top());
            rider.pos.y += track.raft_carry(rows, rider.pos);
            let intent = controller.steer(&rider, &track, &mut rng);
            let (pos, vel) = physics.integrate(rider.pos, rider.vel, intent, Vec2::ZERO, dt);
            rider.pos = pos;
            rider.vel = vel;

            let rows = track
                .get_between(rider.area().bottom() - SLICE_HEIGHT, rider.area().top());
            assert!(
                track.is_on_platform(rows, &rider.area()),
                "rider lost support at y={}",
                rider.pos.y
            );
            assert!(time < 60.0, "raft never returned home");
        }
    }
}
