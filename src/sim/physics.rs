//! Physics - motion integration seam
//!
//! The orchestrator hands each grounded runner's movement intent to a
//! `Physics` implementation together with the slope bias of the surface
//! under it. The default integrator accelerates velocity toward the intent
//! target per axis; the slope bias folds into that target, so a runner can
//! fight a slope but never fully cancel it.

use serde::{Deserialize, Serialize};

use crate::sim::geom::Vec2;

/// Motion integration: advance position and velocity from a movement intent
/// in [-1, 1] per axis plus a slope velocity bias
pub trait Physics {
    fn integrate(&self, pos: Vec2, vel: Vec2, intent: Vec2, slope: Vec2, dt: f32) -> (Vec2, Vec2);
}

/// Default integrator with smooth per-axis acceleration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrator {
    /// Top speed at full intent (world units per second)
    pub max_speed: f32,
    /// Acceleration toward the target velocity (world units per second^2)
    pub accel: f32,
}

impl Integrator {
    /// Constants
    pub const MAX_SPEED: f32 = 130.0;
    pub const ACCELERATION: f32 = 420.0;
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            max_speed: Self::MAX_SPEED,
            accel: Self::ACCELERATION,
        }
    }
}

impl Physics for Integrator {
    fn integrate(&self, pos: Vec2, vel: Vec2, intent: Vec2, slope: Vec2, dt: f32) -> (Vec2, Vec2) {
        let step = self.accel * dt;
        let target = Vec2::new(
            intent.x * self.max_speed + slope.x,
            intent.y * self.max_speed + slope.y,
        );

        let vel = Vec2::new(
            approach(vel.x, target.x, step),
            approach(vel.y, target.y, step),
        );
        (pos + vel * dt, vel)
    }
}

/// Move `current` toward `target` by at most `step`
fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn approach_converges_without_overshoot() {
        assert_eq!(approach(0.0, 10.0, 4.0), 4.0);
        assert_eq!(approach(8.0, 10.0, 4.0), 10.0);
        assert_eq!(approach(10.0, 10.0, 4.0), 10.0);
        assert_eq!(approach(-2.0, -10.0, 4.0), -6.0);
    }

    #[test]
    fn full_forward_intent_reaches_top_speed() {
        let physics = Integrator::default();
        let mut pos = Vec2::new(180.0, 0.0);
        let mut vel = Vec2::ZERO;

        for _ in 0..60 {
            let (p, v) = physics.integrate(pos, vel, Vec2::new(0.0, -1.0), Vec2::ZERO, DT);
            pos = p;
            vel = v;
        }

        assert_eq!(vel.y, -Integrator::MAX_SPEED);
        assert_eq!(vel.x, 0.0);
        assert!(pos.y < -Integrator::MAX_SPEED * 0.5);
    }

    #[test]
    fn slope_bias_drifts_an_idle_runner() {
        let physics = Integrator::default();
        let slope = Vec2::new(90.0, 0.0);
        let mut pos = Vec2::new(180.0, 0.0);
        let mut vel = Vec2::ZERO;

        for _ in 0..60 {
            let (p, v) = physics.integrate(pos, vel, Vec2::ZERO, slope, DT);
            pos = p;
            vel = v;
        }

        assert_eq!(vel.x, 90.0);
        assert!(pos.x > 180.0);
    }

    #[test]
    fn full_counter_intent_fights_but_cannot_cancel_a_slope() {
        let physics = Integrator::default();
        let slope = Vec2::new(90.0, 0.0);
        let mut vel = Vec2::ZERO;
        let mut pos = Vec2::new(180.0, 0.0);

        for _ in 0..60 {
            let (p, v) = physics.integrate(pos, vel, Vec2::new(-1.0, 0.0), slope, DT);
            pos = p;
            vel = v;
        }

        // Steady state is max_speed short of the bias: still leftward here
        assert_eq!(vel.x, 90.0 - Integrator::MAX_SPEED);
        assert!(pos.x < 180.0);
    }

    #[test]
    fn zero_intent_brakes_to_a_stop() {
        let physics = Integrator::default();
        let mut vel = Vec2::new(60.0, -120.0);
        let mut pos = Vec2::ZERO;

        for _ in 0..60 {
            let (p, v) = physics.integrate(pos, vel, Vec2::ZERO, Vec2::ZERO, DT);
            pos = p;
            vel = v;
        }

        assert_eq!(vel, Vec2::ZERO);
    }
}
