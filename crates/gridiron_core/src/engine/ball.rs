//! Ball Entity: carried and free-flight physics for the single ball.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::actor::ActorId;
use super::body_orientation::normalize_or_zero;
use super::field::{clamp_to_safe, is_within_field};
use crate::config::BallConfig;

/// Exactly one of these at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BallMode {
    Carried { owner: ActorId },
    Thrown,
    Resting,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BallEvent {
    /// Free flight ended on the turf
    Settled { position: Vector3<f32> },
    /// Free flight left the field envelope and was dead-balled at the clamp
    OutOfBounds { position: Vector3<f32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub position: Vector3<f32>,
    /// Only meaningful while thrown
    pub velocity: Vector3<f32>,
    /// Euler angles (pitch, yaw, roll)
    pub rotation: Vector3<f32>,
    mode: BallMode,
}

impl Ball {
    pub fn resting_at(position: Vector3<f32>) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            rotation: Vector3::zeros(),
            mode: BallMode::Resting,
        }
    }

    pub fn mode(&self) -> BallMode {
        self.mode
    }

    pub fn owner(&self) -> Option<ActorId> {
        match self.mode {
            BallMode::Carried { owner } => Some(owner),
            _ => None,
        }
    }

    pub fn is_thrown(&self) -> bool {
        self.mode == BallMode::Thrown
    }

    /// Give the ball to `owner`. Clears flight state.
    pub fn attach_to_player(&mut self, owner: ActorId) {
        debug!(owner = %owner, "ball attached");
        self.mode = BallMode::Carried { owner };
        self.velocity = Vector3::zeros();
    }

    /// Launch along the horizontal part of `direction`. Clears ownership.
    pub fn throw_ball(&mut self, direction: Vector3<f32>, force: f32, height: f32) {
        let dir = normalize_or_zero(Vector2::new(direction.x, direction.z));
        self.velocity = Vector3::new(dir.x * force, height, dir.y * force);
        self.mode = BallMode::Thrown;
        debug!(force, height, "ball thrown");
    }

    /// Dead-ball relocation: resting at `position` with no owner and no motion.
    pub fn place_at(&mut self, position: Vector3<f32>) {
        self.position = clamp_to_safe(position);
        self.velocity = Vector3::zeros();
        self.rotation = Vector3::zeros();
        self.mode = BallMode::Resting;
    }

    /// Pin to the owner's hands, offset along its facing, in the carry pose.
    pub fn follow_owner(&mut self, owner_position: Vector3<f32>, owner_yaw: f32, cfg: &BallConfig) {
        let forward = Vector3::new(owner_yaw.sin(), 0.0, owner_yaw.cos());
        let right = Vector3::new(owner_yaw.cos(), 0.0, -owner_yaw.sin());
        self.position = owner_position
            + forward * cfg.carry_forward
            + right * cfg.carry_side
            + Vector3::new(0.0, cfg.carry_height, 0.0);
        self.rotation = Vector3::new(FRAC_PI_2, owner_yaw, 0.0);
        self.velocity = Vector3::zeros();
    }

    /// Integrate free flight. No-op unless thrown.
    pub fn update_flight(&mut self, dt: f32, cfg: &BallConfig) -> Option<BallEvent> {
        if !self.is_thrown() {
            return None;
        }
        let dt = dt.clamp(0.0, cfg.max_dt);

        self.velocity.y -= cfg.gravity * dt;
        self.position += self.velocity * dt;
        let horizontal_speed = Vector2::new(self.velocity.x, self.velocity.z).norm();
        self.rotation.x += horizontal_speed * dt;

        if !is_within_field(&self.position) {
            let position = clamp_to_safe(Vector3::new(self.position.x, cfg.rest_height, self.position.z));
            self.place_at(position);
            debug!(x = position.x, z = position.z, "ball out of bounds");
            return Some(BallEvent::OutOfBounds { position: self.position });
        }

        if self.position.y > cfg.rest_height {
            return None;
        }

        self.position.y = cfg.rest_height;
        if self.velocity.y.abs() > cfg.bounce_threshold {
            self.velocity.y = -self.velocity.y * cfg.restitution;
            self.velocity.x *= cfg.bounce_friction;
            self.velocity.z *= cfg.bounce_friction;
            trace!(vy = self.velocity.y, "ball bounce");
            return None;
        }

        self.velocity.y = 0.0;
        self.velocity.x *= cfg.rolling_friction;
        self.velocity.z *= cfg.rolling_friction;
        if Vector2::new(self.velocity.x, self.velocity.z).norm() < cfg.settle_speed {
            let position = self.position;
            self.place_at(position);
            debug!(x = position.x, z = position.z, "ball settled");
            return Some(BallEvent::Settled { position });
        }
        None
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run_until_settled(ball: &mut Ball, cfg: &BallConfig) -> Option<BallEvent> {
        for _ in 0..10_000 {
            if let Some(ev) = ball.update_flight(DT, cfg) {
                return Some(ev);
            }
        }
        None
    }

    #[test]
    fn test_attach_clears_thrown() {
        let mut ball = Ball::resting_at(Vector3::new(0.0, 0.5, 0.0));
        ball.throw_ball(Vector3::new(0.0, 0.0, -1.0), 10.0, 5.0);
        assert!(ball.is_thrown());
        ball.attach_to_player(ActorId(3));
        assert_eq!(ball.mode(), BallMode::Carried { owner: ActorId(3) });
        assert_eq!(ball.velocity, Vector3::zeros());
    }

    #[test]
    fn test_throw_clears_owner() {
        let mut ball = Ball::resting_at(Vector3::new(0.0, 0.5, 0.0));
        ball.attach_to_player(ActorId(1));
        ball.throw_ball(Vector3::new(3.0, 9.0, 4.0), 10.0, 4.0);
        assert_eq!(ball.owner(), None);
        // Horizontal direction normalized, vertical taken from `height`
        assert!((ball.velocity.x - 6.0).abs() < 0.001);
        assert!((ball.velocity.z - 8.0).abs() < 0.001);
        assert!((ball.velocity.y - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_thrown_ball_bounces_then_settles() {
        let cfg = BallConfig::default();
        let mut ball = Ball::resting_at(Vector3::new(0.0, 2.0, 50.0));
        ball.throw_ball(Vector3::new(0.0, 0.0, -1.0), 8.0, 6.0);

        let mut bounced = false;
        let mut event = None;
        for _ in 0..10_000 {
            let vy_before = ball.velocity.y;
            event = ball.update_flight(DT, &cfg);
            if vy_before < 0.0 && ball.velocity.y > 0.0 {
                bounced = true;
            }
            if event.is_some() {
                break;
            }
        }
        assert!(bounced);
        match event {
            Some(BallEvent::Settled { position }) => {
                assert!(position.z < 50.0);
                assert!((position.y - cfg.rest_height).abs() < 0.001);
            }
            other => panic!("expected settle, got {other:?}"),
        }
        assert_eq!(ball.mode(), BallMode::Resting);
    }

    #[test]
    fn test_diagonal_roll_settles_on_speed_not_axes() {
        let cfg = BallConfig::default();
        let mut ball = Ball::resting_at(Vector3::new(0.0, cfg.rest_height, 0.0));
        // 0.13 along the diagonal: each axis under settle_speed, the speed above it
        ball.throw_ball(Vector3::new(1.0, 0.0, 1.0), 0.13, 0.0);

        assert!(ball.update_flight(DT, &cfg).is_none());
        assert!(ball.is_thrown());
        assert!(ball.velocity.x.abs() < cfg.settle_speed);
        assert!(ball.velocity.z.abs() < cfg.settle_speed);

        match run_until_settled(&mut ball, &cfg) {
            Some(BallEvent::Settled { position }) => assert!(position.x > 0.0 && position.z > 0.0),
            other => panic!("expected settle, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_bounds_dead_balls() {
        let cfg = BallConfig::default();
        let mut ball = Ball::resting_at(Vector3::new(40.0, 2.0, 0.0));
        ball.throw_ball(Vector3::new(1.0, 0.0, 0.0), 40.0, 10.0);
        match run_until_settled(&mut ball, &cfg) {
            Some(BallEvent::OutOfBounds { position }) => assert!(position.x <= 45.0),
            other => panic!("expected out of bounds, got {other:?}"),
        }
        assert_eq!(ball.mode(), BallMode::Resting);
    }

    #[test]
    fn test_carry_offset_follows_facing() {
        let cfg = BallConfig::default();
        let mut ball = Ball::resting_at(Vector3::zeros());
        ball.attach_to_player(ActorId(1));

        // Facing downfield (-z): ball sits ahead in -z and to the right in -x
        ball.follow_owner(Vector3::new(0.0, 1.0, 10.0), std::f32::consts::PI, &cfg);
        assert!(ball.position.z < 10.0);
        assert!(ball.position.x < 0.0);
        assert!((ball.position.y - 2.2).abs() < 0.001);
    }

    #[test]
    fn test_resting_ball_does_not_move() {
        let cfg = BallConfig::default();
        let mut ball = Ball::resting_at(Vector3::new(1.0, 0.5, 2.0));
        assert!(ball.update_flight(DT, &cfg).is_none());
        assert_eq!(ball.position, Vector3::new(1.0, 0.5, 2.0));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_ball_mode_exclusive(
            ops in proptest::collection::vec(0u8..4, 1..60),
            force in 1.0f32..30.0f32,
        ) {
            let cfg = BallConfig::default();
            let mut ball = Ball::resting_at(Vector3::new(0.0, 0.5, 0.0));
            for op in ops {
                match op {
                    0 => {
                        ball.attach_to_player(ActorId(1));
                        prop_assert!(!ball.is_thrown());
                    }
                    1 => {
                        ball.throw_ball(Vector3::new(0.3, 0.0, -1.0), force, 5.0);
                        prop_assert!(ball.owner().is_none());
                    }
                    2 => ball.place_at(Vector3::new(0.0, 0.5, 10.0)),
                    _ => {
                        for _ in 0..30 {
                            ball.update_flight(DT, &cfg);
                        }
                    }
                }
                let modes = [
                    ball.owner().is_some(),
                    ball.is_thrown(),
                    ball.mode() == BallMode::Resting,
                ];
                prop_assert_eq!(modes.iter().filter(|m| **m).count(), 1);
            }
        }
    }
}
