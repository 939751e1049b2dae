//! Actor Controller: the per-frame movement integrator shared by human and
//! AI actors.
//!
//! The controller only decides velocity and facing. Positions belong to the
//! physics backend, which integrates the velocity on the next step.

use nalgebra::{Vector2, Vector3};
use tracing::debug;

use super::actor::Actor;
use super::body_orientation::{discretize_heading, heading_of, lerp_angle, normalize_or_zero};
use super::field::{clamp_to_safe, is_within_guard};
use crate::config::MovementConfig;

// ============================================================================
// Intent
// ============================================================================

/// Desired motion for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntent {
    /// Horizontal direction `(x, z)`, normalized or zero
    pub direction: Vector2<f32>,
    pub speed: f32,
    /// Explicit facing that overrides the movement heading
    pub face: Option<f32>,
}

impl MovementIntent {
    pub fn stop() -> Self {
        Self { direction: Vector2::zeros(), speed: 0.0, face: None }
    }

    pub fn toward(direction: Vector2<f32>, speed: f32) -> Self {
        let direction = normalize_or_zero(direction);
        let speed = if direction == Vector2::zeros() { 0.0 } else { speed.max(0.0) };
        Self { direction, speed, face: None }
    }

    pub fn facing(mut self, yaw: f32) -> Self {
        self.face = Some(yaw);
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.speed <= 0.0
    }
}

impl Default for MovementIntent {
    fn default() -> Self {
        Self::stop()
    }
}

// ============================================================================
// Integrator pieces
// ============================================================================

/// Move `current` toward `target` with independent rise and fall rates.
pub fn converge_speed(current: f32, target: f32, cfg: &MovementConfig, dt: f32) -> f32 {
    let rate = if target > current { cfg.acceleration_rate } else { cfg.deceleration_rate };
    let t = (rate * cfg.frame_scale(dt)).min(1.0);
    current + (target - current) * t
}

/// Exponential decay of residual horizontal velocity, snapping to zero under
/// `stop_epsilon`.
pub fn damp_horizontal(velocity: Vector2<f32>, cfg: &MovementConfig, dt: f32) -> Vector2<f32> {
    let keep = (1.0 - cfg.damping).powf(cfg.frame_scale(dt));
    let damped = velocity * keep;
    if damped.norm() < cfg.stop_epsilon {
        Vector2::zeros()
    } else {
        damped
    }
}

/// Teleport back to the last in-bounds position if the actor left the guard
/// envelope. Returns true when a correction happened.
pub fn enforce_boundary(actor: &mut Actor) -> bool {
    if is_within_guard(&actor.position) {
        actor.last_safe_position = actor.position;
        return false;
    }
    let restored = clamp_to_safe(actor.last_safe_position);
    debug!(
        actor = %actor.id,
        x = actor.position.x,
        z = actor.position.z,
        "boundary guard: restoring last safe position"
    );
    actor.position = restored;
    actor.last_safe_position = restored;
    actor.velocity = Vector3::zeros();
    actor.current_speed = 0.0;
    true
}

/// Result of one controller update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStep {
    /// The boundary guard fired and the position was rewritten
    pub corrected: bool,
}

/// Run the controller for one actor: boundary guard, speed convergence,
/// velocity, facing. Vertical velocity is left to the physics backend.
pub fn update_actor(actor: &mut Actor, cfg: &MovementConfig, dt: f32) -> ControllerStep {
    let corrected = enforce_boundary(actor);
    let intent = actor.intent;

    actor.target_speed = intent.speed;
    let horizontal = if intent.is_stopped() {
        let residual = Vector2::new(actor.velocity.x, actor.velocity.z);
        let damped = damp_horizontal(residual, cfg, dt);
        actor.current_speed = damped.norm();
        damped
    } else {
        actor.current_speed = converge_speed(actor.current_speed, intent.speed, cfg, dt);
        intent.direction * actor.current_speed
    };
    actor.velocity = Vector3::new(horizontal.x, actor.velocity.y, horizontal.y);

    let target_heading = intent
        .face
        .or_else(|| heading_of(intent.direction).map(discretize_heading));
    if let Some(target) = target_heading {
        let t = cfg.turn_speed * cfg.frame_scale(dt);
        actor.yaw = lerp_angle(actor.yaw, target, t);
    }

    ControllerStep { corrected }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actor::{ActorId, ActorSpec, Role, TeamSide};
    use crate::engine::field::dims;
    use crate::engine::physics::BodyHandle;

    const DT: f32 = 1.0 / 60.0;

    fn test_actor() -> Actor {
        let spec = ActorSpec::new(TeamSide::Offense, Role::RunningBack, Vector3::new(0.0, 1.0, 0.0))
            .human();
        Actor::from_spec(ActorId(1), spec, BodyHandle(0))
    }

    #[test]
    fn test_converge_speed_asymmetric() {
        let cfg = MovementConfig::default();
        let up = converge_speed(0.0, 10.0, &cfg, DT);
        let down = converge_speed(10.0, 0.0, &cfg, DT);
        assert!((up - 1.5).abs() < 0.01);
        assert!((down - 7.5).abs() < 0.01);
    }

    #[test]
    fn test_converge_never_overshoots() {
        let cfg = MovementConfig::default();
        // Huge dt is capped, and the lerp factor never exceeds 1
        let v = converge_speed(0.0, 8.0, &cfg, 5.0);
        assert!(v <= 8.0);
    }

    #[test]
    fn test_accelerates_toward_target() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.intent = MovementIntent::toward(Vector2::new(0.0, -1.0), 8.0);
        for _ in 0..120 {
            update_actor(&mut actor, &cfg, DT);
        }
        assert!((actor.current_speed - 8.0).abs() < 0.05);
        assert!((actor.velocity.z + 8.0).abs() < 0.05);
        assert!(actor.velocity.x.abs() < 0.001);
    }

    #[test]
    fn test_damping_snaps_to_zero() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.velocity = Vector3::new(6.0, 0.0, 0.0);
        actor.current_speed = 6.0;
        actor.intent = MovementIntent::stop();

        update_actor(&mut actor, &cfg, DT);
        // Not hard-zeroed on the first frame
        assert!(actor.velocity.x > 0.0);

        for _ in 0..200 {
            update_actor(&mut actor, &cfg, DT);
        }
        assert_eq!(actor.velocity.x, 0.0);
        assert_eq!(actor.current_speed, 0.0);
    }

    #[test]
    fn test_vertical_velocity_preserved() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.velocity = Vector3::new(0.0, 3.0, 0.0);
        actor.intent = MovementIntent::toward(Vector2::new(1.0, 0.0), 8.0);
        update_actor(&mut actor, &cfg, DT);
        assert!((actor.velocity.y - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_facing_is_smoothed() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.yaw = 0.0;
        actor.intent = MovementIntent::toward(Vector2::new(1.0, 0.0), 8.0);
        update_actor(&mut actor, &cfg, DT);
        assert!(actor.yaw > 0.0 && actor.yaw < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_boundary_guard_restores_last_safe() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.position = Vector3::new(10.0, 1.0, 20.0);
        update_actor(&mut actor, &cfg, DT);

        actor.position = Vector3::new(80.0, 1.0, 20.0);
        actor.velocity = Vector3::new(5.0, 0.0, 0.0);
        let step = update_actor(&mut actor, &cfg, DT);
        assert!(step.corrected);
        assert!((actor.position.x - 10.0).abs() < 0.001);
        assert!(actor.position.x.abs() <= dims::SAFE_HALF_WIDTH);
    }

    #[test]
    fn test_boundary_guard_nan_position() {
        let cfg = MovementConfig::default();
        let mut actor = test_actor();
        actor.position = Vector3::new(f32::NAN, 1.0, 0.0);
        let step = update_actor(&mut actor, &cfg, DT);
        assert!(step.corrected);
        assert!(actor.position.x.is_finite());
    }
}
