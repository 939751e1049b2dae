use nalgebra::Vector2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{AiBrain, Decision, DecisionContext, ModeBehavior};
use crate::engine::body_orientation::{heading_of, normalize_or_zero, DEFENSE_FACING};
use crate::engine::field::horizontal_distance;
use crate::engine::movement::MovementIntent;
use crate::engine::steering::to_plane;

/// Chase the ball carrier with a throttled, slightly noisy aim.
pub struct Pursuit;

impl ModeBehavior for Pursuit {
    fn decide(&self, brain: &mut AiBrain, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision {
        let cfg = ctx.cfg;
        // Nobody chases or tackles a teammate carrying the ball.
        if ctx.carrier.is_some_and(|c| c.side == ctx.me.side) {
            return Decision::moving(MovementIntent::stop());
        }
        let Some(focus) = ctx.focus() else {
            return Decision::moving(MovementIntent::stop());
        };
        if !ctx.pursuit_released {
            return Decision::moving(MovementIntent::stop().facing(DEFENSE_FACING));
        }

        if let Some(carrier) = ctx.carrier {
            if horizontal_distance(&ctx.me.position, &carrier.position) <= cfg.tackle_radius {
                let mut decision = Decision::moving(MovementIntent::stop());
                decision.tackle = Some(carrier.id);
                return decision;
            }
        }

        brain.cooldown -= ctx.dt;
        if brain.cooldown <= 0.0 || brain.aim == Vector2::zeros() {
            let mut aim = normalize_or_zero(to_plane(&focus) - to_plane(&ctx.me.position));
            if cfg.pursuit_jitter > 0.0 {
                aim.x += rng.gen_range(-cfg.pursuit_jitter..=cfg.pursuit_jitter);
                aim.y += rng.gen_range(-cfg.pursuit_jitter..=cfg.pursuit_jitter);
            }
            brain.aim = normalize_or_zero(aim);
            brain.cooldown = cfg.pursuit_cooldown;
        }

        let mut intent = MovementIntent::toward(brain.aim, ctx.base_speed * cfg.pursuit_speed_factor);
        if let Some(yaw) = heading_of(brain.aim) {
            intent = intent.facing(yaw);
        }
        Decision::moving(intent)
    }
}
