use rand_chacha::ChaCha8Rng;

use super::{AiBrain, ActorView, Decision, DecisionContext, ModeBehavior};
use crate::engine::body_orientation::heading_of;
use crate::engine::field::horizontal_distance;
use crate::engine::movement::MovementIntent;
use crate::engine::steering::{lead_point, seek, to_plane};

/// Pick up the opponent who matters most to the carrier and hold him off.
pub struct Blocking;

impl Blocking {
    /// Lowest weighted distance: mostly to the carrier, partly to the blocker.
    fn select_target<'a>(ctx: &'a DecisionContext<'_>) -> Option<&'a ActorView> {
        let focus = ctx.focus()?;
        let score = |o: &ActorView| {
            ctx.cfg.block_carrier_weight * horizontal_distance(&o.position, &focus)
                + ctx.cfg.block_self_weight * horizontal_distance(&o.position, &ctx.me.position)
        };
        ctx.opponents().min_by(|a, b| score(a).total_cmp(&score(b)))
    }
}

impl ModeBehavior for Blocking {
    fn decide(&self, brain: &mut AiBrain, ctx: &DecisionContext<'_>, _rng: &mut ChaCha8Rng) -> Decision {
        let cfg = ctx.cfg;
        let Some(target) = Self::select_target(ctx) else {
            brain.block_target = None;
            // No one to block: drift ahead of the play
            let intent = match ctx.focus() {
                Some(focus) => seek(&ctx.me.position, &lead_point(&focus, 2.0), ctx.base_speed * cfg.block_idle_speed),
                None => MovementIntent::stop(),
            };
            return Decision::moving(intent);
        };
        brain.block_target = Some(target.id);

        let distance = horizontal_distance(&ctx.me.position, &target.position);
        let face = heading_of(to_plane(&target.position) - to_plane(&ctx.me.position));
        let factor = if distance < cfg.block_hold_radius {
            0.0
        } else if distance < cfg.block_engage_radius {
            cfg.block_engaged_speed
        } else {
            cfg.block_approach_speed
        };

        let mut intent = seek(&ctx.me.position, &target.position, ctx.base_speed * factor);
        if let Some(yaw) = face {
            intent = intent.facing(yaw);
        }
        Decision::moving(intent)
    }
}
