use rand_chacha::ChaCha8Rng;

use super::{AiBrain, BehaviorMode, Decision, DecisionContext, ModeBehavior};
use crate::engine::actor::Role;
use crate::engine::body_orientation::OFFENSE_FACING;
use crate::engine::movement::MovementIntent;
use crate::engine::steering::arrive;

/// Follow the assigned path at a fixed parameter rate.
pub struct RouteRunning;

impl ModeBehavior for RouteRunning {
    fn decide(&self, brain: &mut AiBrain, ctx: &DecisionContext<'_>, _rng: &mut ChaCha8Rng) -> Decision {
        let cfg = ctx.cfg;
        if brain.start_delay > 0.0 {
            brain.start_delay -= ctx.dt;
            return Decision::moving(MovementIntent::stop().facing(OFFENSE_FACING));
        }

        let Some(path) = brain.path.as_ref() else {
            // Nothing to run: a passer holds, everyone else looks for a block
            let hold = Decision::moving(MovementIntent::stop().facing(OFFENSE_FACING));
            if ctx.me.role != Role::Quarterback && ctx.defender_near_carrier(cfg.block_trigger_radius) {
                return hold.switch_to(BehaviorMode::Block);
            }
            return hold;
        };

        brain.progress = (brain.progress + ctx.dt * cfg.route_progress_rate).min(1.0);
        let Some(target) = path.point_at(brain.progress) else {
            return Decision::moving(MovementIntent::stop());
        };
        let decision = Decision::moving(arrive(
            &ctx.me.position,
            &target,
            ctx.base_speed,
            cfg.route_slowdown_radius,
            cfg.route_slowdown_factor,
        ));

        if brain.progress < cfg.receive_threshold {
            return decision;
        }
        if ctx.me.role.receives_at_route_end() {
            decision.switch_to(BehaviorMode::Receive)
        } else if ctx.defender_near_carrier(cfg.block_trigger_radius) {
            decision.switch_to(BehaviorMode::Block)
        } else {
            decision
        }
    }
}
