use rand_chacha::ChaCha8Rng;

use super::{AiBrain, Decision, DecisionContext, ModeBehavior};
use crate::engine::body_orientation::heading_of;
use crate::engine::movement::MovementIntent;
use crate::engine::steering::to_plane;

/// Hold the spot and face the passer.
pub struct Receiving;

impl ModeBehavior for Receiving {
    fn decide(&self, _brain: &mut AiBrain, ctx: &DecisionContext<'_>, _rng: &mut ChaCha8Rng) -> Decision {
        let intent = MovementIntent::stop();
        let face = ctx
            .passer()
            .and_then(|qb| heading_of(to_plane(&qb.position) - to_plane(&ctx.me.position)));
        Decision::moving(match face {
            Some(yaw) => intent.facing(yaw),
            None => intent,
        })
    }
}
