//! AI Decision Engine.
//!
//! Each AI actor carries an [`AiBrain`] tagged with a [`BehaviorMode`]. Every
//! frame the mode's [`ModeBehavior`] turns a read-only [`DecisionContext`]
//! into a [`Decision`]: the movement intent for the Actor Controller, an
//! optional mode change and an optional tackle. Nothing here waits; delays
//! are countdowns on the brain.

mod blocking;
mod pursuit;
mod receiving;
mod route_running;

pub use blocking::Blocking;
pub use pursuit::Pursuit;
pub use receiving::Receiving;
pub use route_running::RouteRunning;

use nalgebra::Vector3;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::actor::{ActorId, ActorRoster, Role, TeamSide};
use super::field::horizontal_distance;
use super::movement::MovementIntent;
use super::steering::{lead_point, seek};
use crate::config::AiConfig;
use crate::playbook::routes::{RouteAssignment, RoutePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMode {
    Route,
    Block,
    Receive,
    Pursue,
}

/// Per-actor AI state.
#[derive(Debug, Clone)]
pub struct AiBrain {
    pub mode: BehaviorMode,
    /// Mode restored on every re-arm
    pub home_mode: BehaviorMode,
    pub route: Option<RouteAssignment>,
    pub path: Option<RoutePath>,
    /// Normalized route parameter, 0..=1
    pub progress: f32,
    /// Seconds before route running starts
    pub start_delay: f32,
    /// Seconds until the next pursuit re-aim
    pub cooldown: f32,
    /// Current pursuit aim `(x, z)`
    pub aim: nalgebra::Vector2<f32>,
    pub block_target: Option<ActorId>,
}

impl AiBrain {
    pub fn new(mode: BehaviorMode, route: Option<RouteAssignment>, start: Vector3<f32>) -> Self {
        let path = route.as_ref().map(|r| RoutePath::build(r, start));
        Self {
            mode,
            home_mode: mode,
            route,
            path,
            progress: 0.0,
            start_delay: 0.0,
            cooldown: 0.0,
            aim: nalgebra::Vector2::zeros(),
            block_target: None,
        }
    }

    /// Reset for a new snap from `start`.
    pub fn rearm(&mut self, start: Vector3<f32>, cfg: &AiConfig) {
        self.mode = self.home_mode;
        self.path = self.route.as_ref().map(|r| RoutePath::build(r, start));
        self.progress = 0.0;
        self.start_delay = cfg.route_start_delay;
        self.cooldown = 0.0;
        self.aim = nalgebra::Vector2::zeros();
        self.block_target = None;
    }

    pub fn set_route(&mut self, route: Option<RouteAssignment>, start: Vector3<f32>) {
        self.route = route;
        self.path = route.as_ref().map(|r| RoutePath::build(r, start));
        self.progress = 0.0;
    }
}

/// Read-only copy of an actor taken before any brain runs this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView {
    pub id: ActorId,
    pub side: TeamSide,
    pub role: Role,
    pub position: Vector3<f32>,
    pub yaw: f32,
}

pub struct DecisionContext<'a> {
    pub me: ActorView,
    pub actors: &'a [ActorView],
    pub carrier: Option<ActorView>,
    pub ball_position: Option<Vector3<f32>>,
    pub cfg: &'a AiConfig,
    pub base_speed: f32,
    pub dt: f32,
    /// Post-snap reaction delay has elapsed for the defense
    pub pursuit_released: bool,
}

impl<'a> DecisionContext<'a> {
    pub fn opponents(&self) -> impl Iterator<Item = &'a ActorView> + '_ {
        let side = self.me.side;
        self.actors.iter().filter(move |a| a.side != side)
    }

    /// Own-side quarterback other than self.
    pub fn passer(&self) -> Option<&'a ActorView> {
        self.actors
            .iter()
            .find(|a| a.side == self.me.side && a.role == Role::Quarterback && a.id != self.me.id)
    }

    /// Where play is happening: the carrier, else the ball.
    pub fn focus(&self) -> Option<Vector3<f32>> {
        self.carrier.map(|c| c.position).or(self.ball_position)
    }

    /// Any opponent of self within `radius` of the carrier.
    pub fn defender_near_carrier(&self, radius: f32) -> bool {
        let Some(focus) = self.focus() else {
            return false;
        };
        self.opponents().any(|o| horizontal_distance(&o.position, &focus) <= radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub intent: MovementIntent,
    pub next_mode: Option<BehaviorMode>,
    pub tackle: Option<ActorId>,
}

impl Decision {
    pub fn moving(intent: MovementIntent) -> Self {
        Self { intent, next_mode: None, tackle: None }
    }

    pub fn switch_to(mut self, mode: BehaviorMode) -> Self {
        self.next_mode = Some(mode);
        self
    }
}

pub trait ModeBehavior: Send + Sync {
    fn decide(&self, brain: &mut AiBrain, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> Decision;
}

pub fn behavior_for(mode: BehaviorMode) -> &'static dyn ModeBehavior {
    match mode {
        BehaviorMode::Route => &RouteRunning,
        BehaviorMode::Block => &Blocking,
        BehaviorMode::Receive => &Receiving,
        BehaviorMode::Pursue => &Pursuit,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum AiSignal {
    ModeChanged { actor: ActorId, from: BehaviorMode, to: BehaviorMode },
    Tackle { tackler: ActorId, carrier: ActorId },
}

/// Shared inputs for one AI pass.
pub struct AiFrame<'a> {
    pub cfg: &'a AiConfig,
    pub base_speed: f32,
    pub dt: f32,
    pub carrier: Option<ActorId>,
    pub ball_position: Option<Vector3<f32>>,
    pub pursuit_released: bool,
}

const CARRIER_LEAD: f32 = 10.0;

/// Re-evaluate every AI actor once and store its intent. Human actors are
/// untouched.
pub fn update_ai(roster: &mut ActorRoster, frame: &AiFrame<'_>, rng: &mut ChaCha8Rng) -> Vec<AiSignal> {
    let views: Vec<ActorView> = roster
        .iter()
        .map(|a| ActorView { id: a.id, side: a.side, role: a.role, position: a.position, yaw: a.yaw })
        .collect();
    let carrier = frame.carrier.and_then(|id| views.iter().find(|v| v.id == id).copied());

    let mut signals = Vec::new();
    for actor in roster.iter_mut() {
        let Some(brain) = actor.control.brain_mut() else {
            continue;
        };
        let Some(me) = views.iter().find(|v| v.id == actor.id).copied() else {
            continue;
        };

        // An AI ball carrier just runs for the goal its side attacks.
        if carrier.map(|c| c.id) == Some(me.id) {
            let lead = match me.side {
                TeamSide::Offense => CARRIER_LEAD,
                TeamSide::Defense => -CARRIER_LEAD,
            };
            actor.intent = seek(&me.position, &lead_point(&me.position, lead), frame.base_speed);
            continue;
        }

        let ctx = DecisionContext {
            me,
            actors: &views,
            carrier,
            ball_position: frame.ball_position,
            cfg: frame.cfg,
            base_speed: frame.base_speed,
            dt: frame.dt,
            pursuit_released: frame.pursuit_released,
        };
        let decision = behavior_for(brain.mode).decide(brain, &ctx, rng);
        actor.intent = decision.intent;

        if let Some(to) = decision.next_mode.filter(|m| *m != brain.mode) {
            trace!(actor = %me.id, from = ?brain.mode, to = ?to, "behavior change");
            signals.push(AiSignal::ModeChanged { actor: me.id, from: brain.mode, to });
            brain.mode = to;
        }
        if let Some(carrier) = decision.tackle {
            signals.push(AiSignal::Tackle { tackler: me.id, carrier });
        }
    }
    signals
}
