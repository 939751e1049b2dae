//! Published read-only view of the session.
//!
//! Written once per frame at the store-write step. Every field has a single
//! writer upstream; the store only copies, guarding against positions
//! outside the field envelope.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::actor::{Actor, ActorId, Role, TeamSide};
use super::ball::{Ball, BallMode};
use super::behaviors::BehaviorMode;
use super::field::is_within_field;
use super::play_lifecycle::PlayPhase;
use super::special_mode::SpecialMeter;
use crate::rules::{GameStats, PossessionState, Scoreboard};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub side: TeamSide,
    pub role: Role,
    pub label: String,
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub speed: f32,
    pub human: bool,
    pub behavior: Option<BehaviorMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    #[serde(flatten)]
    pub mode: BallMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub quarter: u8,
    pub remaining: f32,
    pub display: String,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub frame: u64,
    pub phase: PlayPhase,
    pub play_id: u32,
    pub play_clock: f32,
    pub possession: PossessionState,
    pub score: Scoreboard,
    pub stats: GameStats,
    pub clock: ClockSnapshot,
    pub special: SpecialMeter,
    pub actors: Vec<ActorSnapshot>,
    pub ball: Option<BallSnapshot>,
}

impl ActorSnapshot {
    pub fn of(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            side: actor.side,
            role: actor.role,
            label: actor.label.clone(),
            position: actor.position,
            yaw: actor.yaw,
            speed: actor.horizontal_speed(),
            human: actor.is_human(),
            behavior: actor.behavior(),
        }
    }
}

impl BallSnapshot {
    pub fn of(ball: &Ball) -> Self {
        Self { position: ball.position, rotation: ball.rotation, mode: ball.mode() }
    }
}

/// Copy `actors` into `published`, keeping the previous position of any actor
/// reported outside the field envelope.
pub fn publish_actors<'a>(published: &mut Vec<ActorSnapshot>, actors: impl Iterator<Item = &'a Actor>) {
    let previous = std::mem::take(published);
    for actor in actors {
        let mut snap = ActorSnapshot::of(actor);
        if !is_within_field(&snap.position) {
            trace!(actor = %actor.id, "store rejected out-of-envelope position");
            match previous.iter().find(|p| p.id == actor.id) {
                Some(prev) => snap.position = prev.position,
                None => continue,
            }
        }
        published.push(snap);
    }
}

/// Same guard for the ball.
pub fn publish_ball(published: &mut Option<BallSnapshot>, ball: Option<&Ball>) {
    match ball {
        None => *published = None,
        Some(ball) => {
            let mut snap = BallSnapshot::of(ball);
            if !is_within_field(&snap.position) {
                match published.as_ref() {
                    Some(prev) => snap.position = prev.position,
                    None => return,
                }
            }
            *published = Some(snap);
        }
    }
}
