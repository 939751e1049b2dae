//! Actors and the active roster.

use std::fmt;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::behaviors::{AiBrain, BehaviorMode};
use super::movement::MovementIntent;
use super::physics::BodyHandle;
use crate::error::{Result, SimError};
use crate::playbook::routes::RouteAssignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Offense,
    Defense,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Offense => TeamSide::Defense,
            TeamSide::Defense => TeamSide::Offense,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Offense => "offense",
            TeamSide::Defense => "defense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Quarterback,
    RunningBack,
    Fullback,
    WideReceiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    Cornerback,
    Safety,
}

impl Role {
    pub fn code(self) -> &'static str {
        match self {
            Role::Quarterback => "QB",
            Role::RunningBack => "RB",
            Role::Fullback => "FB",
            Role::WideReceiver => "WR",
            Role::TightEnd => "TE",
            Role::OffensiveLine => "OL",
            Role::DefensiveLine => "DL",
            Role::Linebacker => "LB",
            Role::Cornerback => "CB",
            Role::Safety => "S",
        }
    }

    /// Roles that can take a pass.
    pub fn is_eligible_receiver(self) -> bool {
        matches!(
            self,
            Role::WideReceiver | Role::TightEnd | Role::RunningBack | Role::Fullback
        )
    }

    /// Roles that stop and wait for the ball at the end of their route.
    pub fn receives_at_route_end(self) -> bool {
        matches!(self, Role::WideReceiver | Role::TightEnd)
    }

    pub fn blocking_strength(self) -> f32 {
        match self {
            Role::OffensiveLine => 1.5,
            Role::TightEnd => 1.2,
            Role::RunningBack | Role::Fullback => 1.0,
            _ => 0.7,
        }
    }

    /// Initial behavior mode at the snap.
    pub fn default_behavior(self, side: TeamSide) -> BehaviorMode {
        if side == TeamSide::Defense {
            return BehaviorMode::Pursue;
        }
        match self {
            Role::OffensiveLine | Role::Fullback => BehaviorMode::Block,
            _ => BehaviorMode::Route,
        }
    }
}

/// Movement-mode flag: human input or an AI brain.
#[derive(Debug, Clone)]
pub enum Control {
    Human,
    Ai(AiBrain),
}

impl Control {
    pub fn is_human(&self) -> bool {
        matches!(self, Control::Human)
    }

    pub fn brain(&self) -> Option<&AiBrain> {
        match self {
            Control::Ai(brain) => Some(brain),
            Control::Human => None,
        }
    }

    pub fn brain_mut(&mut self) -> Option<&mut AiBrain> {
        match self {
            Control::Ai(brain) => Some(brain),
            Control::Human => None,
        }
    }
}

/// Spawn request for [`crate::engine::session::GameSession::add_actor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub side: TeamSide,
    pub role: Role,
    #[serde(default)]
    pub label: String,
    pub position: Vector3<f32>,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub human: bool,
    #[serde(default)]
    pub route: Option<RouteAssignment>,
    /// Placement relative to the line of scrimmage, reused on every reset.
    #[serde(default)]
    pub formation_offset: Option<Vector2<f32>>,
}

impl ActorSpec {
    pub fn new(side: TeamSide, role: Role, position: Vector3<f32>) -> Self {
        Self {
            side,
            role,
            label: role.code().to_string(),
            position,
            yaw: 0.0,
            human: false,
            route: None,
            formation_offset: None,
        }
    }

    pub fn human(mut self) -> Self {
        self.human = true;
        self
    }

    pub fn with_route(mut self, route: RouteAssignment) -> Self {
        self.route = Some(route);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub side: TeamSide,
    pub role: Role,
    pub label: String,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    /// Facing, radians; `atan2(dx, dz)` of the facing direction
    pub yaw: f32,
    pub current_speed: f32,
    pub target_speed: f32,
    pub control: Control,
    pub body: BodyHandle,
    pub last_safe_position: Vector3<f32>,
    pub formation_offset: Option<Vector2<f32>>,
    /// Desired motion consumed by the controller on the next frame
    pub intent: MovementIntent,
}

impl Actor {
    pub fn from_spec(id: ActorId, spec: ActorSpec, body: BodyHandle) -> Self {
        let control = if spec.human {
            Control::Human
        } else {
            let mode = spec.role.default_behavior(spec.side);
            Control::Ai(AiBrain::new(mode, spec.route, spec.position))
        };
        Self {
            id,
            side: spec.side,
            role: spec.role,
            label: spec.label,
            position: spec.position,
            velocity: Vector3::zeros(),
            yaw: spec.yaw,
            current_speed: 0.0,
            target_speed: 0.0,
            control,
            body,
            last_safe_position: spec.position,
            formation_offset: spec.formation_offset,
            intent: MovementIntent::stop(),
        }
    }

    pub fn is_human(&self) -> bool {
        self.control.is_human()
    }

    pub fn behavior(&self) -> Option<BehaviorMode> {
        self.control.brain().map(|b| b.mode)
    }

    pub fn horizontal_speed(&self) -> f32 {
        (self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z).sqrt()
    }

    pub fn facing(&self) -> Vector2<f32> {
        Vector2::new(self.yaw.sin(), self.yaw.cos())
    }
}

/// Active actors in spawn order. Spawn order is also update order.
#[derive(Debug, Clone, Default)]
pub struct ActorRoster {
    actors: Vec<Actor>,
    next_id: u32,
}

impl ActorRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, actor: Actor) -> Result<()> {
        if self.get(actor.id).is_some() {
            return Err(SimError::DuplicateActor(actor.id));
        }
        let demote = actor.is_human().then_some(actor.side);
        self.actors.push(actor);
        if let Some(side) = demote {
            let id = self.actors[self.actors.len() - 1].id;
            self.set_human(side, id)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, id: ActorId) -> Result<Actor> {
        let idx = self
            .actors
            .iter()
            .position(|a| a.id == id)
            .ok_or(SimError::ActorNotFound(id))?;
        Ok(self.actors.remove(idx))
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn clear(&mut self) -> Vec<Actor> {
        std::mem::take(&mut self.actors)
    }

    pub fn human(&self, side: TeamSide) -> Option<&Actor> {
        self.actors.iter().find(|a| a.side == side && a.is_human())
    }

    pub fn first_with_role(&self, side: TeamSide, role: Role) -> Option<&Actor> {
        self.actors.iter().find(|a| a.side == side && a.role == role)
    }

    /// Hand human control on `side` to `id`; the previous human actor on that
    /// side falls back to AI.
    pub fn set_human(&mut self, side: TeamSide, id: ActorId) -> Result<()> {
        match self.get(id) {
            Some(actor) if actor.side == side => {}
            _ => return Err(SimError::ActorNotFound(id)),
        }
        for actor in self.actors.iter_mut().filter(|a| a.side == side) {
            if actor.id == id {
                actor.control = Control::Human;
            } else if actor.is_human() {
                let mode = actor.role.default_behavior(side);
                actor.control = Control::Ai(AiBrain::new(mode, None, actor.position));
            }
        }
        Ok(())
    }
}
