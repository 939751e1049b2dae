//! Formation templates.
//!
//! Offsets are `(x, z)` relative to the ball at the line of scrimmage. The
//! offense lines up on `+z` (its backfield), the defense on `-z`.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::engine::actor::{ActorSpec, Role, TeamSide};
use crate::engine::body_orientation::{DEFENSE_FACING, OFFENSE_FACING};
use crate::engine::field::{clamp_to_safe, dims};
use crate::playbook::routes::RouteAssignment;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub label: &'static str,
    pub role: Role,
    pub x: f32,
    pub z: f32,
}

const fn at(label: &'static str, role: Role, x: f32, z: f32) -> Placement {
    Placement { label, role, x, z }
}

use crate::engine::actor::Role::*;

const I_FORM: &[Placement] = &[
    at("QB", Quarterback, 0.0, 4.0),
    at("FB", Fullback, 0.0, 6.0),
    at("RB", RunningBack, 0.0, 8.0),
    at("LT", OffensiveLine, -4.0, 3.0),
    at("LG", OffensiveLine, -2.0, 3.0),
    at("C", OffensiveLine, 0.0, 3.0),
    at("RG", OffensiveLine, 2.0, 3.0),
    at("RT", OffensiveLine, 4.0, 3.0),
    at("TE", TightEnd, 6.0, 3.0),
    at("WR1", WideReceiver, -10.0, 3.0),
    at("WR2", WideReceiver, 10.0, 3.0),
];

const SHOTGUN: &[Placement] = &[
    at("QB", Quarterback, 0.0, 7.0),
    at("RB", RunningBack, -3.0, 7.0),
    at("LT", OffensiveLine, -4.0, 3.0),
    at("LG", OffensiveLine, -2.0, 3.0),
    at("C", OffensiveLine, 0.0, 3.0),
    at("RG", OffensiveLine, 2.0, 3.0),
    at("RT", OffensiveLine, 4.0, 3.0),
    at("SLOT", WideReceiver, -6.0, 4.0),
    at("TE", TightEnd, 6.0, 3.0),
    at("WR1", WideReceiver, -12.0, 3.0),
    at("WR2", WideReceiver, 12.0, 3.0),
];

const SPREAD: &[Placement] = &[
    at("QB", Quarterback, 0.0, 5.0),
    at("LT", OffensiveLine, -4.0, 3.0),
    at("LG", OffensiveLine, -2.0, 3.0),
    at("C", OffensiveLine, 0.0, 3.0),
    at("RG", OffensiveLine, 2.0, 3.0),
    at("RT", OffensiveLine, 4.0, 3.0),
    at("SLOT1", WideReceiver, -6.0, 4.0),
    at("SLOT2", WideReceiver, 6.0, 4.0),
    at("WR1", WideReceiver, -14.0, 3.0),
    at("WR2", WideReceiver, -10.0, 3.0),
    at("WR3", WideReceiver, 14.0, 3.0),
];

const GOAL_LINE: &[Placement] = &[
    at("QB", Quarterback, 0.0, 4.0),
    at("FB", Fullback, 0.0, 6.0),
    at("RB", RunningBack, 0.0, 8.0),
    at("LT", OffensiveLine, -4.0, 3.0),
    at("LG", OffensiveLine, -2.0, 3.0),
    at("C", OffensiveLine, 0.0, 3.0),
    at("RG", OffensiveLine, 2.0, 3.0),
    at("RT", OffensiveLine, 4.0, 3.0),
    at("TE1", TightEnd, -6.0, 3.0),
    at("TE2", TightEnd, 6.0, 3.0),
    at("TE3", TightEnd, 8.0, 3.0),
];

const DEFENSE_4_3: &[Placement] = &[
    at("DE1", DefensiveLine, -5.0, -2.0),
    at("DT1", DefensiveLine, -2.0, -2.0),
    at("DT2", DefensiveLine, 2.0, -2.0),
    at("DE2", DefensiveLine, 5.0, -2.0),
    at("MLB", Linebacker, 0.0, -5.0),
    at("OLB1", Linebacker, -4.0, -5.0),
    at("OLB2", Linebacker, 4.0, -5.0),
    at("CB1", Cornerback, -10.0, -3.0),
    at("CB2", Cornerback, 10.0, -3.0),
    at("FS", Safety, 0.0, -8.0),
    at("SS", Safety, 6.0, -8.0),
];

const DEFENSE_3_4: &[Placement] = &[
    at("DE1", DefensiveLine, -4.0, -2.0),
    at("NT", DefensiveLine, 0.0, -2.0),
    at("DE2", DefensiveLine, 4.0, -2.0),
    at("ILB1", Linebacker, -2.0, -5.0),
    at("ILB2", Linebacker, 2.0, -5.0),
    at("OLB1", Linebacker, -7.0, -4.0),
    at("OLB2", Linebacker, 7.0, -4.0),
    at("CB1", Cornerback, -10.0, -3.0),
    at("CB2", Cornerback, 10.0, -3.0),
    at("FS", Safety, 0.0, -10.0),
    at("SS", Safety, 5.0, -8.0),
];

const NICKEL: &[Placement] = &[
    at("DE1", DefensiveLine, -5.0, -2.0),
    at("DT1", DefensiveLine, -2.0, -2.0),
    at("DT2", DefensiveLine, 2.0, -2.0),
    at("DE2", DefensiveLine, 5.0, -2.0),
    at("MLB", Linebacker, -2.0, -5.0),
    at("OLB", Linebacker, 3.0, -5.0),
    at("CB1", Cornerback, -10.0, -3.0),
    at("CB2", Cornerback, 10.0, -3.0),
    at("NB", Cornerback, -6.0, -4.0),
    at("FS", Safety, 0.0, -10.0),
    at("SS", Safety, 6.0, -8.0),
];

const DIME: &[Placement] = &[
    at("DE1", DefensiveLine, -5.0, -2.0),
    at("DT1", DefensiveLine, -2.0, -2.0),
    at("DT2", DefensiveLine, 2.0, -2.0),
    at("DE2", DefensiveLine, 5.0, -2.0),
    at("MLB", Linebacker, 0.0, -6.0),
    at("CB1", Cornerback, -12.0, -3.0),
    at("CB2", Cornerback, 12.0, -3.0),
    at("NB1", Cornerback, -6.0, -5.0),
    at("NB2", Cornerback, 6.0, -5.0),
    at("FS", Safety, -4.0, -14.0),
    at("SS", Safety, 4.0, -14.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationId {
    IForm,
    Shotgun,
    Spread,
    GoalLine,
    Defense43,
    Defense34,
    Nickel,
    Dime,
}

impl FormationId {
    pub fn side(self) -> TeamSide {
        match self {
            FormationId::IForm | FormationId::Shotgun | FormationId::Spread | FormationId::GoalLine => {
                TeamSide::Offense
            }
            _ => TeamSide::Defense,
        }
    }

    pub fn placements(self) -> &'static [Placement] {
        match self {
            FormationId::IForm => I_FORM,
            FormationId::Shotgun => SHOTGUN,
            FormationId::Spread => SPREAD,
            FormationId::GoalLine => GOAL_LINE,
            FormationId::Defense43 => DEFENSE_4_3,
            FormationId::Defense34 => DEFENSE_3_4,
            FormationId::Nickel => NICKEL,
            FormationId::Dime => DIME,
        }
    }

    pub fn facing(self) -> f32 {
        match self.side() {
            TeamSide::Offense => OFFENSE_FACING,
            TeamSide::Defense => DEFENSE_FACING,
        }
    }

    /// Slot the human controls when this formation is spawned.
    pub fn human_slot(self) -> &'static str {
        match self.side() {
            TeamSide::Offense => "QB",
            TeamSide::Defense if self == FormationId::Defense34 => "ILB1",
            TeamSide::Defense => "MLB",
        }
    }

    pub fn eligible_receivers(self) -> impl Iterator<Item = &'static Placement> {
        self.placements().iter().filter(|p| p.role.is_eligible_receiver())
    }
}

/// World position of a placement for a ball at `(ball_x, los_z)`.
pub fn placement_position(ball_x: f32, los_z: f32, offset: Vector2<f32>) -> Vector3<f32> {
    clamp_to_safe(Vector3::new(ball_x + offset.x, dims::GROUND_Y, los_z + offset.y))
}

/// Spawn requests for a whole formation. `route_for` supplies route
/// assignments by slot label.
pub fn spawn_specs(
    formation: FormationId,
    ball_x: f32,
    los_z: f32,
    route_for: impl Fn(&Placement) -> Option<RouteAssignment>,
) -> Vec<ActorSpec> {
    let side = formation.side();
    let human = formation.human_slot();
    formation
        .placements()
        .iter()
        .map(|p| {
            let offset = Vector2::new(p.x, p.z);
            let mut spec = ActorSpec::new(side, p.role, placement_position(ball_x, los_z, offset));
            spec.label = p.label.to_string();
            spec.yaw = formation.facing();
            spec.human = p.label == human;
            spec.formation_offset = Some(offset);
            spec.route = if spec.human { None } else { route_for(p) };
            spec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FormationId; 8] = [
        FormationId::IForm,
        FormationId::Shotgun,
        FormationId::Spread,
        FormationId::GoalLine,
        FormationId::Defense43,
        FormationId::Defense34,
        FormationId::Nickel,
        FormationId::Dime,
    ];

    #[test]
    fn test_eleven_per_formation() {
        for f in ALL {
            assert_eq!(f.placements().len(), 11, "{f:?}");
        }
    }

    #[test]
    fn test_sides_of_scrimmage() {
        for f in ALL {
            for p in f.placements() {
                match f.side() {
                    TeamSide::Offense => assert!(p.z > 0.0, "{f:?} {}", p.label),
                    TeamSide::Defense => assert!(p.z < 0.0, "{f:?} {}", p.label),
                }
            }
        }
    }

    #[test]
    fn test_one_human_slot_exists() {
        for f in ALL {
            let n = f.placements().iter().filter(|p| p.label == f.human_slot()).count();
            assert_eq!(n, 1, "{f:?}");
        }
    }

    #[test]
    fn test_five_linemen_on_offense() {
        for f in [FormationId::IForm, FormationId::Shotgun, FormationId::Spread, FormationId::GoalLine] {
            let ol = f.placements().iter().filter(|p| p.role == Role::OffensiveLine).count();
            assert_eq!(ol, 5, "{f:?}");
        }
    }

    #[test]
    fn test_spawn_specs_clamped_and_routed() {
        let specs = spawn_specs(FormationId::Spread, 40.0, 90.0, |p| {
            p.role.is_eligible_receiver().then(|| RouteAssignment::new(crate::playbook::routes::RoutePattern::Go))
        });
        assert_eq!(specs.len(), 11);
        for s in &specs {
            assert!(s.position.x.abs() <= dims::SAFE_HALF_WIDTH);
            assert!(s.position.z.abs() <= dims::SAFE_HALF_LENGTH);
        }
        let qb = specs.iter().find(|s| s.label == "QB").unwrap();
        assert!(qb.human);
        assert!(qb.route.is_none());
        let wr = specs.iter().find(|s| s.label == "WR3").unwrap();
        assert!(wr.route.is_some());
        assert_eq!(wr.formation_offset, Some(Vector2::new(14.0, 3.0)));
    }
}
