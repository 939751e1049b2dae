//! Points and per-side statistics.

use serde::{Deserialize, Serialize};

use crate::engine::actor::TeamSide;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub offense: u32,
    pub defense: u32,
}

impl Scoreboard {
    pub fn points(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Offense => self.offense,
            TeamSide::Defense => self.defense,
        }
    }

    pub fn award(&mut self, side: TeamSide, points: u32) {
        match side {
            TeamSide::Offense => self.offense += points,
            TeamSide::Defense => self.defense += points,
        }
    }

    pub fn leader(&self) -> Option<TeamSide> {
        match self.offense.cmp(&self.defense) {
            std::cmp::Ordering::Greater => Some(TeamSide::Offense),
            std::cmp::Ordering::Less => Some(TeamSide::Defense),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub plays: u32,
    /// Net yards from scrimmage
    pub yards: f32,
    pub touchdowns: u32,
    pub first_downs: u32,
    pub turnovers: u32,
    /// Plays this side ended by tackling the carrier
    pub tackles: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub offense: TeamStats,
    pub defense: TeamStats,
}

impl GameStats {
    pub fn side(&self, side: TeamSide) -> &TeamStats {
        match side {
            TeamSide::Offense => &self.offense,
            TeamSide::Defense => &self.defense,
        }
    }

    pub fn side_mut(&mut self, side: TeamSide) -> &mut TeamStats {
        match side {
            TeamSide::Offense => &mut self.offense,
            TeamSide::Defense => &mut self.defense,
        }
    }
}
