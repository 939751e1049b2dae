//! Possession/Down Rules Engine.
//!
//! The only writer of [`PossessionState`]. A finished play's net yardage is
//! classified into exactly one [`DownOutcome`] with the precedence
//! touchdown, first down, turnover on downs, down advance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::actor::TeamSide;
use crate::engine::field::{clamp_yard_line, yard_line_to_z, yards};
use crate::error::{Result, SimError};

/// Signed yardage that is known to be finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Yards(f32);

impl Yards {
    pub fn new(value: f32) -> Result<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(SimError::InvalidYardage(value))
        }
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Yards {
    type Error = SimError;

    fn try_from(value: f32) -> Result<Self> {
        Yards::new(value)
    }
}

impl<'de> Deserialize<'de> for Yards {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = f32::deserialize(deserializer)?;
        Yards::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DownOutcome {
    Touchdown { scoring_side: TeamSide, points: u32 },
    FirstDown { spot: f32 },
    Turnover { new_possession: TeamSide, spot: f32 },
    DownAdvance { down: u8, to_go: f32 },
}

impl DownOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DownOutcome::Touchdown { .. } => "touchdown",
            DownOutcome::FirstDown { .. } => "first_down",
            DownOutcome::Turnover { .. } => "turnover",
            DownOutcome::DownAdvance { .. } => "down_advance",
        }
    }

    pub fn is_touchdown(&self) -> bool {
        matches!(self, DownOutcome::Touchdown { .. })
    }

    /// Outcomes after which the next snap is centered on the field.
    pub fn recenters_ball(&self) -> bool {
        !matches!(self, DownOutcome::DownAdvance { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionState {
    pub down: u8,
    pub to_go: f32,
    /// Field position of the possessing side, 0 (own goal) to 100 (opponent goal)
    pub position: f32,
    pub line_of_scrimmage: f32,
    pub first_down_line: f32,
    pub possession: TeamSide,
}

impl Default for PossessionState {
    fn default() -> Self {
        Self::touchback(TeamSide::Offense)
    }
}

impl PossessionState {
    /// Fresh drive from the touchback spot.
    pub fn touchback(possession: TeamSide) -> Self {
        Self {
            down: 1,
            to_go: yards::FIRST_DOWN_DISTANCE,
            position: yards::TOUCHBACK,
            line_of_scrimmage: yards::TOUCHBACK,
            first_down_line: yards::TOUCHBACK + yards::FIRST_DOWN_DISTANCE,
            possession,
        }
    }

    /// First and ten (or goal) for `side` at `yard_line`, clamped to `[1, 99]`.
    pub fn start_new_possession(&mut self, side: TeamSide, yard_line: f32) {
        let spot = yard_line.clamp(1.0, 99.0);
        self.possession = side;
        self.set_first_down_at(spot);
    }

    /// Back to the opening drive: offense first and ten at the touchback spot.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the current spot as the line of scrimmage for the next snap.
    pub fn record_line_of_scrimmage(&mut self) {
        self.line_of_scrimmage = self.position;
    }

    pub fn line_of_scrimmage_z(&self) -> f32 {
        yard_line_to_z(self.line_of_scrimmage)
    }

    pub fn is_goal_to_go(&self) -> bool {
        self.first_down_line >= yards::GOAL_LINE
    }

    fn set_first_down_at(&mut self, spot: f32) {
        self.down = 1;
        self.position = spot;
        self.line_of_scrimmage = spot;
        self.first_down_line = (spot + yards::FIRST_DOWN_DISTANCE).min(yards::GOAL_LINE);
        self.to_go = yards::FIRST_DOWN_DISTANCE.min(yards::GOAL_LINE - spot);
    }

    /// Classify and apply one play result.
    pub fn advance_down(&mut self, gained: Yards, touchdown_points: u32) -> DownOutcome {
        let new_position = clamp_yard_line(self.position + gained.value());

        let outcome = if new_position >= yards::GOAL_LINE {
            let scoring_side = self.possession;
            *self = Self::touchback(scoring_side);
            DownOutcome::Touchdown { scoring_side, points: touchdown_points }
        } else if new_position >= self.first_down_line {
            self.set_first_down_at(new_position);
            DownOutcome::FirstDown { spot: new_position }
        } else if self.down >= 4 {
            let flipped = (yards::GOAL_LINE - new_position).clamp(1.0, 99.0);
            self.possession = self.possession.opponent();
            self.set_first_down_at(flipped);
            DownOutcome::Turnover { new_possession: self.possession, spot: flipped }
        } else {
            self.down += 1;
            self.to_go = (self.first_down_line - new_position).max(1.0);
            self.position = new_position;
            self.line_of_scrimmage = new_position;
            DownOutcome::DownAdvance { down: self.down, to_go: self.to_go }
        };

        match outcome {
            DownOutcome::DownAdvance { .. } => debug!(
                down = self.down,
                to_go = self.to_go,
                position = self.position,
                "down advanced"
            ),
            _ => info!(
                outcome = outcome.label(),
                gained = gained.value(),
                position = self.position,
                possession = self.possession.as_str(),
                "possession updated"
            ),
        }
        outcome
    }
}

// ========== Tests ==========
