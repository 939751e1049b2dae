//! Rules layer: possession, scoring and the game clock.

pub mod clock;
pub mod possession;
pub mod scoreboard;

pub use clock::{ClockEvent, GameClock};
pub use possession::{DownOutcome, PossessionState, Yards};
pub use scoreboard::{GameStats, Scoreboard, TeamStats};

use serde::{Deserialize, Serialize};

/// Possession state plus everything a down result writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesEngine {
    pub possession: PossessionState,
    pub scoreboard: Scoreboard,
    pub stats: GameStats,
    touchdown_points: u32,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new(7)
    }
}

impl RulesEngine {
    pub fn new(touchdown_points: u32) -> Self {
        Self {
            possession: PossessionState::default(),
            scoreboard: Scoreboard::default(),
            stats: GameStats::default(),
            touchdown_points,
        }
    }

    /// Apply one play result: down classification, score and stats.
    pub fn advance_down(&mut self, gained: Yards) -> DownOutcome {
        let side = self.possession.possession;
        let outcome = self.possession.advance_down(gained, self.touchdown_points);

        {
            let stats = self.stats.side_mut(side);
            stats.plays += 1;
            stats.yards += gained.value();
            match outcome {
                DownOutcome::FirstDown { .. } => stats.first_downs += 1,
                DownOutcome::Turnover { .. } => stats.turnovers += 1,
                _ => {}
            }
        }
        if let DownOutcome::Touchdown { scoring_side, points } = outcome {
            self.scoreboard.award(scoring_side, points);
            self.stats.side_mut(scoring_side).touchdowns += 1;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actor::TeamSide;

    #[test]
    fn test_touchdown_scores_seven() {
        let mut rules = RulesEngine::new(7);
        rules.possession.position = 95.0;
        rules.possession.down = 2;
        rules.possession.first_down_line = 100.0;

        let outcome = rules.advance_down(Yards::new(6.0).unwrap());
        assert!(outcome.is_touchdown());
        assert_eq!(rules.scoreboard.points(TeamSide::Offense), 7);
        assert_eq!(rules.stats.offense.touchdowns, 1);
        assert_eq!(rules.possession, PossessionState::touchback(TeamSide::Offense));
    }

    #[test]
    fn test_stats_follow_possessing_side() {
        let mut rules = RulesEngine::new(7);
        rules.possession.down = 4;
        rules.advance_down(Yards::new(2.0).unwrap());
        assert_eq!(rules.stats.offense.turnovers, 1);
        assert_eq!(rules.possession.possession, TeamSide::Defense);

        rules.advance_down(Yards::new(11.0).unwrap());
        assert_eq!(rules.stats.defense.first_downs, 1);
        assert_eq!(rules.stats.defense.plays, 1);
    }
}
