//! Offensive and defensive play calls and CPU play selection.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::formations::{FormationId, Placement};
use super::routes::{RouteAssignment, RouteOptions, RoutePattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayKind {
    Run,
    Pass,
}

/// Base numbers for an offensive call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayProfile {
    pub success_rate: f32,
    pub min_yards: i32,
    pub max_yards: i32,
    /// Seconds a live rendition of the play is expected to take
    pub duration: f32,
    pub kind: PlayKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffensivePlay {
    InsideRun,
    OutsideRun,
    TrickRun,
    ShortPass,
    MediumPass,
    LongPass,
}

impl OffensivePlay {
    pub const ALL: [OffensivePlay; 6] = [
        OffensivePlay::InsideRun,
        OffensivePlay::OutsideRun,
        OffensivePlay::TrickRun,
        OffensivePlay::ShortPass,
        OffensivePlay::MediumPass,
        OffensivePlay::LongPass,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OffensivePlay::InsideRun => "Inside Run",
            OffensivePlay::OutsideRun => "Outside Run",
            OffensivePlay::TrickRun => "Trick Run",
            OffensivePlay::ShortPass => "Short Pass",
            OffensivePlay::MediumPass => "Medium Pass",
            OffensivePlay::LongPass => "Long Pass",
        }
    }

    pub fn profile(self) -> PlayProfile {
        let (success_rate, min_yards, max_yards, duration, kind) = match self {
            OffensivePlay::InsideRun => (0.75, 1, 5, 15.0, PlayKind::Run),
            OffensivePlay::OutsideRun => (0.65, 3, 8, 15.0, PlayKind::Run),
            OffensivePlay::TrickRun => (0.4, 0, 15, 20.0, PlayKind::Run),
            OffensivePlay::ShortPass => (0.8, 2, 7, 15.0, PlayKind::Pass),
            OffensivePlay::MediumPass => (0.6, 5, 15, 20.0, PlayKind::Pass),
            OffensivePlay::LongPass => (0.35, 0, 30, 25.0, PlayKind::Pass),
        };
        PlayProfile { success_rate, min_yards, max_yards, duration, kind }
    }

    pub fn is_pass(self) -> bool {
        self.profile().kind == PlayKind::Pass
    }

    pub fn formation(self) -> FormationId {
        match self {
            OffensivePlay::InsideRun | OffensivePlay::TrickRun => FormationId::IForm,
            OffensivePlay::OutsideRun => FormationId::GoalLine,
            OffensivePlay::ShortPass | OffensivePlay::MediumPass => FormationId::Shotgun,
            OffensivePlay::LongPass => FormationId::Spread,
        }
    }

    /// Slot that takes the handoff on a run.
    pub fn ball_carrier(self) -> Option<&'static str> {
        match self {
            OffensivePlay::InsideRun | OffensivePlay::OutsideRun | OffensivePlay::TrickRun => Some("RB"),
            _ => None,
        }
    }

    /// Route for one slot of this play's formation. Linemen have none and
    /// fall back to their default blocking behavior.
    pub fn route_for(self, slot: &Placement) -> Option<RouteAssignment> {
        let (pattern, depth) = match (self, slot.label) {
            (_, "LT" | "LG" | "C" | "RG" | "RT") => return None,
            (_, "QB") => (RoutePattern::BlockPass, 0.0),

            (OffensivePlay::InsideRun, "RB") => (RoutePattern::Go, -15.0),
            (OffensivePlay::InsideRun, "FB" | "TE") => (RoutePattern::BlockRelease, 0.0),
            (OffensivePlay::InsideRun, _) => (RoutePattern::Go, 0.0),

            (OffensivePlay::OutsideRun, "RB") => (RoutePattern::Swing, 0.0),
            (OffensivePlay::OutsideRun, "FB") => (RoutePattern::Flat, 0.0),
            (OffensivePlay::OutsideRun, _) => (RoutePattern::BlockRelease, 0.0),

            (OffensivePlay::TrickRun, "RB") => (RoutePattern::Wheel, 0.0),
            (OffensivePlay::TrickRun, "FB") => (RoutePattern::Swing, 0.0),
            (OffensivePlay::TrickRun, "TE") => (RoutePattern::BlockPass, 0.0),
            (OffensivePlay::TrickRun, _) => (RoutePattern::Post, -5.0),

            (OffensivePlay::ShortPass, "WR1") => (RoutePattern::Slant, 0.0),
            (OffensivePlay::ShortPass, "WR2") => (RoutePattern::Out, 0.0),
            (OffensivePlay::ShortPass, "TE") => (RoutePattern::Curl, 0.0),
            (OffensivePlay::ShortPass, "RB") => (RoutePattern::Flat, 0.0),
            (OffensivePlay::ShortPass, "SLOT") => (RoutePattern::Dig, -2.0),

            (OffensivePlay::MediumPass, "WR1") => (RoutePattern::Dig, 0.0),
            (OffensivePlay::MediumPass, "WR2") => (RoutePattern::Comeback, 0.0),
            (OffensivePlay::MediumPass, "TE") => (RoutePattern::In, 2.0),
            (OffensivePlay::MediumPass, "RB") => (RoutePattern::BlockPass, 0.0),
            (OffensivePlay::MediumPass, "SLOT") => (RoutePattern::Corner, 0.0),

            (OffensivePlay::LongPass, "WR1" | "WR3") => (RoutePattern::Go, 5.0),
            (OffensivePlay::LongPass, "WR2") => (RoutePattern::Post, 0.0),
            (OffensivePlay::LongPass, _) => (RoutePattern::Corner, 0.0),

            _ => (RoutePattern::Curl, 0.0),
        };
        Some(RouteAssignment {
            pattern,
            options: RouteOptions { side_flip: slot.x < 0.0, depth_adjust: depth, width_adjust: 0.0 },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefensivePlay {
    GoalLine,
    Contain,
    Blitz,
    ZoneCoverage,
    ManCoverage,
    Prevent,
}

impl DefensivePlay {
    pub const ALL: [DefensivePlay; 6] = [
        DefensivePlay::GoalLine,
        DefensivePlay::Contain,
        DefensivePlay::Blitz,
        DefensivePlay::ZoneCoverage,
        DefensivePlay::ManCoverage,
        DefensivePlay::Prevent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DefensivePlay::GoalLine => "Goal Line Defense",
            DefensivePlay::Contain => "Contain Defense",
            DefensivePlay::Blitz => "Blitz",
            DefensivePlay::ZoneCoverage => "Zone Coverage",
            DefensivePlay::ManCoverage => "Man Coverage",
            DefensivePlay::Prevent => "Prevent Defense",
        }
    }

    /// Success-rate multiplier against `offense`. Below 1 means this call is
    /// strong against it.
    pub fn modifier(self, offense: OffensivePlay) -> f32 {
        // inside, outside, trick, short, medium, long
        let row: [f32; 6] = match self {
            DefensivePlay::GoalLine => [0.6, 1.0, 1.1, 1.1, 1.2, 1.3],
            DefensivePlay::Contain => [1.1, 0.6, 0.9, 1.0, 1.1, 1.2],
            DefensivePlay::Blitz => [0.5, 0.5, 0.6, 0.7, 1.3, 1.5],
            DefensivePlay::ZoneCoverage => [1.2, 1.1, 1.0, 0.6, 0.9, 1.1],
            DefensivePlay::ManCoverage => [1.1, 1.0, 1.1, 0.9, 0.6, 1.0],
            DefensivePlay::Prevent => [1.3, 1.2, 1.1, 1.0, 0.8, 0.5],
        };
        row[offense as usize]
    }

    pub fn formation(self) -> FormationId {
        match self {
            DefensivePlay::Blitz => FormationId::Defense34,
            DefensivePlay::ZoneCoverage | DefensivePlay::ManCoverage => FormationId::Nickel,
            DefensivePlay::Prevent => FormationId::Dime,
            DefensivePlay::GoalLine | DefensivePlay::Contain => FormationId::Defense43,
        }
    }

    fn is_coverage(self) -> bool {
        matches!(self, DefensivePlay::ZoneCoverage | DefensivePlay::ManCoverage)
    }
}

/// Both sides' calls for the next snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCall {
    pub offense: OffensivePlay,
    pub defense: DefensivePlay,
}

/// Game state the CPU looks at when calling a play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    /// Yard line of the possessing side, 0..=100
    pub field_position: f32,
    pub down: u8,
    pub to_go: f32,
    /// Seconds left in the game
    pub time_remaining: f32,
    /// Possessing side's points minus the opponent's
    pub score_difference: i32,
}

impl Situation {
    pub fn in_red_zone(&self) -> bool {
        self.field_position >= 80.0
    }

    pub fn short_yardage(&self) -> bool {
        self.to_go <= 3.0
    }

    pub fn needs_big_play(&self) -> bool {
        let late = self.time_remaining < 120.0 && self.score_difference != 0;
        (late && self.score_difference < 0) || (self.down >= 3 && self.to_go >= 8.0)
    }
}

pub fn select_offensive_play(situation: &Situation, rng: &mut impl Rng) -> OffensivePlay {
    use OffensivePlay::*;
    let pool: Vec<OffensivePlay> = if situation.in_red_zone() && situation.short_yardage() {
        vec![InsideRun, ShortPass]
    } else if situation.in_red_zone() {
        OffensivePlay::ALL.into_iter().filter(|p| *p != LongPass).collect()
    } else if situation.needs_big_play() {
        vec![MediumPass, LongPass, TrickRun]
    } else if situation.short_yardage() {
        vec![InsideRun, ShortPass]
    } else {
        OffensivePlay::ALL.to_vec()
    };
    pool.choose(rng).copied().unwrap_or(InsideRun)
}

pub fn select_defensive_play(situation: &Situation, rng: &mut impl Rng) -> DefensivePlay {
    use DefensivePlay::*;
    let pool: Vec<DefensivePlay> = if situation.in_red_zone() {
        vec![GoalLine, ManCoverage]
    } else if situation.down >= 3 && situation.to_go >= 7.0 {
        DefensivePlay::ALL.into_iter().filter(|p| p.is_coverage()).collect()
    } else if situation.short_yardage() {
        vec![GoalLine, Contain, Blitz]
    } else {
        DefensivePlay::ALL.to_vec()
    };
    pool.choose(rng).copied().unwrap_or(ZoneCoverage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn situation(field_position: f32, down: u8, to_go: f32) -> Situation {
        Situation { field_position, down, to_go, time_remaining: 900.0, score_difference: 0 }
    }

    #[test]
    fn test_modifier_table() {
        assert_eq!(DefensivePlay::GoalLine.modifier(OffensivePlay::InsideRun), 0.6);
        assert_eq!(DefensivePlay::Blitz.modifier(OffensivePlay::LongPass), 1.5);
        assert_eq!(DefensivePlay::ZoneCoverage.modifier(OffensivePlay::ShortPass), 0.6);
        assert_eq!(DefensivePlay::Prevent.modifier(OffensivePlay::LongPass), 0.5);
        assert_eq!(DefensivePlay::Contain.modifier(OffensivePlay::TrickRun), 0.9);
    }

    #[test]
    fn test_profiles() {
        let long = OffensivePlay::LongPass.profile();
        assert_eq!((long.min_yards, long.max_yards), (0, 30));
        assert!(OffensivePlay::MediumPass.is_pass());
        assert!(!OffensivePlay::TrickRun.is_pass());
    }

    #[test]
    fn test_every_route_slot_exists_in_formation() {
        for play in OffensivePlay::ALL {
            let formation = play.formation();
            let routed = formation.placements().iter().filter(|p| play.route_for(p).is_some()).count();
            // Five linemen never get a route
            assert_eq!(routed, 6, "{play:?}");
            if let Some(carrier) = play.ball_carrier() {
                assert!(formation.placements().iter().any(|p| p.label == carrier), "{play:?}");
            }
        }
    }

    #[test]
    fn test_left_side_routes_are_flipped() {
        let wr1 = FormationId::Shotgun.placements().iter().find(|p| p.label == "WR1").unwrap();
        let route = OffensivePlay::ShortPass.route_for(wr1).unwrap();
        assert!(route.options.side_flip);
    }

    #[test]
    fn test_red_zone_short_yardage_offense() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let play = select_offensive_play(&situation(92.0, 1, 2.0), &mut rng);
            assert!(matches!(play, OffensivePlay::InsideRun | OffensivePlay::ShortPass));
        }
    }

    #[test]
    fn test_desperation_offense() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let s = situation(40.0, 3, 12.0);
        assert!(s.needs_big_play());
        for _ in 0..50 {
            let play = select_offensive_play(&s, &mut rng);
            assert!(matches!(play, OffensivePlay::MediumPass | OffensivePlay::LongPass | OffensivePlay::TrickRun));
        }
    }

    #[test]
    fn test_trailing_late_needs_big_play() {
        let s = Situation { time_remaining: 60.0, score_difference: -3, ..situation(40.0, 1, 10.0) };
        assert!(s.needs_big_play());
        let leading = Situation { score_difference: 3, ..s };
        assert!(!leading.needs_big_play());
    }

    #[test]
    fn test_defense_expects_pass_on_long_third() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let play = select_defensive_play(&situation(50.0, 3, 9.0), &mut rng);
            assert!(matches!(play, DefensivePlay::ZoneCoverage | DefensivePlay::ManCoverage));
        }
    }

    #[test]
    fn test_selection_is_seeded() {
        let s = situation(30.0, 1, 10.0);
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(select_offensive_play(&s, &mut a), select_offensive_play(&s, &mut b));
        }
    }
}
