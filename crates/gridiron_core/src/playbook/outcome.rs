//! Play outcome resolution.
//!
//! A called play is resolved by rolling against
//! `base success rate x defensive modifier x performance`, where performance
//! measures how the live rendition went against the play's expected yards.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::plays::{DefensivePlay, OffensivePlay};

/// Execution grade used in narratives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Outstanding,
    Great,
    Solid,
    Mediocre,
    Poor,
}

impl PerformanceTier {
    pub fn of(performance: f32) -> Self {
        if performance > 1.3 {
            PerformanceTier::Outstanding
        } else if performance > 1.1 {
            PerformanceTier::Great
        } else if performance < 0.7 {
            PerformanceTier::Poor
        } else if performance < 0.9 {
            PerformanceTier::Mediocre
        } else {
            PerformanceTier::Solid
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            PerformanceTier::Outstanding => "an outstanding",
            PerformanceTier::Great => "a great",
            PerformanceTier::Solid => "a solid",
            PerformanceTier::Mediocre => "a mediocre",
            PerformanceTier::Poor => "a poor",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    pub offense: OffensivePlay,
    pub defense: DefensivePlay,
    pub success: bool,
    pub yards: i32,
    pub performance: f32,
    pub tier: PerformanceTier,
    pub narrative: String,
    /// Game-clock seconds the play consumed
    pub clock_seconds: f32,
}

impl PlayResult {
    /// Rebase on yards measured on the field. Grade and clock usage stay.
    pub fn with_measured_yards(mut self, yards: i32) -> Self {
        self.yards = yards;
        self.success = yards > 0;
        self.narrative = describe_outcome(self.offense, self.defense, self.success, yards, self.tier);
        self
    }
}

/// Grade actual yards against the play's expected range.
pub fn performance_from_yards(play: OffensivePlay, actual_yards: f32) -> f32 {
    let profile = play.profile();
    let min = profile.min_yards as f32;
    let max = profile.max_yards as f32;
    let avg = (min + max) / 2.0;

    if !actual_yards.is_finite() || actual_yards <= 0.0 {
        0.7
    } else if actual_yards < min {
        0.8
    } else if actual_yards < avg {
        0.9
    } else if actual_yards < max {
        1.1
    } else if actual_yards == max {
        1.3
    } else {
        1.5
    }
}

pub fn resolve_play_outcome(
    offense: OffensivePlay,
    defense: DefensivePlay,
    performance: f32,
    rng: &mut impl Rng,
) -> PlayResult {
    let profile = offense.profile();
    let modifier = defense.modifier(offense);
    let chance = profile.success_rate * modifier * performance;
    let success = rng.gen::<f32>() <= chance;

    let mut yards = if success {
        let base = rng.gen_range(profile.min_yards..=profile.max_yards);
        let gained = (base as f32 * performance).floor() as i32;
        if modifier > 1.0 {
            ((gained as f32 * 0.8).floor() as i32).max(1)
        } else if modifier < 1.0 {
            (gained as f32 * 1.3).floor() as i32
        } else {
            gained
        }
    } else if offense == OffensivePlay::TrickRun {
        rng.gen_range(-5..=0)
    } else if offense.is_pass() {
        0
    } else {
        rng.gen_range(-2..=1)
    };

    if defense == DefensivePlay::Blitz {
        if !success {
            yards -= rng.gen_range(0..=3);
        } else if offense.is_pass() {
            yards += rng.gen_range(5..=10);
        }
    }

    // Runs and completions keep the clock moving
    let clock_seconds =
        if success || !offense.is_pass() { rng.gen_range(30.0f32..=40.0) } else { rng.gen_range(5.0f32..=10.0) };

    let tier = PerformanceTier::of(performance);
    let narrative = describe_outcome(offense, defense, success, yards, tier);
    debug!(?offense, ?defense, success, yards, chance, "play resolved");

    PlayResult { offense, defense, success, yards, performance, tier, narrative, clock_seconds }
}

/// Play-by-play line for a resolved play.
pub fn describe_outcome(
    offense: OffensivePlay,
    defense: DefensivePlay,
    success: bool,
    yards: i32,
    tier: PerformanceTier,
) -> String {
    let play = offense.name().to_lowercase();
    let mut line = match (offense.is_pass(), success) {
        (true, true) if yards > 20 => {
            format!("Offense completes a HUGE {play} for {yards} yards with {tier} execution!")
        }
        (true, true) if yards > 10 => {
            format!("Offense connects on a {play} for a solid gain of {yards} yards with {tier} throw and catch.")
        }
        (true, true) => format!("Offense's {play} is complete for {yards} yards after {tier} execution."),
        (true, false) => format!("Offense's {play} falls incomplete after {tier} attempt."),
        (false, true) if yards > 10 => {
            format!("Offense breaks loose on a {play} for {yards} yards with {tier} run!")
        }
        (false, true) if yards > 5 => {
            format!("Offense gains {yards} yards on a solid {play} with {tier} effort.")
        }
        (false, true) => format!("Offense picks up {yards} yards on the {play} with {tier} execution."),
        (false, false) if yards < 0 => {
            format!("Offense's {play} is stopped for a loss of {} yards despite {tier} effort.", yards.abs())
        }
        (false, false) if yards == 0 => {
            format!("Offense's {play} is stopped at the line of scrimmage after {tier} attempt.")
        }
        (false, false) => format!("Offense is held to just {yards} yard on the {play} with {tier} execution."),
    };

    if defense == DefensivePlay::Blitz {
        let blitz = defense.name().to_lowercase();
        if !success {
            line.push_str(&format!(" The {blitz} disrupted the play!"));
        } else if offense.is_pass() {
            line.push_str(&format!(" They beat the {blitz} for a big gain!"));
        }
    }
    line
}
