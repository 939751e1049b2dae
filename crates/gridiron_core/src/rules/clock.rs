//! Game clock and quarters.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "clock", rename_all = "snake_case")]
pub enum ClockEvent {
    QuarterEnded { quarter: u8 },
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    pub quarter: u8,
    /// Seconds left in the quarter
    pub remaining: f32,
    quarter_seconds: f32,
    quarters: u8,
    game_over: bool,
}

impl GameClock {
    pub fn new(quarter_seconds: f32, quarters: u8) -> Self {
        Self {
            quarter: 1,
            remaining: quarter_seconds,
            quarter_seconds,
            quarters: quarters.max(1),
            game_over: false,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_final_quarter(&self) -> bool {
        self.quarter >= self.quarters
    }

    /// Seconds left in regulation, across the remaining quarters.
    pub fn game_seconds_remaining(&self) -> f32 {
        let later_quarters = self.quarters.saturating_sub(self.quarter) as f32;
        self.remaining.max(0.0) + later_quarters * self.quarter_seconds
    }

    /// Run `seconds` off the clock; a quarter break consumes the overflow.
    pub fn tick(&mut self, seconds: f32) -> Option<ClockEvent> {
        if self.game_over || seconds <= 0.0 || !seconds.is_finite() {
            return None;
        }
        self.remaining -= seconds;
        if self.remaining > 0.0 {
            return None;
        }
        Some(self.advance_quarter())
    }

    /// End the current quarter immediately.
    pub fn advance_quarter(&mut self) -> ClockEvent {
        if self.is_final_quarter() {
            self.remaining = 0.0;
            self.game_over = true;
            info!(quarter = self.quarter, "game over");
            return ClockEvent::GameOver;
        }
        let ended = self.quarter;
        self.quarter += 1;
        self.remaining = self.quarter_seconds;
        info!(quarter = ended, "quarter ended");
        ClockEvent::QuarterEnded { quarter: ended }
    }

    /// `MM:SS` of the remaining quarter time.
    pub fn display(&self) -> String {
        let secs = self.remaining.max(0.0).ceil() as u32;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
