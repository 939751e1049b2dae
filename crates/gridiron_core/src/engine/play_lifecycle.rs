//! Play Lifecycle Controller state: `Idle -> Active -> Ended -> Idle`.
//!
//! This type only guards transitions and keeps the play clock, reaction
//! delay and dead-ball spot. Repositioning actors and applying the result
//! happen in [`crate::engine::session::GameSession`], which owns the roster.

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::field::{clamp_to_safe, dims};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayPhase {
    #[default]
    Idle,
    Active,
    Ended,
}

impl fmt::Display for PlayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayPhase::Idle => "idle",
            PlayPhase::Active => "active",
            PlayPhase::Ended => "ended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Tackle,
    /// Play clock ran out
    DelayOfGame,
    /// Loose ball came to rest
    BallDead,
    /// Thrown ball landed without a catch
    IncompletePass,
    OutOfBounds,
    /// Host called `end_play`
    Whistle,
}

/// Result of an `end` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTransition {
    Ended,
    /// Already ended; nothing changed
    AlreadyEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayLifecycle {
    phase: PlayPhase,
    /// Seconds left on the play clock
    pub play_clock: f32,
    play_clock_seconds: f32,
    /// Seconds until the defense reacts to the snap
    reaction_timer: f32,
    tackle_spot: Vector3<f32>,
    play_id: u32,
    last_end: Option<EndReason>,
}

impl PlayLifecycle {
    pub fn new(play_clock_seconds: f32) -> Self {
        Self {
            phase: PlayPhase::Idle,
            play_clock: play_clock_seconds,
            play_clock_seconds,
            reaction_timer: 0.0,
            tackle_spot: Vector3::new(0.0, dims::GROUND_Y, 0.0),
            play_id: 0,
            last_end: None,
        }
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == PlayPhase::Active
    }

    /// Id of the current (or most recent) play; 0 before the first snap.
    pub fn play_id(&self) -> u32 {
        self.play_id
    }

    pub fn last_end(&self) -> Option<EndReason> {
        self.last_end
    }

    pub fn tackle_spot(&self) -> Vector3<f32> {
        self.tackle_spot
    }

    /// Snap. Only from `Idle`.
    pub fn start(&mut self, reaction_delay: f32) -> Result<u32> {
        if self.phase != PlayPhase::Idle {
            warn!(phase = %self.phase, "start_play ignored");
            return Err(SimError::InvalidTransition { action: "start_play", phase: self.phase });
        }
        self.phase = PlayPhase::Active;
        self.play_clock = self.play_clock_seconds;
        self.reaction_timer = reaction_delay.max(0.0);
        self.play_id += 1;
        self.last_end = None;
        info!(play_id = self.play_id, "play started");
        Ok(self.play_id)
    }

    /// Whistle. Only from `Active`; a second whistle is a no-op.
    pub fn end(&mut self, reason: EndReason, dead_ball_spot: Vector3<f32>) -> Result<EndTransition> {
        match self.phase {
            PlayPhase::Ended => {
                debug!(?reason, "end_play ignored: already ended");
                Ok(EndTransition::AlreadyEnded)
            }
            PlayPhase::Idle => {
                warn!(?reason, "end_play ignored while idle");
                Err(SimError::InvalidTransition { action: "end_play", phase: self.phase })
            }
            PlayPhase::Active => {
                self.tackle_spot = clamp_to_safe(dead_ball_spot);
                self.tackle_spot.y = dims::GROUND_Y;
                self.phase = PlayPhase::Ended;
                self.last_end = Some(reason);
                info!(play_id = self.play_id, ?reason, "play ended");
                Ok(EndTransition::Ended)
            }
        }
    }

    /// Back to `Idle`. Not allowed mid-play.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase == PlayPhase::Active {
            warn!("reset_play ignored while active");
            return Err(SimError::InvalidTransition { action: "reset_play", phase: self.phase });
        }
        self.phase = PlayPhase::Idle;
        self.play_clock = self.play_clock_seconds;
        self.reaction_timer = 0.0;
        Ok(())
    }

    /// Count the play clock down. True exactly once, when it expires mid-play.
    pub fn tick_play_clock(&mut self, seconds: f32) -> bool {
        if !self.is_active() || self.play_clock <= 0.0 {
            return false;
        }
        self.play_clock = (self.play_clock - seconds.max(0.0)).max(0.0);
        self.play_clock <= 0.0
    }

    pub fn tick_reaction(&mut self, dt: f32) {
        if self.is_active() && self.reaction_timer > 0.0 {
            self.reaction_timer = (self.reaction_timer - dt).max(0.0);
        }
    }

    pub fn defense_released(&self) -> bool {
        self.is_active() && self.reaction_timer <= 0.0
    }

    /// Center the next snap laterally.
    pub fn recenter_tackle_spot(&mut self) {
        self.tackle_spot.x = 0.0;
    }
}
