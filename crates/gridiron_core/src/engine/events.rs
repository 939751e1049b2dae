//! Deferred actions and outgoing simulation events.
//!
//! Deferred actions are drained at one fixed point of the frame, after the
//! store writes, so "wait a frame for the store to settle" is an explicit
//! frame number rather than a timer.

use std::collections::VecDeque;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::actor::ActorId;
use super::play_lifecycle::EndReason;
use crate::playbook::outcome::PlayResult;
use crate::rules::{ClockEvent, DownOutcome, PossessionState, Yards};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredAction {
    /// Apply the result of a finished play
    AdvanceDown { play_id: u32, yards: Yards },
    EndPlay { reason: EndReason },
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_frame: u64,
    action: DeferredAction,
}

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: VecDeque<Scheduled>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` at the drain point of frame `now + delay_frames`.
    pub fn schedule(&mut self, action: DeferredAction, now: u64, delay_frames: u32) {
        self.pending.push_back(Scheduled { due_frame: now + u64::from(delay_frames), action });
    }

    /// Remove and return every action due at `now`, in scheduling order.
    pub fn drain_due(&mut self, now: u64) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        let mut keep = VecDeque::with_capacity(self.pending.len());
        for item in self.pending.drain(..) {
            if item.due_frame <= now {
                due.push(item.action);
            } else {
                keep.push_back(item);
            }
        }
        self.pending = keep;
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Payloads for the presentation layer, drained by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    PlayStarted { play_id: u32, line_of_scrimmage: f32 },
    PlayEnded { play_id: u32, reason: EndReason, dead_ball_yard_line: f32, yards: f32 },
    DownResolved {
        play_id: u32,
        yards: f32,
        outcome: DownOutcome,
        possession: PossessionState,
        narrative: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        play_result: Option<PlayResult>,
    },
    /// A deferred result found a new play already running and was dropped
    OutcomeSuperseded { play_id: u32 },
    PlayReset { line_of_scrimmage: f32 },
    Tackle { tackler: ActorId, carrier: ActorId },
    PassCaught { receiver: ActorId },
    BallSettled { position: Vector3<f32> },
    BallOutOfBounds { position: Vector3<f32> },
    BoundaryCorrected { actor: ActorId },
    Clock(ClockEvent),
    SpecialMode { active: bool },
}
