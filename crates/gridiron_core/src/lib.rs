//! # gridiron_core - Frame-Driven Gridiron Play Simulation
//!
//! Headless core for a real-time American football play: actor movement,
//! rule-based AI, ball flight, the play lifecycle and the down/possession
//! rules that turn each play into a game state.
//!
//! ## Features
//! - Deterministic simulation (same seed and inputs = same game)
//! - Pluggable physics backend behind a small trait
//! - Play calling with CPU selection and seeded outcome resolution
//! - Serde snapshots and events for any presentation layer

// Game engine APIs often require many parameters for physics, state, etc.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally in config presets
#![allow(clippy::field_reassign_with_default)]
// Large enum variants - boxing would require API changes
#![allow(clippy::large_enum_variant)]

pub mod config;
pub mod engine;
pub mod error;
pub mod playbook;
pub mod rules;

pub use config::SimConfig;
pub use engine::{
    ActorId, ActorSpec, EndReason, GameSession, GameSnapshot, InputState, PlayPhase, Role, SimEvent, SpeedTier,
    TeamSide,
};
pub use error::{Result, SimError};
pub use playbook::{DefensivePlay, OffensivePlay, PlayCall, PlayResult};
pub use rules::{DownOutcome, PossessionState, Yards};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
