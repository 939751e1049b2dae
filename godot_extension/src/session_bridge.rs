//! Session Bridge for Godot
//!
//! Exposes `GameSession` to GDScript. Every call returns a JSON string with
//! a `success` flag; failures carry `error` and `error_code`.

use std::cell::RefCell;

use godot::prelude::*;
use gridiron_core::engine::{ActorId, ActorSpec, EndReason, EndTransition, GameSession, InputState, SimEvent};
use gridiron_core::{DefensivePlay, OffensivePlay, SimConfig, SimError};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

/// Gridiron Session - one game, driven frame by frame from `_physics_process`
#[derive(GodotClass)]
#[class(base=RefCounted)]
pub struct GridironSession {
    base: Base<RefCounted>,
    session: RefCell<Option<GameSession>>,
}

#[godot_api]
impl IRefCounted for GridironSession {
    fn init(base: Base<RefCounted>) -> Self {
        crate::install_panic_hook();
        Self { base, session: RefCell::new(None) }
    }
}

#[godot_api]
impl GridironSession {
    /// Connection test
    #[func]
    pub fn test_connection(&self) -> GString {
        GString::from(format!(
            "GridironSession v{} ({} @ {}) - OK",
            gridiron_core::VERSION,
            env!("GIT_HASH"),
            env!("BUILD_TIME_UTC")
        ).as_str())
    }

    /// Create a new game.
    ///
    /// # Arguments
    /// * `config_json` - empty for defaults, `{"preset": "arcade", "seed": 7}`,
    ///   or a full `SimConfig` object
    #[func]
    pub fn session_init(&self, config_json: GString) -> GString {
        let config = match parse_config(&config_json.to_string()) {
            Ok(config) => config,
            Err(err) => return self.sim_error_response(&err),
        };
        let session = match GameSession::new(config) {
            Ok(session) => session,
            Err(err) => return self.sim_error_response(&err),
        };
        let seed = session.config().seed;
        *self.session.borrow_mut() = Some(session);
        godot_print!("GridironSession initialized (seed {})", seed);

        GString::from(json!({ "success": true, "seed": seed }).to_string().as_str())
    }

    #[func]
    pub fn has_session(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Advance one frame.
    ///
    /// # Arguments
    /// * `dt` - frame delta in seconds
    /// * `input_json` - `InputState`, e.g. `{"forward": true, "tier": "sprint"}`
    ///
    /// # Returns
    /// Frame number and the events emitted this frame
    #[func]
    pub fn step_frame(&self, dt: f64, input_json: GString) -> GString {
        let input_str = input_json.to_string();
        let input = if input_str.is_empty() {
            InputState::default()
        } else {
            match serde_json::from_str::<InputState>(&input_str) {
                Ok(input) => input,
                Err(e) => return self.create_error_response(&e.to_string(), "PARSE_ERROR"),
            }
        };
        self.with_session(|s| {
            s.step_frame(dt as f32, &input);
            Ok(json!({ "frame": s.frame(), "events": events_json(s.drain_events()) }))
        })
    }

    /// Wall-clock tick for the play clock, game clock and special mode.
    #[func]
    pub fn tick_interval(&self, seconds: f64) -> GString {
        self.with_session(|s| {
            s.tick_interval(seconds as f32);
            Ok(json!({ "events": events_json(s.drain_events()) }))
        })
    }

    #[func]
    pub fn get_snapshot(&self) -> GString {
        self.with_session(|s| Ok(json!({ "snapshot": s.snapshot() })))
    }

    #[func]
    pub fn drain_events(&self) -> GString {
        self.with_session(|s| Ok(json!({ "events": events_json(s.drain_events()) })))
    }

    // ========== Play lifecycle ==========

    #[func]
    pub fn start_play(&self) -> GString {
        self.with_session(|s| s.start_play().map(|play_id| json!({ "play_id": play_id })))
    }

    /// # Arguments
    /// * `reason` - "tackle", "out_of_bounds", "whistle", ...; empty for "whistle"
    #[func]
    pub fn end_play(&self, reason: GString) -> GString {
        let reason_str = reason.to_string();
        let reason = if reason_str.is_empty() {
            EndReason::Whistle
        } else {
            match parse_name::<EndReason>(&reason_str) {
                Some(reason) => reason,
                None => return self.create_error_response(&format!("Unknown end reason: {reason_str}"), "INVALID_REASON"),
            }
        };
        self.with_session(|s| {
            s.end_play(reason).map(|t| json!({ "already_ended": t == EndTransition::AlreadyEnded }))
        })
    }

    #[func]
    pub fn reset_play(&self) -> GString {
        self.with_session(|s| s.reset_play().map(|()| json!({ "possession": s.possession() })))
    }

    #[func]
    pub fn advance_down(&self, yards: f64) -> GString {
        self.with_session(|s| {
            s.advance_down(yards as f32).map(|outcome| json!({ "outcome": outcome, "possession": s.possession() }))
        })
    }

    #[func]
    pub fn activate_special_mode(&self) -> GString {
        self.with_session(|s| s.activate_special_mode().map(|()| json!({ "special": s.special() })))
    }

    /// Pick plays and line up both formations.
    ///
    /// # Arguments
    /// * `offense` - e.g. "short_pass"; empty lets the CPU choose
    /// * `defense` - e.g. "blitz"; empty lets the CPU choose
    #[func]
    pub fn call_play(&self, offense: GString, defense: GString) -> GString {
        let offense = match parse_optional::<OffensivePlay>(&offense.to_string()) {
            Ok(play) => play,
            Err(name) => return self.create_error_response(&format!("Unknown offensive play: {name}"), "INVALID_PLAY"),
        };
        let defense = match parse_optional::<DefensivePlay>(&defense.to_string()) {
            Ok(play) => play,
            Err(name) => return self.create_error_response(&format!("Unknown defensive play: {name}"), "INVALID_PLAY"),
        };
        self.with_session(|s| {
            s.call_play(offense, defense).map(|call| {
                json!({
                    "offense": call.offense,
                    "offense_name": call.offense.name(),
                    "defense": call.defense,
                    "defense_name": call.defense.name(),
                })
            })
        })
    }

    // ========== Ball ==========

    #[func]
    pub fn throw_ball(&self, direction: Vector3, force: f64, height: f64) -> GString {
        let direction = nalgebra::Vector3::new(direction.x, direction.y, direction.z);
        self.with_session(|s| s.throw_ball(direction, force as f32, height as f32).map(|()| json!({})))
    }

    #[func]
    pub fn attach_to_player(&self, actor_id: i64) -> GString {
        let Some(id) = actor_id_from(actor_id) else {
            return self.create_error_response("actor_id out of range", "INVALID_ACTOR_ID");
        };
        self.with_session(|s| s.attach_to_player(id).map(|()| json!({ "owner": id })))
    }

    // ========== Roster ==========

    /// # Arguments
    /// * `spec_json` - `ActorSpec`, e.g.
    ///   `{"side": "offense", "role": "WideReceiver", "position": [10.0, 1.0, 40.0]}`
    #[func]
    pub fn add_actor(&self, spec_json: GString) -> GString {
        let spec: ActorSpec = match serde_json::from_str(&spec_json.to_string()) {
            Ok(spec) => spec,
            Err(e) => return self.create_error_response(&e.to_string(), "PARSE_ERROR"),
        };
        self.with_session(|s| s.add_actor(spec).map(|id| json!({ "actor_id": id })))
    }

    #[func]
    pub fn remove_actor(&self, actor_id: i64) -> GString {
        let Some(id) = actor_id_from(actor_id) else {
            return self.create_error_response("actor_id out of range", "INVALID_ACTOR_ID");
        };
        self.with_session(|s| s.remove_actor(id).map(|()| json!({ "actor_id": id })))
    }

    // ========== Helpers ==========

    fn create_error_response(&self, message: &str, code: &str) -> GString {
        let response = json!({
            "success": false,
            "error": message,
            "error_code": code
        });
        GString::from(response.to_string().as_str())
    }
}

impl GridironSession {
    /// Run `f` against the live session and wrap its result.
    fn with_session(
        &self,
        f: impl FnOnce(&mut GameSession) -> gridiron_core::Result<JsonValue>,
    ) -> GString {
        let mut guard = self.session.borrow_mut();
        let Some(session) = guard.as_mut() else {
            return self.create_error_response("Session not initialized", "NO_SESSION");
        };
        match f(session) {
            Ok(mut payload) => {
                if let Some(obj) = payload.as_object_mut() {
                    obj.insert("success".to_string(), JsonValue::Bool(true));
                }
                GString::from(payload.to_string().as_str())
            }
            Err(err) => self.sim_error_response(&err),
        }
    }

    fn sim_error_response(&self, err: &SimError) -> GString {
        if !err.is_recoverable() {
            godot_error!("GridironSession: {}", err);
        }
        self.create_error_response(&err.to_string(), error_code(err))
    }
}

fn error_code(err: &SimError) -> &'static str {
    match err {
        SimError::InvalidTransition { .. } => "INVALID_TRANSITION",
        SimError::ActorNotFound(_) => "ACTOR_NOT_FOUND",
        SimError::DuplicateActor(_) => "DUPLICATE_ACTOR",
        SimError::BallUnavailable => "BALL_UNAVAILABLE",
        SimError::InvalidYardage(_) => "INVALID_YARDAGE",
        SimError::MeterNotReady { .. } => "METER_NOT_READY",
        SimError::GameOver => "GAME_OVER",
        SimError::Config(_) => "CONFIG_ERROR",
    }
}

fn parse_config(raw: &str) -> gridiron_core::Result<SimConfig> {
    if raw.trim().is_empty() {
        return Ok(SimConfig::default());
    }
    let value: JsonValue = serde_json::from_str(raw)?;
    let Some(preset) = value.get("preset").and_then(JsonValue::as_str) else {
        return SimConfig::from_json(raw);
    };
    let mut config = match preset {
        "realistic" => SimConfig::realistic(),
        "arcade" => SimConfig::arcade(),
        "deterministic" => SimConfig::deterministic(),
        other => return Err(SimError::Config(format!("unknown preset: {other}"))),
    };
    if let Some(seed) = value.get("seed").and_then(JsonValue::as_u64) {
        config.seed = seed;
    }
    Ok(config)
}

/// Parse a snake_case enum name through its serde representation.
fn parse_name<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(JsonValue::String(name.to_string())).ok()
}

/// Empty string means "not chosen".
fn parse_optional<T: DeserializeOwned>(name: &str) -> std::result::Result<Option<T>, String> {
    if name.is_empty() {
        return Ok(None);
    }
    parse_name(name).map(Some).ok_or_else(|| name.to_string())
}

fn actor_id_from(raw: i64) -> Option<ActorId> {
    u32::try_from(raw).ok().map(ActorId)
}

fn events_json(events: Vec<SimEvent>) -> JsonValue {
    serde_json::to_value(events).unwrap_or_else(|e| {
        godot_error!("GridironSession: event encoding failed: {}", e);
        JsonValue::Array(Vec::new())
    })
}
