//! Game session: owns all simulation state and runs the frame loop.
//!
//! `step_frame` runs, in order: physics step, actor controller, AI, ball,
//! store writes, deferred-action drain. `tick_interval` is the wall-clock
//! timer and only touches the play clock, the game clock and the special
//! meter. Commands (`start_play`, `end_play`, ...) may be called between
//! frames; a rejected command leaves the session unchanged.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use super::actor::{Actor, ActorId, ActorRoster, ActorSpec, Role, TeamSide};
use super::ball::{Ball, BallEvent, BallMode};
use super::behaviors::{update_ai, AiFrame, AiSignal, BehaviorMode};
use super::body_orientation::{DEFENSE_FACING, OFFENSE_FACING};
use super::events::{DeferredAction, EventQueue, SimEvent};
use super::field::{clamp_to_safe, dims, horizontal_distance, is_within_field, yard_line_to_z, z_to_yard_line};
use super::input::InputState;
use super::movement::{update_actor, MovementIntent};
use super::physics::{KinematicBackend, PhysicsBackend};
use super::play_lifecycle::{EndReason, EndTransition, PlayLifecycle, PlayPhase};
use super::special_mode::SpecialMeter;
use super::store::{publish_actors, publish_ball, ActorSnapshot, BallSnapshot, ClockSnapshot, GameSnapshot};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::playbook::formations::{placement_position, spawn_specs, FormationId};
use crate::playbook::outcome::{performance_from_yards, resolve_play_outcome, PlayResult};
use crate::playbook::plays::{
    select_defensive_play, select_offensive_play, DefensivePlay, OffensivePlay, PlayCall, Situation,
};
use crate::rules::{DownOutcome, GameClock, PossessionState, RulesEngine, Yards};

pub struct GameSession<P: PhysicsBackend = KinematicBackend> {
    config: SimConfig,
    physics: P,
    rng: ChaCha8Rng,
    roster: ActorRoster,
    ball: Ball,
    rules: RulesEngine,
    lifecycle: PlayLifecycle,
    clock: GameClock,
    special: SpecialMeter,
    queue: EventQueue,
    events: Vec<SimEvent>,
    published_actors: Vec<ActorSnapshot>,
    published_ball: Option<BallSnapshot>,
    frame: u64,
    play_call: Option<PlayCall>,
    /// Side whose human actor follows `InputState`
    controlled_side: TeamSide,
}

impl GameSession<KinematicBackend> {
    pub fn new(config: SimConfig) -> Result<Self> {
        let physics = KinematicBackend::new(config.ball.gravity);
        Self::with_backend(config, physics)
    }
}

impl<P: PhysicsBackend> GameSession<P> {
    pub fn with_backend(config: SimConfig, physics: P) -> Result<Self> {
        config.validate()?;
        let rules = RulesEngine::new(config.play.touchdown_points);
        let ball_spot = Vector3::new(0.0, config.ball.rest_height, rules.possession.line_of_scrimmage_z());
        info!(seed = config.seed, "game session created");
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            roster: ActorRoster::new(),
            ball: Ball::resting_at(ball_spot),
            lifecycle: PlayLifecycle::new(config.play.play_clock_seconds),
            clock: GameClock::new(config.play.quarter_seconds, config.play.quarters),
            special: SpecialMeter::new(config.play.meter_threshold, config.play.special_mode_seconds),
            queue: EventQueue::new(),
            events: Vec::new(),
            published_actors: Vec::new(),
            published_ball: None,
            frame: 0,
            play_call: None,
            controlled_side: TeamSide::Offense,
            rules,
            physics,
            config,
        })
    }

    // ========== Read-only accessors ==========

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn possession(&self) -> &PossessionState {
        &self.rules.possession
    }

    pub fn rules(&self) -> &RulesEngine {
        &self.rules
    }

    pub fn lifecycle(&self) -> &PlayLifecycle {
        &self.lifecycle
    }

    pub fn phase(&self) -> PlayPhase {
        self.lifecycle.phase()
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn special(&self) -> &SpecialMeter {
        &self.special
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.roster.iter()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.roster.get(id)
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn play_call(&self) -> Option<PlayCall> {
        self.play_call
    }

    pub fn controlled_side(&self) -> TeamSide {
        self.controlled_side
    }

    /// Published view as of the last store write.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            frame: self.frame,
            phase: self.lifecycle.phase(),
            play_id: self.lifecycle.play_id(),
            play_clock: self.lifecycle.play_clock,
            possession: self.rules.possession.clone(),
            score: self.rules.scoreboard.clone(),
            stats: self.rules.stats.clone(),
            clock: ClockSnapshot {
                quarter: self.clock.quarter,
                remaining: self.clock.remaining,
                display: self.clock.display(),
                game_over: self.clock.is_game_over(),
            },
            special: self.special.clone(),
            actors: self.published_actors.clone(),
            ball: self.published_ball.clone(),
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// What the CPU play caller sees for the possessing side.
    pub fn situation(&self) -> Situation {
        let p = &self.rules.possession;
        let ours = self.rules.scoreboard.points(p.possession) as i32;
        let theirs = self.rules.scoreboard.points(p.possession.opponent()) as i32;
        Situation {
            field_position: p.position,
            down: p.down,
            to_go: p.to_go,
            time_remaining: self.clock.game_seconds_remaining(),
            score_difference: ours - theirs,
        }
    }

    // ========== Frame loop ==========

    pub fn step_frame(&mut self, dt: f32, input: &InputState) {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.movement.max_dt) } else { 0.0 };
        self.frame += 1;

        self.physics.step(dt);
        self.sync_from_physics();
        self.run_controllers(dt, input);

        self.lifecycle.tick_reaction(dt);
        if self.lifecycle.is_active() {
            self.run_ai(dt);
        }
        self.update_ball(dt);

        publish_actors(&mut self.published_actors, self.roster.iter());
        publish_ball(&mut self.published_ball, Some(&self.ball));

        self.drain_deferred();
    }

    /// Wall-clock timer tick.
    pub fn tick_interval(&mut self, seconds: f32) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        if self.lifecycle.is_active() {
            if let Some(event) = self.clock.tick(seconds) {
                self.events.push(SimEvent::Clock(event));
            }
        }
        if self.lifecycle.tick_play_clock(seconds) {
            info!(play_id = self.lifecycle.play_id(), "play clock expired");
            if let Err(err) = self.end_play(EndReason::DelayOfGame) {
                debug!(%err, "delay of game not applied");
            }
        }
        if self.special.tick(seconds) {
            self.events.push(SimEvent::SpecialMode { active: false });
        }
    }

    fn sync_from_physics(&mut self) {
        for actor in self.roster.iter_mut() {
            match self.physics.translation(actor.body) {
                Some(position) => actor.position = position,
                None => {
                    trace!(actor = %actor.id, "no physics body; skipped");
                    continue;
                }
            }
            if let Some(velocity) = self.physics.linear_velocity(actor.body) {
                actor.velocity.y = velocity.y;
            }
        }
    }

    fn run_controllers(&mut self, dt: f32, input: &InputState) {
        let human_intent =
            if self.lifecycle.is_active() { input.to_intent(&self.config.movement) } else { MovementIntent::stop() };

        for actor in self.roster.iter_mut() {
            if actor.is_human() {
                // The other side's human holds its spot
                actor.intent =
                    if actor.side == self.controlled_side { human_intent } else { MovementIntent::stop() };
            }
            let step = update_actor(actor, &self.config.movement, dt);
            if step.corrected {
                self.physics.set_translation(actor.body, actor.position);
                self.events.push(SimEvent::BoundaryCorrected { actor: actor.id });
            }
            self.physics.set_linear_velocity(actor.body, actor.velocity);
        }
    }

    fn run_ai(&mut self, dt: f32) {
        let frame = AiFrame {
            cfg: &self.config.ai,
            base_speed: self.config.movement.ai_base_speed,
            dt,
            carrier: self.ball.owner(),
            ball_position: Some(self.ball.position),
            pursuit_released: self.lifecycle.defense_released(),
        };
        let signals = update_ai(&mut self.roster, &frame, &mut self.rng);

        let tackle = signals.iter().find_map(|s| match *s {
            AiSignal::Tackle { tackler, carrier } => Some((tackler, carrier)),
            AiSignal::ModeChanged { .. } => None,
        });
        if let Some((tackler, carrier)) = tackle {
            let side = self.roster.get(tackler).map(|a| a.side).unwrap_or(TeamSide::Defense);
            self.rules.stats.side_mut(side).tackles += 1;
            info!(tackler = %tackler, carrier = %carrier, "tackle");
            self.events.push(SimEvent::Tackle { tackler, carrier });
            self.queue.schedule(DeferredAction::EndPlay { reason: EndReason::Tackle }, self.frame, 0);
        }
    }

    fn update_ball(&mut self, dt: f32) {
        match self.ball.mode() {
            BallMode::Carried { owner } => match self.roster.get(owner) {
                Some(actor) => self.ball.follow_owner(actor.position, actor.yaw, &self.config.ball),
                None => trace!(owner = %owner, "ball owner missing; skipped"),
            },
            BallMode::Thrown => match self.ball.update_flight(dt, &self.config.ball) {
                Some(BallEvent::Settled { position }) => {
                    self.events.push(SimEvent::BallSettled { position });
                    self.end_on_next_drain(EndReason::IncompletePass);
                }
                Some(BallEvent::OutOfBounds { position }) => {
                    self.events.push(SimEvent::BallOutOfBounds { position });
                    self.end_on_next_drain(EndReason::OutOfBounds);
                }
                None => self.try_catch(),
            },
            BallMode::Resting => {}
        }
    }

    /// Hand a thrown ball to the nearest eligible receiver in reach.
    fn try_catch(&mut self) {
        if !self.lifecycle.is_active() || self.ball.position.y > self.config.ball.catch_height {
            return;
        }
        let ball_position = self.ball.position;
        let reach = self.config.ball.catch_radius;
        let receiver = self
            .roster
            .iter()
            .filter(|a| a.side == TeamSide::Offense && a.role.is_eligible_receiver())
            .filter(|a| a.is_human() || a.behavior() == Some(BehaviorMode::Receive))
            .map(|a| (a.id, horizontal_distance(&a.position, &ball_position)))
            .filter(|(_, d)| *d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
        let Some(receiver) = receiver else {
            return;
        };

        self.ball.attach_to_player(receiver);
        if self.controlled_side == TeamSide::Offense {
            if let Err(err) = self.roster.set_human(TeamSide::Offense, receiver) {
                trace!(%err, "receiver kept on AI");
            }
        }
        info!(receiver = %receiver, "pass caught");
        self.events.push(SimEvent::PassCaught { receiver });
    }

    fn end_on_next_drain(&mut self, reason: EndReason) {
        if self.lifecycle.is_active() {
            self.queue.schedule(DeferredAction::EndPlay { reason }, self.frame, 0);
        }
    }

    fn drain_deferred(&mut self) {
        for action in self.queue.drain_due(self.frame) {
            match action {
                DeferredAction::EndPlay { reason } => {
                    if let Err(err) = self.end_play(reason) {
                        debug!(%err, "deferred end_play dropped");
                    }
                }
                DeferredAction::AdvanceDown { play_id, yards } => {
                    if self.lifecycle.is_active() {
                        debug!(play_id, "result superseded by a new snap");
                        self.events.push(SimEvent::OutcomeSuperseded { play_id });
                    } else {
                        self.finish_play(play_id, yards);
                    }
                }
            }
        }
    }

    // ========== Lifecycle commands ==========

    /// Snap. Records the line of scrimmage, gives the ball to the runner (or
    /// the offensive human, or the quarterback) and re-arms every AI brain.
    pub fn start_play(&mut self) -> Result<u32> {
        if self.clock.is_game_over() {
            warn!("start_play ignored: game over");
            return Err(SimError::GameOver);
        }
        let play_id = self.lifecycle.start(self.config.ai.defense_reaction_delay)?;
        self.rules.possession.record_line_of_scrimmage();
        self.snap_ball();

        for actor in self.roster.iter_mut() {
            let start = actor.position;
            if let Some(brain) = actor.control.brain_mut() {
                brain.rearm(start, &self.config.ai);
            }
        }

        let line_of_scrimmage = self.rules.possession.line_of_scrimmage;
        self.events.push(SimEvent::PlayStarted { play_id, line_of_scrimmage });
        Ok(play_id)
    }

    fn snap_ball(&mut self) {
        let runner = self
            .play_call
            .and_then(|call| call.offense.ball_carrier())
            .and_then(|label| self.roster.iter().find(|a| a.side == TeamSide::Offense && a.label == label))
            .map(|a| a.id);
        if let (Some(id), TeamSide::Offense) = (runner, self.controlled_side) {
            if let Err(err) = self.roster.set_human(TeamSide::Offense, id) {
                trace!(%err, "runner kept on AI");
            }
        }

        let taker = runner
            .or_else(|| self.roster.human(TeamSide::Offense).map(|a| a.id))
            .or_else(|| self.roster.first_with_role(TeamSide::Offense, Role::Quarterback).map(|a| a.id));
        let Some(id) = taker else {
            trace!("no offensive actor to take the snap");
            return;
        };
        self.ball.attach_to_player(id);
        if let Some(actor) = self.roster.get(id) {
            self.ball.follow_owner(actor.position, actor.yaw, &self.config.ball);
        }
    }

    /// Whistle. Computes the dead-ball spot, moves to `Ended` and queues the
    /// result for `settle_frames` later. A second whistle is a no-op.
    pub fn end_play(&mut self, reason: EndReason) -> Result<EndTransition> {
        let (spot, dead_ball_yard_line) = self.dead_ball(reason);
        let transition = self.lifecycle.end(reason, spot)?;
        if transition == EndTransition::AlreadyEnded {
            return Ok(transition);
        }

        let gained = dead_ball_yard_line - self.rules.possession.line_of_scrimmage;
        let yards = Yards::new(gained).unwrap_or_else(|_| Yards::zero());
        for actor in self.roster.iter_mut() {
            actor.intent = MovementIntent::stop();
        }

        let play_id = self.lifecycle.play_id();
        self.queue.schedule(DeferredAction::AdvanceDown { play_id, yards }, self.frame, self.config.play.settle_frames);
        self.events.push(SimEvent::PlayEnded { play_id, reason, dead_ball_yard_line, yards: yards.value() });
        Ok(transition)
    }

    /// Dead-ball spot and its yard line. Incompletions come back to the line
    /// of scrimmage; otherwise the ball, then the carrier, then the line.
    fn dead_ball(&self, reason: EndReason) -> (Vector3<f32>, f32) {
        let los = self.rules.possession.line_of_scrimmage;
        let previous = self.lifecycle.tackle_spot();
        let at_line = (Vector3::new(previous.x, dims::GROUND_Y, yard_line_to_z(los)), los);

        let incomplete = matches!(reason, EndReason::IncompletePass | EndReason::OutOfBounds)
            && self.ball.owner().is_none();
        if incomplete {
            return at_line;
        }

        let carrier = self.ball.owner().and_then(|id| self.roster.get(id)).map(|a| a.position);
        [Some(self.ball.position), carrier]
            .into_iter()
            .flatten()
            .find(|p| p.y.is_finite() && is_within_field(p))
            .map(|p| (p, z_to_yard_line(p.z).round()))
            .unwrap_or(at_line)
    }

    /// Line everyone back up at the line of scrimmage. Not allowed mid-play.
    pub fn reset_play(&mut self) -> Result<()> {
        self.lifecycle.reset()?;
        self.reposition();
        let line_of_scrimmage = self.rules.possession.line_of_scrimmage;
        self.events.push(SimEvent::PlayReset { line_of_scrimmage });
        Ok(())
    }

    fn reposition(&mut self) {
        let ball_x = self.lifecycle.tackle_spot().x;
        let los_z = self.rules.possession.line_of_scrimmage_z();
        let play = &self.config.play;

        for actor in self.roster.iter_mut() {
            let target = match (actor.formation_offset, actor.side) {
                (Some(offset), _) => placement_position(ball_x, los_z, offset),
                (None, TeamSide::Offense) => Vector3::new(ball_x, dims::GROUND_Y, los_z + play.line_offset),
                (None, TeamSide::Defense) => {
                    let jitter = if play.defense_jitter > 0.0 {
                        self.rng.gen_range(-play.defense_jitter..=play.defense_jitter)
                    } else {
                        0.0
                    };
                    Vector3::new(ball_x + jitter, dims::GROUND_Y, los_z - play.line_offset)
                }
            };
            let target = clamp_to_safe(target);

            actor.position = target;
            actor.last_safe_position = target;
            actor.velocity = Vector3::zeros();
            actor.current_speed = 0.0;
            actor.target_speed = 0.0;
            actor.intent = MovementIntent::stop();
            actor.yaw = match actor.side {
                TeamSide::Offense => OFFENSE_FACING,
                TeamSide::Defense => DEFENSE_FACING,
            };
            self.physics.set_translation(actor.body, target);
            self.physics.set_linear_velocity(actor.body, Vector3::zeros());
        }

        self.ball.place_at(Vector3::new(ball_x, self.config.ball.rest_height, los_z));
        debug!(ball_x, los_z, "lined up at scrimmage");
    }

    // ========== Result application ==========

    /// Apply a yardage result directly. Rejected while a play is running.
    pub fn advance_down(&mut self, yards: f32) -> Result<DownOutcome> {
        let yards = Yards::new(yards)?;
        if self.lifecycle.is_active() {
            warn!("advance_down ignored while active");
            return Err(SimError::InvalidTransition { action: "advance_down", phase: PlayPhase::Active });
        }
        let play_id = self.lifecycle.play_id();
        Ok(self.apply_down(play_id, yards, None))
    }

    /// Deferred end of a play. The rules always take the measured yards; a
    /// called play only adds its grade, narrative and clock usage.
    fn finish_play(&mut self, play_id: u32, measured: Yards) {
        let result = self.play_call.take().map(|call| {
            let performance = performance_from_yards(call.offense, measured.value());
            resolve_play_outcome(call.offense, call.defense, performance, &mut self.rng)
                .with_measured_yards(measured.value().round() as i32)
        });
        self.apply_down(play_id, measured, result);
    }

    fn apply_down(&mut self, play_id: u32, yards: Yards, play_result: Option<PlayResult>) -> DownOutcome {
        let side = self.rules.possession.possession;
        let outcome = self.rules.advance_down(yards);
        let gained = yards.value();

        if side == TeamSide::Offense {
            if gained > 0.0 {
                self.special.add_points(gained * self.config.play.meter_points_per_yard);
            }
            if outcome.is_touchdown() {
                self.special.add_points(self.config.play.meter_touchdown_bonus);
            }
        }
        if let Some(event) = play_result.as_ref().and_then(|r| self.clock.tick(r.clock_seconds)) {
            self.events.push(SimEvent::Clock(event));
        }
        if outcome.recenters_ball() {
            self.lifecycle.recenter_tackle_spot();
        }

        let summary = describe_down(&outcome, gained);
        let narrative = match &play_result {
            Some(result) => format!("{} {summary}", result.narrative),
            None => summary,
        };
        self.events.push(SimEvent::DownResolved {
            play_id,
            yards: gained,
            outcome,
            possession: self.rules.possession.clone(),
            narrative,
            play_result,
        });

        // A reset that beat the result to the drain lined up on the old spot
        if self.lifecycle.phase() == PlayPhase::Idle {
            self.reposition();
        }
        outcome
    }

    pub fn activate_special_mode(&mut self) -> Result<()> {
        self.special.activate()?;
        self.events.push(SimEvent::SpecialMode { active: true });
        Ok(())
    }

    // ========== Ball commands ==========

    /// Launch the ball. Fails while it is already in the air.
    pub fn throw_ball(&mut self, direction: Vector3<f32>, force: f32, height: f32) -> Result<()> {
        if self.ball.is_thrown() {
            warn!("throw_ball ignored: ball in flight");
            return Err(SimError::BallUnavailable);
        }
        let force = if force.is_finite() { force.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height } else { 0.0 };
        self.ball.throw_ball(direction, force, height);
        Ok(())
    }

    pub fn attach_to_player(&mut self, id: ActorId) -> Result<()> {
        let actor = self.roster.get(id).ok_or(SimError::ActorNotFound(id))?;
        let (position, yaw) = (actor.position, actor.yaw);
        self.ball.attach_to_player(id);
        self.ball.follow_owner(position, yaw, &self.config.ball);
        Ok(())
    }

    // ========== Roster commands ==========

    pub fn add_actor(&mut self, mut spec: ActorSpec) -> Result<ActorId> {
        spec.position = clamp_to_safe(spec.position);
        let body = self.physics.create_body(spec.position);
        let id = self.roster.next_id();
        if let Err(err) = self.roster.insert(Actor::from_spec(id, spec, body)) {
            self.physics.remove_body(body);
            return Err(err);
        }
        debug!(actor = %id, "actor added");
        Ok(id)
    }

    /// Remove an actor. A ball it was carrying drops where it stood.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<()> {
        let actor = self.roster.remove(id)?;
        self.physics.remove_body(actor.body);
        if self.ball.owner() == Some(id) {
            let drop = Vector3::new(actor.position.x, self.config.ball.rest_height, actor.position.z);
            self.ball.place_at(drop);
        }
        debug!(actor = %id, "actor removed");
        Ok(())
    }

    pub fn set_human(&mut self, side: TeamSide, id: ActorId) -> Result<()> {
        self.roster.set_human(side, id)
    }

    pub fn set_controlled_side(&mut self, side: TeamSide) {
        self.controlled_side = side;
    }

    // ========== Play calling ==========

    /// Replace the roster with both formations at the current spot.
    /// Offensive routes come from the current play call.
    pub fn line_up(&mut self, offense: FormationId, defense: FormationId) -> Result<()> {
        if self.lifecycle.is_active() {
            warn!("line_up ignored while active");
            return Err(SimError::InvalidTransition { action: "line_up", phase: PlayPhase::Active });
        }
        if offense.side() != TeamSide::Offense || defense.side() != TeamSide::Defense {
            return Err(SimError::Config(format!("{offense:?} vs {defense:?} is not an offense/defense pairing")));
        }

        for actor in self.roster.clear() {
            self.physics.remove_body(actor.body);
        }
        let ball_x = self.lifecycle.tackle_spot().x;
        let los_z = self.rules.possession.line_of_scrimmage_z();
        let call = self.play_call;
        let offense_specs = spawn_specs(offense, ball_x, los_z, |slot| call.and_then(|c| c.offense.route_for(slot)));
        let defense_specs = spawn_specs(defense, ball_x, los_z, |_| None);
        for spec in offense_specs.into_iter().chain(defense_specs) {
            self.add_actor(spec)?;
        }

        self.ball.place_at(Vector3::new(ball_x, self.config.ball.rest_height, los_z));
        info!(?offense, ?defense, "formations lined up");
        Ok(())
    }

    /// Call the next play and line up for it. A side left as `None` is
    /// picked by the CPU from the current situation.
    pub fn call_play(&mut self, offense: Option<OffensivePlay>, defense: Option<DefensivePlay>) -> Result<PlayCall> {
        if self.lifecycle.is_active() {
            warn!("call_play ignored while active");
            return Err(SimError::InvalidTransition { action: "call_play", phase: PlayPhase::Active });
        }
        let situation = self.situation();
        let offense = offense.unwrap_or_else(|| select_offensive_play(&situation, &mut self.rng));
        let defense = defense.unwrap_or_else(|| select_defensive_play(&situation, &mut self.rng));
        let call = PlayCall { offense, defense };

        self.play_call = Some(call);
        self.line_up(offense.formation(), defense.formation())?;
        info!(offense = offense.name(), defense = defense.name(), "play called");
        Ok(call)
    }
}

fn describe_down(outcome: &DownOutcome, gained: f32) -> String {
    match *outcome {
        DownOutcome::Touchdown { scoring_side, points } => {
            format!("Touchdown! {points} points for the {}.", scoring_side.as_str())
        }
        DownOutcome::FirstDown { spot } => format!("First down at the {spot:.0}."),
        DownOutcome::Turnover { new_possession, spot } => {
            format!("Turnover on downs. {} takes over at the {spot:.0}.", new_possession.as_str())
        }
        DownOutcome::DownAdvance { down, to_go } => {
            let down = match down {
                1 => "1st",
                2 => "2nd",
                3 => "3rd",
                _ => "4th",
            };
            format!("{gained:+.0} yards. {down} and {to_go:.0}.")
        }
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actor::Control;
    use crate::engine::field::spot;
    use crate::engine::input::SpeedTier;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn session() -> GameSession {
        GameSession::new(SimConfig::deterministic()).unwrap()
    }

    fn idle() -> InputState {
        InputState::default()
    }

    fn down_results(events: &[SimEvent]) -> Vec<&SimEvent> {
        events.iter().filter(|e| matches!(e, SimEvent::DownResolved { .. })).collect()
    }

    fn step_until(s: &mut GameSession, frames: usize, done: impl Fn(&GameSession) -> bool) -> bool {
        for _ in 0..frames {
            s.step_frame(DT, &idle());
            if done(s) {
                return true;
            }
        }
        false
    }

    // ---------- Down scenarios through the session ----------

    #[test]
    fn test_first_down_scenario() {
        let mut s = session();
        assert_eq!(s.possession().position, 20.0);

        let outcome = s.advance_down(12.0).unwrap();
        assert_eq!(outcome, DownOutcome::FirstDown { spot: 32.0 });
        let p = s.possession();
        assert_eq!((p.position, p.down, p.to_go, p.first_down_line), (32.0, 1, 10.0, 42.0));
        assert_eq!(down_results(&s.drain_events()).len(), 1);
    }

    #[test]
    fn test_touchdown_scenario() {
        let mut s = session();
        s.rules.possession.position = 95.0;
        s.rules.possession.line_of_scrimmage = 95.0;
        s.rules.possession.first_down_line = 100.0;
        s.rules.possession.down = 2;

        let outcome = s.advance_down(6.0).unwrap();
        assert!(outcome.is_touchdown());
        assert_eq!(s.rules().scoreboard.points(TeamSide::Offense), 7);
        assert_eq!(*s.possession(), PossessionState::touchback(TeamSide::Offense));
        // 6 yards plus the touchdown bonus
        assert!((s.special().points - (12.0 + 25.0)).abs() < 0.001);
    }

    #[test]
    fn test_turnover_scenario() {
        let mut s = session();
        s.rules.possession.position = 40.0;
        s.rules.possession.line_of_scrimmage = 40.0;
        s.rules.possession.first_down_line = 48.0;
        s.rules.possession.down = 4;

        let outcome = s.advance_down(3.0).unwrap();
        assert!(matches!(outcome, DownOutcome::Turnover { .. }));
        assert_eq!(s.possession().position, 57.0);
        assert_eq!(s.possession().possession, TeamSide::Defense);
    }

    #[test]
    fn test_nan_yardage_rejected() {
        let mut s = session();
        assert!(matches!(s.advance_down(f32::NAN), Err(SimError::InvalidYardage(_))));
        assert_eq!(s.possession().down, 1);
        assert!(s.drain_events().is_empty());
    }

    // ---------- Lifecycle through the frame loop ----------

    fn carrier_and_linebacker(s: &mut GameSession, gap: f32) -> (ActorId, ActorId) {
        let start = spot(0.0, 20.0);
        let rb = s
            .add_actor(ActorSpec::new(TeamSide::Offense, Role::RunningBack, start).human())
            .unwrap();
        let lb = s
            .add_actor(ActorSpec::new(TeamSide::Defense, Role::Linebacker, start - Vector3::new(0.0, 0.0, gap)))
            .unwrap();
        (rb, lb)
    }

    #[test]
    fn test_tackle_ends_play_and_applies_result_next_frame() {
        let mut s = session();
        let (rb, lb) = carrier_and_linebacker(&mut s, 1.0);
        s.start_play().unwrap();
        assert_eq!(s.ball().owner(), Some(rb));

        assert!(step_until(&mut s, 120, |s| s.phase() == PlayPhase::Ended));
        assert_eq!(s.lifecycle().last_end(), Some(EndReason::Tackle));
        assert_eq!(s.rules().stats.defense.tackles, 1);
        let events = s.drain_events();
        assert!(events.contains(&SimEvent::Tackle { tackler: lb, carrier: rb }));
        // Result waits one frame
        assert!(down_results(&events).is_empty());

        s.step_frame(DT, &idle());
        let events = s.drain_events();
        assert_eq!(down_results(&events).len(), 1);
        assert_eq!(s.possession().down, 2);
    }

    #[test]
    fn test_defender_carrying_ball_is_never_tackled_by_itself() {
        let mut s = session();
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0)).human()).unwrap();
        let lb = s.add_actor(ActorSpec::new(TeamSide::Defense, Role::Linebacker, spot(0.0, 25.0))).unwrap();
        s.start_play().unwrap();
        s.attach_to_player(lb).unwrap();

        for _ in 0..60 {
            s.step_frame(DT, &idle());
        }
        let events = s.drain_events();
        assert!(!events.iter().any(|e| matches!(e, SimEvent::Tackle { .. })));
        assert!(s.lifecycle().is_active());
        assert_eq!(s.ball().owner(), Some(lb));
        // Runs the return toward the offense's own goal
        assert!(s.actor(lb).unwrap().position.z > yard_line_to_z(25.0));
    }

    #[test]
    fn test_defense_waits_for_reaction_delay() {
        let mut s = session();
        carrier_and_linebacker(&mut s, 1.0);
        s.start_play().unwrap();
        // 0.25 s is inside the 0.5 s reaction delay
        for _ in 0..15 {
            s.step_frame(DT, &idle());
        }
        assert!(s.lifecycle().is_active());
    }

    #[test]
    fn test_delay_of_game() {
        let mut s = session();
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0)).human()).unwrap();
        s.start_play().unwrap();
        s.tick_interval(41.0);
        assert_eq!(s.phase(), PlayPhase::Ended);
        assert_eq!(s.lifecycle().last_end(), Some(EndReason::DelayOfGame));
        // Game clock ran while the play was live
        assert!(s.clock().remaining < 900.0);
    }

    #[test]
    fn test_game_clock_stops_between_plays() {
        let mut s = session();
        s.tick_interval(30.0);
        assert_eq!(s.clock().remaining, 900.0);
    }

    #[test]
    fn test_end_play_twice_is_noop() {
        let mut s = session();
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0)).human()).unwrap();
        s.start_play().unwrap();
        assert_eq!(s.end_play(EndReason::Whistle).unwrap(), EndTransition::Ended);
        assert_eq!(s.end_play(EndReason::Whistle).unwrap(), EndTransition::AlreadyEnded);
        s.step_frame(DT, &idle());
        assert_eq!(down_results(&s.drain_events()).len(), 1);
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut s = session();
        assert!(matches!(s.end_play(EndReason::Whistle), Err(SimError::InvalidTransition { .. })));
        s.start_play().unwrap();
        assert!(matches!(s.start_play(), Err(SimError::InvalidTransition { .. })));
        assert!(matches!(s.reset_play(), Err(SimError::InvalidTransition { .. })));
        assert!(matches!(s.advance_down(5.0), Err(SimError::InvalidTransition { .. })));
        assert!(s.lifecycle().is_active());
        assert_eq!(s.lifecycle().play_id(), 1);
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut s = session();
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0)).human()).unwrap();
        s.start_play().unwrap();
        s.end_play(EndReason::Whistle).unwrap();
        s.reset_play().unwrap();
        s.start_play().unwrap();

        s.step_frame(DT, &idle());
        let events = s.drain_events();
        assert!(events.contains(&SimEvent::OutcomeSuperseded { play_id: 1 }));
        assert!(down_results(&events).is_empty());
        assert_eq!(s.possession().down, 1);
    }

    #[test]
    fn test_reset_lines_up_at_scrimmage() {
        let mut s = session();
        s.rules.possession.start_new_possession(TeamSide::Offense, 50.0);
        let qb = s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(20.0, 10.0)).human()).unwrap();
        let cb = s.add_actor(ActorSpec::new(TeamSide::Defense, Role::Cornerback, spot(-30.0, 80.0))).unwrap();
        s.reset_play().unwrap();

        let los_z = yard_line_to_z(50.0);
        let qb = s.actor(qb).unwrap();
        assert!((qb.position.z - (los_z + 3.0)).abs() < 0.001);
        assert_eq!(qb.position.x, 0.0);
        assert_eq!(qb.yaw, OFFENSE_FACING);
        let cb = s.actor(cb).unwrap();
        assert!((cb.position.z - (los_z - 3.0)).abs() < 0.001);
        assert_eq!(s.ball().mode(), BallMode::Resting);
        assert!((s.ball().position.z - los_z).abs() < 0.001);
    }

    #[test]
    fn test_incomplete_pass_returns_to_line() {
        let mut s = session();
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0)).human()).unwrap();
        s.start_play().unwrap();
        s.throw_ball(Vector3::new(0.0, 0.0, -1.0), 10.0, 3.0).unwrap();
        assert_eq!(s.throw_ball(Vector3::new(1.0, 0.0, 0.0), 5.0, 1.0), Err(SimError::BallUnavailable));

        assert!(step_until(&mut s, 5000, |s| s.phase() == PlayPhase::Ended));
        assert_eq!(s.lifecycle().last_end(), Some(EndReason::IncompletePass));
        s.step_frame(DT, &idle());
        let events = s.drain_events();
        let resolved = down_results(&events);
        assert!(matches!(resolved[0], SimEvent::DownResolved { yards, .. } if *yards == 0.0));
    }

    #[test]
    fn test_receiver_catches_thrown_ball() {
        let mut s = session();
        let start = spot(0.0, 20.0);
        s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, start).human()).unwrap();
        let wr = s.add_actor(ActorSpec::new(TeamSide::Offense, Role::WideReceiver, start)).unwrap();
        s.start_play().unwrap();
        if let Control::Ai(brain) = &mut s.roster.get_mut(wr).unwrap().control {
            brain.mode = BehaviorMode::Receive;
        }
        // Ball starts in the quarterback's hands, right next to the receiver
        s.throw_ball(Vector3::new(0.0, 0.0, -1.0), 0.1, 0.0).unwrap();
        assert!(step_until(&mut s, 60, |s| s.ball().owner() == Some(wr)));
        assert!(s.drain_events().contains(&SimEvent::PassCaught { receiver: wr }));
        assert!(s.actor(wr).unwrap().is_human());
    }

    #[test]
    fn test_remove_carrier_drops_ball() {
        let mut s = session();
        let qb = s.add_actor(ActorSpec::new(TeamSide::Offense, Role::Quarterback, spot(0.0, 20.0))).unwrap();
        s.attach_to_player(qb).unwrap();
        s.remove_actor(qb).unwrap();
        assert_eq!(s.ball().mode(), BallMode::Resting);
        assert_eq!(s.physics().body_count(), 0);
        assert_eq!(s.remove_actor(qb), Err(SimError::ActorNotFound(qb)));
        assert_eq!(s.attach_to_player(qb), Err(SimError::ActorNotFound(qb)));
    }

    #[test]
    fn test_game_over_blocks_snap() {
        let mut s = session();
        for _ in 0..4 {
            s.clock.advance_quarter();
        }
        assert_eq!(s.start_play(), Err(SimError::GameOver));
        assert_eq!(s.phase(), PlayPhase::Idle);
    }

    #[test]
    fn test_special_mode_cycle() {
        let mut s = session();
        assert!(matches!(s.activate_special_mode(), Err(SimError::MeterNotReady { .. })));
        s.special.add_points(500.0);
        s.activate_special_mode().unwrap();
        s.tick_interval(15.0);
        let events = s.drain_events();
        assert!(events.contains(&SimEvent::SpecialMode { active: true }));
        assert!(events.contains(&SimEvent::SpecialMode { active: false }));
    }

    // ---------- Play calling ----------

    #[test]
    fn test_call_play_lines_up_both_formations() {
        let mut s = session();
        let call = s.call_play(Some(OffensivePlay::ShortPass), Some(DefensivePlay::ZoneCoverage)).unwrap();
        assert_eq!(call.offense, OffensivePlay::ShortPass);
        assert_eq!(s.actors().count(), 22);
        for side in [TeamSide::Offense, TeamSide::Defense] {
            assert_eq!(s.actors().filter(|a| a.side == side && a.is_human()).count(), 1);
        }
        let routed = s
            .actors()
            .filter(|a| a.control.brain().map_or(false, |b| b.route.is_some()))
            .count();
        assert_eq!(routed, 5);
    }

    #[test]
    fn test_called_play_resolves_with_narrative() {
        let mut s = session();
        s.call_play(Some(OffensivePlay::InsideRun), Some(DefensivePlay::Blitz)).unwrap();
        s.start_play().unwrap();
        // The runner takes the handoff and becomes the human
        let rb = s.ball().owner().unwrap();
        assert_eq!(s.actor(rb).unwrap().label, "RB");
        assert!(s.actor(rb).unwrap().is_human());

        s.end_play(EndReason::Whistle).unwrap();
        s.step_frame(DT, &idle());
        let events = s.drain_events();
        let Some(SimEvent::DownResolved { play_result: Some(result), narrative, .. }) =
            down_results(&events).first().copied()
        else {
            panic!("no resolved play");
        };
        assert_eq!(result.offense, OffensivePlay::InsideRun);
        assert!(narrative.starts_with(&result.narrative));
        assert!(s.play_call().is_none());
    }

    #[test]
    fn test_called_play_applies_measured_yards() {
        let mut s = session();
        s.call_play(Some(OffensivePlay::InsideRun), Some(DefensivePlay::Blitz)).unwrap();
        s.start_play().unwrap();
        let rb = s.ball().owner().unwrap();

        // Runner breaks free to the 45 before the whistle
        let downfield = spot(0.0, 45.0);
        let body = s.actor(rb).unwrap().body;
        s.physics.set_translation(body, downfield);
        s.step_frame(DT, &idle());
        s.end_play(EndReason::Whistle).unwrap();
        s.step_frame(DT, &idle());

        let events = s.drain_events();
        let ended = events.iter().find_map(|e| match e {
            SimEvent::PlayEnded { yards, .. } => Some(*yards),
            _ => None,
        });
        assert_eq!(ended, Some(25.0));
        let Some(SimEvent::DownResolved { yards, outcome, play_result: Some(result), .. }) =
            down_results(&events).first().copied()
        else {
            panic!("no resolved play");
        };
        assert_eq!(*yards, 25.0);
        assert_eq!(result.yards, 25);
        assert_eq!(*outcome, DownOutcome::FirstDown { spot: 45.0 });
        assert_eq!(s.possession().position, 45.0);
        assert_eq!(s.possession().first_down_line, 55.0);
    }

    #[test]
    fn test_cpu_calls_are_seeded() {
        let mut a = session();
        let mut b = session();
        for _ in 0..5 {
            assert_eq!(a.call_play(None, None).unwrap(), b.call_play(None, None).unwrap());
        }
    }

    #[test]
    fn test_line_up_rejects_swapped_sides() {
        let mut s = session();
        assert!(s.line_up(FormationId::Nickel, FormationId::IForm).is_err());
        assert_eq!(s.actors().count(), 0);
    }

    #[test]
    fn test_snapshot_reflects_store() {
        let mut s = session();
        s.call_play(Some(OffensivePlay::LongPass), Some(DefensivePlay::Prevent)).unwrap();
        s.step_frame(DT, &idle());
        let snap = s.snapshot();
        assert_eq!(snap.actors.len(), 22);
        assert_eq!(snap.phase, PlayPhase::Idle);
        assert_eq!(snap.clock.display, "15:00");
        assert!(snap.ball.is_some());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["ball"]["mode"], "resting");
    }

    // ---------- Boundary containment ----------

    fn input_strategy() -> impl Strategy<Value = InputState> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(forward, backward, left, right)| {
            InputState { forward, backward, left, right, tier: SpeedTier::Sprint }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_actors_stay_on_field(
            x in -44.0f32..44.0,
            yard in 5.0f32..95.0,
            inputs in prop::collection::vec(input_strategy(), 1..300),
            dt in 0.001f32..0.2,
        ) {
            let mut s = session();
            s.rules.possession.start_new_possession(TeamSide::Offense, yard);
            s.add_actor(ActorSpec::new(TeamSide::Offense, Role::RunningBack, spot(x, yard)).human()).unwrap();
            s.add_actor(ActorSpec::new(TeamSide::Defense, Role::Safety, spot(-x, yard))).unwrap();
            s.start_play().unwrap();

            for input in &inputs {
                s.step_frame(dt, input);
                for actor in s.actors() {
                    prop_assert!(is_within_field(&actor.position), "{:?}", actor.position);
                }
                for snap in &s.snapshot().actors {
                    prop_assert!(is_within_field(&snap.position));
                }
                prop_assert!(is_within_field(&s.ball().position));
            }
        }
    }
}
