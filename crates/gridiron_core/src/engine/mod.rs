pub mod actor;
pub mod ball;
pub mod behaviors; // AI decision engine: route, block, receive, pursue
pub mod body_orientation;
pub mod events; // Deferred actions + outgoing SimEvent payloads
pub mod field;
pub mod input;
pub mod movement; // Actor controller
pub mod physics;
pub mod play_lifecycle;
pub mod session;
pub mod special_mode;
pub mod steering;
pub mod store; // Published snapshot

pub use actor::{Actor, ActorId, ActorRoster, ActorSpec, Control, Role, TeamSide};
pub use ball::{Ball, BallEvent, BallMode};
pub use behaviors::{AiBrain, AiSignal, BehaviorMode};
pub use events::{DeferredAction, EventQueue, SimEvent};
pub use input::{InputState, SpeedTier};
pub use movement::MovementIntent;
pub use physics::{BodyHandle, KinematicBackend, PhysicsBackend};
pub use play_lifecycle::{EndReason, EndTransition, PlayLifecycle, PlayPhase};
pub use session::GameSession;
pub use special_mode::SpecialMeter;
pub use store::{ActorSnapshot, BallSnapshot, ClockSnapshot, GameSnapshot};
