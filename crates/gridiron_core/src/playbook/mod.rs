//! Static playbook data: formations, routes and play calls, plus outcome
//! resolution for called plays.

pub mod formations;
pub mod outcome;
pub mod plays;
pub mod routes;

pub use formations::{spawn_specs, FormationId, Placement};
pub use outcome::{performance_from_yards, resolve_play_outcome, PerformanceTier, PlayResult};
pub use plays::{select_defensive_play, select_offensive_play, DefensivePlay, OffensivePlay, PlayCall, Situation};
pub use routes::{RouteAssignment, RouteOptions, RoutePath, RoutePattern};
