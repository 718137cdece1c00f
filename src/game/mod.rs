//! Game Logic Module
//!
//! All arena simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Input port, bindings and per-tick samples
//! - `terrain`: Static surfaces and downward ray queries
//! - `collision`: Body identities, damage capability, projectile contacts
//! - `combatant`: Combatants and the roster
//! - `projectile`: Projectile registry
//! - `clock`: Round clock and expiry subscribers
//! - `goal`: Goal regions and goal policy
//! - `controller`: Round state machine
//! - `presentation`: Outbound presentation port
//! - `config`: Arena configuration and setup errors
//! - `events`: Arena events for logging/replay
//! - `arena`: The session that owns all of the above
//! - `tick`: Fixed update, frame update, replay

pub mod input;
pub mod terrain;
pub mod collision;
pub mod combatant;
pub mod projectile;
pub mod clock;
pub mod goal;
pub mod controller;
pub mod presentation;
pub mod config;
pub mod events;
pub mod arena;
pub mod tick;

// Re-export key types
pub use arena::Arena;
pub use combatant::{Combatant, CombatantId, Roster};
pub use config::{ArenaConfig, SetupError};
pub use controller::{RoundController, RoundOutcome, RoundState};
pub use events::{ArenaEvent, ArenaEventData};
pub use input::{InputSource, ScriptedInput};
pub use presentation::PresentationPort;
pub use projectile::{ProjectileId, ProjectileRegistry};
pub use tick::TickResult;
