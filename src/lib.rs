//! # Arena Round
//!
//! Deterministic round/session core for a small 2D arena game: combatants
//! with health and platformer movement, projectiles, a round clock and a
//! round state machine. Rendering and input devices live behind ports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ARENA ROUND                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── color.rs    - HSV tint interpolation (presentation)     │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Arena logic (deterministic)               │
//! │  ├── input.rs    - Input port and sampling                   │
//! │  ├── terrain.rs  - Surfaces and ground rays                  │
//! │  ├── collision.rs- Bodies and projectile contacts            │
//! │  ├── combatant.rs- Combatants and roster                     │
//! │  ├── projectile.rs- Projectile registry                      │
//! │  ├── clock.rs    - Round clock                               │
//! │  ├── goal.rs     - Goal regions                              │
//! │  ├── controller.rs- Round state machine                      │
//! │  ├── presentation.rs- Outbound UI port                       │
//! │  ├── events.rs   - Event log records                         │
//! │  ├── config.rs   - Arena configuration                       │
//! │  ├── arena.rs    - Session                                   │
//! │  └── tick.rs     - Fixed/frame update pipeline               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The simulation is **100% deterministic**:
//! - No floating-point arithmetic in game logic (floats only at config
//!   load and in tint colors)
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//!
//! Given identical configuration and inputs, two runs end in
//! **identical state hashes**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, TICK_DURATION};
pub use core::vec2::FixedVec2;
pub use game::arena::Arena;
pub use game::config::{ArenaConfig, SetupError};
pub use game::controller::{RoundOutcome, RoundState};
pub use game::input::{InputSource, ScriptedInput};
pub use game::presentation::PresentationPort;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Default round length (seconds)
pub const DEFAULT_ROUND_SECONDS: u32 = 60;
