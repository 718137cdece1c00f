//! Core deterministic primitives.
//!
//! Fixed-point scalars and vectors used by every simulation step, the
//! state hasher used for replay checks, and the presentation-only color
//! helpers.

pub mod fixed;
pub mod vec2;
pub mod hash;
pub mod color;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use hash::{StateHash, compute_state_hash};
pub use color::{Rgb, TintRange};
