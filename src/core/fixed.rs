//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic scalar math for the arena simulation.
//! Positions, velocities, health, damage, lifetimes and clock time all use
//! this representation; floats only appear at configuration load and in
//! presentation output.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// ARENA CONSTANTS
// =============================================================================

/// Fixed tick duration: 1/60 second = round(65536/60) = 1092
pub const TICK_DURATION: Fixed = 1092;

/// Default horizontal/vertical movement speed: 5.0 units/sec
pub const DEFAULT_MOVE_SPEED: Fixed = 327680;

/// Default jump velocity: 12.0 = 12 * 65536 = 786432
pub const DEFAULT_JUMP_VELOCITY: Fixed = 786432;

/// Default gravity acceleration: 30.0 = 30 * 65536 = 1966080
pub const DEFAULT_GRAVITY: Fixed = 1966080;

/// Minimum upward component of a surface normal that counts as ground: 0.7
pub const GROUND_NORMAL_THRESHOLD: Fixed = 45875;

/// Leeway applied to the ground rays: 1.05
pub const GROUND_RAY_MULTIPLIER: Fixed = 68812;

/// Half-size of the playable world: 4096 units.
/// Combatants are clamped inside it and projectiles leaving it expire.
pub const WORLD_BOUND: Fixed = 4096 << FIXED_SCALE;

/// Fastest a combatant may move along either axis: 256 units/sec
pub const MAX_COMBATANT_SPEED: Fixed = 256 << FIXED_SCALE;

/// Default projectile collision radius: 0.1
pub const DEFAULT_PROJECTILE_RADIUS: Fixed = 6553;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a float to fixed-point.
///
/// # Warning
/// Only use at compile-time or while loading configuration. NEVER in the tick loop.
///
/// # Example
/// ```
/// use arena_round::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers (i64 intermediate, truncating).
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers. Dividing by zero returns 0.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Integer square root (floor) of a 64-bit value.
///
/// The root of a Q32.32 product is a Q16.16 value, which is how vector
/// lengths are taken without narrowing the square to 32 bits first.
pub fn isqrt_u64(value: u64) -> u64 {
    let mut value = value;
    let mut result: u64 = 0;
    let mut bit: u64 = 1 << 62;

    while bit > value {
        bit >>= 2;
    }

    while bit != 0 {
        if value >= result + bit {
            value -= result + bit;
            result = (result >> 1) + bit;
        } else {
            result >>= 1;
        }
        bit >>= 2;
    }

    result
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.min(max).max(min)
}

/// Round a non-negative fixed-point value up to the next whole number.
#[inline]
pub fn fixed_ceil_to_u32(x: Fixed) -> u32 {
    if x <= 0 {
        return 0;
    }
    ((x as u32) + (FIXED_ONE as u32 - 1)) >> FIXED_SCALE
}

// =============================================================================
// TESTS
// =============================================================================
