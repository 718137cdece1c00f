//! Input Port and Sampling
//!
//! The simulation never polls devices. It reads an [`InputSource`] through
//! per-combatant [`InputBindings`] and reduces the result to an
//! [`InputSample`] once per fixed tick.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE, fixed_clamp};
use crate::core::vec2::FixedVec2;

// =============================================================================
// INPUT SOURCE PORT
// =============================================================================

/// Abstract input device.
///
/// Implementations must tolerate unknown or empty names by returning the
/// neutral value (0 / false).
pub trait InputSource {
    /// Axis value in [-1, 1] (fixed-point).
    fn axis(&self, name: &str) -> Fixed;

    /// Whether the button is currently held.
    fn button(&self, name: &str) -> bool;

    /// Whether the button went down this frame.
    fn button_down(&self, name: &str) -> bool;

    /// World-space aim point, if the device has one.
    fn pointer(&self) -> Option<FixedVec2> {
        None
    }
}

// =============================================================================
// BINDINGS
// =============================================================================

/// Named input bindings for one combatant.
///
/// An unset binding disables that control entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    /// Horizontal movement axis
    pub horizontal: Option<String>,
    /// Vertical movement axis (ignored in gravity mode)
    pub vertical: Option<String>,
    /// Jump button (held)
    pub jump: Option<String>,
    /// Shoot button (pressed)
    pub shoot: Option<String>,
    /// Aim at the input source's pointer
    pub aim_with_pointer: bool,
}

impl InputBindings {
    /// Bindings for a horizontal axis plus jump, the usual platformer layout.
    pub fn platformer(horizontal: &str, jump: &str) -> Self {
        Self {
            horizontal: Some(horizontal.to_string()),
            jump: Some(jump.to_string()),
            ..Self::default()
        }
    }

    /// Bindings for free 2D movement on two axes.
    pub fn free_move(horizontal: &str, vertical: &str) -> Self {
        Self {
            horizontal: Some(horizontal.to_string()),
            vertical: Some(vertical.to_string()),
            ..Self::default()
        }
    }

    /// Add a shoot button.
    pub fn with_shoot(mut self, shoot: &str) -> Self {
        self.shoot = Some(shoot.to_string());
        self
    }

    /// Treat empty names as unbound.
    pub fn normalized(self) -> Self {
        fn keep(name: Option<String>) -> Option<String> {
            name.filter(|n| !n.trim().is_empty())
        }

        Self {
            horizontal: keep(self.horizontal),
            vertical: keep(self.vertical),
            jump: keep(self.jump),
            shoot: keep(self.shoot),
            aim_with_pointer: self.aim_with_pointer,
        }
    }
}

// =============================================================================
// SAMPLE
// =============================================================================

/// Input reduced to what one combatant needs for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSample {
    /// Movement axes, each in [-1, 1]; not yet normalized
    pub axis: FixedVec2,
    /// Jump held
    pub jump: bool,
    /// Shoot pressed this frame
    pub shoot: bool,
    /// Aim point, if aiming with a pointer
    pub aim_target: Option<FixedVec2>,
}

impl InputSample {
    /// Neutral sample (no movement, no buttons).
    pub const IDLE: Self = Self {
        axis: FixedVec2::ZERO,
        jump: false,
        shoot: false,
        aim_target: None,
    };

    /// Read a sample through `bindings`.
    ///
    /// Unbound names are never queried. When `can_move` is false nothing
    /// is read and the idle sample is returned.
    pub fn capture(bindings: &InputBindings, source: &dyn InputSource, can_move: bool) -> Self {
        if !can_move {
            return Self::IDLE;
        }

        let read_axis = |name: &Option<String>| {
            name.as_deref()
                .map(|n| fixed_clamp(source.axis(n), -FIXED_ONE, FIXED_ONE))
                .unwrap_or(0)
        };

        Self {
            axis: FixedVec2::new(read_axis(&bindings.horizontal), read_axis(&bindings.vertical)),
            jump: bindings.jump.as_deref().is_some_and(|n| source.button(n)),
            shoot: bindings.shoot.as_deref().is_some_and(|n| source.button_down(n)),
            aim_target: if bindings.aim_with_pointer { source.pointer() } else { None },
        }
    }

    /// Movement axes with magnitude capped at 1.
    ///
    /// Keeps diagonal movement from being faster than straight movement.
    pub fn movement(&self) -> FixedVec2 {
        if self.axis.length_squared() > FIXED_ONE {
            self.axis.normalize()
        } else {
            self.axis
        }
    }
}

// =============================================================================
// SCRIPTED SOURCE
// =============================================================================

/// Deterministic in-memory input source.
///
/// Axes and held buttons persist until changed; pressed buttons last until
/// [`ScriptedInput::end_frame`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    axes: BTreeMap<String, Fixed>,
    held: BTreeSet<String>,
    pressed: BTreeSet<String>,
    pointer: Option<FixedVec2>,
}

impl ScriptedInput {
    /// Create an idle source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an axis value.
    pub fn set_axis(&mut self, name: &str, value: Fixed) {
        self.axes.insert(name.to_string(), value);
    }

    /// Start holding a button.
    pub fn hold(&mut self, name: &str) {
        self.held.insert(name.to_string());
    }

    /// Stop holding a button.
    pub fn release(&mut self, name: &str) {
        self.held.remove(name);
    }

    /// Press a button for the current frame (also holds it for that frame).
    pub fn press(&mut self, name: &str) {
        self.pressed.insert(name.to_string());
    }

    /// Move the pointer.
    pub fn set_pointer(&mut self, target: Option<FixedVec2>) {
        self.pointer = target;
    }

    /// Clear per-frame presses.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Reset everything to idle.
    pub fn clear(&mut self) {
        self.axes.clear();
        self.held.clear();
        self.pressed.clear();
        self.pointer = None;
    }
}

impl InputSource for ScriptedInput {
    fn axis(&self, name: &str) -> Fixed {
        self.axes.get(name).copied().unwrap_or(0)
    }

    fn button(&self, name: &str) -> bool {
        self.held.contains(name) || self.pressed.contains(name)
    }

    fn button_down(&self, name: &str) -> bool {
        self.pressed.contains(name)
    }

    fn pointer(&self) -> Option<FixedVec2> {
        self.pointer
    }
}

// =============================================================================
// TESTS
// =============================================================================
