//! Combatants
//!
//! Player-controlled bodies with health, movement and aim.
//!
//! Movement comes in two modes:
//! - Gravity mode (`gravity_scale > 0`): horizontal axis drives velocity,
//!   vertical input is ignored, and jumping requires a grounded test.
//! - Free mode (`gravity_scale == 0`): both axes drive velocity directly.
//!
//! The [`Roster`] owns every combatant, keyed by [`CombatantId`] in a
//! BTreeMap so iteration order is deterministic.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::color::{Rgb, TintRange};
use crate::core::fixed::{
    Fixed, FIXED_ONE, fixed_div, fixed_mul, to_float,
    DEFAULT_JUMP_VELOCITY, DEFAULT_MOVE_SPEED,
    GROUND_NORMAL_THRESHOLD, MAX_COMBATANT_SPEED, GROUND_RAY_MULTIPLIER, WORLD_BOUND,
};
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::collision::{Body, ColliderKind, Damageable, DamageSink};
use crate::game::input::{InputBindings, InputSample};
use crate::game::presentation::PresentationPort;
use crate::game::terrain::{Aabb, Terrain};

/// Stable combatant identifier (assigned in roster insertion order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u16);

/// Per-combatant movement tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementTuning {
    /// Movement speed (units/s)
    pub speed: Fixed,
    /// Vertical velocity set by a jump (units/s)
    pub jump_velocity: Fixed,
    /// Multiplier on arena gravity; zero selects free movement
    pub gravity_scale: Fixed,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MOVE_SPEED,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            gravity_scale: FIXED_ONE,
        }
    }
}

impl MovementTuning {
    /// Whether gravity (and therefore jumping) applies.
    #[inline]
    pub fn gravity_enabled(&self) -> bool {
        self.gravity_scale > 0
    }
}

/// Everything needed to place a combatant in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantSetup {
    /// Display name (also the goal winner label)
    pub name: String,
    /// Spawn position (box center)
    pub spawn_position: FixedVec2,
    /// Unit aim direction at spawn
    pub spawn_facing: FixedVec2,
    /// Collision box half extents
    pub half_extents: FixedVec2,
    /// Maximum health
    pub max_health: Fixed,
    /// Movement tuning
    pub tuning: MovementTuning,
    /// Input bindings
    pub bindings: InputBindings,
    /// Solid or sensor body
    pub collider: ColliderKind,
    /// Health tint colors
    pub tint: TintRange,
}

impl CombatantSetup {
    /// A default 1x1 solid combatant at `position`.
    pub fn at(name: &str, position: FixedVec2) -> Self {
        Self {
            name: name.to_string(),
            spawn_position: position,
            spawn_facing: FixedVec2::RIGHT,
            half_extents: FixedVec2::new(FIXED_ONE / 2, FIXED_ONE / 2),
            max_health: FIXED_ONE,
            tuning: MovementTuning::default(),
            bindings: InputBindings::default(),
            collider: ColliderKind::Solid,
            tint: TintRange::default(),
        }
    }
}

// =============================================================================
// COMBATANT
// =============================================================================

/// A player-controlled body.
#[derive(Clone, Debug)]
pub struct Combatant {
    /// Identifier
    pub id: CombatantId,
    /// Display name
    pub name: String,
    /// Box center
    pub position: FixedVec2,
    /// Velocity (units/s)
    pub velocity: FixedVec2,
    /// Unit aim direction used for shooting
    pub aim: FixedVec2,
    /// Collision box half extents
    pub half_extents: FixedVec2,
    /// Movement tuning
    pub tuning: MovementTuning,
    /// Input bindings
    pub bindings: InputBindings,
    /// Solid or sensor body
    pub collider: ColliderKind,

    health: Fixed,
    max_health: Fixed,
    spawn_position: FixedVec2,
    spawn_facing: FixedVec2,
    tint: TintRange,
    jumped: bool,
}

impl Combatant {
    /// Create a combatant at its spawn point with full health.
    pub fn new(id: CombatantId, setup: CombatantSetup) -> Self {
        Self {
            id,
            name: setup.name,
            position: setup.spawn_position,
            velocity: FixedVec2::ZERO,
            aim: setup.spawn_facing,
            half_extents: setup.half_extents,
            tuning: setup.tuning,
            bindings: setup.bindings,
            collider: setup.collider,
            health: setup.max_health,
            max_health: setup.max_health,
            spawn_position: setup.spawn_position,
            spawn_facing: setup.spawn_facing,
            tint: setup.tint,
            jumped: false,
        }
    }

    /// Current health.
    #[inline]
    pub fn health(&self) -> Fixed {
        self.health
    }

    /// Maximum health.
    #[inline]
    pub fn max_health(&self) -> Fixed {
        self.max_health
    }

    /// Health as a fraction of maximum.
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        to_float(self.health) / to_float(self.max_health)
    }

    /// Still has health left.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Spawn position.
    pub fn spawn_position(&self) -> FixedVec2 {
        self.spawn_position
    }

    /// Collision box.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.half_extents)
    }

    /// Color for the current health.
    pub fn tint(&self) -> Rgb {
        self.tint.at(self.health_fraction())
    }

    /// Check for upward-facing ground under either bottom corner.
    pub fn is_grounded(&self, terrain: &Terrain) -> bool {
        let inset = fixed_div(self.half_extents.x, GROUND_RAY_MULTIPLIER);
        let length = fixed_mul(self.half_extents.y, GROUND_RAY_MULTIPLIER);

        [self.position.x - inset, self.position.x + inset]
            .into_iter()
            .any(|x| {
                terrain
                    .raycast_down(FixedVec2::new(x, self.position.y), length)
                    .is_some_and(|hit| hit.normal.y > GROUND_NORMAL_THRESHOLD)
            })
    }

    /// Point the aim at `target`. A target on top of the combatant keeps the old aim.
    pub fn aim_at(&mut self, target: FixedVec2) {
        let direction = (target - self.position).normalize();
        if direction != FixedVec2::ZERO {
            self.aim = direction;
        }
    }

    /// Turn an input sample into velocity. Returns true if a jump fired.
    pub fn apply_input(&mut self, sample: &InputSample, terrain: &Terrain) -> bool {
        let movement = sample.movement();
        self.jumped = false;

        if self.tuning.gravity_enabled() {
            self.velocity.x = fixed_mul(movement.x, self.tuning.speed);

            if sample.jump && self.is_grounded(terrain) {
                self.velocity.y = self.tuning.jump_velocity;
                self.jumped = true;
            }
        } else {
            self.velocity = movement.scale(self.tuning.speed);
        }

        if let Some(target) = sample.aim_target {
            self.aim_at(target);
        }

        self.jumped
    }

    /// Apply gravity, move, and land on upward-facing ground.
    ///
    /// Velocity is capped at [`MAX_COMBATANT_SPEED`] per axis and position
    /// stays inside [`WORLD_BOUND`]; a combatant that falls off the terrain
    /// comes to rest on the bottom of the world.
    pub fn integrate(&mut self, dt: Fixed, gravity: Fixed, terrain: &Terrain) {
        let gravity_mode = self.tuning.gravity_enabled();

        // A jump overrides gravity for the tick it fires
        if gravity_mode && !self.jumped {
            let pull = fixed_mul(gravity, self.tuning.gravity_scale);
            self.velocity.y = self.velocity.y.saturating_sub(fixed_mul(pull, dt));
        }
        self.jumped = false;
        self.velocity = self.velocity.clamp_components(MAX_COMBATANT_SPEED);

        let previous_y = self.position.y;
        self.position = (self.position + self.velocity.scale(dt)).clamp_components(WORLD_BOUND);

        if self.position.y == -WORLD_BOUND && self.velocity.y < 0 {
            self.velocity.y = 0;
        }

        if gravity_mode && self.velocity.y <= 0 {
            self.land(previous_y, terrain);
        }
    }

    fn land(&mut self, previous_y: Fixed, terrain: &Terrain) {
        let half_height = self.half_extents.y;
        let origin = FixedVec2::new(self.position.x, previous_y);
        let reach = half_height.saturating_add(previous_y.saturating_sub(self.position.y));

        if let Some(hit) = terrain.raycast_down(origin, reach) {
            if hit.normal.y > GROUND_NORMAL_THRESHOLD {
                self.position.y = hit.point.y + half_height;
                self.velocity.y = 0;
            }
        }
    }

    /// One movement step. With `can_move` false the sample is ignored.
    ///
    /// Returns true if a jump fired.
    pub fn tick(
        &mut self,
        dt: Fixed,
        sample: &InputSample,
        can_move: bool,
        gravity: Fixed,
        terrain: &Terrain,
    ) -> bool {
        let sample = if can_move { *sample } else { InputSample::IDLE };
        let jumped = self.apply_input(&sample, terrain);
        self.integrate(dt, gravity, terrain);
        jumped
    }

    /// Take damage, clamping health to [0, max]. Returns the new tint.
    pub fn apply_damage(&mut self, amount: Fixed) -> Rgb {
        self.health = self.health.saturating_sub(amount).clamp(0, self.max_health);
        debug!(
            "{} took {:.3} damage, health {:.3}",
            self.name,
            to_float(amount),
            to_float(self.health)
        );
        self.tint()
    }

    /// Back to spawn with full health. Returns the full-health tint.
    pub fn reset_to_spawn(&mut self) -> Rgb {
        self.position = self.spawn_position;
        self.velocity = FixedVec2::ZERO;
        self.aim = self.spawn_facing;
        self.health = self.max_health;
        self.jumped = false;
        self.tint()
    }

    /// Add this combatant's simulation state to a hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u16(self.id.0);
        hasher.update_str(&self.name);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_vec2(self.aim);
        hasher.update_fixed(self.health);
    }
}

impl Damageable for Combatant {
    fn receive_damage(&mut self, amount: Fixed) {
        self.apply_damage(amount);
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// Registry of every combatant in the session.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    combatants: BTreeMap<CombatantId, Combatant>,
    next_id: u16,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a combatant and return its id.
    pub fn add(&mut self, setup: CombatantSetup) -> CombatantId {
        let id = CombatantId(self.next_id);
        self.next_id += 1;
        self.combatants.insert(id, Combatant::new(id, setup));
        id
    }

    /// Remove a combatant (session teardown).
    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    /// Get a combatant by id.
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Get a mutable combatant by id.
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Look up a combatant by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Combatant> {
        self.combatants.values().find(|c| c.name == name)
    }

    /// Combatants in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    /// Mutable combatants in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<CombatantId> {
        self.combatants.keys().copied().collect()
    }

    /// Number of combatants.
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// No combatants registered.
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Combatants with health left.
    pub fn survivors(&self) -> Vec<&Combatant> {
        self.combatants.values().filter(|c| c.is_alive()).collect()
    }

    /// Reset every combatant to spawn and push full-health tints.
    pub fn reset_all(&mut self, presentation: &mut dyn PresentationPort) {
        for combatant in self.combatants.values_mut() {
            let tint = combatant.reset_to_spawn();
            presentation.set_combatant_tint(combatant.id, tint);
        }
    }
}

impl DamageSink for Roster {
    fn damageable(&mut self, body: Body) -> Option<&mut dyn Damageable> {
        match body {
            Body::Combatant(id) => self
                .combatants
                .get_mut(&id)
                .map(|c| c as &mut dyn Damageable),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
