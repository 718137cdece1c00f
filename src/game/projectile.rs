//! Projectiles
//!
//! Live projectiles are owned by the [`ProjectileRegistry`] and addressed by
//! monotonically increasing [`ProjectileId`]s, so a stale id can never alias
//! a newer projectile. Each projectile counts its own time-to-live down in
//! the fixed update and is removed exactly once: on expiry (TTL spent or
//! out of the world), on its first valid collision, or when the registry
//! is cleared.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::{Fixed, DEFAULT_PROJECTILE_RADIUS, WORLD_BOUND, to_float};
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::collision::{Body, DamageSink};
use crate::game::combatant::CombatantId;

/// Unique projectile identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// A live projectile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Identifier
    pub id: ProjectileId,
    /// Combatant that fired it (never damaged by it)
    pub owner: CombatantId,
    /// Center position
    pub position: FixedVec2,
    /// Velocity (units/s)
    pub velocity: FixedVec2,
    /// Damage dealt on hit
    pub damage: Fixed,
    /// Remaining time-to-live (seconds)
    pub ttl: Fixed,
    /// Collision radius
    pub radius: Fixed,
}

/// What a collision callback did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// The projectile touched its owner; nothing happened.
    IgnoredOwner,
    /// The projectile was removed.
    Consumed {
        /// Damage carried by the projectile
        damage: Fixed,
        /// Whether the target had a damage capability
        delivered: bool,
    },
    /// The id is not live (already removed or never existed).
    Stale,
}

/// Registry of live projectiles.
#[derive(Clone, Debug)]
pub struct ProjectileRegistry {
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_id: u32,
    radius: Fixed,
}

impl Default for ProjectileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectileRegistry {
    /// Create an empty registry with the default projectile radius.
    pub fn new() -> Self {
        Self::with_radius(DEFAULT_PROJECTILE_RADIUS)
    }

    /// Create an empty registry whose projectiles use `radius`.
    pub fn with_radius(radius: Fixed) -> Self {
        Self {
            projectiles: BTreeMap::new(),
            next_id: 0,
            radius,
        }
    }

    /// Spawn a projectile travelling at `direction * speed`.
    pub fn spawn(
        &mut self,
        origin: FixedVec2,
        direction: FixedVec2,
        owner: CombatantId,
        speed: Fixed,
        damage: Fixed,
        ttl: Fixed,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.projectiles.insert(id, Projectile {
            id,
            owner,
            position: origin,
            velocity: direction.scale(speed),
            damage,
            ttl,
            radius: self.radius,
        });

        debug!("Projectile {} spawned by combatant {}", id.0, owner.0);
        id
    }

    /// Move every projectile and count down its TTL.
    ///
    /// Returns the ids removed because their TTL ran out or they left
    /// the world bounds.
    pub fn tick(&mut self, dt: Fixed) -> Vec<ProjectileId> {
        let dt = dt.max(0);

        for projectile in self.projectiles.values_mut() {
            projectile.position = projectile.position + projectile.velocity.scale(dt);
            projectile.ttl -= dt;
        }

        let expired: Vec<ProjectileId> = self
            .projectiles
            .values()
            .filter(|p| p.ttl <= 0 || p.position.clamp_components(WORLD_BOUND) != p.position)
            .map(|p| p.id)
            .collect();

        for id in &expired {
            self.projectiles.remove(id);
            debug!("Projectile {} expired", id.0);
        }

        expired
    }

    /// Resolve a contact between a projectile and another body.
    ///
    /// Contacts with the owner are ignored. Any other contact delivers the
    /// projectile's damage if `body` can take damage, then removes it.
    pub fn on_collision(
        &mut self,
        id: ProjectileId,
        body: Body,
        sink: &mut dyn DamageSink,
    ) -> CollisionOutcome {
        let Some(projectile) = self.projectiles.get(&id) else {
            return CollisionOutcome::Stale;
        };

        if body == Body::Combatant(projectile.owner) {
            return CollisionOutcome::IgnoredOwner;
        }

        let damage = projectile.damage;
        let delivered = match sink.damageable(body) {
            Some(target) => {
                target.receive_damage(damage);
                true
            }
            None => false,
        };

        self.projectiles.remove(&id);
        debug!(
            "Projectile {} hit {} ({:.3} damage, delivered: {})",
            id.0, body, to_float(damage), delivered
        );

        CollisionOutcome::Consumed { damage, delivered }
    }

    /// Remove every live projectile. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let count = self.projectiles.len();
        self.projectiles.clear();
        count
    }

    /// Get a live projectile.
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Whether `id` is still live.
    pub fn contains(&self, id: ProjectileId) -> bool {
        self.projectiles.contains_key(&id)
    }

    /// Live projectiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Number of live projectiles.
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// No live projectiles.
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Add every live projectile to a hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.projectiles.len() as u32);
        for projectile in self.projectiles.values() {
            hasher.update_u32(projectile.id.0);
            hasher.update_u16(projectile.owner.0);
            hasher.update_vec2(projectile.position);
            hasher.update_vec2(projectile.velocity);
            hasher.update_fixed(projectile.ttl);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
