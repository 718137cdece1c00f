//! Collision Detection
//!
//! Body identities, the damage capability, and per-tick contact detection
//! between projectiles and everything they can touch.
//! Iteration is always in ascending id order so contacts are reported
//! deterministically.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::game::combatant::{CombatantId, Roster};
use crate::game::projectile::{ProjectileId, ProjectileRegistry};
use crate::game::terrain::Terrain;

/// Anything a projectile or goal can come into contact with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Body {
    /// A combatant
    Combatant(CombatantId),
    /// A projectile
    Projectile(ProjectileId),
    /// A static terrain surface (index into the terrain list)
    Terrain(usize),
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Combatant(id) => write!(f, "combatant #{}", id.0),
            Body::Projectile(id) => write!(f, "projectile #{}", id.0),
            Body::Terrain(index) => write!(f, "surface #{}", index),
        }
    }
}

/// Whether a collider is solid or a pass-through sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderKind {
    /// Physical body
    #[default]
    Solid,
    /// Trigger/sensor collider
    Sensor,
}

/// Something that can take damage.
pub trait Damageable {
    /// Receive `amount` damage.
    fn receive_damage(&mut self, amount: Fixed);
}

/// Resolves a body to its damage capability, if it has one.
pub trait DamageSink {
    /// The damageable behind `body`, or `None` when the body cannot take damage.
    fn damageable(&mut self, body: Body) -> Option<&mut dyn Damageable>;
}

/// A projectile touching a body this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileContact {
    /// The projectile
    pub projectile: ProjectileId,
    /// What it touched
    pub body: Body,
}

/// Find every projectile contact for this tick.
///
/// For each projectile (ascending id) every overlapping combatant is
/// reported (ascending id, owner included), followed by the first
/// terrain surface it touches, if any.
pub fn check_projectile_contacts(
    projectiles: &ProjectileRegistry,
    roster: &Roster,
    terrain: &Terrain,
) -> Vec<ProjectileContact> {
    let mut contacts = Vec::new();

    for projectile in projectiles.iter() {
        for combatant in roster.iter() {
            if combatant.bounds().overlaps_circle(projectile.position, projectile.radius) {
                contacts.push(ProjectileContact {
                    projectile: projectile.id,
                    body: Body::Combatant(combatant.id),
                });
            }
        }

        if let Some(surface) = terrain.circle_contact(projectile.position, projectile.radius) {
            contacts.push(ProjectileContact {
                projectile: projectile.id,
                body: Body::Terrain(surface),
            });
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::core::vec2::FixedVec2;
    use crate::game::combatant::CombatantSetup;
    use crate::game::terrain::Surface;

    #[test]
    fn test_contacts_include_owner_then_terrain() {
        let mut roster = Roster::new();
        let a = roster.add(CombatantSetup::at("A", FixedVec2::ZERO));
        let b = roster.add(CombatantSetup::at("B", FixedVec2::from_ints(5, 0)));

        let terrain = Terrain::new(vec![Surface::new(
            FixedVec2::new(to_fixed(-10.0), to_fixed(-0.5)),
            FixedVec2::new(to_fixed(10.0), to_fixed(-0.5)),
        )]);

        let mut projectiles = ProjectileRegistry::new();
        let shot = projectiles.spawn(
            FixedVec2::new(0, to_fixed(-0.45)),
            FixedVec2::RIGHT,
            a,
            to_fixed(20.0),
            to_fixed(0.1),
            to_fixed(5.0),
        );

        let contacts = check_projectile_contacts(&projectiles, &roster, &terrain);

        assert_eq!(
            contacts,
            vec![
                ProjectileContact { projectile: shot, body: Body::Combatant(a) },
                ProjectileContact { projectile: shot, body: Body::Terrain(0) },
            ]
        );
        assert!(!contacts.iter().any(|c| c.body == Body::Combatant(b)));
    }

    #[test]
    fn test_body_ordering_and_display() {
        let a = Body::Combatant(CombatantId(2));
        let b = Body::Projectile(ProjectileId(0));
        assert!(a < b);
        assert_eq!(a.to_string(), "combatant #2");
        assert_eq!(Body::Terrain(3).to_string(), "surface #3");
    }
}
