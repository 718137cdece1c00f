//! Goal Regions
//!
//! Sensor boxes that end the round when entered. Entry is edge-triggered:
//! a body inside a goal does not trigger it again until it has left.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::game::collision::{Body, ColliderKind};
use crate::game::combatant::Roster;
use crate::game::controller::RoundOutcome;
use crate::game::projectile::ProjectileRegistry;
use crate::game::terrain::Aabb;

/// Which goal contacts count and what they report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Solid bodies only; the body's name wins.
    #[default]
    SolidNamed,
    /// Any body, sensors included; the body's name wins.
    AnyNamed,
    /// Solid bodies only; an anonymous victory.
    SolidAnonymous,
}

impl GoalPolicy {
    /// Outcome for a contact, or `None` if the contact does not count.
    pub fn resolve(&self, contact: &GoalContact) -> Option<RoundOutcome> {
        let solid = contact.collider == ColliderKind::Solid;
        match self {
            GoalPolicy::SolidNamed if solid => Some(RoundOutcome::Winner(contact.label.clone())),
            GoalPolicy::AnyNamed => Some(RoundOutcome::Winner(contact.label.clone())),
            GoalPolicy::SolidAnonymous if solid => Some(RoundOutcome::Victory),
            _ => None,
        }
    }
}

/// A body entering a goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalContact {
    /// Goal index
    pub goal: usize,
    /// Goal name
    pub goal_name: String,
    /// Entering body
    pub body: Body,
    /// Name of the entering body
    pub label: String,
    /// Collider kind of the entering body
    pub collider: ColliderKind,
}

/// A goal sensor region.
#[derive(Clone, Debug)]
pub struct GoalRegion {
    /// Name
    pub name: String,
    /// Region
    pub bounds: Aabb,
    occupants: BTreeSet<Body>,
}

impl GoalRegion {
    /// Create an empty goal.
    pub fn new(name: &str, bounds: Aabb) -> Self {
        Self {
            name: name.to_string(),
            bounds,
            occupants: BTreeSet::new(),
        }
    }

    /// Bodies currently inside.
    pub fn occupants(&self) -> &BTreeSet<Body> {
        &self.occupants
    }
}

/// Every goal in the arena.
#[derive(Clone, Debug, Default)]
pub struct Goals {
    regions: Vec<GoalRegion>,
}

impl Goals {
    /// Create from regions.
    pub fn new(regions: Vec<GoalRegion>) -> Self {
        Self { regions }
    }

    /// All regions.
    pub fn regions(&self) -> &[GoalRegion] {
        &self.regions
    }

    /// Forget who is inside (round restart).
    pub fn clear_occupancy(&mut self) {
        for region in &mut self.regions {
            region.occupants.clear();
        }
    }

    /// Update occupancy and return bodies that entered since the last call.
    ///
    /// Contacts are ordered by goal index, then body (combatants before
    /// projectiles, ascending id). Projectiles are reported as sensors.
    pub fn detect_entries(&mut self, roster: &Roster, projectiles: &ProjectileRegistry) -> Vec<GoalContact> {
        let mut entries = Vec::new();

        for (index, region) in self.regions.iter_mut().enumerate() {
            let mut inside: BTreeMap<Body, (String, ColliderKind)> = BTreeMap::new();

            for combatant in roster.iter() {
                if region.bounds.overlaps(&combatant.bounds()) {
                    inside.insert(
                        Body::Combatant(combatant.id),
                        (combatant.name.clone(), combatant.collider),
                    );
                }
            }

            for projectile in projectiles.iter() {
                if region.bounds.overlaps_circle(projectile.position, projectile.radius) {
                    let body = Body::Projectile(projectile.id);
                    inside.insert(body, (body.to_string(), ColliderKind::Sensor));
                }
            }

            for (body, (label, collider)) in &inside {
                if !region.occupants.contains(body) {
                    entries.push(GoalContact {
                        goal: index,
                        goal_name: region.name.clone(),
                        body: *body,
                        label: label.clone(),
                        collider: *collider,
                    });
                }
            }

            region.occupants = inside.into_keys().collect();
        }

        entries
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::core::vec2::FixedVec2;
    use crate::game::combatant::{CombatantId, CombatantSetup};

    fn goal_at(x: i32) -> Goals {
        Goals::new(vec![GoalRegion::new(
            "Flag",
            Aabb::new(FixedVec2::from_ints(x, 0), FixedVec2::from_ints(1, 1)),
        )])
    }

    fn contact(collider: ColliderKind) -> GoalContact {
        GoalContact {
            goal: 0,
            goal_name: "Flag".to_string(),
            body: Body::Combatant(CombatantId(0)),
            label: "Red".to_string(),
            collider,
        }
    }

    #[test]
    fn test_policy_resolution() {
        let solid = contact(ColliderKind::Solid);
        let sensor = contact(ColliderKind::Sensor);
        let red = Some(RoundOutcome::Winner("Red".to_string()));

        assert_eq!(GoalPolicy::SolidNamed.resolve(&solid), red);
        assert_eq!(GoalPolicy::SolidNamed.resolve(&sensor), None);
        assert_eq!(GoalPolicy::AnyNamed.resolve(&sensor), red);
        assert_eq!(GoalPolicy::SolidAnonymous.resolve(&solid), Some(RoundOutcome::Victory));
        assert_eq!(GoalPolicy::SolidAnonymous.resolve(&sensor), None);
    }

    #[test]
    fn test_entry_is_edge_triggered() {
        let mut goals = goal_at(0);
        let mut roster = Roster::new();
        let red = roster.add(CombatantSetup::at("Red", FixedVec2::from_ints(10, 0)));
        let projectiles = ProjectileRegistry::new();

        assert!(goals.detect_entries(&roster, &projectiles).is_empty());

        roster.get_mut(red).unwrap().position = FixedVec2::ZERO;
        let entries = goals.detect_entries(&roster, &projectiles);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Red");
        assert_eq!(entries[0].collider, ColliderKind::Solid);

        // Still inside: no new entry
        assert!(goals.detect_entries(&roster, &projectiles).is_empty());

        // Leave and come back
        roster.get_mut(red).unwrap().position = FixedVec2::from_ints(10, 0);
        assert!(goals.detect_entries(&roster, &projectiles).is_empty());
        roster.get_mut(red).unwrap().position = FixedVec2::ZERO;
        assert_eq!(goals.detect_entries(&roster, &projectiles).len(), 1);
    }

    #[test]
    fn test_clear_occupancy_retriggers() {
        let mut goals = goal_at(0);
        let mut roster = Roster::new();
        roster.add(CombatantSetup::at("Red", FixedVec2::ZERO));
        let projectiles = ProjectileRegistry::new();

        assert_eq!(goals.detect_entries(&roster, &projectiles).len(), 1);
        goals.clear_occupancy();
        assert_eq!(goals.detect_entries(&roster, &projectiles).len(), 1);
    }

    #[test]
    fn test_projectiles_enter_as_sensors() {
        let mut goals = goal_at(0);
        let roster = Roster::new();
        let mut projectiles = ProjectileRegistry::new();
        projectiles.spawn(
            FixedVec2::ZERO,
            FixedVec2::RIGHT,
            CombatantId(0),
            to_fixed(20.0),
            to_fixed(0.1),
            to_fixed(5.0),
        );

        let entries = goals.detect_entries(&roster, &projectiles);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].collider, ColliderKind::Sensor);
        assert_eq!(entries[0].label, "projectile #0");
        assert_eq!(GoalPolicy::SolidNamed.resolve(&entries[0]), None);
    }
}
