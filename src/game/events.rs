//! Arena Events
//!
//! Events generated during simulation for logging, replay and verification.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::collision::Body;
use crate::game::combatant::CombatantId;
use crate::game::controller::RoundOutcome;
use crate::game::projectile::ProjectileId;

/// Order of events within a tick.
///
/// Follows the tick pipeline, so a cause always sorts before its effect:
/// a hit before the damage it deals, damage before the elimination, and
/// the round ending last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// A round started
    RoundStart = 0,
    /// Jumps
    Movement = 1,
    /// Projectile spawn, expiry and hits
    Projectile = 2,
    /// Health lost
    Damage = 3,
    /// Health reached zero
    Elimination = 4,
    /// Goal entries
    Goal = 5,
    /// Clock ran out
    Timer = 6,
    /// A round ended
    RoundEnd = 7,
}

/// Arena event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaEventData {
    /// A round started
    RoundStarted {
        round: u32,
    },

    /// A round ended
    RoundEnded {
        outcome: RoundOutcome,
    },

    /// The round clock ran out
    TimerExpired,

    /// A combatant fired
    ProjectileSpawned {
        projectile_id: ProjectileId,
        owner: CombatantId,
        position: FixedVec2,
    },

    /// A projectile's time-to-live ran out
    ProjectileExpired {
        projectile_id: ProjectileId,
    },

    /// A projectile hit something and was removed
    ProjectileHit {
        projectile_id: ProjectileId,
        body: Body,
        delivered: bool,
    },

    /// A combatant lost health
    DamageTaken {
        combatant: CombatantId,
        amount: Fixed,
        health: Fixed,
    },

    /// A combatant's health reached zero
    CombatantEliminated {
        combatant: CombatantId,
    },

    /// A combatant jumped
    Jumped {
        combatant: CombatantId,
    },

    /// A body entered a goal
    GoalEntered {
        goal: String,
        body: Body,
        counted: bool,
    },
}

/// An arena event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Combatant involved, if any
    pub combatant: Option<CombatantId>,

    /// Event data
    pub data: ArenaEventData,
}

impl ArenaEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: ArenaEventData) -> Self {
        let combatant = match &data {
            ArenaEventData::ProjectileSpawned { owner, .. } => Some(*owner),
            ArenaEventData::DamageTaken { combatant, .. } => Some(*combatant),
            ArenaEventData::CombatantEliminated { combatant } => Some(*combatant),
            ArenaEventData::Jumped { combatant } => Some(*combatant),
            ArenaEventData::ProjectileHit { body: Body::Combatant(id), .. } => Some(*id),
            ArenaEventData::GoalEntered { body: Body::Combatant(id), .. } => Some(*id),
            _ => None,
        };

        Self {
            tick,
            priority,
            combatant,
            data,
        }
    }

    /// Create round started event.
    pub fn round_started(tick: u32, round: u32) -> Self {
        Self::new(tick, EventPriority::RoundStart, ArenaEventData::RoundStarted { round })
    }

    /// Create round ended event.
    pub fn round_ended(tick: u32, outcome: RoundOutcome) -> Self {
        Self::new(tick, EventPriority::RoundEnd, ArenaEventData::RoundEnded { outcome })
    }

    /// Create timer expired event.
    pub fn timer_expired(tick: u32) -> Self {
        Self::new(tick, EventPriority::Timer, ArenaEventData::TimerExpired)
    }

    /// Create projectile spawned event.
    pub fn projectile_spawned(
        tick: u32,
        projectile_id: ProjectileId,
        owner: CombatantId,
        position: FixedVec2,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            ArenaEventData::ProjectileSpawned {
                projectile_id,
                owner,
                position,
            },
        )
    }

    /// Create projectile expired event.
    pub fn projectile_expired(tick: u32, projectile_id: ProjectileId) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            ArenaEventData::ProjectileExpired { projectile_id },
        )
    }

    /// Create projectile hit event.
    pub fn projectile_hit(tick: u32, projectile_id: ProjectileId, body: Body, delivered: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Projectile,
            ArenaEventData::ProjectileHit {
                projectile_id,
                body,
                delivered,
            },
        )
    }

    /// Create damage taken event.
    pub fn damage_taken(tick: u32, combatant: CombatantId, amount: Fixed, health: Fixed) -> Self {
        Self::new(
            tick,
            EventPriority::Damage,
            ArenaEventData::DamageTaken {
                combatant,
                amount,
                health,
            },
        )
    }

    /// Create combatant eliminated event.
    pub fn combatant_eliminated(tick: u32, combatant: CombatantId) -> Self {
        Self::new(
            tick,
            EventPriority::Elimination,
            ArenaEventData::CombatantEliminated { combatant },
        )
    }

    /// Create jumped event.
    pub fn jumped(tick: u32, combatant: CombatantId) -> Self {
        Self::new(tick, EventPriority::Movement, ArenaEventData::Jumped { combatant })
    }

    /// Create goal entered event.
    pub fn goal_entered(tick: u32, goal: &str, body: Body, counted: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Goal,
            ArenaEventData::GoalEntered {
                goal: goal.to_string(),
                body,
                counted,
            },
        )
    }
}

/// Sort events by tick, then priority.
///
/// The sort is stable: events sharing a tick and priority keep the order
/// they were pushed in, which is ascending id order within each phase.
pub fn sort_events(events: &mut [ArenaEvent]) {
    events.sort_by_key(|event| (event.tick, event.priority));
}
