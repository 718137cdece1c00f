//! Arena Session
//!
//! One explicitly constructed session: terrain, goals, combatants,
//! projectiles and the round controller, plus the presentation port they
//! report to. Nothing here is global; the tick pipeline receives the arena
//! by reference.

use std::fmt;
use tracing::info;

use crate::core::fixed::Fixed;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::combatant::Roster;
use crate::game::config::{ArenaConfig, ProjectileTuning, SetupError};
use crate::game::controller::{RoundController, RoundOutcome, RoundState};
use crate::game::events::ArenaEvent;
use crate::game::goal::Goals;
use crate::game::presentation::PresentationPort;
use crate::game::projectile::ProjectileRegistry;
use crate::game::terrain::Terrain;

/// A running arena session.
pub struct Arena {
    /// Fixed ticks simulated so far
    pub tick: u32,
    /// Every combatant
    pub roster: Roster,
    /// Live projectiles
    pub projectiles: ProjectileRegistry,
    /// Static surfaces
    pub terrain: Terrain,
    /// Goal regions
    pub goals: Goals,
    /// Round state machine
    pub controller: RoundController,
    /// Gravity (units/s²)
    pub gravity: Fixed,
    /// Projectile tuning
    pub projectile_tuning: ProjectileTuning,
    /// End the round when one or no combatant is left standing
    pub end_on_elimination: bool,

    pub(crate) presentation: Box<dyn PresentationPort>,
    pending_events: Vec<ArenaEvent>,
}

impl Arena {
    /// Build a session from configuration.
    ///
    /// Shows the start menu and full-health tints; the round stays `Ended`
    /// until [`Arena::start_round`].
    pub fn bootstrap(
        config: &ArenaConfig,
        mut presentation: Box<dyn PresentationPort>,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let projectile_tuning = config.projectile_tuning();
        let mut roster = Roster::new();
        for setup in config.combatant_setups()? {
            roster.add(setup);
        }

        presentation.show_menu(&config.start_menu);
        for combatant in roster.iter() {
            presentation.set_combatant_tint(combatant.id, combatant.tint());
        }

        info!(
            "Arena ready: {} combatants, {} surfaces, {} goals, {:.0}s rounds",
            roster.len(),
            config.surfaces.len(),
            config.goals.len(),
            config.round_seconds
        );

        Ok(Self {
            tick: 0,
            roster,
            projectiles: ProjectileRegistry::with_radius(projectile_tuning.radius),
            terrain: config.terrain(),
            goals: config.goal_regions(),
            controller: RoundController::new(config.round_duration(), config.goal_policy, &config.win_menu),
            gravity: config.gravity_fixed(),
            projectile_tuning,
            end_on_elimination: config.end_on_elimination,
            presentation,
            pending_events: Vec::new(),
        })
    }

    /// Start (or restart) a round.
    ///
    /// Clears projectiles and goal occupancy, then resets the clock and
    /// every combatant and enables movement.
    pub fn start_round(&mut self) {
        self.projectiles.clear_all();
        self.goals.clear_occupancy();
        self.controller.start_round(&mut self.roster, self.presentation.as_mut());

        let round = self.controller.rounds_started();
        self.push_event(ArenaEvent::round_started(self.tick, round));
    }

    /// End the round. Returns false if it had already ended.
    pub fn end_round(&mut self, outcome: RoundOutcome) -> bool {
        if !self.controller.end_round(outcome.clone(), self.presentation.as_mut()) {
            return false;
        }
        self.push_event(ArenaEvent::round_ended(self.tick, outcome));
        true
    }

    /// Tear the session down: clear projectiles and detach the timer hook.
    pub fn shutdown(&mut self) {
        let cleared = self.projectiles.clear_all();
        self.controller.shutdown();
        info!("Arena shut down after {} ticks ({} projectiles cleared)", self.tick, cleared);
    }

    /// Current round state.
    pub fn state(&self) -> RoundState {
        self.controller.state()
    }

    /// Whether combatants may act.
    pub fn can_move(&self) -> bool {
        self.controller.can_move()
    }

    /// Outcome of the last finished round.
    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.controller.outcome()
    }

    /// Compute the state hash for determinism checks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            self.controller.hash_into(hasher);

            // BTreeMap order
            for combatant in self.roster.iter() {
                combatant.hash_into(hasher);
            }

            self.projectiles.hash_into(hasher);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Add an event.
    pub fn push_event(&mut self, event: ArenaEvent) {
        self.pending_events.push(event);
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("tick", &self.tick)
            .field("controller", &self.controller)
            .field("combatants", &self.roster.len())
            .field("projectiles", &self.projectiles.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FIXED_ONE};
    use crate::core::vec2::FixedVec2;
    use crate::game::combatant::CombatantId;
    use crate::game::events::ArenaEventData;
    use crate::game::presentation::{NullPresentation, RecordingPresentation};

    #[test]
    fn test_bootstrap_shows_start_menu_and_tints() {
        let ui = RecordingPresentation::new();
        let arena = Arena::bootstrap(&ArenaConfig::default(), Box::new(ui.clone())).unwrap();

        assert_eq!(arena.state(), RoundState::Ended);
        assert!(!arena.can_move());
        assert_eq!(ui.menus(), vec!["StartMenu"]);
        assert!(ui.last_tint(CombatantId(0)).is_some());
        assert!(ui.last_tint(CombatantId(1)).is_some());
    }

    #[test]
    fn test_bootstrap_rejects_bad_config() {
        let mut config = ArenaConfig::default();
        config.combatants[0].spawn = None;

        let result = Arena::bootstrap(&config, Box::new(NullPresentation));
        assert!(matches!(result, Err(SetupError::MissingSpawn(_))));
    }

    #[test]
    fn test_start_round_resets_everything() {
        let mut arena = Arena::bootstrap(&ArenaConfig::default(), Box::new(NullPresentation)).unwrap();
        arena.start_round();

        let red = CombatantId(0);
        {
            let c = arena.roster.get_mut(red).unwrap();
            c.apply_damage(to_fixed(0.4));
            c.position = FixedVec2::from_ints(9, 9);
        }
        arena.projectiles.spawn(
            FixedVec2::ZERO,
            FixedVec2::RIGHT,
            red,
            FIXED_ONE,
            FIXED_ONE,
            FIXED_ONE,
        );
        arena.controller.clock_mut().tick(to_fixed(20.0));
        arena.end_round(RoundOutcome::Draw);

        arena.start_round();

        let c = arena.roster.get(red).unwrap();
        assert_eq!(c.health(), c.max_health());
        assert_eq!(c.position, c.spawn_position());
        assert!(arena.projectiles.is_empty());
        assert_eq!(arena.controller.clock().remaining(), to_fixed(60.0));
        assert!(arena.controller.clock().is_running());
        assert_eq!(arena.state(), RoundState::Playing);
    }

    #[test]
    fn test_end_round_records_one_event() {
        let mut arena = Arena::bootstrap(&ArenaConfig::default(), Box::new(NullPresentation)).unwrap();
        arena.start_round();

        assert!(arena.end_round(RoundOutcome::Victory));
        assert!(!arena.end_round(RoundOutcome::Timeout));

        let ended: Vec<_> = arena
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.data, ArenaEventData::RoundEnded { .. }))
            .collect();
        assert_eq!(ended.len(), 1);
        assert_eq!(arena.outcome(), Some(&RoundOutcome::Victory));
    }

    #[test]
    fn test_hash_tracks_state() {
        let make = || {
            let mut arena = Arena::bootstrap(&ArenaConfig::default(), Box::new(NullPresentation)).unwrap();
            arena.start_round();
            arena
        };

        let a = make();
        let mut b = make();
        assert_eq!(a.compute_hash(), b.compute_hash());

        b.roster.get_mut(CombatantId(1)).unwrap().apply_damage(to_fixed(0.1));
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_shutdown() {
        let mut arena = Arena::bootstrap(&ArenaConfig::default(), Box::new(NullPresentation)).unwrap();
        arena.start_round();
        arena.projectiles.spawn(FixedVec2::ZERO, FixedVec2::RIGHT, CombatantId(0), FIXED_ONE, FIXED_ONE, FIXED_ONE);

        arena.shutdown();

        assert!(arena.projectiles.is_empty());
        assert!(arena.controller.clock().subscribers().is_empty());
        assert_eq!(arena.state(), RoundState::Ended);
    }
}
