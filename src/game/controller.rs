//! Round Controller
//!
//! The `Playing` / `Ended` state machine. The controller owns the round
//! state, the round clock and the movement switch every combatant consults.
//!
//! ```text
//!            start_round()
//!   Ended ───────────────────▶ Playing
//!     ▲                           │
//!     │  end_round(outcome)       │  timer expiry / goal / elimination
//!     └───────────────────────────┘
//! ```
//!
//! `end_round` is idempotent: only the first resolution of a round counts.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use serde::{Serialize, Deserialize};
use tracing::{info, debug};

use crate::core::fixed::Fixed;
use crate::core::hash::StateHasher;
use crate::game::clock::{ExpiryCallback, RoundClock};
use crate::game::combatant::Roster;
use crate::game::goal::{GoalContact, GoalPolicy};
use crate::game::presentation::PresentationPort;

/// Whether a round is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundState {
    /// Round in progress
    Playing,
    /// No round in progress (initial state)
    #[default]
    Ended,
}

impl RoundState {
    fn as_u8(self) -> u8 {
        match self {
            RoundState::Playing => 0,
            RoundState::Ended => 1,
        }
    }
}

/// How a round was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// A named body won (goal reached or last one standing)
    Winner(String),
    /// An anonymous win
    Victory,
    /// The clock ran out
    Timeout,
    /// Nobody is left standing
    Draw,
}

impl RoundOutcome {
    /// Text shown by the presentation layer.
    pub fn label(&self) -> &str {
        match self {
            RoundOutcome::Winner(name) => name,
            RoundOutcome::Victory => "You Win!",
            RoundOutcome::Timeout => "You Lose!",
            RoundOutcome::Draw => "Draw",
        }
    }

    /// The winner's name, if there is one.
    pub fn winner(&self) -> Option<&str> {
        match self {
            RoundOutcome::Winner(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundOutcome::Winner(name) => write!(f, "winner {}", name),
            RoundOutcome::Victory => write!(f, "victory"),
            RoundOutcome::Timeout => write!(f, "timeout"),
            RoundOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// Owns round state, the round clock and the movement switch.
pub struct RoundController {
    state: RoundState,
    outcome: Option<RoundOutcome>,
    clock: RoundClock,
    can_move: bool,
    goal_policy: GoalPolicy,
    win_menu: String,
    rounds_started: u32,
    expired: Rc<Cell<bool>>,
    expiry_hook: ExpiryCallback,
}

impl RoundController {
    /// Create a controller in the `Ended` state, subscribed to its clock.
    pub fn new(round_duration: Fixed, goal_policy: GoalPolicy, win_menu: &str) -> Self {
        let expired = Rc::new(Cell::new(false));
        let latch = Rc::clone(&expired);
        let expiry_hook: ExpiryCallback = Rc::new(move || latch.set(true));

        let clock = RoundClock::new(round_duration);
        clock.subscribe(&expiry_hook);

        Self {
            state: RoundState::Ended,
            outcome: None,
            clock,
            can_move: false,
            goal_policy,
            win_menu: win_menu.to_string(),
            rounds_started: 0,
            expired,
            expiry_hook,
        }
    }

    /// Current state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Whether a round is in progress.
    pub fn is_playing(&self) -> bool {
        self.state == RoundState::Playing
    }

    /// Outcome of the last finished round (cleared on start).
    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    /// Whether combatants may act.
    pub fn can_move(&self) -> bool {
        self.can_move
    }

    /// Override the movement switch.
    pub fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
    }

    /// The round clock.
    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    /// Mutable access to the round clock.
    pub fn clock_mut(&mut self) -> &mut RoundClock {
        &mut self.clock
    }

    /// Goal resolution policy.
    pub fn goal_policy(&self) -> GoalPolicy {
        self.goal_policy
    }

    /// Number of rounds started.
    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    /// Start a round from any state.
    ///
    /// Restarts the clock, resets every combatant to spawn and enables movement.
    pub fn start_round(&mut self, roster: &mut Roster, presentation: &mut dyn PresentationPort) {
        self.expired.set(false);
        self.clock.reset();
        roster.reset_all(presentation);
        self.outcome = None;
        self.can_move = true;
        self.state = RoundState::Playing;
        self.rounds_started += 1;

        presentation.set_timer_text(self.clock.seconds_remaining());
        info!("Round {} started ({} combatants)", self.rounds_started, roster.len());
    }

    /// End the round. Returns false if it had already ended.
    pub fn end_round(&mut self, outcome: RoundOutcome, presentation: &mut dyn PresentationPort) -> bool {
        if self.state == RoundState::Ended {
            debug!("Ignoring {}: round already ended", outcome);
            return false;
        }

        self.state = RoundState::Ended;
        self.can_move = false;
        self.clock.pause();

        presentation.set_winner_text(outcome.label());
        presentation.show_menu(&self.win_menu);

        info!("Round {} ended: {}", self.rounds_started, outcome);
        self.outcome = Some(outcome);
        true
    }

    /// Advance the clock by one frame and push the timer text.
    ///
    /// Returns the outcome if the clock ran out and ended the round.
    pub fn advance_clock(&mut self, dt: Fixed, presentation: &mut dyn PresentationPort) -> Option<RoundOutcome> {
        self.clock.tick(dt);
        presentation.set_timer_text(self.clock.seconds_remaining());

        if !self.expired.replace(false) {
            return None;
        }

        self.end_round(RoundOutcome::Timeout, presentation)
            .then_some(RoundOutcome::Timeout)
    }

    /// Resolve a body entering a goal.
    ///
    /// Returns the outcome if the contact counted and ended the round.
    pub fn on_goal_contact(
        &mut self,
        contact: &GoalContact,
        presentation: &mut dyn PresentationPort,
    ) -> Option<RoundOutcome> {
        if !self.is_playing() {
            return None;
        }

        let Some(outcome) = self.goal_policy.resolve(contact) else {
            debug!("Goal {} ignored {} ({:?})", contact.goal_name, contact.label, contact.collider);
            return None;
        };

        self.end_round(outcome.clone(), presentation).then_some(outcome)
    }

    /// Detach from the clock and stop everything (session teardown).
    pub fn shutdown(&mut self) {
        self.clock.unsubscribe(&self.expiry_hook);
        self.clock.pause();
        self.can_move = false;
        self.state = RoundState::Ended;
    }

    /// Add controller state to a hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.state.as_u8());
        hasher.update_bool(self.can_move);
        hasher.update_fixed(self.clock.remaining());
        hasher.update_bool(self.clock.is_running());
        hasher.update_u32(self.rounds_started);
    }
}

impl fmt::Debug for RoundController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundController")
            .field("state", &self.state)
            .field("outcome", &self.outcome)
            .field("clock", &self.clock)
            .field("can_move", &self.can_move)
            .field("goal_policy", &self.goal_policy)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
