//! Presentation Port
//!
//! The simulation pushes menus, labels, timer text and tints through this
//! trait and never reads presentation state back.

use tracing::info;

use crate::core::color::Rgb;
use crate::game::combatant::CombatantId;

/// Outbound presentation calls.
pub trait PresentationPort {
    /// Show the named menu.
    fn show_menu(&mut self, name: &str);

    /// Show the round result label.
    fn set_winner_text(&mut self, label: &str);

    /// Show the remaining whole seconds.
    fn set_timer_text(&mut self, seconds_remaining: u32);

    /// Recolor a combatant.
    fn set_combatant_tint(&mut self, id: CombatantId, color: Rgb);
}

/// Discards every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresentation;

impl PresentationPort for NullPresentation {
    fn show_menu(&mut self, _name: &str) {}
    fn set_winner_text(&mut self, _label: &str) {}
    fn set_timer_text(&mut self, _seconds_remaining: u32) {}
    fn set_combatant_tint(&mut self, _id: CombatantId, _color: Rgb) {}
}

/// Timer text as shown to players.
pub fn timer_text(seconds_remaining: u32) -> String {
    if seconds_remaining == 1 {
        "1 second remaining".to_string()
    } else {
        format!("{} seconds remaining", seconds_remaining)
    }
}

/// Renders presentation calls as log lines.
///
/// Timer text is only logged when the displayed value changes.
#[derive(Clone, Debug, Default)]
pub struct TracingPresentation {
    last_timer: Option<u32>,
}

impl TracingPresentation {
    /// Create a logging presentation.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationPort for TracingPresentation {
    fn show_menu(&mut self, name: &str) {
        info!("[ui] menu: {}", name);
    }

    fn set_winner_text(&mut self, label: &str) {
        info!("[ui] winner: {}", label);
    }

    fn set_timer_text(&mut self, seconds_remaining: u32) {
        if self.last_timer != Some(seconds_remaining) {
            self.last_timer = Some(seconds_remaining);
            info!("[ui] {}", timer_text(seconds_remaining));
        }
    }

    fn set_combatant_tint(&mut self, id: CombatantId, color: Rgb) {
        info!(
            "[ui] combatant {} tint ({:.2}, {:.2}, {:.2})",
            id.0, color.r, color.g, color.b
        );
    }
}

/// A recorded presentation call.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationCall {
    /// `show_menu`
    Menu(String),
    /// `set_winner_text`
    Winner(String),
    /// `set_timer_text`
    Timer(u32),
    /// `set_combatant_tint`
    Tint(CombatantId, Rgb),
}

/// Records calls into a shared log, for tests and headless replays.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresentation {
    calls: std::rc::Rc<std::cell::RefCell<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.borrow().clone()
    }

    /// Labels passed to `set_winner_text`, in order.
    pub fn winners(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Winner(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names passed to `show_menu`, in order.
    pub fn menus(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Menu(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last timer value shown.
    pub fn last_timer(&self) -> Option<u32> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PresentationCall::Timer(seconds) => Some(*seconds),
            _ => None,
        })
    }

    /// Last tint pushed for `id`.
    pub fn last_tint(&self, id: CombatantId) -> Option<Rgb> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PresentationCall::Tint(who, color) if *who == id => Some(*color),
            _ => None,
        })
    }
}

impl PresentationPort for RecordingPresentation {
    fn show_menu(&mut self, name: &str) {
        self.calls.borrow_mut().push(PresentationCall::Menu(name.to_string()));
    }

    fn set_winner_text(&mut self, label: &str) {
        self.calls.borrow_mut().push(PresentationCall::Winner(label.to_string()));
    }

    fn set_timer_text(&mut self, seconds_remaining: u32) {
        self.calls.borrow_mut().push(PresentationCall::Timer(seconds_remaining));
    }

    fn set_combatant_tint(&mut self, id: CombatantId, color: Rgb) {
        self.calls.borrow_mut().push(PresentationCall::Tint(id, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_text() {
        assert_eq!(timer_text(1), "1 second remaining");
        assert_eq!(timer_text(0), "0 seconds remaining");
        assert_eq!(timer_text(42), "42 seconds remaining");
    }

    #[test]
    fn test_recording_shares_log_between_clones() {
        let recorder = RecordingPresentation::new();
        let mut port: Box<dyn PresentationPort> = Box::new(recorder.clone());

        port.show_menu("Start");
        port.set_winner_text("Blue");
        port.set_timer_text(3);
        port.set_combatant_tint(CombatantId(1), Rgb::WHITE);

        assert_eq!(recorder.menus(), vec!["Start"]);
        assert_eq!(recorder.winners(), vec!["Blue"]);
        assert_eq!(recorder.last_timer(), Some(3));
        assert_eq!(recorder.last_tint(CombatantId(1)), Some(Rgb::WHITE));
        assert_eq!(recorder.last_tint(CombatantId(0)), None);
    }
}
