//! Round Clock
//!
//! Countdown timer for a round. When it runs out it stops and notifies
//! every expiry subscriber once, in subscription order.
//!
//! Subscribers are identified by `Rc` pointer identity: subscribing the
//! same callback twice keeps a single entry, and unsubscribing something
//! that is not subscribed does nothing. Notification iterates a snapshot,
//! so callbacks may subscribe or unsubscribe during the pass without
//! affecting it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::info;

use crate::core::fixed::{Fixed, fixed_ceil_to_u32, to_float};

/// Callback run when the clock reaches zero.
pub type ExpiryCallback = Rc<dyn Fn()>;

/// Shared list of expiry callbacks.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct ExpirySubscribers {
    callbacks: Rc<RefCell<Vec<ExpiryCallback>>>,
}

impl ExpirySubscribers {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback. Returns false if it was already subscribed.
    pub fn subscribe(&self, callback: &ExpiryCallback) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        if callbacks.iter().any(|c| same_callback(c, callback)) {
            return false;
        }
        callbacks.push(Rc::clone(callback));
        true
    }

    /// Remove a callback. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, callback: &ExpiryCallback) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|c| !same_callback(c, callback));
        callbacks.len() != before
    }

    /// Whether `callback` is subscribed.
    pub fn contains(&self, callback: &ExpiryCallback) -> bool {
        self.callbacks.borrow().iter().any(|c| same_callback(c, callback))
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// No subscribers.
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Invoke every subscriber present when the pass starts.
    pub fn notify(&self) {
        let snapshot: Vec<ExpiryCallback> = self.callbacks.borrow().clone();
        for callback in snapshot {
            callback();
        }
    }
}

impl fmt::Debug for ExpirySubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpirySubscribers")
            .field("len", &self.len())
            .finish()
    }
}

fn same_callback(a: &ExpiryCallback, b: &ExpiryCallback) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// =============================================================================
// CLOCK
// =============================================================================

/// Countdown timer for one round.
#[derive(Debug)]
pub struct RoundClock {
    remaining: Fixed,
    default_duration: Fixed,
    running: bool,
    subscribers: ExpirySubscribers,
}

impl RoundClock {
    /// Create a stopped clock holding the full duration.
    pub fn new(default_duration: Fixed) -> Self {
        let default_duration = default_duration.max(0);
        Self {
            remaining: default_duration,
            default_duration,
            running: false,
            subscribers: ExpirySubscribers::new(),
        }
    }

    /// Advance by `dt`. Returns true if the clock expired on this call.
    pub fn tick(&mut self, dt: Fixed) -> bool {
        if !self.running {
            return false;
        }

        self.remaining = (self.remaining - dt.max(0)).clamp(0, self.default_duration);
        if self.remaining > 0 {
            return false;
        }

        self.running = false;
        info!("Round clock expired");
        self.subscribers.notify();
        true
    }

    /// Stop counting.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue counting. Has no effect once the clock has expired.
    pub fn resume(&mut self) -> bool {
        if self.remaining > 0 {
            self.running = true;
        }
        self.running
    }

    /// Restart from the full duration.
    pub fn reset(&mut self) {
        self.remaining = self.default_duration;
        self.running = true;
    }

    /// Remaining time (seconds, fixed-point).
    pub fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// Full duration.
    pub fn default_duration(&self) -> Fixed {
        self.default_duration
    }

    /// Whether the clock is counting.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remaining whole seconds, rounded up (timer display value).
    pub fn seconds_remaining(&self) -> u32 {
        fixed_ceil_to_u32(self.remaining)
    }

    /// Subscribe to expiry. Returns false if already subscribed.
    pub fn subscribe(&self, callback: &ExpiryCallback) -> bool {
        self.subscribers.subscribe(callback)
    }

    /// Unsubscribe from expiry. Returns false if not subscribed.
    pub fn unsubscribe(&self, callback: &ExpiryCallback) -> bool {
        self.subscribers.unsubscribe(callback)
    }

    /// Handle to the subscriber list (usable from inside callbacks).
    pub fn subscribers(&self) -> ExpirySubscribers {
        self.subscribers.clone()
    }
}

impl fmt::Display for RoundClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}s / {:.2}s ({})",
            to_float(self.remaining),
            to_float(self.default_duration),
            if self.running { "running" } else { "stopped" }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
