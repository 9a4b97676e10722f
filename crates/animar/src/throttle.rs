//! Action throttling: a re-entrancy lock plus a minimum-interval window.
//!
//! The guard separates two independent suppression windows. A hard
//! in-progress lock, released after a short cooldown, absorbs duplicate
//! near-simultaneous triggers (a double-tap). A softer minimum interval
//! between accepted actions limits the rate even when every action
//! completes instantly.
//!
//! The cooldown release is an explicit scheduled action in a
//! [`DelayScheduler`], so tests advance time deterministically instead of
//! sleeping. The release is scheduled on every exit path of the invocation,
//! including unwinding, so a panicking action never leaves the lock stuck.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::timer::DelayScheduler;

/// Default minimum time between accepted actions.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 150;

/// Default time the in-progress lock stays set after an accept.
pub const DEFAULT_COOLDOWN_MS: u64 = 50;

/// Configuration for an action guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum time between accepted actions
    pub min_interval_ms: u64,
    /// How long the in-progress lock stays set after an accept
    pub cooldown_ms: u64,
}

impl ThrottleConfig {
    /// Create the default configuration (150ms interval, 50ms cooldown).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }

    /// Set the minimum interval between accepted actions.
    #[must_use]
    pub const fn with_min_interval_ms(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    /// Set the cooldown holding the in-progress lock.
    #[must_use]
    pub const fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ThrottleState {
    /// Wall-clock time of the last accepted action; `None` means never ran.
    last_action_ms: Option<u64>,
    in_progress: bool,
}

/// Guard deciding whether a requested action may run now.
///
/// One guard instance owns its state exclusively; the single-threaded model
/// serializes all access.
#[derive(Debug)]
pub struct ActionGuard<C: Clock, D: DelayScheduler> {
    config: ThrottleConfig,
    clock: C,
    timers: D,
    state: Rc<RefCell<ThrottleState>>,
}

/// Schedules the cooldown release when dropped, on any exit path.
struct ReleaseOnDrop<'a, D: DelayScheduler> {
    timers: &'a D,
    state: Rc<RefCell<ThrottleState>>,
    cooldown_ms: u64,
}

impl<D: DelayScheduler> Drop for ReleaseOnDrop<'_, D> {
    fn drop(&mut self) {
        let state = Rc::clone(&self.state);
        self.timers.schedule_after(
            self.cooldown_ms,
            Box::new(move || {
                state.borrow_mut().in_progress = false;
                tracing::trace!("in-progress lock released");
            }),
        );
    }
}

impl<C: Clock, D: DelayScheduler> ActionGuard<C, D> {
    /// Create a guard with explicit configuration.
    #[must_use]
    pub fn new(config: ThrottleConfig, clock: C, timers: D) -> Self {
        Self {
            config,
            clock,
            timers,
            state: Rc::new(RefCell::new(ThrottleState::default())),
        }
    }

    /// Create a guard with the default interval and cooldown.
    #[must_use]
    pub fn with_defaults(clock: C, timers: D) -> Self {
        Self::new(ThrottleConfig::new(), clock, timers)
    }

    /// The guard's configuration.
    #[must_use]
    pub const fn config(&self) -> ThrottleConfig {
        self.config
    }

    /// Run `action` now if the guard allows it.
    ///
    /// Returns `true` when the guard accepted and invoked the action — the
    /// action's own outcome does not change the return value. Returns
    /// `false` without invoking when a previous action is still in progress
    /// or the minimum interval has not elapsed.
    ///
    /// The in-progress lock is released `cooldown_ms` after the accept by a
    /// deferred callback, scheduled whether the action returns or panics; a
    /// panic propagates to the caller with the guard's state consistent.
    pub fn try_run<F: FnOnce()>(&self, action: F) -> bool {
        let now = self.clock.now_ms();
        {
            let mut state = self.state.borrow_mut();
            if state.in_progress {
                tracing::trace!(now_ms = now, "action rejected: still in progress");
                return false;
            }
            if let Some(last) = state.last_action_ms {
                let since = now.saturating_sub(last);
                if since < self.config.min_interval_ms {
                    tracing::trace!(
                        now_ms = now,
                        since_ms = since,
                        "action rejected: minimum interval not elapsed"
                    );
                    return false;
                }
            }
            state.in_progress = true;
            state.last_action_ms = Some(now);
        }
        tracing::debug!(now_ms = now, "action accepted");

        let _release = ReleaseOnDrop {
            timers: &self.timers,
            state: Rc::clone(&self.state),
            cooldown_ms: self.config.cooldown_ms,
        };
        action();
        true
    }

    /// Clear the guard as if no action had ever run.
    ///
    /// A release already scheduled keeps its slot in the timer facility and
    /// will clear the lock again later; both writes converge on `false`.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.in_progress = false;
        state.last_action_ms = None;
        tracing::debug!("guard reset");
    }

    /// Whether an accepted action's lock window is still open.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.state.borrow().in_progress
    }

    /// Wall-clock time of the last accepted action, if any.
    #[must_use]
    pub fn last_accept_ms(&self) -> Option<u64> {
        self.state.borrow().last_action_ms
    }
}
