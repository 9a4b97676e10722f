//! Deferred one-shot callbacks.
//!
//! Models the host's timeout facility: `schedule_after` registers a
//! callback to run once a delay elapses. There is no cancellation surface
//! — the one consumer of this facility, the throttling guard's cooldown
//! release, is fire-and-forget and idempotent.
//!
//! `TimerQueue` is the deterministic host. It shares a [`SimClock`] with
//! the code under test; `advance` moves time forward and fires whatever
//! became due, in due-then-schedule order.

use std::cell::RefCell;
use std::rc::Rc;

use crate::clock::{Clock, SimClock};

/// Token identifying a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A deferred one-shot callback.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Host facility running a callback after a delay.
pub trait DelayScheduler {
    /// Run `callback` once `delay_ms` has elapsed.
    fn schedule_after(&self, delay_ms: u64, callback: TimerCallback) -> TimerToken;
}

struct TimerEntry {
    token: TimerToken,
    due_ms: u64,
    callback: TimerCallback,
}

struct TimerQueueState {
    pending: Vec<TimerEntry>,
    next_token: u64,
    fired: u64,
}

/// Deterministic timer host bound to a simulated clock.
///
/// Clones share the same queue and clock.
#[derive(Clone)]
pub struct TimerQueue {
    state: Rc<RefCell<TimerQueueState>>,
    clock: SimClock,
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TimerQueue")
            .field("pending_count", &state.pending.len())
            .field("fired", &state.fired)
            .field("now_ms", &self.clock.now_ms())
            .finish()
    }
}

/// Bound on callbacks fired per drain, against zero-delay reschedule loops.
const MAX_FIRED_PER_DRAIN: usize = 10_000;

impl TimerQueue {
    /// Create an empty queue reading time from `clock`.
    #[must_use]
    pub fn new(clock: SimClock) -> Self {
        Self {
            state: Rc::new(RefCell::new(TimerQueueState {
                pending: Vec::new(),
                next_token: 0,
                fired: 0,
            })),
            clock,
        }
    }

    /// Move the shared clock forward by `ms` and fire everything due.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, ms: u64) -> usize {
        self.clock.advance(ms);
        self.fire_due()
    }

    /// Fire every callback whose due time has been reached.
    ///
    /// Callbacks fire in due order, ties in schedule order. A callback may
    /// schedule further timers; those fire too if already due, up to a
    /// drain bound.
    pub fn fire_due(&self) -> usize {
        let mut fired = 0;
        while fired < MAX_FIRED_PER_DRAIN {
            let next = {
                let mut state = self.state.borrow_mut();
                let now = self.clock.now_ms();
                let due_index = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due_ms <= now)
                    .min_by_key(|(_, e)| (e.due_ms, e.token.0))
                    .map(|(i, _)| i);
                match due_index {
                    Some(i) => {
                        let entry = state.pending.remove(i);
                        state.fired += 1;
                        Some(entry.callback)
                    }
                    None => None,
                }
            };
            match next {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    /// Number of timers not yet fired.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Total callbacks fired.
    #[must_use]
    pub fn fired_count(&self) -> u64 {
        self.state.borrow().fired
    }
}

impl DelayScheduler for TimerQueue {
    fn schedule_after(&self, delay_ms: u64, callback: TimerCallback) -> TimerToken {
        let mut state = self.state.borrow_mut();
        let token = TimerToken(state.next_token);
        state.next_token += 1;
        let due_ms = self.clock.now_ms() + delay_ms;
        state.pending.push(TimerEntry {
            token,
            due_ms,
            callback,
        });
        token
    }
}
