//! Frame-callback facility.
//!
//! Models the host's per-frame callback hook (the requestAnimationFrame
//! contract): `schedule` registers a one-shot callback that receives the
//! paint-cycle timestamp, `cancel` revokes it before it fires. Timestamps
//! are strictly increasing across cycles.
//!
//! `FrameLoop` is the deterministic in-process host: each `step` is one
//! paint cycle, driven explicitly by tests or simulations. Callbacks
//! scheduled while a cycle is being delivered fire on the next cycle,
//! which is what lets a callback reschedule itself without spinning.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{AnimarError, AnimarResult};

/// Token identifying a scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// A one-shot frame callback receiving the cycle timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host facility delivering per-frame callbacks.
pub trait FrameScheduler {
    /// Schedule `callback` for the next paint cycle.
    fn schedule(&self, callback: FrameCallback) -> FrameToken;

    /// Cancel a pending callback.
    ///
    /// Unknown or already-fired tokens are ignored.
    fn cancel(&self, token: FrameToken);
}

struct FrameLoopState {
    pending: Vec<(FrameToken, FrameCallback)>,
    next_token: u64,
    last_timestamp: Option<f64>,
    delivering: bool,
    frames_delivered: u64,
    callbacks_fired: u64,
    callbacks_cancelled: u64,
}

impl FrameLoopState {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_token: 0,
            last_timestamp: None,
            delivering: false,
            frames_delivered: 0,
            callbacks_fired: 0,
            callbacks_cancelled: 0,
        }
    }
}

/// Deterministic frame loop.
///
/// Clones share the same state, like a browser window shared by every
/// component scheduled on it.
#[derive(Clone)]
pub struct FrameLoop {
    state: Rc<RefCell<FrameLoopState>>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameLoop")
            .field("pending_count", &state.pending.len())
            .field("last_timestamp", &state.last_timestamp)
            .field("frames_delivered", &state.frames_delivered)
            .field("callbacks_fired", &state.callbacks_fired)
            .field("callbacks_cancelled", &state.callbacks_cancelled)
            .finish()
    }
}

/// Restores the delivery flag even if a callback panics.
struct DeliveryGuard {
    state: Rc<RefCell<FrameLoopState>>,
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        self.state.borrow_mut().delivering = false;
    }
}

impl FrameLoop {
    /// Create an empty frame loop.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FrameLoopState::new())),
        }
    }

    /// Deliver one paint cycle at `timestamp_ms`.
    ///
    /// Fires every callback pending at the start of the cycle, in the order
    /// scheduled. Callbacks scheduled during the cycle are held for the next
    /// one. Returns the number of callbacks fired.
    ///
    /// # Errors
    ///
    /// Returns [`AnimarError::NonMonotonicTimestamp`] if `timestamp_ms` does
    /// not advance past the previous cycle, and [`AnimarError::ReentrantStep`]
    /// if called from inside a frame callback.
    pub fn step(&self, timestamp_ms: f64) -> AnimarResult<usize> {
        let cutoff = {
            let mut state = self.state.borrow_mut();
            if state.delivering {
                return Err(AnimarError::ReentrantStep);
            }
            if let Some(last) = state.last_timestamp {
                if timestamp_ms <= last || timestamp_ms.is_nan() {
                    return Err(AnimarError::NonMonotonicTimestamp {
                        last_ms: last,
                        next_ms: timestamp_ms,
                    });
                }
            }
            state.delivering = true;
            state.last_timestamp = Some(timestamp_ms);
            state.next_token
        };

        let _guard = DeliveryGuard {
            state: Rc::clone(&self.state),
        };

        // Pull one callback at a time: a cancel issued by an earlier callback
        // in this cycle still revokes a later one, and anything scheduled
        // during the cycle (token at or past the cutoff) waits for the next.
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                state
                    .pending
                    .iter()
                    .position(|(token, _)| token.0 < cutoff)
                    .map(|i| state.pending.remove(i))
            };
            match next {
                Some((_token, callback)) => {
                    callback(timestamp_ms);
                    fired += 1;
                }
                None => break,
            }
        }

        let mut state = self.state.borrow_mut();
        state.frames_delivered += 1;
        state.callbacks_fired += fired as u64;
        Ok(fired)
    }

    /// Deliver paint cycles at a fixed interval until nothing is pending.
    ///
    /// Cycles run at `start_ms`, `start_ms + interval_ms`, and so on, for at
    /// most `max_frames` cycles. Returns the number of cycles delivered.
    ///
    /// # Errors
    ///
    /// Propagates [`step`](Self::step) errors; a non-positive `interval_ms`
    /// fails the monotonicity check on the second cycle.
    pub fn run_until_idle(
        &self,
        start_ms: f64,
        interval_ms: f64,
        max_frames: usize,
    ) -> AnimarResult<usize> {
        let mut delivered = 0;
        let mut timestamp = start_ms;
        while delivered < max_frames && self.has_pending() {
            self.step(timestamp)?;
            delivered += 1;
            timestamp += interval_ms;
        }
        Ok(delivered)
    }

    /// Number of callbacks waiting for the next cycle.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Check whether any callback is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Timestamp of the most recent cycle, if any was delivered.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<f64> {
        self.state.borrow().last_timestamp
    }

    /// Total paint cycles delivered.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.state.borrow().frames_delivered
    }

    /// Total callbacks fired across all cycles.
    #[must_use]
    pub fn callbacks_fired(&self) -> u64 {
        self.state.borrow().callbacks_fired
    }

    /// Total callbacks cancelled before firing.
    #[must_use]
    pub fn callbacks_cancelled(&self) -> u64 {
        self.state.borrow().callbacks_cancelled
    }
}

impl FrameScheduler for FrameLoop {
    fn schedule(&self, callback: FrameCallback) -> FrameToken {
        let mut state = self.state.borrow_mut();
        let token = FrameToken(state.next_token);
        state.next_token += 1;
        state.pending.push((token, callback));
        token
    }

    fn cancel(&self, token: FrameToken) {
        let mut state = self.state.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|(t, _)| *t != token);
        if state.pending.len() < before {
            state.callbacks_cancelled += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_step_fires_with_timestamp() {
        let frames = FrameLoop::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);

        frames.schedule(Box::new(move |ts| seen_clone.borrow_mut().push(ts)));
        assert_eq!(frames.step(16.7).unwrap(), 1);

        assert_eq!(*seen.borrow(), vec![16.7]);
        assert_eq!(frames.callbacks_fired(), 1);
        assert_eq!(frames.last_timestamp(), Some(16.7));
    }

    #[test]
    fn test_callbacks_fire_in_schedule_order() {
        let frames = FrameLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order_clone = Rc::clone(&order);
            frames.schedule(Box::new(move |_| order_clone.borrow_mut().push(label)));
        }
        frames.step(1.0).unwrap();

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let frames = FrameLoop::new();
        let fired = Rc::new(RefCell::new(false));
        let fired_clone = Rc::clone(&fired);

        let token = frames.schedule(Box::new(move |_| *fired_clone.borrow_mut() = true));
        frames.cancel(token);
        frames.step(1.0).unwrap();

        assert!(!*fired.borrow(), "cancelled callback must not fire");
        assert_eq!(frames.callbacks_cancelled(), 1);
    }

    #[test]
    fn test_cancel_during_cycle_revokes_later_callback() {
        let frames = FrameLoop::new();
        let fired = Rc::new(RefCell::new(false));
        let fired_clone = Rc::clone(&fired);

        // The first callback cancels the second before it fires.
        let frames_clone = frames.clone();
        let victim = Rc::new(RefCell::new(None));
        let victim_clone = Rc::clone(&victim);
        frames.schedule(Box::new(move |_| {
            let token = victim_clone.borrow_mut().take();
            frames_clone.cancel(token.unwrap());
        }));
        let token = frames.schedule(Box::new(move |_| *fired_clone.borrow_mut() = true));
        *victim.borrow_mut() = Some(token);

        assert_eq!(frames.step(1.0).unwrap(), 1);
        assert!(!*fired.borrow(), "cancelled mid-cycle, must not fire");
        assert_eq!(frames.callbacks_cancelled(), 1);
    }

    #[test]
    fn test_cancel_unknown_token_is_ignored() {
        let frames = FrameLoop::new();
        let token = frames.schedule(Box::new(|_| {}));
        frames.step(1.0).unwrap();

        // Already fired; cancelling again changes nothing.
        frames.cancel(token);
        assert_eq!(frames.callbacks_cancelled(), 0);
    }

    #[test]
    fn test_schedule_during_step_lands_next_cycle() {
        let frames = FrameLoop::new();
        let frames_clone = frames.clone();
        let inner_ts = Rc::new(RefCell::new(None));
        let inner_ts_clone = Rc::clone(&inner_ts);

        frames.schedule(Box::new(move |_| {
            let inner = Rc::clone(&inner_ts_clone);
            frames_clone.schedule(Box::new(move |ts| *inner.borrow_mut() = Some(ts)));
        }));

        assert_eq!(frames.step(10.0).unwrap(), 1);
        assert!(inner_ts.borrow().is_none(), "held for the next cycle");
        assert_eq!(frames.pending_count(), 1);

        assert_eq!(frames.step(20.0).unwrap(), 1);
        assert_eq!(*inner_ts.borrow(), Some(20.0));
    }

    #[test]
    fn test_non_monotonic_timestamp_rejected() {
        let frames = FrameLoop::new();
        frames.step(100.0).unwrap();

        assert!(matches!(
            frames.step(100.0),
            Err(AnimarError::NonMonotonicTimestamp { .. })
        ));
        assert!(matches!(
            frames.step(50.0),
            Err(AnimarError::NonMonotonicTimestamp { .. })
        ));
        // The loop still accepts a later timestamp.
        frames.step(101.0).unwrap();
    }

    #[test]
    fn test_reentrant_step_rejected() {
        let frames = FrameLoop::new();
        let frames_clone = frames.clone();
        let inner_result = Rc::new(RefCell::new(None));
        let inner_result_clone = Rc::clone(&inner_result);

        frames.schedule(Box::new(move |_| {
            *inner_result_clone.borrow_mut() = Some(frames_clone.step(99.0));
        }));
        frames.step(1.0).unwrap();

        assert!(matches!(
            inner_result.borrow_mut().take(),
            Some(Err(AnimarError::ReentrantStep))
        ));
        // Delivery flag was restored; the next cycle works.
        frames.step(2.0).unwrap();
    }

    #[test]
    fn test_run_until_idle_bounded() {
        let frames = FrameLoop::new();

        // A callback chain that reschedules itself forever.
        fn reschedule(frames: &FrameLoop) {
            let frames_clone = frames.clone();
            frames.schedule(Box::new(move |_| reschedule(&frames_clone)));
        }
        reschedule(&frames);

        let delivered = frames.run_until_idle(0.0, 16.0, 10).unwrap();
        assert_eq!(delivered, 10, "bound must stop an endless chain");
        assert!(frames.has_pending());
    }

    #[test]
    fn test_run_until_idle_stops_when_idle() {
        let frames = FrameLoop::new();
        frames.schedule(Box::new(|_| {}));

        let delivered = frames.run_until_idle(0.0, 16.0, 100).unwrap();
        assert_eq!(delivered, 1);
        assert!(!frames.has_pending());
    }

    #[test]
    fn test_clones_share_state() {
        let frames = FrameLoop::new();
        let handle = frames.clone();

        handle.schedule(Box::new(|_| {}));
        assert_eq!(frames.pending_count(), 1);
    }
}
