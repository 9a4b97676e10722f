//! Eased counter animation.
//!
//! A counter rises from 0 to a target value along an easing curve, driven
//! by the host's per-frame callback facility.
//!
//! # Architecture
//!
//! ```text
//! CounterConfig ──► CounterSession ──► value_at / advance   (pure math)
//!                         │
//!                         ▼
//!                  AnimatedCounter ──► FrameScheduler        (side effects)
//!                         │
//!                  CounterTrace                              (recorded runs)
//! ```
//!
//! The sampling math lives on [`CounterSession`] and is host-free, so tests
//! inject synthetic timestamps. [`AnimatedCounter`] owns the scheduling side
//! effects: it reschedules itself once per frame and cancels its pending
//! callback on drop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::frame::{FrameScheduler, FrameToken};

/// Configuration for one counter animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// End value the counter rises to
    pub target: f64,
    /// Total animation time in milliseconds
    pub duration_ms: f64,
    /// Curve shaping the rise
    pub easing: Easing,
}

impl CounterConfig {
    /// Create a config for `target` with the default one-second duration.
    #[must_use]
    pub const fn new(target: f64) -> Self {
        Self {
            target,
            duration_ms: 1000.0,
            easing: Easing::ExpoOut,
        }
    }

    /// Set the animation duration in milliseconds.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the easing curve.
    #[must_use]
    pub const fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// One sampled frame of a counter session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterFrame {
    /// Displayed integer value at this frame
    pub value: i64,
    /// Whether the session reached its terminal state
    pub finished: bool,
}

/// One activation of a counter animation.
///
/// The start timestamp is captured on the first sample and immutable after.
/// Sampling is pure: the same session and timestamp always produce the same
/// value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterSession {
    config: CounterConfig,
    start_timestamp: Option<f64>,
}

impl CounterSession {
    /// Create an unstarted session.
    #[must_use]
    pub const fn new(config: CounterConfig) -> Self {
        Self {
            config,
            start_timestamp: None,
        }
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> CounterConfig {
        self.config
    }

    /// Whether the first frame has been sampled.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.start_timestamp.is_some()
    }

    /// Displayed value at `timestamp_ms`, without mutating the session.
    ///
    /// Before the first sample the timestamp itself acts as the start, so
    /// this is the value the next [`advance`](Self::advance) would produce.
    #[must_use]
    pub fn value_at(&self, timestamp_ms: f64) -> i64 {
        self.sample(self.start_timestamp.unwrap_or(timestamp_ms), timestamp_ms)
            .value
    }

    /// Sample the next frame, recording the start on the first call.
    pub fn advance(&mut self, timestamp_ms: f64) -> CounterFrame {
        let start = *self.start_timestamp.get_or_insert(timestamp_ms);
        self.sample(start, timestamp_ms)
    }

    fn sample(&self, start: f64, timestamp_ms: f64) -> CounterFrame {
        let elapsed = timestamp_ms - start;
        let CounterConfig {
            target,
            duration_ms,
            easing,
        } = self.config;
        // A non-positive (or non-finite) duration is complete on arrival.
        let (progress, finished) = if duration_ms > 0.0 {
            ((elapsed / duration_ms).clamp(0.0, 1.0), elapsed >= duration_ms)
        } else {
            (1.0, true)
        };
        let value = (easing.evaluate(progress) * target).floor() as i64;
        CounterFrame { value, finished }
    }
}

struct CounterInner<S: FrameScheduler> {
    scheduler: S,
    session: RefCell<CounterSession>,
    value: Cell<i64>,
    finished: Cell<bool>,
    token: Cell<Option<FrameToken>>,
}

/// Frame-driven counter animation.
///
/// Activating the counter schedules a frame callback that samples the
/// session and reschedules itself until the session finishes. Dropping the
/// counter cancels the pending callback, so no update fires after teardown.
pub struct AnimatedCounter<S: FrameScheduler + 'static> {
    inner: Rc<CounterInner<S>>,
}

impl<S: FrameScheduler + 'static> std::fmt::Debug for AnimatedCounter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedCounter")
            .field("value", &self.inner.value.get())
            .field("finished", &self.inner.finished.get())
            .field("pending", &self.inner.token.get().is_some())
            .finish()
    }
}

impl<S: FrameScheduler + 'static> AnimatedCounter<S> {
    /// Activate a counter on `scheduler`.
    ///
    /// The displayed value starts at 0 and updates once per frame.
    #[must_use]
    pub fn start(scheduler: S, config: CounterConfig) -> Self {
        let inner = Rc::new(CounterInner {
            scheduler,
            session: RefCell::new(CounterSession::new(config)),
            value: Cell::new(0),
            finished: Cell::new(false),
            token: Cell::new(None),
        });
        tracing::debug!(
            target_value = config.target,
            duration_ms = config.duration_ms,
            "counter session activated"
        );
        Self::pump(&inner);
        Self { inner }
    }

    fn pump(inner: &Rc<CounterInner<S>>) {
        let captured = Rc::clone(inner);
        let token = inner.scheduler.schedule(Box::new(move |timestamp_ms| {
            captured.token.set(None);
            let frame = captured.session.borrow_mut().advance(timestamp_ms);
            captured.value.set(frame.value);
            if frame.finished {
                captured.finished.set(true);
                tracing::debug!(value = frame.value, "counter session finished");
            } else {
                Self::pump(&captured);
            }
        }));
        inner.token.set(Some(token));
    }

    /// Current displayed value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.inner.value.get()
    }

    /// Whether a frame callback is still pending.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.token.get().is_some()
    }

    /// Whether the session reached its terminal value.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.finished.get()
    }

    /// Abandon the current session and start a brand-new one.
    ///
    /// The pending frame callback of the old session is cancelled and the
    /// displayed value restarts from 0; nothing else carries over.
    pub fn retarget(&self, config: CounterConfig) {
        self.cancel_pending();
        *self.inner.session.borrow_mut() = CounterSession::new(config);
        self.inner.value.set(0);
        self.inner.finished.set(false);
        tracing::debug!(
            target_value = config.target,
            duration_ms = config.duration_ms,
            "counter session replaced"
        );
        Self::pump(&self.inner);
    }

    fn cancel_pending(&self) {
        if let Some(token) = self.inner.token.take() {
            self.inner.scheduler.cancel(token);
            tracing::debug!("counter session cancelled");
        }
    }
}

impl<S: FrameScheduler + 'static> Drop for AnimatedCounter<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Record of a counter run, for regression assertions.
///
/// The serialized form is a stable contract: capture a trace once, then
/// compare later runs against it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterTrace {
    /// Configuration that produced the trace
    pub config: CounterConfig,
    /// Samples in timestamp order
    pub samples: Vec<TraceSample>,
    /// Whether the session reached its terminal state
    pub completed: bool,
}

/// A single sampled point in a trace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    /// Frame timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Displayed value at this frame
    pub value: i64,
}

impl CounterTrace {
    /// Run a session over increasing `timestamps` and record each frame.
    ///
    /// Sampling stops at the terminal frame even if timestamps remain.
    #[must_use]
    pub fn capture<I>(config: CounterConfig, timestamps: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut session = CounterSession::new(config);
        let mut samples = Vec::new();
        let mut completed = false;
        for timestamp_ms in timestamps {
            let frame = session.advance(timestamp_ms);
            samples.push(TraceSample {
                timestamp_ms,
                value: frame.value,
            });
            if frame.finished {
                completed = true;
                break;
            }
        }
        Self {
            config,
            samples,
            completed,
        }
    }

    /// Value of the last sample, if any.
    #[must_use]
    pub fn final_value(&self) -> Option<i64> {
        self.samples.last().map(|s| s.value)
    }

    /// Check that the displayed sequence never decreases.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.samples.windows(2).all(|w| w[0].value <= w[1].value)
    }
}
