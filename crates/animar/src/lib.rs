//! Animar: Frame-Driven Counter Animation and Action Throttling
//!
//! Animar (Spanish: "to animate") provides two small UI-timing utilities —
//! an eased counter animation driven by the host's per-frame callback
//! facility, and a guard that throttles repeated actions — together with
//! deterministic in-process hosts, so the timing logic is testable without
//! a browser, a frame rate, or a wall clock.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      ANIMAR Architecture                       │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐   schedules on   ┌────────────────────────┐ │
//! │  │ AnimatedCounter│────────────────►│ FrameScheduler         │ │
//! │  │ (CounterSession│◄────────────────│ (FrameLoop host)       │ │
//! │  │  + easing)     │  timestamps     └────────────────────────┘ │
//! │  └───────────────┘                                             │
//! │  ┌───────────────┐   reads/defers   ┌────────────────────────┐ │
//! │  │ ActionGuard    │────────────────►│ Clock + DelayScheduler │ │
//! │  │ (ThrottleState)│◄────────────────│ (SimClock, TimerQueue) │ │
//! │  └───────────────┘  cooldown fires  └────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Animating a counter
//!
//! ```
//! use animar::{AnimatedCounter, CounterConfig, FrameLoop};
//!
//! # fn main() -> animar::AnimarResult<()> {
//! let frames = FrameLoop::new();
//! let counter = AnimatedCounter::start(frames.clone(), CounterConfig::new(100.0));
//!
//! frames.step(0.0)?; // first frame records the start timestamp
//! frames.step(500.0)?; // eased far past the halfway mark
//! assert!(counter.value() > 90);
//!
//! frames.step(1000.0)?; // terminal frame lands exactly on the target
//! assert_eq!(counter.value(), 100);
//! assert!(counter.is_finished());
//! # Ok(())
//! # }
//! ```
//!
//! # Guarding an action
//!
//! ```
//! use animar::{ActionGuard, SimClock, TimerQueue};
//!
//! let clock = SimClock::new();
//! let timers = TimerQueue::new(clock.clone());
//! let guard = ActionGuard::with_defaults(clock, timers.clone());
//!
//! assert!(guard.try_run(|| {}));
//! assert!(!guard.try_run(|| {})); // still in progress
//!
//! timers.advance(200); // cooldown and minimum interval elapse
//! assert!(guard.try_run(|| {}));
//! ```

#![warn(missing_docs)]

/// Wall-clock sources: `SystemClock` and the deterministic `SimClock`.
pub mod clock;

/// Eased counter animation: session math, frame driver, recorded traces.
pub mod counter;

/// Easing curves mapping normalized progress to eased progress.
pub mod easing;

/// Result and error types.
pub mod error;

/// Frame-callback facility and the deterministic `FrameLoop` host.
pub mod frame;

/// Action throttling: re-entrancy lock plus minimum-interval window.
pub mod throttle;

/// Deferred one-shot callbacks and the deterministic `TimerQueue` host.
pub mod timer;

pub use clock::{Clock, SimClock, SystemClock};
pub use counter::{
    AnimatedCounter, CounterConfig, CounterFrame, CounterSession, CounterTrace, TraceSample,
};
pub use easing::Easing;
pub use error::{AnimarError, AnimarResult};
pub use frame::{FrameCallback, FrameLoop, FrameScheduler, FrameToken};
pub use throttle::{ActionGuard, ThrottleConfig, DEFAULT_COOLDOWN_MS, DEFAULT_MIN_INTERVAL_MS};
pub use timer::{DelayScheduler, TimerCallback, TimerQueue, TimerToken};
