//! Animated values for gauges and numbers.
//!
//! An [`AnimatedValue`] separates what is drawn from what is true: each
//! new target starts a transition from whatever is currently displayed,
//! advanced once per frame. All timing goes through explicit [`Instant`]s
//! so transitions are deterministic under test.
//!
//! Every retarget bumps a generation counter and hands out a
//! [`FrameTicket`]. Advancing with a ticket from an earlier generation does
//! nothing, so only the most recent target ever drives the display.

use std::time::{Duration, Instant};

/// Easing curve applied to linear progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// `t * (2 - t)`
    QuadOut,
    /// `1 - (1 - t)^3`
    CubicOut,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Duration and curve of one kind of transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub easing: Easing,
}

/// Plain numbers: 800ms, quadratic ease-out.
pub const NUMBER_ANIMATION: AnimationSpec = AnimationSpec {
    duration: Duration::from_millis(800),
    easing: Easing::QuadOut,
};

/// Circular gauges: 1500ms, cubic ease-out.
pub const GAUGE_ANIMATION: AnimationSpec = AnimationSpec {
    duration: Duration::from_millis(1500),
    easing: Easing::CubicOut,
};

/// Proof that a frame belongs to a particular transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct AnimatedValue {
    spec: AnimationSpec,
    max: f64,
    displayed: f64,
    from: f64,
    target: f64,
    started_at: Instant,
    generation: u64,
    animating: bool,
}

impl AnimatedValue {
    /// A value resting at `initial`, clamped to `[0, max]`.
    pub fn new(initial: f64, max: f64, spec: AnimationSpec, now: Instant) -> Self {
        let max = max.max(0.0);
        let initial = initial.clamp(0.0, max);
        Self {
            spec,
            max,
            displayed: initial,
            from: initial,
            target: initial,
            started_at: now,
            generation: 0,
            animating: false,
        }
    }

    /// Start a transition to `target` from the value currently displayed.
    ///
    /// Any transition in progress is superseded. Retargeting to the current
    /// target keeps the running transition.
    pub fn retarget(&mut self, target: f64, now: Instant) -> FrameTicket {
        let target = target.clamp(0.0, self.max);
        if target == self.target {
            return self.ticket();
        }

        self.generation += 1;
        self.from = self.displayed;
        self.target = target;
        self.started_at = now;
        self.animating = true;
        self.ticket()
    }

    /// Advance the transition identified by `ticket` to time `now`.
    ///
    /// Returns true while that transition is still running. A stale ticket
    /// is a no-op that returns false.
    pub fn advance(&mut self, ticket: FrameTicket, now: Instant) -> bool {
        if ticket.generation != self.generation || !self.animating {
            return false;
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        let progress = if self.spec.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.spec.duration.as_secs_f64()).min(1.0)
        };

        if progress >= 1.0 {
            self.displayed = self.target;
            self.animating = false;
            return false;
        }

        let eased = self.spec.easing.apply(progress);
        self.displayed = (self.from + (self.target - self.from) * eased).clamp(0.0, self.max);
        true
    }

    /// Advance the current transition, if any.
    pub fn tick(&mut self, now: Instant) -> bool {
        let ticket = self.ticket();
        self.advance(ticket, now)
    }

    /// Jump straight to `value` with no transition.
    pub fn snap(&mut self, value: f64) {
        let value = value.clamp(0.0, self.max);
        self.generation += 1;
        self.displayed = value;
        self.from = value;
        self.target = value;
        self.animating = false;
    }

    pub fn ticket(&self) -> FrameTicket {
        FrameTicket {
            generation: self.generation,
        }
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }
}
