use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Duration of the start-to-end render transition.
pub const TRANSITION_DURATION_MS: f64 = 2000.0;

static NEXT_TRANSITION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Pending,
    Cancelled,
    Completed,
}

/// Caller-side view of one scheduled transition.
///
/// Clones share status, so a handle kept by the host observes the
/// cancellation performed by a later render.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    id: u64,
    status: Rc<Cell<TransitionStatus>>,
}

impl TransitionHandle {
    fn new() -> Self {
        Self {
            id: NEXT_TRANSITION_ID.fetch_add(1, Ordering::Relaxed),
            status: Rc::new(Cell::new(TransitionStatus::Pending)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> TransitionStatus {
        self.status.get()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == TransitionStatus::Pending
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status() == TransitionStatus::Cancelled
    }

    pub(crate) fn cancel(&self) {
        if self.is_pending() {
            self.status.set(TransitionStatus::Cancelled);
        }
    }

    fn complete(&self) {
        if self.is_pending() {
            self.status.set(TransitionStatus::Completed);
        }
    }
}

impl PartialEq for TransitionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Time-driven transition from the start-state to the end-state paint.
#[derive(Debug, Clone)]
pub struct Transition {
    handle: TransitionHandle,
    duration_ms: f64,
    easing: Easing,
    elapsed_ms: f64,
}

impl Transition {
    #[must_use]
    pub fn schedule(duration_ms: f64, easing: Easing) -> Self {
        Self {
            handle: TransitionHandle::new(),
            duration_ms: duration_ms.max(0.0),
            easing,
            elapsed_ms: 0.0,
        }
    }

    #[must_use]
    pub fn handle(&self) -> &TransitionHandle {
        &self.handle
    }

    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.easing.apply(self.elapsed_ms / self.duration_ms)
    }

    #[must_use]
    pub fn remaining_ms(&self) -> f64 {
        (self.duration_ms - self.elapsed_ms).max(0.0)
    }

    /// Advances the clock; returns `true` once the duration has elapsed.
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.elapsed_ms = (self.elapsed_ms + elapsed_ms).min(self.duration_ms);
        }
        self.elapsed_ms >= self.duration_ms
    }

    pub(crate) fn cancel(&self) {
        self.handle.cancel();
    }

    pub(crate) fn finish(&self) {
        self.handle.complete();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Easing, Transition, TransitionStatus};

    #[test]
    fn cubic_in_out_is_symmetric() {
        assert_relative_eq!(Easing::CubicInOut.apply(0.0), 0.0);
        assert_relative_eq!(Easing::CubicInOut.apply(0.5), 0.5);
        assert_relative_eq!(Easing::CubicInOut.apply(1.0), 1.0);
        assert_relative_eq!(
            Easing::CubicInOut.apply(0.25),
            1.0 - Easing::CubicInOut.apply(0.75)
        );
    }

    #[test]
    fn advance_saturates_at_duration() {
        let mut transition = Transition::schedule(2000.0, Easing::CubicInOut);
        assert!(!transition.advance(500.0));
        assert_relative_eq!(transition.remaining_ms(), 1500.0);
        assert!(transition.advance(5000.0));
        assert_relative_eq!(transition.progress(), 1.0);
    }

    #[test]
    fn cancelled_handle_cannot_complete() {
        let transition = Transition::schedule(10.0, Easing::Linear);
        let handle = transition.handle().clone();
        transition.cancel();
        transition.finish();
        assert_eq!(handle.status(), TransitionStatus::Cancelled);
    }
}
