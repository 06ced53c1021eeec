//! Named, cancellable deferred actions.
//!
//! Each `TimerKind` has at most one pending deadline. Scheduling a kind
//! that is already pending replaces it, so a superseded callback can never
//! fire late. The owner drives time explicitly through `take_due(now)`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Hover-intent delay on the candidate link.
    HoverIntent,
    /// Reveal the spinner if the fetch is still in flight.
    SpinnerReveal,
    /// Raise panel opacity on the paint tick after content lands.
    FadeIn,
    /// Hide the panel and release its content after the fade-out.
    FadeOut,
    /// Restore the copy button label.
    CopyRevert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    kind: TimerKind,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct Timers {
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(5),
        }
    }

    /// Arm `kind` to fire `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, kind: TimerKind, now: Instant, delay: Duration) {
        self.cancel(kind);
        self.pending.push(Pending {
            kind,
            due: now + delay,
        });
    }

    /// Returns whether a pending timer was removed.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.kind != kind);
        before != self.pending.len()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<Pending> = self
            .pending
            .iter()
            .copied()
            .filter(|p| p.due <= now)
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        self.pending.retain(|p| p.due > now);
        due.sort_by_key(|p| p.due);
        due.into_iter().map(|p| p.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn rescheduling_replaces_pending() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::HoverIntent, t0, ms(500));
        timers.schedule(TimerKind::HoverIntent, t0 + ms(400), ms(500));
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(t0 + ms(600)).is_empty());
        assert_eq!(timers.take_due(t0 + ms(900)), vec![TimerKind::HoverIntent]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::SpinnerReveal, t0, ms(500));
        assert!(timers.cancel(TimerKind::SpinnerReveal));
        assert!(!timers.cancel(TimerKind::SpinnerReveal));
        assert!(timers.take_due(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::CopyRevert, t0, ms(300));
        timers.schedule(TimerKind::FadeIn, t0, ms(0));
        timers.schedule(TimerKind::FadeOut, t0, ms(5000));
        assert_eq!(timers.next_deadline(), Some(t0));
        assert_eq!(
            timers.take_due(t0 + ms(300)),
            vec![TimerKind::FadeIn, TimerKind::CopyRevert]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_deadline(), Some(t0 + ms(5000)));
    }
}
