//! Headless timer wheel for the rotation engine.
//!
//! Time is a monotonic offset from engine start. The scheduler never sleeps;
//! the host asks for [`Scheduler::next_deadline`], waits however it likes and
//! then drains due timers with [`Scheduler::pop_due`].

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Poll,
    Clock,
    Rotation,
    Promo,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [TimerKind::Poll, TimerKind::Clock, TimerKind::Rotation, TimerKind::Promo];

    fn slot(self) -> usize {
        match self {
            TimerKind::Poll => 0,
            TimerKind::Clock => 1,
            TimerKind::Rotation => 2,
            TimerKind::Promo => 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    slots: [Option<Duration>; 4],
    shut_down: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduler's current time: the last fired deadline, or the last
    /// `pop_due` time when nothing was due.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm `kind` to fire `after` from now, replacing any pending deadline.
    pub fn schedule(&mut self, kind: TimerKind, after: Duration) {
        if self.shut_down {
            return;
        }
        self.slots[kind.slot()] = Some(self.now + after);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.slots[kind.slot()] = None;
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.slots[kind.slot()]
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.slots.iter().flatten().min().copied()
    }

    /// Cancel everything. Later `schedule` calls are ignored.
    pub fn shutdown(&mut self) {
        self.slots = [None; 4];
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Take the earliest timer due at `now`, if any. Ties go to the kind
    /// listed first in [`TimerKind::ALL`]. The scheduler's clock moves to the
    /// fired deadline so a timer re-armed by its handler keeps its cadence.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerKind> {
        let due = TimerKind::ALL
            .into_iter()
            .filter_map(|kind| self.deadline(kind).map(|at| (at, kind)))
            .filter(|(at, _)| *at <= now)
            .min_by_key(|(at, kind)| (*at, kind.slot()));

        match due {
            Some((at, kind)) => {
                self.slots[kind.slot()] = None;
                self.now = self.now.max(at);
                Some(kind)
            }
            None => {
                self.now = self.now.max(now);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Rotation, secs(15));
        s.schedule(TimerKind::Clock, secs(1));
        s.schedule(TimerKind::Promo, secs(5));

        assert_eq!(s.pop_due(secs(20)), Some(TimerKind::Clock));
        assert_eq!(s.now(), secs(1));
        assert_eq!(s.pop_due(secs(20)), Some(TimerKind::Promo));
        assert_eq!(s.pop_due(secs(20)), Some(TimerKind::Rotation));
        assert_eq!(s.pop_due(secs(20)), None);
        assert_eq!(s.now(), secs(20));
    }

    #[test]
    fn rearm_from_fired_deadline_does_not_drift() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Clock, secs(1));

        // Host woke late, at 3.5s: three ticks are still due at 1, 2 and 3.
        let late = Duration::from_millis(3_500);
        let mut fired = Vec::new();
        while let Some(kind) = s.pop_due(late) {
            fired.push(s.now());
            s.schedule(kind, secs(1));
        }
        assert_eq!(fired, vec![secs(1), secs(2), secs(3)]);
        assert_eq!(s.deadline(TimerKind::Clock), Some(secs(4)));
    }

    #[test]
    fn schedule_replaces_and_cancel_removes() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Poll, secs(30));
        s.schedule(TimerKind::Poll, secs(10));
        assert_eq!(s.next_deadline(), Some(secs(10)));

        s.cancel(TimerKind::Poll);
        assert!(!s.is_armed(TimerKind::Poll));
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn shutdown_ignores_later_schedules() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::Clock, secs(1));
        s.shutdown();
        s.schedule(TimerKind::Clock, secs(1));

        assert!(s.is_shut_down());
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.pop_due(secs(1_000)), None);
    }
}
