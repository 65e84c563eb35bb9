use std::time::Duration;

use crate::session::stage::Stage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    PreflightTimeout,
    LetterFall,
    LetterSpawn,
    Countdown,
}

impl TimerKind {
    /// The stage that owns this timer. Leaving that stage cancels it.
    pub fn scope(self) -> Stage {
        match self {
            TimerKind::PreflightTimeout => Stage::Preflight,
            TimerKind::LetterFall | TimerKind::LetterSpawn | TimerKind::Countdown => Stage::Game,
        }
    }
}

#[derive(Clone, Debug)]
struct Scheduled {
    kind: TimerKind,
    due: Duration,
    period: Option<Duration>,
    seq: u64,
}

/// Deadline queue for lesson timers, driven by an external clock.
///
/// Handlers never sleep: the owner calls [`Scheduler::pop_due`] with the
/// current session time and runs whatever fired. Periodic timers re-arm
/// themselves one period after their previous deadline, so a late caller
/// catches up on every missed firing in order.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot timer, replacing any timer of the same kind.
    pub fn once(&mut self, kind: TimerKind, due: Duration) {
        self.cancel(kind);
        self.push(kind, due, None);
    }

    /// Arms a periodic timer whose first firing is one period after `now`.
    pub fn every(&mut self, kind: TimerKind, now: Duration, period: Duration) {
        self.cancel(kind);
        let period = period.max(MIN_PERIOD);
        self.push(kind, now + period, Some(period));
    }

    fn push(&mut self, kind: TimerKind, due: Duration, period: Option<Duration>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            kind,
            due,
            period,
            seq,
        });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.entries.retain(|e| e.kind != kind);
    }

    /// Drops every timer not owned by `stage`.
    pub fn retain_scope(&mut self, stage: Stage) {
        self.entries.retain(|e| e.kind.scope() == stage);
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Removes and returns the earliest timer due at or before `now`,
    /// together with its deadline. Ties go to the timer armed first.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerKind, Duration)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.remove(idx);
        if let Some(period) = entry.period {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.entries.push(Scheduled {
                due: entry.due + period,
                seq,
                ..entry
            });
        }
        Some((entry.kind, entry.due))
    }
}
