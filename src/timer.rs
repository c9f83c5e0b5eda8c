//! Phase timer: the countdown state machine for the active phase.
//!
//! The timer never reads a clock itself. The control loop feeds it monotonic
//! deltas through [`PhaseTimer::tick`], so pause accounting is just "ignore
//! ticks unless running".
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |           |
//!           +-----+-----+--> Completed (tick reaches planned, or end_early)
//!                 +--------> Skipped   (break kinds only)
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PomoError, Result};
use crate::history::{Outcome, SessionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl PhaseKind {
    pub fn is_break(self) -> bool {
        !matches!(self, Self::Work)
    }

    /// Banner shown above the countdown.
    pub fn title(self) -> &'static str {
        match self {
            Self::Work => "🎯 FOCUS TIME",
            Self::ShortBreak => "☕ SHORT BREAK",
            Self::LongBreak => "🌴 LONG BREAK",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "short_break",
            Self::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Work => "work",
            Self::ShortBreak => "short break",
            Self::LongBreak => "long break",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Skipped,
}

impl TimerStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        })
    }
}

/// One phase instance, from creation until it reaches a terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTimer {
    kind: PhaseKind,
    planned: Duration,
    elapsed: Duration,
    status: TimerStatus,
    outcome: Option<Outcome>,
    min_planned: Duration,
    started_at: Option<DateTime<Local>>,
}

impl PhaseTimer {
    /// Creates an idle timer. `min_planned` is the floor for later adjustments.
    pub fn new(kind: PhaseKind, planned: Duration, min_planned: Duration) -> Self {
        Self {
            kind,
            planned,
            elapsed: Duration::ZERO,
            status: TimerStatus::Idle,
            outcome: None,
            min_planned,
            started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn planned(&self) -> Duration {
        self.planned
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn remaining(&self) -> Duration {
        self.planned.saturating_sub(self.elapsed)
    }

    /// 0.0 .. 1.0 progress through the planned duration.
    pub fn progress(&self) -> f64 {
        if self.planned.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.planned.as_secs_f64()).clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<()> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                if self.started_at.is_none() {
                    self.started_at = Some(Local::now());
                }
                self.transition(TimerStatus::Running);
                Ok(())
            }
            status => Err(PomoError::InvalidTransition { command: "start", status }),
        }
    }

    pub fn pause(&mut self) -> Result<()> {
        match self.status {
            TimerStatus::Running => {
                self.transition(TimerStatus::Paused);
                Ok(())
            }
            status => Err(PomoError::InvalidTransition { command: "pause", status }),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.status {
            TimerStatus::Paused => self.start(),
            status => Err(PomoError::InvalidTransition { command: "resume", status }),
        }
    }

    /// Advances elapsed time while running. Returns `true` on the tick that
    /// completes the phase.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(delta).min(self.planned);
        if self.elapsed == self.planned {
            self.finish(Outcome::Completed);
            return true;
        }
        false
    }

    /// Completes the phase now, keeping the time spent so far.
    pub fn end_early(&mut self) -> Result<()> {
        match self.status {
            TimerStatus::Running | TimerStatus::Paused => {
                self.finish(Outcome::EndedEarly);
                Ok(())
            }
            status => Err(PomoError::InvalidTransition { command: "end", status }),
        }
    }

    pub fn skip(&mut self) -> Result<()> {
        if !self.kind.is_break() {
            return Err(PomoError::InvalidPhaseKind { command: "skip", kind: self.kind });
        }
        if self.is_terminal() {
            return Err(PomoError::InvalidTransition { command: "skip", status: self.status });
        }
        self.finish(Outcome::Skipped);
        Ok(())
    }

    /// Grows or shrinks the planned duration. The result never drops below
    /// the configured floor or below the time already spent.
    pub fn adjust(&mut self, delta: TimeDelta) -> Result<Duration> {
        if self.is_terminal() {
            return Err(PomoError::InvalidTransition { command: "adjust", status: self.status });
        }
        let magnitude = delta.abs().to_std().unwrap_or(Duration::MAX);
        let shifted = if delta < TimeDelta::zero() {
            self.planned.saturating_sub(magnitude)
        } else {
            self.planned.saturating_add(magnitude)
        };
        self.planned = shifted.max(self.min_planned).max(self.elapsed);
        debug!(kind = %self.kind, planned_secs = self.planned.as_secs_f64(), "planned duration adjusted");
        Ok(self.planned)
    }

    /// History entry for a terminal timer, `None` while still in progress.
    pub fn to_record(&self, index: u64, task: &str, now: DateTime<Local>) -> Option<SessionRecord> {
        let outcome = self.outcome?;
        let task = task.trim();
        Some(SessionRecord {
            index,
            kind: self.kind,
            task: if task.is_empty() { "—".into() } else { task.into() },
            started_at: self.started_at.unwrap_or(now),
            planned: self.planned,
            actual: self.elapsed,
            outcome,
            timestamp: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.transition(match outcome {
            Outcome::Skipped => TimerStatus::Skipped,
            Outcome::Completed | Outcome::EndedEarly => TimerStatus::Completed,
        });
    }

    fn transition(&mut self, to: TimerStatus) {
        debug!(kind = %self.kind, from = %self.status, %to, "timer transition");
        self.status = to;
    }
}
