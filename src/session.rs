//! Command/event API over the timer, sequencer and history.
//!
//! A [`Session`] is owned by the control loop. Every mutation goes through
//! [`Session::apply`] or [`Session::tick`] on that one owner, so commands and
//! clock ticks are applied one at a time in arrival order.

use std::time::Duration;

use chrono::{Local, TimeDelta};
use tracing::{debug, info};

use crate::config::{SessionConfig, SettingsConfig};
use crate::error::{PomoError, Result};
use crate::history::{SessionHistory, SessionRecord};
use crate::sequencer::{self, CycleState};
use crate::timer::{PhaseKind, PhaseTimer, TimerStatus};

/// Largest single adjustment accepted, in seconds.
const MAX_ADJUST_SECS: i64 = 7 * 24 * 3600;

/// Closed set of user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartOrPauseOrResume,
    EndPhase,
    StartBreakNow,
    SkipBreak,
    OpenSettings,
    AdjustMinutes(i64),
    AdjustSeconds(i64),
    Quit,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Self::StartOrPauseOrResume => "Start/Pause",
            Self::EndPhase => "End",
            Self::StartBreakNow => "Start Break",
            Self::SkipBreak => "Skip Break",
            Self::OpenSettings => "Settings",
            Self::AdjustMinutes(_) => "Adjust minutes",
            Self::AdjustSeconds(_) => "Adjust seconds",
            Self::Quit => "Quit",
        }
    }
}

/// What happened as a result of a command or tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started { kind: PhaseKind },
    Paused { remaining: Duration },
    Resumed { remaining: Duration },
    Adjusted { planned: Duration },
    /// A phase reached a terminal status and was recorded.
    PhaseFinished(SessionRecord),
    /// A fresh idle phase replaced the previous one.
    PhaseEntered { kind: PhaseKind, planned: Duration },
    SettingsRequested(SettingsConfig),
    SettingsApplied(SettingsConfig),
    Quit,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    timer: PhaseTimer,
    cycle: CycleState,
    history: SessionHistory,
    task: String,
}

impl Session {
    /// Starts at an idle work phase.
    pub fn new(config: SessionConfig, history: SessionHistory) -> Self {
        Self {
            timer: PhaseTimer::new(PhaseKind::Work, config.work, config.min_planned),
            cycle: CycleState::new(config.long_break_frequency),
            config,
            history,
            task: String::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    pub fn cycle(&self) -> &CycleState {
        &self.cycle
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn settings(&self) -> SettingsConfig {
        self.config.settings()
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// True while an idle break is waiting right after a work phase.
    pub fn break_pending(&self) -> bool {
        self.timer.kind().is_break() && self.timer.status() == TimerStatus::Idle
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>> {
        debug!(?command, status = %self.timer.status(), "applying command");
        match command {
            Command::StartOrPauseOrResume => self.toggle(),
            Command::EndPhase => {
                self.timer.end_early()?;
                self.finish()
            }
            Command::StartBreakNow => {
                if !self.break_pending() {
                    return Err(PomoError::InvalidTransition {
                        command: "start break",
                        status: self.timer.status(),
                    });
                }
                self.timer.start()?;
                Ok(vec![Event::Started { kind: self.timer.kind() }])
            }
            Command::SkipBreak => {
                self.timer.skip()?;
                self.finish()
            }
            Command::OpenSettings => Ok(vec![Event::SettingsRequested(self.settings())]),
            Command::AdjustMinutes(n) => self.adjust_secs(n.saturating_mul(60)),
            Command::AdjustSeconds(n) => self.adjust_secs(n),
            Command::Quit => {
                if !self.timer.is_terminal() && self.timer.status() != TimerStatus::Idle {
                    info!(
                        kind = %self.timer.kind(),
                        elapsed_secs = self.timer.elapsed().as_secs(),
                        "abandoning phase on quit"
                    );
                }
                self.timer = self.fresh_timer(self.timer.kind());
                Ok(vec![Event::Quit])
            }
        }
    }

    /// Feeds one clock delta to the active phase.
    pub fn tick(&mut self, delta: Duration) -> Result<Vec<Event>> {
        if self.timer.tick(delta) {
            return self.finish();
        }
        Ok(Vec::new())
    }

    /// Replaces the durations. A phase already under way keeps its planned
    /// duration; an untouched idle phase picks up the new one.
    pub fn apply_settings(&mut self, settings: SettingsConfig) -> Result<Vec<Event>> {
        self.config = SessionConfig::from_settings(&settings, self.config.min_planned)?;
        self.cycle.set_frequency(self.config.long_break_frequency);
        if self.timer.status() == TimerStatus::Idle && self.timer.elapsed().is_zero() {
            self.timer = self.fresh_timer(self.timer.kind());
        }
        info!(?settings, "settings applied");
        Ok(vec![Event::SettingsApplied(settings)])
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = task.into();
    }

    /// Drops the current phase without recording it and returns to an idle
    /// work phase. The cycle count is kept.
    pub fn end_session(&mut self) -> Vec<Event> {
        self.timer = self.fresh_timer(PhaseKind::Work);
        vec![self.entered()]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn toggle(&mut self) -> Result<Vec<Event>> {
        match self.timer.status() {
            TimerStatus::Running => {
                self.timer.pause()?;
                Ok(vec![Event::Paused { remaining: self.timer.remaining() }])
            }
            TimerStatus::Paused => {
                self.timer.resume()?;
                Ok(vec![Event::Resumed { remaining: self.timer.remaining() }])
            }
            _ => {
                self.timer.start()?;
                Ok(vec![Event::Started { kind: self.timer.kind() }])
            }
        }
    }

    fn adjust_secs(&mut self, secs: i64) -> Result<Vec<Event>> {
        let delta = TimeDelta::seconds(secs.clamp(-MAX_ADJUST_SECS, MAX_ADJUST_SECS));
        let planned = self.timer.adjust(delta)?;
        Ok(vec![Event::Adjusted { planned }])
    }

    /// Records the terminal timer and moves on to the next phase.
    fn finish(&mut self) -> Result<Vec<Event>> {
        let record = self
            .timer
            .to_record(self.history.next_index(), &self.task, Local::now())
            .ok_or_else(|| {
                PomoError::InvariantViolation(format!(
                    "finishing a {} phase that is still {}",
                    self.timer.kind(),
                    self.timer.status()
                ))
            })?;
        self.history.record(record.clone())?;
        info!(
            kind = %record.kind,
            outcome = %record.outcome,
            actual_secs = record.actual.as_secs(),
            planned_secs = record.planned.as_secs(),
            "phase finished"
        );

        let next = sequencer::next_phase(record.kind, &mut self.cycle);
        self.timer = self.fresh_timer(next);
        Ok(vec![Event::PhaseFinished(record), self.entered()])
    }

    fn fresh_timer(&self, kind: PhaseKind) -> PhaseTimer {
        PhaseTimer::new(kind, self.config.planned_for(kind), self.config.min_planned)
    }

    fn entered(&self) -> Event {
        Event::PhaseEntered { kind: self.timer.kind(), planned: self.timer.planned() }
    }
}
