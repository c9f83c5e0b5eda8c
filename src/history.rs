//! Append-only session history and the statistics derived from it.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PomoError, Result};
use crate::timer::PhaseKind;

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    #[serde(rename = "ended")]
    EndedEarly,
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::EndedEarly => "ended",
            Self::Skipped => "skipped",
        })
    }
}

/// One finished phase. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub index: u64,
    pub kind: PhaseKind,
    #[serde(default)]
    pub task: String,
    pub started_at: DateTime<Local>,
    #[serde(rename = "planned_seconds", with = "secs_f64")]
    pub planned: Duration,
    #[serde(rename = "actual_seconds", with = "secs_f64")]
    pub actual: Duration,
    pub outcome: Outcome,
    /// When the record was finalized.
    pub timestamp: DateTime<Local>,
}

/// Export tuple: kind, planned seconds, actual seconds, outcome, ISO-8601 timestamp.
pub type ExportRow = (PhaseKind, f64, f64, Outcome, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFilter {
    All,
    Kind(PhaseKind),
}

impl StatsFilter {
    fn matches(self, kind: PhaseKind) -> bool {
        match self {
            Self::All => true,
            Self::Kind(k) => k == kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub count: usize,
    pub total_planned: Duration,
    pub total_actual: Duration,
    /// Fraction of records with outcome `Completed`; 0.0 when empty.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHistory {
    records: Vec<SessionRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds history from persisted records, dropping any that break the
    /// `actual <= planned` rule.
    pub fn from_records(records: Vec<SessionRecord>) -> Self {
        let mut history = Self::new();
        for record in records {
            let index = record.index;
            if let Err(e) = history.record(record) {
                warn!(index, error = %e, "dropping stored history entry");
            }
        }
        history
    }

    pub fn record(&mut self, entry: SessionRecord) -> Result<()> {
        if entry.actual > entry.planned {
            return Err(PomoError::InvariantViolation(format!(
                "actual duration {:.1}s exceeds planned {:.1}s",
                entry.actual.as_secs_f64(),
                entry.planned.as_secs_f64()
            )));
        }
        self.records.push(entry);
        Ok(())
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn next_index(&self) -> u64 {
        self.records.last().map_or(1, |r| r.index + 1)
    }

    /// Newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SessionRecord> {
        self.records.iter().rev().take(n)
    }

    pub fn stats_for(&self, filter: StatsFilter) -> Stats {
        let mut stats = Stats::default();
        let mut completed = 0usize;
        for r in self.records.iter().filter(|r| filter.matches(r.kind)) {
            stats.count += 1;
            stats.total_planned += r.planned;
            stats.total_actual += r.actual;
            if r.outcome == Outcome::Completed {
                completed += 1;
            }
        }
        if stats.count > 0 {
            stats.completion_rate = completed as f64 / stats.count as f64;
        }
        stats
    }

    /// Work phases finished (completed or ended early) on `date`.
    pub fn work_done_on(&self, date: NaiveDate) -> u32 {
        self.records
            .iter()
            .filter(|r| counts_as_pomodoro(r) && r.timestamp.date_naive() == date)
            .count() as u32
    }

    /// Per-day work counts for the `days` days ending at `today`, oldest first.
    pub fn daily_work_counts(&self, today: NaiveDate, days: u64) -> Vec<(NaiveDate, u32)> {
        (0..days)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| (date, self.work_done_on(date)))
            .collect()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.records
            .iter()
            .map(|r| {
                (
                    r.kind,
                    r.planned.as_secs_f64(),
                    r.actual.as_secs_f64(),
                    r.outcome,
                    r.timestamp.to_rfc3339(),
                )
            })
            .collect()
    }
}

fn counts_as_pomodoro(r: &SessionRecord) -> bool {
    r.kind == PhaseKind::Work && r.outcome != Outcome::Skipped
}

mod secs_f64 {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
