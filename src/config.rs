//! Settings input, validated session durations and the persisted app config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PomoError, Result};
use crate::timer::PhaseKind;

/// Upper bound for any single phase, in minutes.
const MAX_PHASE_MINUTES: f64 = 24.0 * 60.0;
const MAX_LONG_BREAK_FREQUENCY: u32 = 100;
const DEFAULT_MIN_PHASE_SECS: u64 = 10;

/// Raw user-facing settings: phase lengths in minutes plus the long-break
/// frequency. Fractional minutes are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: f64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: f64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: f64,
    #[serde(default = "default_long_break_every")]
    pub long_break_every: u32,
}

fn default_work_minutes() -> f64 {
    25.0
}
fn default_short_break_minutes() -> f64 {
    5.0
}
fn default_long_break_minutes() -> f64 {
    15.0
}
fn default_long_break_every() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_min_phase_secs() -> u64 {
    DEFAULT_MIN_PHASE_SECS
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            long_break_every: default_long_break_every(),
        }
    }
}

impl SettingsConfig {
    /// Checks every field, returning the first offending one.
    pub fn validate(&self) -> Result<()> {
        check_minutes("work_minutes", self.work_minutes)?;
        check_minutes("short_break_minutes", self.short_break_minutes)?;
        check_minutes("long_break_minutes", self.long_break_minutes)?;
        check_frequency(self.long_break_every)?;
        Ok(())
    }

    /// Builds settings from the four text fields of the settings form.
    pub fn parse_form(work: &str, short_break: &str, long_break: &str, every: &str) -> Result<Self> {
        let settings = Self {
            work_minutes: parse_minutes("work_minutes", work)?,
            short_break_minutes: parse_minutes("short_break_minutes", short_break)?,
            long_break_minutes: parse_minutes("long_break_minutes", long_break)?,
            long_break_every: parse_frequency(every)?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Durations the timer actually runs with. Only constructed from validated
/// settings, so every duration is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub work: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
    pub long_break_frequency: u32,
    /// Floor for any adjusted planned duration.
    pub min_planned: Duration,
}

impl SessionConfig {
    pub fn from_settings(settings: &SettingsConfig, min_planned: Duration) -> Result<Self> {
        settings.validate()?;
        if min_planned.is_zero() {
            return Err(PomoError::InvalidConfig {
                field: "min_phase_secs",
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            work: minutes(settings.work_minutes),
            short_break: minutes(settings.short_break_minutes),
            long_break: minutes(settings.long_break_minutes),
            long_break_frequency: settings.long_break_every,
            min_planned,
        })
    }

    pub fn planned_for(&self, kind: PhaseKind) -> Duration {
        match kind {
            PhaseKind::Work => self.work,
            PhaseKind::ShortBreak => self.short_break,
            PhaseKind::LongBreak => self.long_break,
        }
    }

    /// Inverse of [`SessionConfig::from_settings`], for showing the form.
    pub fn settings(&self) -> SettingsConfig {
        SettingsConfig {
            work_minutes: self.work.as_secs_f64() / 60.0,
            short_break_minutes: self.short_break.as_secs_f64() / 60.0,
            long_break_minutes: self.long_break.as_secs_f64() / 60.0,
            long_break_every: self.long_break_frequency,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let settings = SettingsConfig::default();
        Self {
            work: minutes(settings.work_minutes),
            short_break: minutes(settings.short_break_minutes),
            long_break: minutes(settings.long_break_minutes),
            long_break_frequency: settings.long_break_every,
            min_planned: Duration::from_secs(DEFAULT_MIN_PHASE_SECS),
        }
    }
}

/// Everything stored in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_min_phase_secs")]
    pub min_phase_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: SettingsConfig::default(),
            sound_enabled: true,
            notifications_enabled: true,
            min_phase_secs: DEFAULT_MIN_PHASE_SECS,
        }
    }
}

impl AppConfig {
    pub fn session_config(&self) -> Result<SessionConfig> {
        SessionConfig::from_settings(&self.settings, Duration::from_secs(self.min_phase_secs))
    }
}

/// Parses `25m`, `1h30m`, `90s` or `1.5m` into minutes.
pub fn parse_duration(s: &str) -> std::result::Result<f64, String> {
    let s = s.trim().to_lowercase();
    let mut total = 0.0;
    let mut num = String::new();

    for c in s.chars() {
        match c {
            '0'..='9' | '.' => num.push(c),
            'h' => { total += num.parse::<f64>().map_err(|_| "Invalid hours")? * 60.0; num.clear(); }
            'm' => { total += num.parse::<f64>().map_err(|_| "Invalid minutes")?; num.clear(); }
            's' => { total += num.parse::<f64>().map_err(|_| "Invalid seconds")? / 60.0; num.clear(); }
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        // Bare number means minutes.
        total += num.parse::<f64>().map_err(|_| "Invalid minutes")?;
    }

    if total > 0.0 { Ok(total) } else { Err("Duration must be > 0".into()) }
}

fn parse_minutes(field: &'static str, raw: &str) -> Result<f64> {
    let m = parse_duration(raw).map_err(|message| PomoError::InvalidConfig { field, message })?;
    check_minutes(field, m)?;
    Ok(m)
}

fn parse_frequency(raw: &str) -> Result<u32> {
    let every = raw.trim().parse::<u32>().map_err(|_| PomoError::InvalidConfig {
        field: "long_break_every",
        message: format!("'{}' is not a whole number", raw.trim()),
    })?;
    check_frequency(every)?;
    Ok(every)
}

fn check_minutes(field: &'static str, m: f64) -> Result<()> {
    if !m.is_finite() || m <= 0.0 {
        return Err(PomoError::InvalidConfig {
            field,
            message: format!("{m} must be a positive number of minutes"),
        });
    }
    if minutes(m).is_zero() {
        return Err(PomoError::InvalidConfig {
            field,
            message: format!("{m} minutes is shorter than one millisecond"),
        });
    }
    if m > MAX_PHASE_MINUTES {
        return Err(PomoError::InvalidConfig {
            field,
            message: format!("{m} exceeds {MAX_PHASE_MINUTES} minutes"),
        });
    }
    Ok(())
}

fn check_frequency(every: u32) -> Result<()> {
    if !(1..=MAX_LONG_BREAK_FREQUENCY).contains(&every) {
        return Err(PomoError::InvalidConfig {
            field: "long_break_every",
            message: format!("{every} must be between 1 and {MAX_LONG_BREAK_FREQUENCY}"),
        });
    }
    Ok(())
}

/// Whole milliseconds, so values typed as seconds come back exact.
fn minutes(m: f64) -> Duration {
    Duration::from_millis((m * 60_000.0).round() as u64)
}

/// Renders minutes in a form [`parse_duration`] reads back to the same
/// [`Duration`]: `25`, `1m30s`, `10s`, `12.5s`.
pub fn format_minutes(m: f64) -> String {
    let ms = minutes(m).as_millis() as u64;
    let (mins, rem) = (ms / 60_000, ms % 60_000);
    let secs = if rem % 1000 == 0 { format!("{}s", rem / 1000) } else { format!("{}s", rem as f64 / 1000.0) };
    match (mins, rem) {
        (_, 0) => mins.to_string(),
        (0, _) => secs,
        _ => format!("{mins}m{secs}"),
    }
}
