//! Pomodoro timer core: phase timers, the work/break sequencer, an
//! append-only session history and the controller that ties them to a
//! fixed set of commands. The terminal front end lives in [`app`] and [`ui`].
//!
//! Time only moves when the caller says so: [`Session::tick`] takes an
//! explicit delta, usually produced by a [`MonotonicClock`].

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod keymap;
pub mod notify;
pub mod sequencer;
pub mod session;
pub mod storage;
pub mod timer;
pub mod ui;

pub use clock::{Clock, MonotonicClock};
pub use config::{AppConfig, SessionConfig, SettingsConfig};
pub use error::{PomoError, StorageError};
pub use history::{Outcome, SessionHistory, SessionRecord, Stats, StatsFilter};
pub use sequencer::{CycleState, next_phase};
pub use session::{Command, Event, Session};
pub use storage::Store;
pub use timer::{PhaseKind, PhaseTimer, TimerStatus};
