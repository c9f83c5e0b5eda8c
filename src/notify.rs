//! Desktop notification and chime when a phase ends.

use std::path::Path;
use std::process::{Command, Stdio};

use notify_rust::{Notification, Urgency};
use tracing::debug;

use crate::history::{Outcome, SessionRecord};
use crate::timer::PhaseKind;

const SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    pub desktop: bool,
    pub sound: bool,
}

impl Notifier {
    /// Announces the phase that follows `finished`. Only timer expiry is
    /// announced; ending or skipping by hand is already visible to the user.
    pub fn phase_finished(&self, finished: &SessionRecord, next: PhaseKind) {
        if finished.outcome != Outcome::Completed {
            return;
        }
        let (title, body) = message(next);
        if self.desktop {
            if let Err(e) = Notification::new()
                .summary(title)
                .body(body)
                .appname("pomo")
                .icon("alarm-clock")
                .urgency(Urgency::Critical)
                .show()
            {
                debug!(error = %e, "desktop notification failed");
            }
        }
        if self.sound {
            chime();
        }
    }
}

fn message(next: PhaseKind) -> (&'static str, &'static str) {
    match next {
        PhaseKind::LongBreak => ("Long Break Time! 🌴", "Great work! Take a longer break."),
        PhaseKind::ShortBreak => ("Break Time! ☕", "Time for a short break."),
        PhaseKind::Work => ("Back to Work! 🎯", "Let's focus on your next session."),
    }
}

fn chime() {
    std::thread::spawn(|| {
        if let Some((cmd, file)) = SOUNDS.iter().find(|(_, file)| Path::new(file).exists()) {
            let _ = Command::new(cmd)
                .arg(file)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
        }
    });
}
