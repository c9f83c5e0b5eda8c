//! Presentation state: views, text inputs and the glue between key presses
//! and the [`Session`].

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, warn};

use crate::clock::Clock;
use crate::config::{AppConfig, SettingsConfig, format_minutes};
use crate::keymap;
use crate::notify::Notifier;
use crate::session::{Command, Event, Session};
use crate::storage::Store;

const AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(5);
const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum View {
    Timer,
    History,
    Help,
    Settings,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SettingsField {
    Work,
    ShortBreak,
    LongBreak,
    Every,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [Self::Work, Self::ShortBreak, Self::LongBreak, Self::Every];

    fn next(self) -> Self {
        match self {
            Self::Work => Self::ShortBreak,
            Self::ShortBreak => Self::LongBreak,
            Self::LongBreak => Self::Every,
            Self::Every => Self::Work,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Work => Self::Every,
            Self::ShortBreak => Self::Work,
            Self::LongBreak => Self::ShortBreak,
            Self::Every => Self::LongBreak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "🎯 Work (min)",
            Self::ShortBreak => "☕ Short break (min)",
            Self::LongBreak => "🌴 Long break (min)",
            Self::Every => "🔄 Long break every (pomos)",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Work => 0,
            Self::ShortBreak => 1,
            Self::LongBreak => 2,
            Self::Every => 3,
        }
    }
}

/// The settings modal: one text buffer per field.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub field: SettingsField,
    inputs: [String; 4],
}

impl SettingsForm {
    fn from_settings(s: &SettingsConfig) -> Self {
        Self {
            field: SettingsField::Work,
            inputs: [
                format_minutes(s.work_minutes),
                format_minutes(s.short_break_minutes),
                format_minutes(s.long_break_minutes),
                s.long_break_every.to_string(),
            ],
        }
    }

    pub fn input(&self, field: SettingsField) -> &str {
        &self.inputs[field.slot()]
    }

    fn current_mut(&mut self) -> &mut String {
        &mut self.inputs[self.field.slot()]
    }

    fn parse(&self) -> crate::error::Result<SettingsConfig> {
        let [work, short, long, every] = &self.inputs;
        SettingsConfig::parse_form(work, short, long, every)
    }
}

pub struct App {
    pub session: Session,
    pub view: View,
    pub form: SettingsForm,
    pub task_editing: bool,
    pub task_input: String,
    pub animation_frame: u8,
    pub should_quit: bool,
    status: Option<(String, Instant)>,
    store: Store,
    config: AppConfig,
    notifier: Notifier,
    needs_save: bool,
    last_save: Instant,
}

impl App {
    pub fn new(session: Session, store: Store, config: AppConfig, notifier: Notifier) -> Self {
        let form = SettingsForm::from_settings(&session.settings());
        Self {
            session,
            view: View::Timer,
            form,
            task_editing: false,
            task_input: String::new(),
            animation_frame: 0,
            should_quit: false,
            status: None,
            store,
            config,
            notifier,
            needs_save: false,
            last_save: Instant::now(),
        }
    }

    /// Latest status line, until it expires.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Credits the time since the last tick to the current status before
    /// the key can change it.
    pub fn handle_key_at(&mut self, key: KeyEvent, clock: &mut impl Clock) {
        self.tick(clock.delta());
        self.handle_key(key);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.task_editing = false;
            self.dispatch(Command::Quit);
            return;
        }
        if self.task_editing {
            self.handle_task_input(key);
            return;
        }
        match self.view {
            View::Settings => self.handle_settings(key),
            View::Help => self.view = View::Timer,
            View::Timer | View::History => self.handle_main(key),
        }
    }

    fn handle_task_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.task_input.push(c),
            KeyCode::Backspace => {
                self.task_input.pop();
            }
            KeyCode::Enter => {
                self.session.set_task(self.task_input.trim());
                self.task_editing = false;
            }
            KeyCode::Esc => {
                self.task_editing = false;
                self.task_input.clear();
            }
            _ => {}
        }
    }

    fn handle_settings(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.view = View::Timer,
            KeyCode::Down | KeyCode::Tab => self.form.field = self.form.field.next(),
            KeyCode::Up | KeyCode::BackTab => self.form.field = self.form.field.prev(),
            KeyCode::Backspace => {
                self.form.current_mut().pop();
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() || c == '.' => self.form.current_mut().push(c),
            KeyCode::Enter => self.save_settings(),
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        let applied = self.form.parse().and_then(|s| self.session.apply_settings(s));
        match applied {
            Ok(events) => {
                self.handle_events(events);
                self.view = View::Timer;
            }
            Err(e) => {
                warn!(error = %e, "settings rejected");
                self.flash(e.to_string());
            }
        }
    }

    fn handle_main(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.view = if self.view == View::Timer { View::History } else { View::Timer };
                return;
            }
            KeyCode::Char('?') | KeyCode::Char('h') => {
                self.view = View::Help;
                return;
            }
            KeyCode::Esc => {
                self.view = View::Timer;
                return;
            }
            KeyCode::Char('t') => {
                self.task_input = self.session.task().to_string();
                self.task_editing = true;
                return;
            }
            KeyCode::Char('n') => {
                let events = self.session.end_session();
                self.handle_events(events);
                self.flash("Session reset to a fresh work phase");
                return;
            }
            KeyCode::Char('x') => {
                self.export();
                return;
            }
            _ => {}
        }
        if let Some(command) = keymap::lookup(key) {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        match self.session.apply(command) {
            Ok(events) => self.handle_events(events),
            Err(e) => {
                warn!(?command, error = %e, "command rejected");
                self.flash(format!("{}: {e}", command.label()));
            }
        }
    }

    // ── Clock ────────────────────────────────────────────────────────

    pub fn tick(&mut self, delta: Duration) {
        match self.session.tick(delta) {
            Ok(events) => self.handle_events(events),
            Err(e) => {
                error!(error = %e, "tick failed");
                self.flash(e.to_string());
            }
        }

        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;

        if self.needs_save && self.last_save.elapsed() >= AUTO_SAVE_INTERVAL {
            self.save_history();
            self.last_save = Instant::now();
        }
    }

    fn handle_events(&mut self, events: Vec<Event>) {
        let mut finished = None;
        for event in events {
            match event {
                Event::PhaseFinished(record) => {
                    self.needs_save = true;
                    finished = Some(record);
                }
                Event::PhaseEntered { kind, .. } => {
                    if let Some(record) = finished.take() {
                        self.notifier.phase_finished(&record, kind);
                    }
                }
                Event::SettingsRequested(settings) => {
                    self.form = SettingsForm::from_settings(&settings);
                    self.view = View::Settings;
                }
                Event::SettingsApplied(settings) => {
                    self.config.settings = settings;
                    if let Err(e) = self.store.save_config(&self.config) {
                        warn!(error = %e, "failed to save config");
                        self.flash(e.to_string());
                    } else {
                        self.flash("Settings saved");
                    }
                }
                Event::Quit => self.should_quit = true,
                Event::Started { .. } | Event::Paused { .. } | Event::Resumed { .. } | Event::Adjusted { .. } => {}
            }
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn save_history(&mut self) {
        match self.store.save_history(self.session.history()) {
            Ok(()) => self.needs_save = false,
            Err(e) => warn!(error = %e, "failed to save history"),
        }
    }

    fn export(&mut self) {
        match self.store.export_csv(self.session.history()) {
            Ok(path) => self.flash(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "export failed");
                self.flash(e.to_string());
            }
        }
    }

    pub fn save_on_quit(&mut self) {
        self.save_history();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::history::SessionHistory;
    use crate::timer::{PhaseKind, TimerStatus};

    fn app(dir: &std::path::Path) -> App {
        let store = Store::open(dir).unwrap();
        let session = Session::new(SessionConfig::default(), SessionHistory::new());
        App::new(session, store, AppConfig::default(), Notifier { desktop: false, sound: false })
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn space_starts_and_q_quits() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.timer().status(), TimerStatus::Running);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn rejected_command_sets_status() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char('k'));
        assert!(app.status().unwrap().contains("Skip Break"));
        assert_eq!(app.session.timer().status(), TimerStatus::Idle);
    }

    #[test]
    fn settings_form_saves_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.view, View::Settings);
        assert_eq!(app.form.input(SettingsField::Work), "25");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "40");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Timer);
        assert_eq!(app.session.timer().planned(), Duration::from_secs(40 * 60));
        let stored = Store::open(tmp.path()).unwrap().load_config();
        assert_eq!(stored.settings.work_minutes, 40.0);
    }

    #[test]
    fn bad_settings_keep_form_open() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.form.field, SettingsField::Every);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "0");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Settings);
        assert!(app.status().is_some());
    }

    #[test]
    fn task_label_flows_into_history() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char('t'));
        type_str(&mut app, "draft chapter");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        app.tick(Duration::from_secs(25 * 60));
        let rec = &app.session.history().records()[0];
        assert_eq!(rec.task, "draft chapter");
        assert_eq!(app.session.timer().kind(), PhaseKind::ShortBreak);
    }

    #[test]
    fn quit_flushes_history() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        press(&mut app, KeyCode::Char(' '));
        app.tick(Duration::from_secs(25 * 60));
        app.save_on_quit();
        let stored = Store::open(tmp.path()).unwrap().load_history();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn unedited_form_keeps_sub_minute_breaks() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let settings = SettingsConfig { short_break_minutes: 10.0 / 60.0, ..SettingsConfig::default() };
        let config = SessionConfig::from_settings(&settings, Duration::from_secs(10)).unwrap();
        let session = Session::new(config, SessionHistory::new());
        let mut app = App::new(session, store, AppConfig::default(), Notifier { desktop: false, sound: false });

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.form.input(SettingsField::ShortBreak), "10s");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Timer);
        assert_eq!(*app.session.config(), config);
    }

    struct StepClock(Duration);

    impl Clock for StepClock {
        fn delta(&mut self) -> Duration {
            self.0
        }
    }

    #[test]
    fn key_sees_time_elapsed_before_it() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path());
        let mut clock = StepClock(Duration::from_millis(40));
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);

        // Idle time before the start is not counted.
        app.handle_key_at(space, &mut clock);
        assert_eq!(app.session.timer().status(), TimerStatus::Running);
        assert_eq!(app.session.timer().elapsed(), Duration::ZERO);

        // Running time before the pause is kept.
        app.handle_key_at(space, &mut clock);
        assert_eq!(app.session.timer().status(), TimerStatus::Paused);
        assert_eq!(app.session.timer().elapsed(), Duration::from_millis(40));
    }

    #[test]
    fn ctrl_c_quits_from_text_inputs() {
        let tmp = tempfile::tempdir().unwrap();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        let mut editing = app(tmp.path());
        press(&mut editing, KeyCode::Char('t'));
        editing.handle_key(ctrl_c);
        assert!(editing.should_quit);
        assert!(editing.task_input.is_empty());

        let mut in_form = app(tmp.path());
        press(&mut in_form, KeyCode::Char('s'));
        in_form.handle_key(ctrl_c);
        assert!(in_form.should_quit);
        assert_eq!(in_form.form.input(SettingsField::Work), "25");
    }
}
