use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pomo::app::App;
use pomo::config::parse_duration;
use pomo::notify::Notifier;
use pomo::storage::{LOG_FILE, Store};
use pomo::{Clock, MonotonicClock, Session, ui};

const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(author, version, about = "🍅 pomo - a terminal Pomodoro timer")]
struct Args {
    /// Work phase length (25, 25m, 1h30m, 90s)
    #[arg(short, long, value_parser = parse_duration)]
    work: Option<f64>,
    /// Short break length
    #[arg(short, long, value_parser = parse_duration)]
    short_break: Option<f64>,
    /// Long break length
    #[arg(short, long, value_parser = parse_duration)]
    long_break: Option<f64>,
    /// Work phases per long break
    #[arg(short, long)]
    every: Option<u32>,
    /// Directory for config, history and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    no_sound: bool,
    #[arg(long)]
    no_notify: bool,
    /// Log filter written to pomo.log (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(store: &Store, level: &str) -> Result<()> {
    let path = store.path(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let store = Store::open(args.data_dir.clone().unwrap_or_else(Store::default_dir))
        .context("opening data directory")?;
    init_tracing(&store, &args.log_level)?;

    let mut config = store.load_config();

    // CLI overrides
    if let Some(w) = args.work { config.settings.work_minutes = w; }
    if let Some(s) = args.short_break { config.settings.short_break_minutes = s; }
    if let Some(l) = args.long_break { config.settings.long_break_minutes = l; }
    if let Some(e) = args.every { config.settings.long_break_every = e; }
    if args.no_sound { config.sound_enabled = false; }
    if args.no_notify { config.notifications_enabled = false; }

    let session_config = config.session_config().context("invalid timer settings")?;
    let history = store.load_history();
    info!(dir = %store.dir().display(), records = history.len(), "starting");

    let notifier = Notifier { desktop: config.notifications_enabled, sound: config.sound_enabled };
    let session = Session::new(session_config, history);
    let mut app = App::new(session, store, config, notifier);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut clock = MonotonicClock::new();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let timeout = TICK_RATE.saturating_sub(clock.since_last());
        if event::poll(timeout)? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_at(key, &mut clock);
                }
            }
        }

        if app.should_quit {
            app.save_on_quit();
            info!("quit");
            return Ok(());
        }

        if clock.since_last() >= TICK_RATE {
            app.tick(clock.delta());
        }
    }
}
