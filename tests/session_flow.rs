use std::time::Duration;

use pomo::{
    Command, Event, Outcome, PhaseKind, PomoError, Session, SessionConfig, SessionHistory,
    SettingsConfig, StatsFilter, TimerStatus,
};

const MIN: Duration = Duration::from_secs(60);

fn session() -> Session {
    let settings = SettingsConfig {
        work_minutes: 25.0,
        short_break_minutes: 5.0,
        long_break_minutes: 15.0,
        long_break_every: 4,
    };
    let config = SessionConfig::from_settings(&settings, Duration::from_secs(10)).unwrap();
    Session::new(config, SessionHistory::new())
}

#[test]
fn work_then_skipped_break() {
    let mut s = session();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    let events = s.tick(25 * MIN).unwrap();

    assert!(matches!(&events[0], Event::PhaseFinished(r) if r.outcome == Outcome::Completed));
    assert_eq!(s.cycle().completed_work_count, 1);
    assert_eq!(s.timer().kind(), PhaseKind::ShortBreak);
    assert!(s.break_pending());

    s.apply(Command::StartBreakNow).unwrap();
    s.tick(MIN).unwrap();
    s.apply(Command::SkipBreak).unwrap();

    let last = s.history().records().last().unwrap();
    assert_eq!(last.kind, PhaseKind::ShortBreak);
    assert_eq!(last.actual, MIN);
    assert_eq!(last.planned, 5 * MIN);
    assert_eq!(last.outcome, Outcome::Skipped);
    assert_eq!(s.timer().kind(), PhaseKind::Work);
    assert_eq!(s.timer().status(), TimerStatus::Idle);
}

#[test]
fn shrinking_below_elapsed_clamps() {
    let mut s = session();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.tick(3 * MIN).unwrap();
    let events = s.apply(Command::AdjustMinutes(-30)).unwrap();
    assert_eq!(events, vec![Event::Adjusted { planned: 3 * MIN }]);
    assert_eq!(s.timer().planned(), 3 * MIN);
    assert_eq!(s.timer().status(), TimerStatus::Running);

    // Next tick of any size completes it.
    s.tick(Duration::from_millis(1)).unwrap();
    assert_eq!(s.history().records()[0].actual, 3 * MIN);
}

#[test]
fn shrinking_fresh_phase_stops_at_floor() {
    let mut s = session();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.apply(Command::AdjustMinutes(-30)).unwrap();
    assert_eq!(s.timer().planned(), Duration::from_secs(10));
}

#[test]
fn full_cycle_reaches_long_break() {
    let mut s = session();
    let mut breaks = Vec::new();
    for _ in 0..4 {
        s.apply(Command::StartOrPauseOrResume).unwrap();
        s.tick(25 * MIN).unwrap();
        breaks.push(s.timer().kind());
        s.apply(Command::SkipBreak).unwrap();
    }
    assert_eq!(
        breaks,
        vec![PhaseKind::ShortBreak, PhaseKind::ShortBreak, PhaseKind::ShortBreak, PhaseKind::LongBreak]
    );
}

#[test]
fn every_terminal_phase_is_counted_once() {
    let mut s = session();
    // Work completed, break ended early, work ended early, break skipped.
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.tick(25 * MIN).unwrap();
    s.apply(Command::StartBreakNow).unwrap();
    s.tick(2 * MIN).unwrap();
    s.apply(Command::EndPhase).unwrap();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.tick(MIN).unwrap();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.apply(Command::EndPhase).unwrap();
    s.apply(Command::SkipBreak).unwrap();

    let all = s.history().stats_for(StatsFilter::All);
    assert_eq!(all.count, 4);
    assert!(s.history().records().iter().all(|r| r.actual <= r.planned));
    let work = s.history().stats_for(StatsFilter::Kind(PhaseKind::Work));
    assert_eq!(work.count, 2);
    assert_eq!(work.total_actual, 26 * MIN);
    let indices: Vec<u64> = s.history().records().iter().map(|r| r.index).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn rejected_commands_leave_state_alone() {
    let mut s = session();
    let err = s.apply(Command::SkipBreak).unwrap_err();
    assert!(matches!(err, PomoError::InvalidPhaseKind { kind: PhaseKind::Work, .. }));
    assert!(s.apply(Command::EndPhase).is_err());
    assert!(s.apply(Command::StartBreakNow).is_err());
    assert_eq!(s.timer().status(), TimerStatus::Idle);
    assert!(s.history().is_empty());
}

#[test]
fn quit_discards_running_phase() {
    let mut s = session();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.tick(10 * MIN).unwrap();
    assert_eq!(s.apply(Command::Quit).unwrap(), vec![Event::Quit]);
    assert!(s.history().is_empty());
}

#[test]
fn settings_apply_to_the_next_phase() {
    let mut s = session();
    s.apply(Command::StartOrPauseOrResume).unwrap();
    let mut settings = s.settings();
    settings.short_break_minutes = 8.0;
    settings.work_minutes = 50.0;
    s.apply_settings(settings).unwrap();
    assert_eq!(s.timer().planned(), 25 * MIN);

    s.tick(25 * MIN).unwrap();
    assert_eq!(s.timer().planned(), 8 * MIN);
}
