use std::time::Duration;

use chrono::Local;
use ratatui::{prelude::*, widgets::*};

use crate::app::{App, SettingsField, View};
use crate::history::{Outcome, StatsFilter};
use crate::keymap;
use crate::session::Command;
use crate::timer::{PhaseKind, TimerStatus};

const BORDER: Color = Color::Rgb(0, 200, 255);
const ACCENT: Color = Color::Rgb(255, 100, 0);

fn phase_color(kind: PhaseKind) -> Color {
    match kind {
        PhaseKind::Work => Color::Rgb(100, 181, 246),
        PhaseKind::ShortBreak => Color::Rgb(255, 0, 100),
        PhaseKind::LongBreak => Color::Rgb(0, 255, 150),
    }
}

pub fn render(f: &mut Frame, app: &App) {
    match app.view {
        View::Timer => render_timer(f, app),
        View::History => render_history(f, app),
        View::Help => render_help(f),
        View::Settings => render_settings(f, app),
    }
}

pub fn fmt_mmss(d: Duration) -> String {
    // Round up so the display reads 00:00 only once the phase is over.
    let secs = d.as_millis().div_ceil(1000) as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
}

fn render_timer(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(" 🍅 POMO ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)));
    f.render_widget(header, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    let timer = app.session.timer();
    let color = phase_color(timer.kind());

    f.render_widget(
        Paragraph::new(timer.kind().title())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    f.render_widget(
        Paragraph::new(fmt_mmss(timer.remaining()))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    let start = timer.started_at().map(|t| t.format("%H:%M:%S").to_string());
    let end = match timer.status() {
        TimerStatus::Running | TimerStatus::Paused => {
            let remaining = chrono::TimeDelta::from_std(timer.remaining()).unwrap_or(chrono::TimeDelta::zero());
            Some((Local::now() + remaining).format("%H:%M:%S").to_string())
        }
        _ => None,
    };
    f.render_widget(
        Paragraph::new(format!(
            "Start: {}  •  End: {}  •  Planned: {}",
            start.as_deref().unwrap_or("--:--"),
            end.as_deref().unwrap_or("--:--"),
            fmt_mmss(timer.planned()),
        ))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center),
        sections[5],
    );

    let status = match timer.status() {
        TimerStatus::Paused => format!("⏸  PAUSED{}", ".".repeat((app.animation_frame / 5) as usize % 4)),
        TimerStatus::Running => format!("{} RUNNING", if app.animation_frame < 10 { "●" } else { "○" }),
        _ if app.session.break_pending() => "☕ Break ready: B to start, K to skip".into(),
        _ => "○ READY: Space to start".into(),
    };
    let status_color = match timer.status() {
        TimerStatus::Running => Color::Green,
        TimerStatus::Paused => Color::Yellow,
        _ => Color::Gray,
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[7],
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(timer.progress()),
        sections[9],
    );

    let task = if app.task_editing {
        Line::from(vec![
            Span::styled("Task: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(app.task_input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled("█", Style::default().fg(Color::Green)),
        ])
    } else if app.session.task().is_empty() {
        Line::from(Span::styled(
            "What are you working on? Press T",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(vec![
            Span::styled("Task: ", Style::default().fg(Color::Gray)),
            Span::styled(app.session.task(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ])
    };
    f.render_widget(Paragraph::new(task).alignment(Alignment::Center), sections[11]);

    let cycle = app.session.cycle();
    let today = app.session.history().work_done_on(Local::now().date_naive());
    f.render_widget(
        Paragraph::new(format!(
            "Session {} of {}  •  {} pomos  •  {} completed today",
            cycle.position_in_cycle(),
            cycle.long_break_frequency,
            cycle.completed_work_count,
            today,
        ))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center),
        sections[13],
    );

    render_footer(f, app, chunks[2]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let lines = match app.status() {
        Some(msg) => vec![Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))],
        None => vec![
            Line::from(vec![
                span_key("Space"), Span::raw(" Start/Pause  •  "),
                span_key("E"), Span::raw(" End  •  "),
                span_key("B"), Span::raw(" Break  •  "),
                span_key("K"), Span::raw(" Skip  •  "),
                span_key("+/-"), Span::raw(" 1m  •  "),
                span_key("]/["), Span::raw(" 10s"),
            ]),
            Line::from(vec![
                span_key("T"), Span::raw(" Task  •  "),
                span_key("S"), Span::raw(" Settings  •  "),
                span_key("Tab"), Span::raw(" History  •  "),
                span_key("H"), Span::raw(" Help  •  "),
                span_key("Q"), Span::raw(" Quit"),
            ]),
        ],
    };
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn span_key(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 85, f.size());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer Controls:"),
    ];
    for command in [
        Command::StartOrPauseOrResume,
        Command::EndPhase,
        Command::StartBreakNow,
        Command::SkipBreak,
        Command::AdjustMinutes(1),
        Command::AdjustMinutes(-1),
        Command::AdjustSeconds(10),
        Command::AdjustSeconds(-10),
        Command::OpenSettings,
    ] {
        if let Some(key) = keymap::key_for(command) {
            lines.push(help_line(key, describe(command)));
        }
    }
    lines.extend([
        Line::from(""),
        Line::from("  Session:"),
        help_line("T", "Edit the task label"),
        help_line("N", "End session (back to a fresh work phase)"),
        Line::from(""),
        Line::from("  Navigation:"),
        help_line("Tab", "Toggle timer / history"),
        help_line("X", "Export history to CSV"),
        help_line("H / ?", "This help"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Q / Ctrl+C", "Quit (the running phase is discarded)"),
        Line::from(""),
        Line::from(Span::styled(
            "💡 Press any key to go back",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ]);

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Left).block(panel(" Help ")), area);
}

fn describe(command: Command) -> &'static str {
    match command {
        Command::StartOrPauseOrResume => "Start / pause / resume",
        Command::EndPhase => "End the current phase now",
        Command::StartBreakNow => "Start the pending break",
        Command::SkipBreak => "Skip the break",
        Command::OpenSettings => "Open settings",
        Command::AdjustMinutes(n) if n > 0 => "Add a minute",
        Command::AdjustMinutes(_) => "Remove a minute",
        Command::AdjustSeconds(n) if n > 0 => "Add 10 seconds",
        Command::AdjustSeconds(_) => "Remove 10 seconds",
        Command::Quit => "Quit",
    }
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn render_history(f: &mut Frame, app: &App) {
    let area = centered_rect(80, 90, f.size());
    let history = app.session.history();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("📊 STATISTICS", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "  Tab: back to timer  •  X: export CSV",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ];

    for (label, filter) in [
        ("All", StatsFilter::All),
        ("Work", StatsFilter::Kind(PhaseKind::Work)),
        ("Short break", StatsFilter::Kind(PhaseKind::ShortBreak)),
        ("Long break", StatsFilter::Kind(PhaseKind::LongBreak)),
    ] {
        let s = history.stats_for(filter);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", label), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "{:>4} sessions  •  planned {:>6.1}h  •  actual {:>6.1}h  •  {:>3.0}% completed",
                s.count,
                s.total_planned.as_secs_f64() / 3600.0,
                s.total_actual.as_secs_f64() / 3600.0,
                s.completion_rate * 100.0,
            )),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  📅 Last 7 days:", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))));
    let week = history.daily_work_counts(Local::now().date_naive(), 7);
    let max = week.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    for (date, count) in week {
        let width = (count as f64 / max as f64 * 30.0) as usize;
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", date.format("%a %d")), Style::default().fg(Color::Gray)),
            Span::styled("█".repeat(width), Style::default().fg(ACCENT)),
            Span::raw(format!(" {}", count)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  📜 Recent sessions:", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))));
    if history.is_empty() {
        lines.push(Line::from(Span::styled("  No sessions yet!", Style::default().fg(Color::DarkGray))));
    }
    for r in history.recent(12) {
        let icon = match r.kind {
            PhaseKind::Work => "🎯",
            PhaseKind::ShortBreak => "☕",
            PhaseKind::LongBreak => "🌴",
        };
        let (mark, color) = match r.outcome {
            Outcome::Completed => ("✓", Color::Green),
            Outcome::EndedEarly => ("■", Color::Yellow),
            Outcome::Skipped => ("»", Color::DarkGray),
        };
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>3} {} ", r.index, icon)),
            Span::styled(r.timestamp.format("%Y-%m-%d %H:%M").to_string(), Style::default().fg(Color::Gray)),
            Span::raw(" • "),
            Span::styled(r.task.as_str(), Style::default().fg(Color::White)),
            Span::raw(" • "),
            Span::styled(
                format!("{} / {}", fmt_mmss(r.actual), fmt_mmss(r.planned)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::styled(format!("{mark} {}", r.outcome), Style::default().fg(color)),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(panel(" History ")), area);
    render_status_overlay(f, app);
}

fn render_settings(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 70, f.size());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⚙️  SETTINGS", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑↓/Tab: Field  •  Type to edit (25, 1.5, 90s)  •  Enter: Save  •  Esc: Cancel",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    for field in SettingsField::ALL {
        let selected = app.form.field == field;
        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(if selected { "  > " } else { "    " }, label_style),
            Span::styled(field.label(), label_style),
        ]));
        let mut value = vec![
            Span::raw("    "),
            Span::styled(
                app.form.input(field),
                if selected {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ),
        ];
        if selected {
            value.push(Span::styled("█", Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(value));
    }

    if app.session.timer().status() != TimerStatus::Idle {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  ℹ The phase in progress keeps its length; new values apply from the next phase.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(panel(" Settings ")), area);
    render_status_overlay(f, app);
}

/// One-line status message pinned to the bottom of the screen.
fn render_status_overlay(f: &mut Frame, app: &App) {
    let Some(msg) = app.status() else { return };
    let full = f.size();
    let area = Rect { x: full.x, y: full.bottom().saturating_sub(1), width: full.width, height: 1 };
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        area,
    );
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
