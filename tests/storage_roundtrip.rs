use std::fs;
use std::time::Duration;

use pomo::{Command, Outcome, PhaseKind, Session, SessionConfig, SessionHistory, Store};

fn finished_session() -> Session {
    let mut s = Session::new(SessionConfig::default(), SessionHistory::new());
    s.set_task("write report");
    s.apply(Command::StartOrPauseOrResume).unwrap();
    s.tick(Duration::from_secs(25 * 60)).unwrap();
    s.apply(Command::StartBreakNow).unwrap();
    s.tick(Duration::from_secs(90)).unwrap();
    s.apply(Command::SkipBreak).unwrap();
    s
}

#[test]
fn history_survives_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    let s = finished_session();
    store.save_history(s.history()).unwrap();

    let loaded = Store::open(tmp.path()).unwrap().load_history();
    assert_eq!(loaded.records(), s.history().records());
    assert_eq!(loaded.next_index(), s.history().next_index());
    assert_eq!(loaded.records()[1].actual, Duration::from_secs(90));
}

#[test]
fn history_json_uses_seconds() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    store.save_history(finished_session().history()).unwrap();

    let raw = fs::read_to_string(tmp.path().join("history.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["kind"], "work");
    assert_eq!(json[0]["planned_seconds"], 1500.0);
    assert_eq!(json[1]["outcome"], "skipped");
    assert_eq!(json[1]["task"], "write report");
}

#[test]
fn csv_export_has_one_row_per_record() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    let s = finished_session();
    let path = store.export_csv(s.history()).unwrap();

    let csv = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "kind,planned_seconds,actual_seconds,outcome,timestamp");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("work,1500.0,1500.0,completed,"));
    assert!(lines[2].starts_with("short_break,300.0,90.0,skipped,"));

    let rows = s.history().export_rows();
    assert_eq!(rows[1].0, PhaseKind::ShortBreak);
    assert_eq!(rows[1].3, Outcome::Skipped);
}

#[test]
fn invalid_records_are_dropped_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    store.save_history(finished_session().history()).unwrap();

    let path = tmp.path().join("history.json");
    let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json[0]["actual_seconds"] = serde_json::json!(99999.0);
    fs::write(&path, json.to_string()).unwrap();

    let loaded = store.load_history();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.records()[0].kind, PhaseKind::ShortBreak);
}
