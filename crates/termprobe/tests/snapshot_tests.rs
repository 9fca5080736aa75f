//! Snapshot baselines across sessions: create, match, mismatch, update.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use tempfile::TempDir;
use termprobe::prelude::*;
use termprobe::{RichSnapshot, TextSnapshot};

fn config(dir: &TempDir) -> SessionConfig {
    init_test_logging();
    SessionConfig::default()
        .with_size(16, 3)
        .with_snapshot_dir(dir.path())
        .with_test_name("snapshot_tests")
}

/// Status screen whose label color is the only style in play.
fn status_screen(label: &'static str, color: NamedColor) -> impl Fn(Rect, &mut Buffer) {
    move |_area: Rect, buf: &mut Buffer| {
        buf.set_string(0, 0, "status:", Style::new());
        buf.set_string(8, 0, label, Style::new().fg(color).add_modifier(Modifier::BOLD));
        buf.set_string(0, 2, "q quit", Style::new().add_modifier(Modifier::DIM));
    }
}

fn plain(dir: &TempDir, screen: impl Fn(Rect, &mut Buffer)) -> HarnessResult<SnapshotOutcome> {
    with_virtual_terminal(config(dir), |term| {
        term.draw(&screen)?;
        term.assert_snapshot("status")
    })
}

fn rich(dir: &TempDir, screen: impl Fn(Rect, &mut Buffer)) -> HarnessResult<SnapshotOutcome> {
    with_virtual_terminal(config(dir), |term| {
        term.draw(&screen)?;
        term.assert_rich_snapshot("status")
    })
}

// ============================================================================
// Plain text
// ============================================================================

#[test]
fn test_first_run_creates_then_matches() {
    let dir = TempDir::new().unwrap();
    assert_eq!(plain(&dir, status_screen("ok", NamedColor::Green)).unwrap(), SnapshotOutcome::Created);
    assert!(dir.path().join("snapshot_tests").join("status.snap.yaml").exists());
    assert_eq!(plain(&dir, status_screen("ok", NamedColor::Green)).unwrap(), SnapshotOutcome::Matched);
}

#[test]
fn test_glyph_change_fails() {
    let dir = TempDir::new().unwrap();
    plain(&dir, status_screen("ok", NamedColor::Green)).unwrap();

    let err = plain(&dir, status_screen("no", NamedColor::Green)).unwrap_err();
    assert!(err.is_assertion_failure());
    match err {
        HarnessError::SnapshotMismatch { name, detail } => {
            assert_eq!(name, "snapshot_tests/status");
            assert!(detail.contains("row 0"), "detail: {detail}");
        }
        other => panic!("expected SnapshotMismatch, got {other:?}"),
    }
}

#[test]
fn test_style_change_is_invisible_to_plain_snapshot() {
    let dir = TempDir::new().unwrap();
    plain(&dir, status_screen("ok", NamedColor::Green)).unwrap();
    assert_eq!(plain(&dir, status_screen("ok", NamedColor::Red)).unwrap(), SnapshotOutcome::Matched);
}

#[test]
fn test_baseline_file_is_readable_yaml() {
    let dir = TempDir::new().unwrap();
    plain(&dir, status_screen("ok", NamedColor::Green)).unwrap();

    let store = SnapshotStore::new(dir.path());
    let baseline: TextSnapshot = store.load("snapshot_tests", "status").unwrap();
    assert_eq!((baseline.width, baseline.height), (16, 3));
    assert_eq!(baseline.rows[0], "status: ok      ");
    assert_eq!(baseline.rows[2], "q quit          ");
    let text = std::fs::read_to_string(store.path_for::<TextSnapshot>("snapshot_tests", "status")).unwrap();
    assert!(text.contains("status: ok"));
}

// ============================================================================
// Styled runs
// ============================================================================

#[test]
fn test_rich_snapshot_catches_style_only_change() {
    let dir = TempDir::new().unwrap();
    assert_eq!(rich(&dir, status_screen("ok", NamedColor::Green)).unwrap(), SnapshotOutcome::Created);
    assert_eq!(rich(&dir, status_screen("ok", NamedColor::Green)).unwrap(), SnapshotOutcome::Matched);

    let err = rich(&dir, status_screen("ok", NamedColor::Red)).unwrap_err();
    assert!(matches!(err, HarnessError::SnapshotMismatch { .. }));
    assert!(err.to_string().contains("row 0"));
}

#[test]
fn test_rich_snapshot_catches_glyph_change() {
    let dir = TempDir::new().unwrap();
    rich(&dir, status_screen("ok", NamedColor::Green)).unwrap();

    let err = rich(&dir, status_screen("no", NamedColor::Green)).unwrap_err();
    assert!(err.is_assertion_failure());
    match err {
        HarnessError::SnapshotMismatch { name, detail } => {
            assert_eq!(name, "snapshot_tests/status");
            assert!(detail.contains("row 0"), "detail: {detail}");
            assert!(detail.contains("\"no\""), "detail: {detail}");
        }
        other => panic!("expected SnapshotMismatch, got {other:?}"),
    }
}

#[test]
fn test_rich_baseline_keeps_runs() {
    let dir = TempDir::new().unwrap();
    rich(&dir, status_screen("ok", NamedColor::Yellow)).unwrap();

    let baseline: RichSnapshot = SnapshotStore::new(dir.path())
        .load("snapshot_tests", "status")
        .unwrap();
    let label = baseline.rows[0]
        .iter()
        .find(|run| run.text == "ok")
        .expect("label run");
    assert_eq!(label.fg, Color::Named(NamedColor::Yellow));
    assert!(label.modifiers.contains(Modifier::BOLD));
    assert_eq!(baseline.to_text().rows[0], "status: ok      ");
}

#[test]
fn test_plain_and_rich_baselines_are_independent() {
    let dir = TempDir::new().unwrap();
    plain(&dir, status_screen("ok", NamedColor::Green)).unwrap();
    // Same name, other kind: created, not compared against the text file.
    assert_eq!(rich(&dir, status_screen("ok", NamedColor::Green)).unwrap(), SnapshotOutcome::Created);

    let store = SnapshotStore::new(dir.path());
    assert_eq!(store.list::<TextSnapshot>("snapshot_tests").unwrap(), vec!["status".to_string()]);
    assert_eq!(store.list::<RichSnapshot>("snapshot_tests").unwrap(), vec!["status".to_string()]);
}

// ============================================================================
// Update mode
// ============================================================================

#[test]
fn test_update_mode_rewrites_mismatch() {
    let dir = TempDir::new().unwrap();
    rich(&dir, status_screen("ok", NamedColor::Green)).unwrap();

    let outcome = with_virtual_terminal(config(&dir).with_update_mode(true), |term| {
        term.draw(&status_screen("ok", NamedColor::Red))?;
        term.assert_rich_snapshot("status")
    })
    .unwrap();
    assert_eq!(outcome, SnapshotOutcome::Updated);

    // The rewritten baseline is now the reference.
    assert_eq!(rich(&dir, status_screen("ok", NamedColor::Red)).unwrap(), SnapshotOutcome::Matched);
    assert!(rich(&dir, status_screen("ok", NamedColor::Green)).is_err());
}

#[test]
fn test_update_mode_leaves_matching_baseline_alone() {
    let dir = TempDir::new().unwrap();
    plain(&dir, status_screen("ok", NamedColor::Green)).unwrap();
    let outcome = with_virtual_terminal(config(&dir).with_update_mode(true), |term| {
        term.draw(&status_screen("ok", NamedColor::Green))?;
        term.assert_snapshot("status")
    })
    .unwrap();
    assert_eq!(outcome, SnapshotOutcome::Matched);
}

// ============================================================================
// Namespacing
// ============================================================================

#[test]
fn test_test_name_defaults_to_thread_name() {
    let dir = TempDir::new().unwrap();
    let config = SessionConfig::default()
        .with_size(8, 1)
        .with_snapshot_dir(dir.path());
    let test_name = with_virtual_terminal(config, |term| {
        term.draw("hello")?;
        term.assert_snapshot("greeting")?;
        term.test_name()
    })
    .unwrap()
    .expect("libtest names its threads");
    assert!(test_name.contains("test_test_name_defaults_to_thread_name"));

    let store = SnapshotStore::new(dir.path());
    assert!(store.exists::<TextSnapshot>(&test_name, "greeting"));
}

#[test]
fn test_similar_snapshot_names_do_not_share_a_baseline() {
    let dir = TempDir::new().unwrap();
    with_virtual_terminal(config(&dir), |term| {
        term.draw(&status_screen("ok", NamedColor::Green))?;
        assert_eq!(term.assert_snapshot("home page")?, SnapshotOutcome::Created);
        term.draw(&status_screen("no", NamedColor::Green))?;
        assert_eq!(term.assert_snapshot("home_page")?, SnapshotOutcome::Created);
        assert_eq!(term.assert_snapshot("home/page")?, SnapshotOutcome::Created);
        Ok(())
    })
    .unwrap();

    let store = SnapshotStore::new(dir.path());
    let spaced: TextSnapshot = store.load("snapshot_tests", "home page").unwrap();
    let snake: TextSnapshot = store.load("snapshot_tests", "home_page").unwrap();
    assert_eq!(spaced.rows[0], "status: ok      ");
    assert_eq!(snake.rows[0], "status: no      ");
}

#[test]
fn test_similar_test_names_do_not_share_a_directory() {
    let dir = TempDir::new().unwrap();
    let run = |test: &str, label: &'static str| {
        with_virtual_terminal(config(&dir).with_test_name(test), |term| {
            term.draw(&status_screen(label, NamedColor::Green))?;
            term.assert_snapshot("status")
        })
    };
    assert_eq!(run("suite::case", "ok").unwrap(), SnapshotOutcome::Created);
    assert_eq!(run("suite__case", "no").unwrap(), SnapshotOutcome::Created);
    assert_eq!(run("suite::case", "ok").unwrap(), SnapshotOutcome::Matched);
}
