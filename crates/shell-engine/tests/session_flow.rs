//! End-to-end session scenarios driven purely through the public event
//! channel, observed through the capture surface.

use shell_engine::{NoopPort, Session, SessionConfig};
use shell_events::{EVENT_CHANNEL_CAP, Event, KeyCode, KeyEvent};
use shell_surface::CaptureSurface;
use tokio::sync::mpsc;

fn text(s: &str) -> Event {
    Event::Key(KeyEvent::text(s))
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::plain(code))
}

async fn run_session(events: Vec<Event>) -> Session<CaptureSurface> {
    let mut session = Session::new(
        CaptureSurface::new(80, 24),
        SessionConfig::default(),
        Box::new(NoopPort),
    );
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAP);
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    session.run(&mut rx).await.unwrap();
    session
}

#[tokio::test]
async fn unknown_word_reports_command_not_found() {
    let session = run_session(vec![text("projects"), key(KeyCode::Enter)]).await;
    let written = session.surface().written();
    assert!(written.contains("projects: command not found\r\n"));
    assert!(written.ends_with("guest@kiosk $ "));
}

#[tokio::test]
async fn tab_completion_feeds_straight_into_execution() {
    let session = run_session(vec![text("cat re"), key(KeyCode::Tab), key(KeyCode::Enter)]).await;
    let written = session.surface().written();
    // "re" uniquely names readme.txt at the root.
    assert!(written.contains("cat readme.txt"));
    assert!(written.contains("Type 'help' to list the available commands"));
}

#[tokio::test]
async fn cwd_threads_through_consecutive_commands() {
    let session = run_session(vec![
        text("cd projects"),
        key(KeyCode::Enter),
        text("ls"),
        key(KeyCode::Enter),
        text("pwd"),
        key(KeyCode::Enter),
    ])
    .await;
    let written = session.surface().written();
    assert!(written.contains("kiosk.md  renderer.md"));
    assert!(written.contains("/projects\r\n"));
    assert_eq!(session.state().cwd, "/projects");
}

#[tokio::test]
async fn history_recall_reruns_a_command() {
    let session = run_session(vec![
        text("echo one"),
        key(KeyCode::Enter),
        key(KeyCode::Up),
        key(KeyCode::Enter),
    ])
    .await;
    let written = session.surface().written();
    assert_eq!(written.matches("\r\none\r\n").count(), 2);
    assert_eq!(session.state().history.entries(), ["echo one", "echo one"]);
}

#[tokio::test]
async fn failed_command_output_is_rendered_before_the_prompt() {
    let session = run_session(vec![text("cat nope"), key(KeyCode::Enter)]).await;
    let written = session.surface().written();
    assert!(written.contains("cat: nope: no such file or directory\r\n"));
    assert!(written.ends_with("guest@kiosk $ "));
}

#[tokio::test]
async fn editing_mid_line_then_submitting_runs_the_edited_line() {
    let session = run_session(vec![
        text("eco x"),
        key(KeyCode::Left),
        key(KeyCode::Left),
        key(KeyCode::Left),
        text("h"),
        key(KeyCode::Enter),
    ])
    .await;
    let written = session.surface().written();
    assert!(written.contains("\r\nx\r\n"));
    assert_eq!(session.state().history.entries(), ["echo x"]);
}
