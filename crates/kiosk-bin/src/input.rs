//! Crossterm input pump: one tokio task reading the terminal event stream
//! and forwarding normalized [`Event`]s to the session channel.
//!
//! Pastes arrive as a single crossterm `Paste` payload and are run through
//! `shell_events::decode`, so a multi-line paste turns into the same
//! printable/Enter key sequence the engine would see from raw surface data.

use crossterm::event::{
    Event as CEvent, EventStream, KeyCode as CKeyCode, KeyEvent as CKeyEvent,
    KeyEventKind as CKind, KeyModifiers as CMods,
};
use shell_events::{Event, KeyCode, KeyEvent, KeyModifiers, decode};
use std::io;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{info, trace, warn};

/// Handle the runtime uses to stop the input task during shutdown.
#[derive(Clone, Debug)]
pub struct InputShutdown {
    notify: Arc<Notify>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

/// Spawn the input task over the live crossterm event stream.
pub fn spawn_input(sender: Sender<Event>) -> (task::JoinHandle<()>, InputShutdown) {
    let notify = Arc::new(Notify::new());
    let shutdown = InputShutdown {
        notify: notify.clone(),
    };
    let handle = task::spawn(async move {
        pump(sender, EventStream::new(), notify).await;
    });
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

async fn pump<S>(sender: Sender<Event>, mut stream: S, shutdown: Arc<Notify>)
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    info!(target: "input.task", "input_task_started");
    let reason = loop {
        let result = tokio::select! {
            biased;
            _ = shutdown.notified() => break ExitReason::ShutdownSignal,
            result = stream.next() => result,
        };
        let Some(result) = result else {
            break ExitReason::StreamEnded;
        };
        let events = match result {
            Ok(CEvent::Key(key)) => map_key(&key).map(Event::Key).into_iter().collect(),
            Ok(CEvent::Resize(cols, rows)) => {
                trace!(target: "input.task", cols, rows, "resize");
                vec![Event::Resize(cols, rows)]
            }
            Ok(CEvent::Paste(data)) => {
                trace!(target: "input.task", len = data.len(), "paste");
                decode(&data).into_iter().map(Event::Key).collect()
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(target: "input.task", error = %e, "stream_error");
                break ExitReason::StreamError;
            }
        };
        let mut closed = false;
        for event in events {
            if sender.send(event).await.is_err() {
                closed = true;
                break;
            }
        }
        if closed {
            break ExitReason::ChannelClosed;
        }
    };
    info!(target: "input.task", reason = reason.as_str(), "input_task_stopped");
}

/// Normalize one crossterm key event. Release events and keys the engine has
/// no transition for are dropped here.
fn map_key(key: &CKeyEvent) -> Option<KeyEvent> {
    if !matches!(key.kind, CKind::Press | CKind::Repeat) {
        return None;
    }
    let mut mods = KeyModifiers::empty();
    if key.modifiers.contains(CMods::CONTROL) {
        mods |= KeyModifiers::CTRL;
    }
    if key.modifiers.contains(CMods::ALT) {
        mods |= KeyModifiers::ALT;
    }
    if key.modifiers.contains(CMods::SHIFT) {
        mods |= KeyModifiers::SHIFT;
    }
    let code = match key.code {
        CKeyCode::Char(c) if mods.contains(KeyModifiers::CTRL) => {
            KeyCode::Char(c.to_ascii_lowercase())
        }
        CKeyCode::Char(c) => KeyCode::Text(c.to_string()),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        _ => return None,
    };
    Some(KeyEvent { code, mods })
}
