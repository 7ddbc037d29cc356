//! Event types and raw-input decoding for the shell engine.
//!
//! The session loop consumes a single bounded mpsc channel of [`Event`]s fed
//! by whichever input source the host wires up: the crossterm event stream in
//! the binary, or raw surface data decoded through [`decode`] when the engine
//! is embedded behind an `onData`-style callback. Both sources normalize into
//! the same key model so the input machine has exactly one entry point.
//!
//! Channel policy: bounded at [`EVENT_CHANNEL_CAP`] with a single producer and
//! single consumer. Producers use `send(..).await`; the consumer drains every
//! event synchronously, so latency stays low and no lossy drop strategy is
//! needed.

mod decode;

pub use decode::decode;

/// Capacity of the session event channel.
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event consumed by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Surface dimensions changed (columns, rows).
    Resize(u16, u16),
    Shutdown,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

/// Normalized logical keys surfaced to the input machine.
///
/// Printable data arrives as a `Text` payload (usually one grapheme cluster
/// per keystroke, possibly more for a paste); control chords carry a `Char`
/// plus modifiers so `Ctrl+A` and plain `a` can never be confused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Text(String),
    Char(char),
    Enter,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: KeyModifiers::CTRL,
        }
    }

    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::plain(KeyCode::Text(s.into()))
    }

    /// The cancellation chord is the one key that is honored even while a
    /// command owns the output.
    pub fn is_cancel(&self) -> bool {
        matches!(self.code, KeyCode::Char('c')) && self.mods.contains(KeyModifiers::CTRL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_is_cancel() {
        assert!(KeyEvent::ctrl('c').is_cancel());
        assert!(!KeyEvent::ctrl('a').is_cancel());
        assert!(!KeyEvent::text("c").is_cancel());
    }
}
