//! Shell-level state: the logical input line, submission history, and the
//! durable snapshot that survives destructive surface redraws.
//!
//! One owned [`ShellState`] is threaded through a single dispatch function in
//! the engine; nothing here is shared across callbacks, which removes the
//! stale-closure class of bugs the original design suffered from.
//!
//! Offsets are cell offsets: one extended grapheme cluster per surface cell.
//! The buffer never contains newlines; wrapping is a display concern that
//! lives entirely in `shell-geometry`.

use unicode_segmentation::UnicodeSegmentation;

mod history;

pub use history::{HistoryLog, NavOutcome};

/// Number of cells a string occupies.
pub fn cell_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// The single source of truth for what the user has typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor cell offset, always in `0..=len`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in cells.
    pub fn len(&self) -> usize {
        cell_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_of_cell(&self, cell: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(cell)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Insert printable data at the cursor; newlines are stripped because the
    /// buffer is a single logical line by invariant.
    pub fn insert(&mut self, data: &str) {
        let clean: String = data.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if clean.is_empty() {
            return;
        }
        let at = self.byte_of_cell(self.cursor);
        self.text.insert_str(at, &clean);
        self.cursor += cell_count(&clean);
    }

    /// Delete the cell left of the cursor. Returns false at offset 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.byte_of_cell(self.cursor - 1);
        let end = self.byte_of_cell(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Clamp-set the cursor to an arbitrary cell offset (visual-row moves).
    pub fn set_cursor(&mut self, cell: usize) {
        self.cursor = cell.min(self.len());
    }

    /// Replace the whole line, cursor at the end (history loads, completion).
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Durable copy of `(text, cursor)` kept outside the live buffer.
///
/// The rendering surface may truncate or reflow its own internal line buffer
/// during a resize; the logical input must not inherit that. The snapshot is
/// refreshed after every buffer mutation and is the only source of truth used
/// to rebuild the visible input once a resize settles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    text: String,
    cursor: usize,
}

/// Everything the input machine owns for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub buffer: InputBuffer,
    pub history: HistoryLog,
    /// Single-flight gate: while true, every event except cancellation is
    /// discarded.
    pub command_running: bool,
    pub cwd: String,
    pub user: String,
    backup: Snapshot,
}

impl ShellState {
    pub fn new(user: &str, history_cap: usize) -> Self {
        Self {
            buffer: InputBuffer::new(),
            history: HistoryLog::new(history_cap),
            command_running: false,
            cwd: "/".to_string(),
            user: user.to_string(),
            backup: Snapshot::default(),
        }
    }

    /// Mirror the live buffer into the durable backup.
    pub fn snapshot(&mut self) {
        self.backup = Snapshot {
            text: self.buffer.text().to_string(),
            cursor: self.buffer.cursor(),
        };
    }

    /// Rebuild the live buffer from the durable backup.
    pub fn restore(&mut self) {
        self.buffer = InputBuffer {
            text: self.backup.text.clone(),
            cursor: self.backup.cursor.min(cell_count(&self.backup.text)),
        };
    }

    /// Reset the line to empty and mirror that state, used after submit and
    /// after cancellation.
    pub fn reset_line(&mut self) {
        self.buffer.clear();
        self.snapshot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_then_left_left_backspace_leaves_tail() {
        let mut buf = InputBuffer::new();
        buf.insert("ab");
        assert!(buf.move_left());
        assert!(buf.move_left());
        // Backspace at offset 0 is a no-op.
        assert!(!buf.backspace());
        assert_eq!((buf.text(), buf.cursor()), ("ab", 0));

        // Same keystrokes with one fewer Left: deletes 'a'.
        let mut buf = InputBuffer::new();
        buf.insert("ab");
        buf.move_left();
        assert!(buf.backspace());
        assert_eq!((buf.text(), buf.cursor()), ("b", 0));
    }

    #[test]
    fn insert_mid_buffer_at_cursor() {
        let mut buf = InputBuffer::new();
        buf.insert("hllo");
        buf.set_cursor(1);
        buf.insert("e");
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn newlines_never_enter_the_buffer() {
        let mut buf = InputBuffer::new();
        buf.insert("a\r\nb");
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut buf = InputBuffer::new();
        buf.insert("xy");
        // Insert leaves the cursor at the end, so right is already clamped.
        assert!(!buf.move_right());
        buf.move_home();
        assert!(!buf.move_left());
    }

    #[test]
    fn grapheme_clusters_count_as_single_cells() {
        let mut buf = InputBuffer::new();
        // Family emoji is one cluster, many code points.
        buf.insert("a\u{1F469}\u{200D}\u{1F469}\u{200D}\u{1F466}b");
        assert_eq!(buf.len(), 3);
        buf.set_cursor(2);
        assert!(buf.backspace());
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let mut state = ShellState::new("guest", 100);
        state.buffer.insert("draft");
        state.buffer.set_cursor(2);
        state.snapshot();

        // Simulate the surface clobbering the live buffer.
        state.buffer.clear();
        state.restore();
        assert_eq!(state.buffer.text(), "draft");
        assert_eq!(state.buffer.cursor(), 2);
    }

    #[test]
    fn reset_line_clears_both_copies() {
        let mut state = ShellState::new("guest", 100);
        state.buffer.insert("pending");
        state.snapshot();
        state.reset_line();
        state.restore();
        assert!(state.buffer.is_empty());
        assert_eq!(state.buffer.cursor(), 0);
    }
}
