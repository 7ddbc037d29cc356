//! The input state machine: one key event in, one buffer mutation plus a
//! minimal write string out.
//!
//! This function is deliberately surface-free (it returns what *would* be
//! written) so every transition is testable against plain strings. The
//! session applies the writes and owns the async side (dispatch, abort,
//! reflow).
//!
//! Redraw policy: a printable appended at the end of the buffer that stays on
//! the caret's current row is echoed as-is (the common typing path, O(1));
//! likewise a backspace at the end that does not change the wrap-row count
//! rubs out one cell. Every other mutation clears and rewrites the wrapped
//! input region. While a command is running, everything except the
//! cancellation chord is discarded.

use crate::{Prompt, redraw};
use shell_complete::{CompletionSources, apply_single, complete};
use shell_events::{KeyCode, KeyEvent, KeyModifiers};
use shell_state::{NavOutcome, ShellState};
use shell_vfs::Vfs;

/// Result of one transition: text to write to the surface and, on Enter with
/// a non-empty buffer, the trimmed line to dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub writes: String,
    pub submit: Option<String>,
}

impl Transition {
    fn none() -> Self {
        Self::default()
    }

    fn write<S: Into<String>>(writes: S) -> Self {
        Self {
            writes: writes.into(),
            submit: None,
        }
    }
}

/// Apply one key event to the shell state.
///
/// `commands` is the completion source for the leading token; `vfs` backs
/// path-aware argument completion.
pub fn handle_key(
    state: &mut ShellState,
    prompt: &Prompt,
    cols: u16,
    commands: &[&str],
    vfs: &Vfs,
    key: &KeyEvent,
) -> Transition {
    // Single-flight gate: a running command owns the output. The session
    // handles the cancellation chord itself; everything else is dropped here.
    if state.command_running {
        if !key.is_cancel() {
            tracing::trace!(target: "engine.input", "key_dropped_while_running");
        }
        return Transition::none();
    }

    let geom = prompt.geometry(cols);
    let transition = match (&key.code, key.mods) {
        (KeyCode::Text(data), mods) if !mods.contains(KeyModifiers::CTRL) => {
            insert_printable(state, prompt, &geom, data)
        }
        (KeyCode::Backspace, _) => backspace(state, prompt, &geom),
        (KeyCode::Left, _) => {
            let from = geom.to_screen_clamped(state.buffer.cursor());
            if state.buffer.move_left() {
                let to = geom.to_screen_clamped(state.buffer.cursor());
                Transition::write(redraw::cursor_move(from, to, geom.cols()))
            } else {
                Transition::none()
            }
        }
        (KeyCode::Right, _) => {
            let from = geom.to_screen_clamped(state.buffer.cursor());
            if state.buffer.move_right() {
                let to = geom.to_screen_clamped(state.buffer.cursor());
                Transition::write(redraw::cursor_move(from, to, geom.cols()))
            } else {
                Transition::none()
            }
        }
        (KeyCode::Up, _) => vertical(state, prompt, &geom, Direction::Up),
        (KeyCode::Down, _) => vertical(state, prompt, &geom, Direction::Down),
        (KeyCode::Char('a'), mods) if mods.contains(KeyModifiers::CTRL) => {
            let from = geom.to_screen_clamped(state.buffer.cursor());
            state.buffer.move_home();
            let to = geom.to_screen_clamped(state.buffer.cursor());
            Transition::write(redraw::cursor_move(from, to, geom.cols()))
        }
        (KeyCode::Char('e'), mods) if mods.contains(KeyModifiers::CTRL) => {
            let from = geom.to_screen_clamped(state.buffer.cursor());
            state.buffer.move_end();
            let to = geom.to_screen_clamped(state.buffer.cursor());
            Transition::write(redraw::cursor_move(from, to, geom.cols()))
        }
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CTRL) => {
            // Idle Ctrl+C: drop the composition and rearm history.
            state.buffer.clear();
            state.history.reset_index();
            Transition::write(format!("^C\r\n{}", prompt.text()))
        }
        (KeyCode::Enter, _) => submit(state, prompt),
        (KeyCode::Tab, _) => complete_token(state, prompt, &geom, commands, vfs),
        _ => Transition::none(),
    };

    // Mirror every mutation into the durable backup; a resize may clobber the
    // surface at any moment.
    state.snapshot();
    transition
}

fn insert_printable(
    state: &mut ShellState,
    prompt: &Prompt,
    geom: &shell_geometry::WrapGeometry,
    data: &str,
) -> Transition {
    let at_end = state.buffer.cursor() == state.buffer.len();
    let caret_before = geom.to_screen_clamped(state.buffer.cursor());
    state.buffer.insert(data);
    let caret_after = geom.to_screen_clamped(state.buffer.cursor());

    if at_end && caret_after.row == caret_before.row {
        // Common typing path: echo and let the surface advance the caret.
        return Transition::write(data.to_string());
    }
    Transition::write(redraw::full_redraw(
        prompt,
        state.buffer.text(),
        state.buffer.cursor(),
        state.buffer.len(),
        geom,
        caret_before,
    ))
}

fn backspace(
    state: &mut ShellState,
    prompt: &Prompt,
    geom: &shell_geometry::WrapGeometry,
) -> Transition {
    if state.buffer.cursor() == 0 {
        return Transition::none();
    }
    let at_end = state.buffer.cursor() == state.buffer.len();
    let rows_before = geom.row_count(state.buffer.len());
    let caret_before = geom.to_screen_clamped(state.buffer.cursor());
    if !state.buffer.backspace() {
        return Transition::none();
    }
    let rows_after = geom.row_count(state.buffer.len());

    let cheap = at_end
        && rows_after == rows_before
        && caret_before.col >= 1
        && caret_before.col < geom.cols();
    if cheap {
        return Transition::write("\u{8} \u{8}");
    }
    Transition::write(redraw::full_redraw(
        prompt,
        state.buffer.text(),
        state.buffer.cursor(),
        state.buffer.len(),
        geom,
        caret_before,
    ))
}

enum Direction {
    Up,
    Down,
}

/// Up/Down: move one visual row inside wrapped text; fall through to history
/// only at the topmost/bottommost visual row (and immediately when the buffer
/// is empty).
fn vertical(
    state: &mut ShellState,
    prompt: &Prompt,
    geom: &shell_geometry::WrapGeometry,
    dir: Direction,
) -> Transition {
    let caret = geom.to_screen_clamped(state.buffer.cursor());
    if !state.buffer.is_empty() {
        let last_row = geom.row_count(state.buffer.len()) - 1;
        let target_row = match dir {
            Direction::Up if caret.row > 0 => Some(caret.row - 1),
            Direction::Down if caret.row < last_row => Some(caret.row + 1),
            _ => None,
        };
        if let Some(row) = target_row {
            let offset = geom
                .to_buffer(shell_geometry::ScreenPos::new(row, caret.col))
                .min(state.buffer.len());
            state.buffer.set_cursor(offset);
            let to = geom.to_screen_clamped(state.buffer.cursor());
            return Transition::write(redraw::cursor_move(caret, to, geom.cols()));
        }
    }

    let outcome = match dir {
        Direction::Up => state.history.up(),
        Direction::Down => state.history.down(),
    };
    match outcome {
        NavOutcome::Unchanged => Transition::none(),
        NavOutcome::Load(entry) => {
            state.buffer.set_text(entry);
            Transition::write(redraw::full_redraw(
                prompt,
                state.buffer.text(),
                state.buffer.cursor(),
                state.buffer.len(),
                geom,
                caret,
            ))
        }
        NavOutcome::ClearToLive => {
            state.buffer.clear();
            Transition::write(redraw::full_redraw(
                prompt,
                "",
                0,
                0,
                geom,
                caret,
            ))
        }
    }
}

fn submit(state: &mut ShellState, prompt: &Prompt) -> Transition {
    let trimmed = state.buffer.text().trim().to_string();
    if trimmed.is_empty() {
        state.buffer.clear();
        return Transition::write(format!("\r\n{}", prompt.text()));
    }
    state.history.push(&trimmed);
    // The buffer is reset before dispatch so the machine is ready for the
    // next line the moment the command settles.
    state.reset_line();
    Transition {
        writes: "\r\n".to_string(),
        submit: Some(trimmed),
    }
}

fn complete_token(
    state: &mut ShellState,
    prompt: &Prompt,
    geom: &shell_geometry::WrapGeometry,
    commands: &[&str],
    vfs: &Vfs,
) -> Transition {
    let sources = CompletionSources {
        commands,
        vfs,
        cwd: &state.cwd,
    };
    let candidates = complete(state.buffer.text(), &sources);
    match candidates.len() {
        0 => Transition::none(),
        1 => {
            let caret = geom.to_screen_clamped(state.buffer.cursor());
            let new_text = apply_single(state.buffer.text(), &candidates[0]);
            state.buffer.set_text(new_text);
            Transition::write(redraw::full_redraw(
                prompt,
                state.buffer.text(),
                state.buffer.cursor(),
                state.buffer.len(),
                geom,
                caret,
            ))
        }
        _ => {
            // Print the candidates below the line, then reprint prompt and
            // buffer with the caret where it was.
            let mut writes = format!("\r\n{}\r\n", candidates.join("  "));
            writes.push_str(&prompt.text());
            writes.push_str(state.buffer.text());
            let end = geom.to_screen_clamped(state.buffer.len());
            let caret = geom.to_screen_clamped(state.buffer.cursor());
            writes.push_str(&redraw::cursor_move(end, caret, geom.cols()));
            Transition::write(writes)
        }
    }
}
