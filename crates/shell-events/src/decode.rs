//! Raw surface data -> key events.
//!
//! Embedded hosts hand the engine exactly what a line terminal's `onData`
//! callback produces: single C0 control codes, short CSI escape sequences for
//! the arrow keys, or runs of printable characters. The decoder normalizes
//! all three into [`KeyEvent`]s; unrecognized sequences are dropped with a
//! trace record that carries only lengths, never payload bytes.

use crate::{KeyCode, KeyEvent};

const CTRL_A: char = '\u{01}';
const CTRL_C: char = '\u{03}';
const CTRL_E: char = '\u{05}';
const ESC: char = '\u{1b}';
const DEL: char = '\u{7f}';

/// Decode one data chunk into zero or more key events.
///
/// Consecutive printable characters collapse into a single `Text` event so a
/// paste of N characters costs one buffer insertion, not N.
pub fn decode(data: &str) -> Vec<KeyEvent> {
    let mut out = Vec::new();
    let mut printable = String::new();
    let mut chars = data.chars().peekable();

    while let Some(c) = chars.next() {
        let key = match c {
            '\r' | '\n' => Some(KeyEvent::plain(KeyCode::Enter)),
            DEL | '\u{08}' => Some(KeyEvent::plain(KeyCode::Backspace)),
            '\t' => Some(KeyEvent::plain(KeyCode::Tab)),
            CTRL_A => Some(KeyEvent::ctrl('a')),
            CTRL_C => Some(KeyEvent::ctrl('c')),
            CTRL_E => Some(KeyEvent::ctrl('e')),
            ESC => decode_escape(&mut chars),
            c if c.is_control() => {
                tracing::trace!(target: "events.decode", code = c as u32, "drop_control");
                None
            }
            c => {
                printable.push(c);
                continue;
            }
        };
        flush_printable(&mut printable, &mut out);
        if let Some(key) = key {
            out.push(key);
        }
    }
    flush_printable(&mut printable, &mut out);
    out
}

fn flush_printable(printable: &mut String, out: &mut Vec<KeyEvent>) {
    if !printable.is_empty() {
        out.push(KeyEvent::text(std::mem::take(printable)));
    }
}

/// Consume the remainder of an escape sequence. Only the four cursor keys are
/// meaningful here; anything else is swallowed up to its final byte so a
/// partial sequence cannot leak into the printable run.
fn decode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<KeyEvent> {
    if chars.peek() != Some(&'[') {
        tracing::trace!(target: "events.decode", "drop_lone_escape");
        return None;
    }
    chars.next();

    let mut seq_len = 1usize;
    for c in chars.by_ref() {
        seq_len += 1;
        // CSI final bytes are 0x40..=0x7e.
        if ('\u{40}'..='\u{7e}').contains(&c) {
            return match c {
                'A' => Some(KeyEvent::plain(KeyCode::Up)),
                'B' => Some(KeyEvent::plain(KeyCode::Down)),
                'C' => Some(KeyEvent::plain(KeyCode::Right)),
                'D' => Some(KeyEvent::plain(KeyCode::Left)),
                _ => {
                    tracing::trace!(target: "events.decode", seq_len, "drop_csi");
                    None
                }
            };
        }
    }
    tracing::trace!(target: "events.decode", seq_len, "drop_truncated_csi");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_codes_map_to_named_keys() {
        assert_eq!(decode("\r"), vec![KeyEvent::plain(KeyCode::Enter)]);
        assert_eq!(decode("\u{7f}"), vec![KeyEvent::plain(KeyCode::Backspace)]);
        assert_eq!(decode("\t"), vec![KeyEvent::plain(KeyCode::Tab)]);
        assert_eq!(decode("\u{03}"), vec![KeyEvent::ctrl('c')]);
        assert_eq!(decode("\u{01}"), vec![KeyEvent::ctrl('a')]);
        assert_eq!(decode("\u{05}"), vec![KeyEvent::ctrl('e')]);
    }

    #[test]
    fn arrow_sequences_decode() {
        assert_eq!(decode("\u{1b}[A"), vec![KeyEvent::plain(KeyCode::Up)]);
        assert_eq!(decode("\u{1b}[B"), vec![KeyEvent::plain(KeyCode::Down)]);
        assert_eq!(decode("\u{1b}[C"), vec![KeyEvent::plain(KeyCode::Right)]);
        assert_eq!(decode("\u{1b}[D"), vec![KeyEvent::plain(KeyCode::Left)]);
    }

    #[test]
    fn printable_run_collapses_to_one_event() {
        assert_eq!(decode("projects"), vec![KeyEvent::text("projects")]);
    }

    #[test]
    fn mixed_chunk_preserves_order() {
        let keys = decode("ab\u{7f}c\r");
        assert_eq!(
            keys,
            vec![
                KeyEvent::text("ab"),
                KeyEvent::plain(KeyCode::Backspace),
                KeyEvent::text("c"),
                KeyEvent::plain(KeyCode::Enter),
            ]
        );
    }

    #[test]
    fn unknown_csi_is_dropped_not_leaked() {
        // Home key on some terminals; not part of the contract.
        assert_eq!(decode("\u{1b}[1~x"), vec![KeyEvent::text("x")]);
    }

    #[test]
    fn lone_escape_is_dropped() {
        assert!(decode("\u{1b}").is_empty());
    }

    #[test]
    fn multibyte_printables_survive() {
        assert_eq!(decode("héllo"), vec![KeyEvent::text("héllo")]);
    }
}
