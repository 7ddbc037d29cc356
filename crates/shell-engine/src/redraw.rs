//! Write-string composition for the wrapped input region.
//!
//! The engine never repaints more than the input region: cheap paths append
//! or rub out a single cell, everything else clears from the prompt row down
//! and rewrites, then repositions the caret through geometry. All output is
//! plain text plus the small cursor-movement subset of control sequences the
//! surface contract allows.

use crate::Prompt;
use shell_geometry::{ScreenPos, WrapGeometry};

const CLEAR_BELOW: &str = "\x1b[J";

/// Move the caret between two known positions.
///
/// Same-row moves inside the grid emit one relative column escape; anything
/// touching a row change or the phantom end-of-row column goes through the
/// absolute-column form, which stays correct even when the surface has
/// wrap-pending state at the right edge.
pub fn cursor_move(from: ScreenPos, to: ScreenPos, cols: usize) -> String {
    if from == to {
        return String::new();
    }
    if from.row == to.row && from.col < cols && to.col < cols {
        let out = if to.col > from.col {
            format!("\x1b[{}C", to.col - from.col)
        } else {
            format!("\x1b[{}D", from.col - to.col)
        };
        return out;
    }
    let mut out = String::new();
    if to.row > from.row {
        out.push_str(&format!("\x1b[{}B", to.row - from.row));
    } else if to.row < from.row {
        out.push_str(&format!("\x1b[{}A", from.row - to.row));
    }
    out.push('\r');
    if to.col > 0 {
        out.push_str(&format!("\x1b[{}C", to.col));
    }
    out
}

/// Clear the whole input region and rewrite prompt + buffer, leaving the
/// caret on `cursor`. `caret` is where the surface caret currently sits
/// (so the clear can start at the prompt row).
pub fn full_redraw(
    prompt: &Prompt,
    text: &str,
    cursor: usize,
    len: usize,
    geom: &WrapGeometry,
    caret: ScreenPos,
) -> String {
    let mut out = String::new();
    if caret.row > 0 {
        out.push_str(&format!("\x1b[{}A", caret.row));
    }
    out.push('\r');
    out.push_str(CLEAR_BELOW);
    out.push_str(&prompt.text());
    out.push_str(text);
    // The surface caret now sits after the last cell; walk it back to the
    // logical cursor.
    let end = geom.to_screen_clamped(len);
    let target = geom.to_screen_clamped(cursor);
    out.push_str(&cursor_move(end, target, geom.cols()));
    out
}
