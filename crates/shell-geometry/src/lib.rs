//! Wrap geometry: bidirectional mapping between a linear offset in the logical
//! input line and a `{row, col}` cell in the rendering surface's fixed-width
//! grid.
//!
//! Row 0 is always the prompt row and holds `cols - prompt_len` input cells;
//! every subsequent row holds `cols` cells. The mapping is intentionally
//! asymmetric at the first wrap boundary: a cursor sitting exactly at the end
//! of the prompt row reports the phantom column `cols` (one past the last
//! cell), while the next offset begins the following row at column 0. This
//! mirrors how the surface actually places the caret when the prompt row
//! fills, and `to_buffer` is the exact inverse on that image so round-trips
//! are lossless.
//!
//! This crate is pure: no side effects, no dependencies. Every redraw
//! calculation in the input machine goes through it.

/// A coordinate in the surface grid. `row` 0 is the prompt row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPos {
    pub row: usize,
    pub col: usize,
}

impl ScreenPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Geometry for one prompt/width configuration.
///
/// Rebuilt on every positioning calculation from the live column count and the
/// freshly derived prompt length; never cached across a prompt change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapGeometry {
    cols: usize,
    prompt_len: usize,
}

impl WrapGeometry {
    /// `cols` is clamped to at least 1 so a momentarily stale surface report
    /// (e.g. mid-resize) can never divide by zero.
    pub fn new(cols: usize, prompt_len: usize) -> Self {
        Self {
            cols: cols.max(1),
            prompt_len,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn prompt_len(&self) -> usize {
        self.prompt_len
    }

    /// Input cells available on the prompt row.
    pub fn first_row_capacity(&self) -> usize {
        self.cols.saturating_sub(self.prompt_len)
    }

    /// Number of screen rows a line of `len` cells occupies.
    pub fn row_count(&self, len: usize) -> usize {
        let overflow = len.saturating_sub(self.first_row_capacity());
        1 + overflow.div_ceil(self.cols)
    }

    /// Map a buffer offset to its screen position.
    ///
    /// Offsets at or before the first-row capacity stay on row 0 (including
    /// the phantom end-of-row column); everything past it distributes over
    /// full-width rows, with an offset exactly at a later wrap boundary
    /// belonging to the start of the next row.
    pub fn to_screen(&self, offset: usize) -> ScreenPos {
        let cap = self.first_row_capacity();
        if offset <= cap {
            return ScreenPos::new(0, self.prompt_len + offset);
        }
        let rem = offset - cap - 1;
        ScreenPos::new(1 + rem / self.cols, rem % self.cols)
    }

    /// `to_screen` with the column clamped into `[0, cols]`, for redraw paths
    /// that must tolerate a stale column count reported by the surface.
    pub fn to_screen_clamped(&self, offset: usize) -> ScreenPos {
        let pos = self.to_screen(offset);
        ScreenPos::new(pos.row, pos.col.min(self.cols))
    }

    /// Inverse of `to_screen` on its image. Row 0 subtracts the prompt length;
    /// later rows add their full-width cells to the first-row capacity.
    pub fn to_buffer(&self, pos: ScreenPos) -> usize {
        if pos.row == 0 {
            return pos.col.saturating_sub(self.prompt_len);
        }
        self.first_row_capacity() + (pos.row - 1) * self.cols + pos.col + 1
    }
}
