//! In-memory surface for tests: records every write verbatim and reports
//! configurable dimensions so input-machine behavior can be asserted without
//! a terminal.

use crate::Surface;
use anyhow::Result;

#[derive(Debug)]
pub struct CaptureSurface {
    cols: u16,
    rows: u16,
    written: String,
    clear_count: usize,
}

impl CaptureSurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            written: String::new(),
            clear_count: 0,
        }
    }

    /// Everything written since construction (or the last `take`).
    pub fn written(&self) -> &str {
        &self.written
    }

    pub fn take_written(&mut self) -> String {
        std::mem::take(&mut self.written)
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn set_dims(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }
}

impl Surface for CaptureSurface {
    fn write(&mut self, text: &str) -> Result<()> {
        self.written.push_str(text);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clear_count += 1;
        self.written.clear();
        Ok(())
    }

    fn cols(&self) -> u16 {
        self.cols
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}
