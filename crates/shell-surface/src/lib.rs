//! Rendering-surface contract and the crossterm-backed implementation.
//!
//! The engine never owns the surface; it is injected and consumed through a
//! deliberately narrow contract: write raw text/control sequences, clear the
//! whole grid, and report dimensions. Everything the input machine does is
//! expressed as plain write strings so any character-cell widget can sit on
//! the other side.

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use std::io::{Write, stdout};
use std::time::Duration;

pub mod capture;

pub use capture::CaptureSurface;

/// Narrow contract the engine holds on the rendering surface.
pub trait Surface: Send {
    /// Append raw text / control sequences at the surface cursor.
    fn write(&mut self, text: &str) -> Result<()>;
    /// Erase the whole surface and home the cursor.
    fn clear(&mut self) -> Result<()>;
    fn cols(&self) -> u16;
    fn rows(&self) -> u16;
}

/// Crossterm surface over stdout. Raw mode is entered on attach and restored
/// on drop, even if the session exits early.
pub struct CrosstermSurface {
    entered: bool,
    cols: u16,
    rows: u16,
}

impl CrosstermSurface {
    /// Attach to the terminal, retrying a bounded number of times on a fixed
    /// interval. After exhausting the retries the caller gets the underlying
    /// error and must leave the engine uninitialized rather than run against
    /// a missing surface.
    pub async fn attach(retries: u32, interval: Duration) -> Result<Self> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match Self::try_attach() {
                Ok(surface) => {
                    tracing::info!(target: "surface", attempt, cols = surface.cols, rows = surface.rows, "attached");
                    return Ok(surface);
                }
                Err(e) if attempt <= retries => {
                    tracing::warn!(target: "surface", attempt, error = %e, "attach_retry");
                    tokio::time::sleep(interval).await;
                }
                Err(e) => {
                    return Err(e).context("surface failed to attach after retries");
                }
            }
        }
    }

    fn try_attach() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size()?;
        enable_raw_mode()?;
        Ok(Self {
            entered: true,
            cols,
            rows,
        })
    }

    /// Record new dimensions reported by a resize event.
    pub fn set_dims(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Surface for CrosstermSurface {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut out = stdout();
        queue!(out, Print(text))?;
        out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut out = stdout();
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        out.flush()?;
        Ok(())
    }

    fn cols(&self) -> u16 {
        self.cols
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

impl Drop for CrosstermSurface {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
