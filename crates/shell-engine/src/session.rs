//! The session: the only async loop in the engine.
//!
//! One task owns the surface, the shell state, and the dispatcher. Events
//! arrive on a bounded channel; while idle they feed the key-transition
//! machine, and while a command is in flight the loop multiplexes the
//! command's settlement, its streaming lines, and the event channel (where
//! only the cancellation chord and resize reports still matter).
//!
//! Resizes are debounced: the burst of reports a drag produces collapses into
//! one reflow, executed from the durable snapshot rather than whatever the
//! surface left behind.

use crate::{Prompt, redraw, transition};
use anyhow::Result;
use shell_commands::{
    Dispatcher, Effect, InvocationEnv, Outcome, Registry, settle,
};
use shell_events::Event;
use shell_geometry::ScreenPos;
use shell_state::ShellState;
use shell_surface::Surface;
use shell_vfs::Vfs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Host-side sink for effects the session cannot perform itself.
///
/// `OpenUrl` is the only one today: inside a real terminal there is no
/// browser to hand the link to, so hosts decide (print it, spawn a browser,
/// ignore it).
pub trait EffectPort: Send {
    fn open_url(&self, url: &str);
}

/// Default port: drops every outward effect.
pub struct NoopPort;

impl EffectPort for NoopPort {
    fn open_url(&self, _url: &str) {}
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user: String,
    pub host: String,
    pub symbol: String,
    pub history_cap: usize,
    pub resize_debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            host: "kiosk".to_string(),
            symbol: "$".to_string(),
            history_cap: 500,
            resize_debounce: Duration::from_millis(150),
        }
    }
}

pub struct Session<S: Surface> {
    surface: S,
    state: ShellState,
    dispatcher: Dispatcher,
    commands: Vec<&'static str>,
    vfs: Arc<Vfs>,
    port: Box<dyn EffectPort>,
    cfg: SessionConfig,
    cols: u16,
    rows: u16,
}

impl<S: Surface> Session<S> {
    pub fn new(surface: S, cfg: SessionConfig, port: Box<dyn EffectPort>) -> Self {
        let registry = Arc::new(Registry::builtin());
        let commands = registry.names();
        let vfs = Arc::new(Vfs::portfolio());
        let dispatcher = Dispatcher::new(registry, vfs.clone());
        let state = ShellState::new(&cfg.user, cfg.history_cap);
        let cols = surface.cols();
        let rows = surface.rows();
        Self {
            surface,
            state,
            dispatcher,
            commands,
            vfs,
            port,
            cfg,
            cols,
            rows,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    fn prompt(&self) -> Prompt {
        Prompt::new(&self.state.user, &self.cfg.host, &self.cfg.symbol)
    }

    /// Drive the session until the event channel closes or a shutdown event
    /// arrives.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<Event>) -> Result<()> {
        self.cols = self.surface.cols();
        self.rows = self.surface.rows();
        self.surface.write(&self.prompt().text())?;

        let mut pending_reflow: Option<Instant> = None;
        loop {
            tokio::select! {
                maybe = events.recv() => match maybe {
                    None | Some(Event::Shutdown) => break,
                    Some(Event::Resize(cols, rows)) => {
                        self.cols = cols;
                        self.rows = rows;
                        pending_reflow = Some(Instant::now() + self.cfg.resize_debounce);
                    }
                    Some(Event::Key(key)) => {
                        let prompt = self.prompt();
                        let t = transition::handle_key(
                            &mut self.state,
                            &prompt,
                            self.cols,
                            &self.commands,
                            &self.vfs,
                            &key,
                        );
                        if !t.writes.is_empty() {
                            self.surface.write(&t.writes)?;
                        }
                        if let Some(line) = t.submit {
                            self.execute(&line, events).await?;
                        }
                    }
                },
                _ = async {
                    if let Some(deadline) = pending_reflow {
                        tokio::time::sleep_until(deadline).await;
                    }
                }, if pending_reflow.is_some() => {
                    pending_reflow = None;
                    self.reflow()?;
                }
            }
        }
        Ok(())
    }

    /// Launch one submitted line and pump it to settlement. The single-flight
    /// gate is raised for the whole call; only cancellation and resize
    /// reports get through it.
    async fn execute(
        &mut self,
        line: &str,
        events: &mut mpsc::Receiver<Event>,
    ) -> Result<()> {
        let env = InvocationEnv {
            cwd: self.state.cwd.clone(),
            user: self.state.user.clone(),
            cols: self.cols,
            rows: self.rows,
            history: self.state.history.entries().to_vec(),
        };
        let running = match self.dispatcher.dispatch(line, env) {
            Ok(running) => running,
            Err(e) => {
                self.surface.write(&format!("{e}\r\n"))?;
                self.surface.write(&self.prompt().text())?;
                return Ok(());
            }
        };

        self.state.command_running = true;
        let (name, abort, mut lines, mut handle) = running.into_parts();
        let mut lines_open = true;
        let mut events_open = true;
        let outcome = loop {
            tokio::select! {
                joined = &mut handle => break settle(&name, abort.is_aborted(), joined),
                maybe = lines.recv(), if lines_open => match maybe {
                    Some(line) if !abort.is_aborted() => {
                        self.surface.write(&format!("{line}\r\n"))?;
                    }
                    Some(_) => {}
                    None => lines_open = false,
                },
                maybe = events.recv(), if events_open => match maybe {
                    Some(Event::Key(key)) if key.is_cancel() => abort.abort(),
                    Some(Event::Key(_)) => {
                        tracing::trace!(target: "engine.session", name = %name, "key_dropped_while_running");
                    }
                    Some(Event::Resize(cols, rows)) => {
                        self.cols = cols;
                        self.rows = rows;
                    }
                    Some(Event::Shutdown) | None => {
                        // The host is going away; treat it as a cancel so the
                        // command settles promptly.
                        abort.abort();
                        events_open = false;
                    }
                },
            }
        };

        // Progress lines buffered between the last poll and settlement.
        if !abort.is_aborted() {
            while let Ok(line) = lines.try_recv() {
                self.surface.write(&format!("{line}\r\n"))?;
            }
        }

        self.state.command_running = false;
        match outcome {
            Outcome::Cancelled => {
                self.surface.write("^C\r\n")?;
            }
            Outcome::Failed(message) => {
                self.surface.write(&format!("{message}\r\n"))?;
            }
            Outcome::Completed(result) => {
                for effect in &result.effects {
                    match effect {
                        Effect::SetCwd(cwd) => self.state.cwd = cwd.clone(),
                        Effect::SetUser(user) => self.state.user = user.clone(),
                        Effect::ClearScreen => self.surface.clear()?,
                        Effect::OpenUrl(url) => self.port.open_url(url),
                    }
                }
                if !result.output.is_empty() {
                    self.surface.write(&format!("{}\r\n", result.output))?;
                }
            }
        }
        self.surface.write(&self.prompt().text())?;
        Ok(())
    }

    /// Rebuild the visible input line after a resize settles. The surface's
    /// own line buffer is untrusted at this point; the durable snapshot is
    /// the source of truth.
    fn reflow(&mut self) -> Result<()> {
        self.state.restore();
        let prompt = self.prompt();
        let geom = prompt.geometry(self.cols);
        let writes = redraw::full_redraw(
            &prompt,
            self.state.buffer.text(),
            self.state.buffer.cursor(),
            self.state.buffer.len(),
            &geom,
            ScreenPos::new(0, 0),
        );
        self.surface.write(&writes)?;
        tracing::debug!(target: "engine.session", cols = self.cols, rows = self.rows, "reflow");
        Ok(())
    }
}
