//! Command contract and execution pipeline.
//!
//! Commands are registered in a name -> implementation table and invoked with
//! `(args, CommandContext)`; each invocation gets a fresh context and a fresh
//! abort pair, and at most one command is in flight at a time (the engine's
//! single-flight gate enforces that, not this crate). Results carry typed
//! side-effect descriptors instead of dispatching ambient events; the owning
//! session translates them into calls on its injected ports.

use shell_vfs::Vfs;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

mod abort;
pub mod builtins;
mod dispatch;

pub use abort::{AbortHandle, AbortSignal, abort_pair};
pub use dispatch::{DispatchError, Dispatcher, InvocationEnv, Outcome, RunningCommand, settle};

/// Capacity of the per-invocation streaming line channel.
pub const LINE_CHANNEL_CAP: usize = 64;

/// Typed side effect a command asks the owning session to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetCwd(String),
    SetUser(String),
    /// The command already owns the screen contents; the session clears and
    /// re-prompts without duplicating output.
    ClearScreen,
    OpenUrl(String),
}

/// Terminal outcome of one command. Exit codes map 1:1 onto `success`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub success: bool,
    pub effects: Vec<Effect>,
}

impl CommandResult {
    pub fn ok<S: Into<String>>(output: S) -> Self {
        Self {
            output: output.into(),
            success: true,
            effects: Vec::new(),
        }
    }

    pub fn fail<S: Into<String>>(output: S) -> Self {
        Self {
            output: output.into(),
            success: false,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Immutable-per-invocation bundle handed to every command. Owned by the
/// dispatcher, constructed fresh per submitted line, discarded after the
/// command settles.
#[derive(Clone)]
pub struct CommandContext {
    pub cwd: String,
    pub user: String,
    pub cols: u16,
    pub rows: u16,
    pub vfs: Arc<Vfs>,
    /// Streaming line writer for long-running commands; lines sent here are
    /// rendered while the command is still in flight.
    pub lines: mpsc::Sender<String>,
    pub abort: AbortSignal,
    /// Submission history at dispatch time (for `history`).
    pub history: Vec<String>,
}

pub type CommandFuture = Pin<Box<dyn Future<Output = anyhow::Result<CommandResult>> + Send>>;

/// Uniform command contract. Long-running implementations must check the
/// context's abort signal themselves; the dispatcher only guarantees that an
/// aborted command's result is never rendered.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn summary(&self) -> &'static str;
    fn run(&self, args: Vec<String>, ctx: CommandContext) -> CommandFuture;
}

/// Name -> command table. Lookup is verbatim: no fuzzy matching, no aliasing
/// beyond what is registered.
#[derive(Default)]
pub struct Registry {
    table: std::collections::BTreeMap<&'static str, Arc<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Command + 'static>(&mut self, command: C) {
        self.table.insert(command.name(), Arc::new(command));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.table.get(name).cloned()
    }

    /// Registered names in lexicographic order (the completion source).
    pub fn names(&self) -> Vec<&'static str> {
        self.table.keys().copied().collect()
    }

    /// `(name, summary)` pairs in lexicographic order.
    pub fn catalog(&self) -> Vec<(&'static str, &'static str)> {
        self.table
            .values()
            .map(|c| (c.name(), c.summary()))
            .collect()
    }

    /// The full builtin catalog.
    pub fn builtin() -> Self {
        builtins::install()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_sorted() {
        let registry = Registry::builtin();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"help"));
    }

    #[test]
    fn lookup_is_verbatim() {
        let registry = Registry::builtin();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("ECHO").is_none());
        assert!(registry.get("ech").is_none());
    }
}
