//! Resolution and execution of one submitted line.
//!
//! The only synchronous failure path is an unknown name; everything else is
//! an asynchronous settlement. On settlement the abort flag is checked before
//! any output is surfaced, so a slow command that resolves after a cancel can
//! never clobber output written after the cancellation notice.

use crate::{
    AbortHandle, Command, CommandContext, CommandResult, LINE_CHANNEL_CAP, Registry, abort_pair,
};
use shell_vfs::Vfs;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("empty command line")]
    Empty,
}

/// Shell-level values captured at dispatch time. The context is built from
/// this copy so a command observes a consistent view even if the shell state
/// changes while it runs.
#[derive(Debug, Clone)]
pub struct InvocationEnv {
    pub cwd: String,
    pub user: String,
    pub cols: u16,
    pub rows: u16,
    pub history: Vec<String>,
}

/// Final disposition of a settled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(CommandResult),
    /// The abort signal fired before settlement; the command's own result has
    /// been discarded.
    Cancelled,
    /// The command future rejected; surfaced as a diagnostic line, never as a
    /// crash.
    Failed(String),
}

/// A command in flight: the abort handle, the streaming line channel, and the
/// join handle the session polls.
#[derive(Debug)]
pub struct RunningCommand {
    name: String,
    abort: AbortHandle,
    pub lines: mpsc::Receiver<String>,
    handle: JoinHandle<anyhow::Result<CommandResult>>,
}

impl RunningCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Poll the command future (used inside the session's `select!`).
    pub async fn join(&mut self) -> Outcome {
        let joined = (&mut self.handle).await;
        settle(&self.name, self.abort.is_aborted(), joined)
    }

    /// Split into the pieces the session's select loop borrows independently:
    /// the join handle, the line stream, and the abort handle.
    pub fn into_parts(
        self,
    ) -> (
        String,
        AbortHandle,
        mpsc::Receiver<String>,
        JoinHandle<anyhow::Result<CommandResult>>,
    ) {
        (self.name, self.abort, self.lines, self.handle)
    }

    /// Drain and settle without a surrounding select loop (tests, non-
    /// interactive hosts). Streamed lines are discarded.
    pub async fn join_discarding_stream(mut self) -> Outcome {
        self.lines.close();
        self.join().await
    }
}

/// Classify a joined command future. The abort flag wins over whatever the
/// future resolved to, so late output from a cancelled command is discarded.
pub fn settle(
    name: &str,
    aborted: bool,
    joined: Result<anyhow::Result<CommandResult>, tokio::task::JoinError>,
) -> Outcome {
    let outcome = match joined {
        _ if aborted => Outcome::Cancelled,
        Ok(Ok(result)) => Outcome::Completed(result),
        Ok(Err(e)) => Outcome::Failed(format!("Command error: {e}")),
        Err(e) => {
            tracing::error!(target: "dispatch", error = %e, name, "join_failed");
            Outcome::Failed("Command error: internal task failure".to_string())
        }
    };
    tracing::debug!(
        target: "dispatch",
        name,
        outcome = match &outcome {
            Outcome::Completed(r) if r.success => "ok",
            Outcome::Completed(_) => "failed",
            Outcome::Cancelled => "cancelled",
            Outcome::Failed(_) => "error",
        },
        "settled"
    );
    outcome
}

pub struct Dispatcher {
    registry: Arc<Registry>,
    vfs: Arc<Vfs>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, vfs: Arc<Vfs>) -> Self {
        Self { registry, vfs }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve the first whitespace-separated token and launch the command
    /// with a fresh context and abort pair.
    pub fn dispatch(
        &self,
        line: &str,
        env: InvocationEnv,
    ) -> Result<RunningCommand, DispatchError> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(DispatchError::Empty)?;
        let command: Arc<dyn Command> = self
            .registry
            .get(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;
        let args: Vec<String> = tokens.map(str::to_string).collect();

        let (abort, signal) = abort_pair();
        let (line_tx, line_rx) = mpsc::channel(LINE_CHANNEL_CAP);
        let ctx = CommandContext {
            cwd: env.cwd,
            user: env.user,
            cols: env.cols,
            rows: env.rows,
            vfs: self.vfs.clone(),
            lines: line_tx,
            abort: signal,
            history: env.history,
        };

        tracing::info!(target: "dispatch", name, arg_count = args.len(), "launch");
        let future = command.run(args, ctx);
        let handle = tokio::spawn(future);

        Ok(RunningCommand {
            name: name.to_string(),
            abort,
            lines: line_rx,
            handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandFuture, Effect};
    use std::time::Duration;

    fn env() -> InvocationEnv {
        InvocationEnv {
            cwd: "/".into(),
            user: "guest".into(),
            cols: 80,
            rows: 24,
            history: Vec::new(),
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(Registry::builtin()), Arc::new(Vfs::portfolio()))
    }

    struct Explode;
    impl Command for Explode {
        fn name(&self) -> &'static str {
            "explode"
        }
        fn summary(&self) -> &'static str {
            "always rejects"
        }
        fn run(&self, _args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
            Box::pin(async { anyhow::bail!("boom") })
        }
    }

    #[tokio::test]
    async fn unknown_name_fails_synchronously() {
        let err = dispatcher().dispatch("frobnicate now", env()).unwrap_err();
        assert_eq!(err, DispatchError::NotFound("frobnicate".into()));
        assert_eq!(err.to_string(), "frobnicate: command not found");
    }

    #[tokio::test]
    async fn echo_completes_with_output() {
        let running = dispatcher().dispatch("echo hello world", env()).unwrap();
        match running.join_discarding_stream().await {
            Outcome::Completed(res) => {
                assert!(res.success);
                assert_eq!(res.output, "hello world");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejection_is_caught_at_the_boundary() {
        let mut registry = Registry::builtin();
        registry.register(Explode);
        let d = Dispatcher::new(Arc::new(registry), Arc::new(Vfs::portfolio()));
        let running = d.dispatch("explode", env()).unwrap();
        match running.join_discarding_stream().await {
            Outcome::Failed(line) => assert_eq!(line, "Command error: boom"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_discards_late_output() {
        // `sleep` resolves with output eventually; aborting first must win.
        let running = dispatcher().dispatch("sleep 5", env()).unwrap();
        running.abort_handle().abort();
        match running.join_discarding_stream().await {
            Outcome::Cancelled => {}
            other => panic!("aborted command surfaced a result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn abort_after_success_still_discards() {
        // Settlement order: command finished, then the abort flag fired
        // before the session could render. Output must be discarded.
        let running = dispatcher().dispatch("echo late", env()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        running.abort_handle().abort();
        match running.join_discarding_stream().await {
            Outcome::Cancelled => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_reports_screen_effect() {
        let running = dispatcher().dispatch("clear", env()).unwrap();
        match running.join_discarding_stream().await {
            Outcome::Completed(res) => {
                assert!(res.effects.contains(&Effect::ClearScreen));
                assert!(res.output.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sleep_streams_progress_lines() {
        let mut running = dispatcher().dispatch("sleep 1", env()).unwrap();
        let first = tokio::time::timeout(Duration::from_secs(5), running.lines.recv())
            .await
            .expect("progress line before settlement");
        assert!(first.is_some());
        let _ = running.join().await;
    }
}
