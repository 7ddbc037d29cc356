//! Kiosk entrypoint: terminal attach, logging, input task, session loop.

use anyhow::Result;
use clap::Parser;
use shell_config::load_from;
use shell_engine::{Session, SessionConfig};
use shell_events::{EVENT_CHANNEL_CAP, Event};
use shell_surface::{CrosstermSurface, Surface};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod input;
mod port;

const BANNER: &str = "kiosk shell\r\nType 'help' to see what you can do.\r\n\r\n";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "kiosk", version, about = "Embedded-style portfolio shell")]
struct Args {
    /// Optional configuration file path (overrides discovery of `kiosk.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Override the configured prompt user.
    #[arg(long = "user")]
    pub user: Option<String>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("kiosk.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "kiosk.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; drop the guard so the writer
        // shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

async fn shutdown_input(
    shutdown: input::InputShutdown,
    handle: tokio::task::JoinHandle<()>,
) {
    shutdown.signal();
    match tokio::time::timeout(Duration::from_millis(200), handle).await {
        Ok(Ok(())) => trace!(target: "runtime.shutdown", "input_task_joined"),
        Ok(Err(err)) if err.is_cancelled() => {
            trace!(target: "runtime.shutdown", "input_task_cancelled")
        }
        Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "input_task_join_failed"),
        Err(_) => warn!(target: "runtime.shutdown", "input_task_join_timeout"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    info!(
        target: "runtime",
        config_override = args.config.is_some(),
        user_override = args.user.is_some(),
        "startup"
    );

    let surface =
        CrosstermSurface::attach(config.surface.attach_retries, config.attach_interval()).await?;

    let session_config = SessionConfig {
        user: args.user.unwrap_or_else(|| config.prompt.user.clone()),
        host: config.prompt.host.clone(),
        symbol: config.prompt.symbol.clone(),
        history_cap: config.shell.history_cap,
        resize_debounce: config.resize_debounce(),
    };

    let (tx, mut rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = input::spawn_input(tx.clone());

    let mut session = Session::new(surface, session_config, Box::new(port::LoggingPort));
    session.surface_mut().write(BANNER)?;
    let result = session.run(&mut rx).await;

    drop(tx);
    shutdown_input(input_shutdown, input_task).await;
    info!(target: "runtime.shutdown", "complete");
    result
}
