//! Host-side effect ports.
//!
//! Inside a plain terminal there is no embedding page to hand a URL to, so
//! the host port records the request in the log; the command's own output
//! already tells the user where to go.

use shell_engine::EffectPort;
use tracing::info;

pub struct LoggingPort;

impl EffectPort for LoggingPort {
    fn open_url(&self, url: &str) {
        info!(target: "runtime.port", url, "open_url");
    }
}
