//! Cooperative cancellation pair.
//!
//! The handle side flags the signal and wakes any waiter; the signal side is
//! cloned into the command context. Cancellation does not forcibly interrupt
//! a command's internal logic; well-behaved long-running commands await
//! [`AbortSignal::cancelled`] in their loops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Clone, Debug)]
pub struct AbortHandle {
    inner: Arc<Inner>,
}

#[derive(Clone, Debug)]
pub struct AbortSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

pub fn abort_pair() -> (AbortHandle, AbortSignal) {
    let inner = Arc::new(Inner {
        flag: AtomicBool::new(false),
        notify: Notify::new(),
    });
    (
        AbortHandle {
            inner: inner.clone(),
        },
        AbortSignal { inner },
    )
}

impl AbortHandle {
    pub fn abort(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once the handle aborts. Registers the waiter before checking
    /// the flag so a concurrent abort cannot be missed.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}
