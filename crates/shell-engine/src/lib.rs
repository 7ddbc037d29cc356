//! The input/editing engine: prompt metrics, minimal-redraw composition, the
//! key-transition function, and the session loop that ties the surface, the
//! dispatcher, and resize reflow together.
//!
//! Layering mirrors the data flow: `prompt` derives metrics, `redraw`
//! composes write strings from geometry, `transition` is the surface-free
//! state machine, and `session` owns the only async loop.

pub mod prompt;
pub mod redraw;
pub mod session;
pub mod transition;

pub use prompt::Prompt;
pub use session::{EffectPort, NoopPort, Session, SessionConfig};
pub use transition::{Transition, handle_key};
