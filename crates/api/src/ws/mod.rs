//! WebSocket infrastructure for analysis sessions.
//!
//! Each connection is handled by a [`ConnectionSupervisor`] which runs the
//! job and a listener for client actions side by side. Shared outbound
//! writes go through a [`ProgressEmitter`]; live sessions are tracked in the
//! [`SessionRegistry`].

pub mod dispatch;
pub mod emitter;
mod handler;
pub mod listener;
pub mod registry;
pub mod supervisor;

pub use dispatch::{ActionDispatcher, Flow};
pub use emitter::{BoxSink, ProgressEmitter};
pub use handler::ws_handler;
pub use listener::{BoxStream, ListenerExit};
pub use registry::SessionRegistry;
pub use supervisor::{ConnectionSupervisor, SessionOutcome};
