//! Routing of client actions to handlers.
//!
//! Handlers are looked up by action name. Adding a command means
//! registering one more handler; unknown names are rejected uniformly with
//! the list of registered ones.

use std::collections::BTreeMap;

use analyser_core::action::ActionMessage;
use analyser_core::job_events::ACTION_CANCEL;
use analyser_core::request::AnalysisRequest;
use analyser_core::types::ConnId;
use tokio_util::sync::CancellationToken;

/// What the listener does after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Result of routing one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled(Flow),
    Unknown,
}

/// State a handler may act on.
pub struct ActionContext {
    pub conn_id: ConnId,
    pub request: AnalysisRequest,
    /// Cancellation signal shared with the job runner.
    pub cancel: CancellationToken,
}

pub type ActionHandler = Box<dyn Fn(&ActionContext, &ActionMessage) -> Flow + Send + Sync>;

pub struct ActionDispatcher {
    handlers: BTreeMap<String, ActionHandler>,
}

impl ActionDispatcher {
    /// A dispatcher with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register `handler` under `action`, replacing any previous one.
    pub fn register<F>(mut self, action: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ActionContext, &ActionMessage) -> Flow + Send + Sync + 'static,
    {
        self.handlers.insert(action.into(), Box::new(handler));
        self
    }

    /// Registered action names, sorted.
    pub fn available_actions(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn dispatch(&self, ctx: &ActionContext, message: &ActionMessage) -> Dispatch {
        match self.handlers.get(&message.action) {
            Some(handler) => Dispatch::Handled(handler(ctx, message)),
            None => Dispatch::Unknown,
        }
    }
}

impl Default for ActionDispatcher {
    /// The built-in action set: `cancel`.
    fn default() -> Self {
        Self::empty().register(ACTION_CANCEL, handle_cancel)
    }
}

/// Trip the job's cancellation token and stop listening.
fn handle_cancel(ctx: &ActionContext, _message: &ActionMessage) -> Flow {
    tracing::info!(
        conn_id = %ctx.conn_id,
        ticker = %ctx.request.ticker(),
        "Received cancel request",
    );
    ctx.cancel.cancel();
    Flow::Stop
}
