use std::collections::HashMap;
use std::time::Duration;

use analyser_core::request::AnalysisRequest;
use analyser_core::types::{ConnId, Timestamp};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// How often [`SessionRegistry::drain`] re-checks the session count.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Metadata for one live analysis session.
pub struct Session {
    pub ticker: String,
    pub provider: String,
    /// The job's cancellation token.
    pub cancel: CancellationToken,
    pub connected_at: Timestamp,
}

/// Tracks every connection that is currently running a job.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session. Re-using a `conn_id` replaces the previous entry.
    pub async fn add(&self, conn_id: ConnId, request: &AnalysisRequest, cancel: CancellationToken) {
        let session = Session {
            ticker: request.ticker().to_string(),
            provider: request.provider().to_string(),
            cancel,
            connected_at: chrono::Utc::now(),
        };
        self.sessions.write().await.insert(conn_id, session);
    }

    pub async fn remove(&self, conn_id: &str) {
        self.sessions.write().await.remove(conn_id);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Connection IDs of sessions whose jobs share the artifact key
    /// `(ticker, provider)`.
    pub async fn sessions_for(&self, ticker: &str, provider: &str) -> Vec<ConnId> {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.ticker == ticker && s.provider == provider)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Trip every session's cancellation token. Sessions deregister
    /// themselves once their handlers return.
    ///
    /// Returns the number of sessions signalled.
    pub async fn cancel_all(&self) -> usize {
        let sessions = self.sessions.read().await;
        for (conn_id, session) in sessions.iter() {
            tracing::debug!(
                conn_id = %conn_id,
                ticker = %session.ticker,
                age_secs = (chrono::Utc::now() - session.connected_at).num_seconds(),
                "Cancelling session",
            );
            session.cancel.cancel();
        }
        let count = sessions.len();
        tracing::info!(count, "Cancelled all analysis sessions");
        count
    }

    /// Wait until no sessions remain or `timeout` elapses.
    ///
    /// Returns `true` if the registry drained in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let wait = async {
            while self.session_count().await > 0 {
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
