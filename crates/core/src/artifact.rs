//! Report artifacts produced by the engine, keyed by `(ticker, provider)`.
//!
//! Concurrent jobs for the same key on different connections write and read
//! the same artifact without coordination.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Location of the report for one `(ticker, provider)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    path: PathBuf,
}

impl ArtifactKey {
    /// `<dir>/<ticker>_<provider>_report.md`
    pub fn new(dir: &Path, ticker: &str, provider: &str) -> Self {
        Self {
            path: dir.join(report_file_name(ticker, provider)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// File name of a report, shared by the engines that write it and the
/// store that reads it.
pub fn report_file_name(ticker: &str, provider: &str) -> String {
    format!("{ticker}_{provider}_report.md")
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Failed to read report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Report {0} is not valid UTF-8")]
    InvalidEncoding(String),
}

/// Read access to report artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Key under which the report for this pair is stored.
    fn key(&self, ticker: &str, provider: &str) -> ArtifactKey;

    /// Load the report content.
    async fn read(&self, key: &ArtifactKey) -> Result<String, ArtifactError>;
}
