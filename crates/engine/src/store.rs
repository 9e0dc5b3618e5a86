//! Filesystem-backed report store.

use std::io::ErrorKind;
use std::path::PathBuf;

use analyser_core::artifact::{ArtifactError, ArtifactKey, ArtifactStore};
use async_trait::async_trait;

/// Reads reports from `<dir>/<ticker>_<provider>_report.md`.
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    fn key(&self, ticker: &str, provider: &str) -> ArtifactKey {
        ArtifactKey::new(&self.dir, ticker, provider)
    }

    async fn read(&self, key: &ArtifactKey) -> Result<String, ArtifactError> {
        let bytes = tokio::fs::read(key.path()).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ArtifactError::NotFound(key.to_string())
            } else {
                ArtifactError::Io {
                    path: key.to_string(),
                    source: e,
                }
            }
        })?;

        String::from_utf8(bytes).map_err(|_| ArtifactError::InvalidEncoding(key.to_string()))
    }
}
