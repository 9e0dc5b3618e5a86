//! Development engine that fakes an analysis run.

use std::path::PathBuf;
use std::time::Duration;

use analyser_core::artifact::report_file_name;
use analyser_core::engine::{check_provider, AnalysisEngine, EngineError, EngineInput, EngineOutput};

/// Sleeps for a fixed delay, then writes a placeholder report where
/// [`FsArtifactStore`](crate::FsArtifactStore) will look for it.
pub struct SimulatedEngine {
    output_dir: PathBuf,
    delay: Duration,
}

impl SimulatedEngine {
    pub fn new(output_dir: PathBuf, delay: Duration) -> Self {
        Self { output_dir, delay }
    }
}

impl AnalysisEngine for SimulatedEngine {
    fn run(&self, input: &EngineInput) -> Result<EngineOutput, EngineError> {
        check_provider(&input.provider)?;

        tracing::debug!(
            ticker = %input.ticker,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating analysis run",
        );
        std::thread::sleep(self.delay);

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(report_file_name(&input.ticker, &input.provider));
        let summary = format!(
            "Simulated report for {} using {}",
            input.ticker, input.provider
        );
        let body = format!(
            "# {} Stock Analysis ({})\n\n{summary}.\n",
            input.ticker, input.current_year
        );
        std::fs::write(&path, body)?;

        Ok(EngineOutput { summary })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_report_into_output_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("output");
        let engine = SimulatedEngine::new(out.clone(), Duration::ZERO);

        let output = engine
            .run(&EngineInput {
                ticker: "NVDA".to_string(),
                provider: "gemini".to_string(),
                current_year: 2026,
            })
            .unwrap();

        assert_eq!(output.summary, "Simulated report for NVDA using gemini");
        let report = std::fs::read_to_string(out.join("NVDA_gemini_report.md")).unwrap();
        assert!(report.starts_with("# NVDA Stock Analysis (2026)"));
    }

    #[test]
    fn rejects_unknown_provider() {
        let temp = TempDir::new().unwrap();
        let engine = SimulatedEngine::new(temp.path().to_path_buf(), Duration::ZERO);
        assert_matches!(
            engine.run(&EngineInput {
                ticker: "NVDA".to_string(),
                provider: "nope".to_string(),
                current_year: 2026,
            }),
            Err(EngineError::UnsupportedProvider(_))
        );
    }
}
