//! Engine backed by an external command.
//!
//! The command receives its inputs through environment variables and is
//! expected to write its report to `$OUTPUT_DIR/<ticker>_<provider>_report.md`.
//! The call blocks until the child exits; there is no way to interrupt it
//! from the caller's side.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use analyser_core::engine::{check_provider, AnalysisEngine, EngineError, EngineInput, EngineOutput};

/// Maximum number of stderr bytes kept in an [`EngineError::ExecutionFailed`].
///
/// The tail is kept since that is where tracebacks end.
const MAX_STDERR_BYTES: usize = 4096;

pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    output_dir: PathBuf,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>, output_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            args,
            output_dir,
        }
    }
}

impl AnalysisEngine for CommandEngine {
    fn run(&self, input: &EngineInput) -> Result<EngineOutput, EngineError> {
        check_provider(&input.provider)?;

        tracing::info!(
            program = %self.program,
            ticker = %input.ticker,
            provider = %input.provider,
            "Starting analysis engine",
        );
        let start = Instant::now();

        let output = Command::new(&self.program)
            .args(&self.args)
            .env("STOCK_TICKER", &input.ticker)
            .env("LLM_CHOICE", &input.provider)
            .env("CURRENT_YEAR", input.current_year.to_string())
            .env("OUTPUT_DIR", &self.output_dir)
            .stdin(Stdio::null())
            .output()?;

        let duration_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            tracing::warn!(ticker = %input.ticker, exit_code, duration_ms, "Analysis engine failed");
            return Err(EngineError::ExecutionFailed {
                exit_code,
                stderr: stderr_tail(&output.stderr),
            });
        }

        tracing::info!(ticker = %input.ticker, duration_ms, "Analysis engine finished");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let summary = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(EngineOutput { summary })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(MAX_STDERR_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
