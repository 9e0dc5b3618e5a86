use std::path::PathBuf;
use std::time::Duration;

use analyser_engine::finnhub::DEFAULT_BASE_URL;

/// Which analysis engine the server drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineConfig {
    /// Run an external program per job.
    Command { program: String, args: Vec<String> },
    /// Fake the run with a fixed delay (development default).
    Simulated { delay: Duration },
}

/// Credentials for the Finnhub ticker lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for running sessions, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory the engine writes reports to (default: `output`).
    pub output_dir: PathBuf,
    pub engine: EngineConfig,
    /// `None` when `FINNHUB_API_KEY` is unset; validation is then format-only.
    pub finnhub: Option<FinnhubConfig>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                                  |
    /// |-----------------------------|------------------------------------------|
    /// | `HOST`                      | `0.0.0.0`                                |
    /// | `PORT`                      | `8000`                                   |
    /// | `CORS_ORIGINS`              | `http://localhost,http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                                     |
    /// | `OUTPUT_DIR`                | `output`                                 |
    /// | `ENGINE_COMMAND`            | unset (simulated engine)                 |
    /// | `ENGINE_ARGS`               | empty                                    |
    /// | `SIMULATED_ENGINE_DELAY_MS` | `2000`                                   |
    /// | `FINNHUB_API_KEY`           | unset                                    |
    /// | `FINNHUB_BASE_URL`          | `https://finnhub.io/api/v1`              |
    /// | `LOG_FORMAT`                | `pretty`                                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost,http://localhost:3000".into()),
            ',',
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let output_dir =
            PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".into()));

        let engine = match non_empty_var("ENGINE_COMMAND") {
            Some(program) => EngineConfig::Command {
                program,
                args: std::env::var("ENGINE_ARGS")
                    .map(|a| a.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
            },
            None => {
                let delay_ms: u64 = std::env::var("SIMULATED_ENGINE_DELAY_MS")
                    .unwrap_or_else(|_| "2000".into())
                    .parse()
                    .expect("SIMULATED_ENGINE_DELAY_MS must be a valid u64");
                EngineConfig::Simulated {
                    delay: Duration::from_millis(delay_ms),
                }
            }
        };

        let finnhub = non_empty_var("FINNHUB_API_KEY").map(|api_key| FinnhubConfig {
            api_key,
            base_url: std::env::var("FINNHUB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        });

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            output_dir,
            engine,
            finnhub,
            log_format,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list("http://localhost, ,http://localhost:3000,", ','),
            vec!["http://localhost", "http://localhost:3000"]
        );
    }
}
