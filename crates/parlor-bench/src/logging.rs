use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::{self, format::FmtSpan};

use crate::config::{LoggingConfig, ResolvedOutputs};

const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Crates whose events reach the telemetry file when `RUST_LOG` is unset.
const TRACED_CRATES: [&str; 2] = ["parlor_bench", "parlor_bot"];

/// Keeps the background writer alive; dropping it flushes the file.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Where the run's JSON events land: beside the summary markdown.
pub fn telemetry_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .join(TELEMETRY_FILE)
}

/// One directive per traced crate at the configured level, so dependency
/// noise stays out of the file. `RUST_LOG` replaces it wholesale.
pub fn telemetry_filter(logging: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = logging
        .level()
        .unwrap_or(Level::INFO)
        .as_str()
        .to_ascii_lowercase();
    TRACED_CRATES
        .iter()
        .filter_map(|krate| format!("{krate}={level}").parse::<Directive>().ok())
        .fold(EnvFilter::new("off"), EnvFilter::add_directive)
}

pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = telemetry_path(outputs);
    let file = open_telemetry(&telemetry_path)?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(telemetry_filter(logging))
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Several runs may share a process; the first subscriber stays.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        event!(
            target: "parlor_bench::run",
            Level::INFO,
            telemetry = %telemetry_path.display(),
            level = %logging.tracing_level,
            "telemetry opened"
        );
    }

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path,
    }))
}

fn open_telemetry(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("creating telemetry file at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(dir: &Path) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: dir.join("hands.jsonl"),
            summary_md: dir.join("out").join("summary.md"),
        }
    }

    #[test]
    fn disabled_logging_creates_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let guard = init_logging(&LoggingConfig::default(), &outputs(dir.path())).expect("init");
        assert!(guard.is_none());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn bare_summary_name_logs_to_the_working_directory() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("hands.jsonl"),
            summary_md: PathBuf::from("summary.md"),
        };
        assert_eq!(telemetry_path(&outputs), Path::new(".").join("telemetry.jsonl"));
    }

    #[test]
    fn configured_level_scopes_to_parlor_crates() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: "debug".to_string(),
        };
        let filter = telemetry_filter(&logging).to_string().to_ascii_lowercase();
        assert!(filter.contains("parlor_bench=debug"));
        assert!(filter.contains("parlor_bot=debug"));
    }

    #[test]
    fn structured_logging_writes_beside_the_summary() {
        let dir = tempfile::tempdir().expect("temp dir");
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: "debug".to_string(),
        };
        let guard = init_logging(&logging, &outputs(dir.path()))
            .expect("init")
            .expect("guard");
        assert_eq!(guard.telemetry_path, dir.path().join("out").join(TELEMETRY_FILE));
        assert!(guard.telemetry_path.exists());
    }
}
