use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the non-blocking log worker alive for the run; dropping the guard
/// flushes whatever the worker still buffers.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// Where the structured events are being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Installs the structured-event subscriber when the config asks for one:
/// JSON lines written next to the summary, filtered at the configured level
/// unless `RUST_LOG` overrides it. Returns `None` with nothing installed
/// when structured logging is disabled.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let path = event_log_path(outputs);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory at {}", dir.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("creating event log at {}", path.display()))?;

    // Lossless: a benchmark that silently drops decision events is worse
    // than one that stalls on a slow disk.
    let (writer, worker) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter(logging))
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A test harness may have installed a subscriber already; keep theirs.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _worker: worker,
        path,
    }))
}

fn event_log_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("events.jsonl")
}

fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    let level = logging.level().unwrap_or(Level::INFO);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::event_log_path;
    use crate::config::ResolvedOutputs;
    use std::path::PathBuf;

    #[test]
    fn event_log_lands_next_to_the_summary() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("bench/out/run/matches.jsonl"),
            summary_md: PathBuf::from("bench/out/run/summary.md"),
            plots_dir: PathBuf::from("bench/out/run/plots"),
        };
        assert_eq!(
            event_log_path(&outputs),
            PathBuf::from("bench/out/run/events.jsonl")
        );
    }
}
