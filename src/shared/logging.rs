use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking writers flushing. Drop it only at process exit.
pub struct LogGuards {
    _file: WorkerGuard,
    _console: WorkerGuard,
}

/// Console + daily-rolling file logging, filtered by `RUST_LOG` (default `info`).
pub fn init_logging(log_dir: &Path, service_name: &str) -> Result<LogGuards, anyhow::Error> {
    let rotated = rotate_logs_on_startup(log_dir, service_name)?;
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, format!("{service_name}.log"));
    let (file_writer, file_guard) = non_blocking(file_appender);
    let (console_writer, console_guard) = non_blocking(std::io::stdout());

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(console_writer)
        .with_ansi(true)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    info!("Logging initialized, writing to {}/{service_name}.log", log_dir.display());
    if let Some(backup) = rotated {
        info!("Previous log file backed up to: {backup}");
    }

    Ok(LogGuards {
        _file: file_guard,
        _console: console_guard,
    })
}

/// Moves the previous run's log aside with a timestamp suffix.
fn rotate_logs_on_startup(log_dir: &Path, service_name: &str) -> Result<Option<String>, anyhow::Error> {
    let log_path = log_dir.join(format!("{service_name}.log"));
    if !log_path.exists() {
        return Ok(None);
    }

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let backup = log_dir.join(format!("{service_name}.{timestamp}.log"));
    std::fs::rename(&log_path, &backup)?;

    Ok(Some(backup.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_a_noop_without_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        assert!(rotate_logs_on_startup(dir.path(), "gamehost").unwrap().is_none());
    }

    #[test]
    fn rotation_moves_previous_log_aside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gamehost.log"), "old run").unwrap();

        let backup = rotate_logs_on_startup(dir.path(), "gamehost").unwrap().unwrap();

        assert!(!dir.path().join("gamehost.log").exists());
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "old run");
    }
}
