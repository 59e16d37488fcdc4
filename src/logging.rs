use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE: &str = "sto-claimer.log";

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Records go to a daily rotating file in the configured directory and, when
/// enabled, to the console. Keep the returned guard alive until exit so the
/// file writer can flush.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,sto_claimer={}", config.level)));

    let (file_layer, guard) = match file_writer(&config.dir) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });

    let file_logging_enabled = file_layer.is_some();
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: logging already initialized ({e})");
        return None;
    }

    if file_logging_enabled {
        tracing::info!("File logging enabled: {}/{}", config.dir.display(), LOG_FILE);
    }
    guard
}

/// `tracing_appender::rolling::daily` panics when it cannot create its first
/// file, so writability is checked first.
fn file_writer(dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "Warning: Could not create log directory {} ({}), file logging disabled",
            dir.display(),
            e
        );
        return None;
    }

    let probe = dir.join(".sto_write_test");
    match std::fs::OpenOptions::new().create(true).append(true).open(&probe) {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            Some(tracing_appender::non_blocking(appender))
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                dir.display(),
                e
            );
            None
        }
    }
}
