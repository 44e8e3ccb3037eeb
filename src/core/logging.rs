use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::config::LoggingConfig;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber. Stdout always; a daily rolling file when
/// `logging.dir` is configured. `RUST_LOG` takes precedence over `logging.level`.
pub fn init(config: &LoggingConfig, file_prefix: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = config
        .dir
        .as_deref()
        .and_then(|dir| file_writer(dir, file_prefix))
        .map(|writer| {
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
        });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}

fn file_writer(log_dir: &Path, file_prefix: &str) -> Option<NonBlocking> {
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log dir {}: {}", log_dir.display(), err);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, format!("{}.log", file_prefix));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
