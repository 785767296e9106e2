use std::path::Path;
use steward_core::AppConfig;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr and file layers. `log_level` and `log_file_path` come
/// from the configuration, so `STEWARD_LOG_LEVEL` and `STEWARD_LOG_FILE_PATH`
/// override them like every other setting.
///
/// The returned guard flushes the file writer when dropped.
pub fn init_logger(config: &AppConfig) -> impl Drop {
    let filter_layer = EnvFilter::new(&config.log_level);

    let log_file = Path::new(&config.log_file_path);
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "steward.log".into());

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    info!(
        "Logging at {} to stderr and {}",
        config.log_level,
        log_file.display()
    );

    guard
}
