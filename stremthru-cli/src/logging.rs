use std::fs::{File, OpenOptions};
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging for one CLI run.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr unless a
/// file is configured, stdout is reserved for command output.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;
    let file = config.file_path.as_deref().map(open_log_file).transpose()?;

    let registry = tracing_subscriber::registry().with(env_filter);
    match (config.format.as_str(), file) {
        ("json", Some(file)) => registry.with(fmt::layer().json().with_writer(file)).init(),
        ("json", None) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (_, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .init(),
        (_, None) => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

fn open_log_file(path: &str) -> std::io::Result<Arc<File>> {
    OpenOptions::new().create(true).append(true).open(path).map(Arc::new)
}

/// Parse a level name such as `warn` or `DEBUG`
pub fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))
}
