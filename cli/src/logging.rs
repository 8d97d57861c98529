use std::path::PathBuf;

use skillwave_core::api::{CliError, LogRotation, LoggingConfig};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

/// Install the subscriber for one planning run.
///
/// Stdout carries the plan, so the console layer always writes to stderr.
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), CliError> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(scoped_directives(&logging.level))
            .map_err(|e| CliError::Config(format!("invalid logging.level: {e}")))?,
    };

    let file_writer = if logging.file {
        let appender = plan_log_appender(logging)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(non_blocking)
    } else {
        None
    };

    if !logging.console && file_writer.is_none() {
        return Err(CliError::Config(
            "logging enabled but both console and file are off".to_string(),
        ));
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = file_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Command(format!("tracing init failed: {e}")))
}

/// A bare level applies to skillwave targets only; HTTP client crates stay at
/// `warn`. Anything with an explicit directive is passed through untouched.
pub(crate) fn scoped_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return "warn,skillwave=info".to_string();
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    format!("warn,skillwave={level},skillwave_core={level},skillwave_plugins={level},skillwave_cli={level}")
}

fn rotation_of(kind: LogRotation) -> Rotation {
    match kind {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

fn plan_log_appender(logging: &LoggingConfig) -> Result<RollingFileAppender, CliError> {
    let dir = match logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(d) => PathBuf::from(d),
        None => std::env::temp_dir().join("skillwave"),
    };
    std::fs::create_dir_all(&dir)?;

    let prefix = match logging.file_prefix.trim() {
        "" => "skillwave-plan.log",
        p => p,
    };
    Ok(RollingFileAppender::new(
        rotation_of(logging.rotation),
        dir,
        prefix,
    ))
}
