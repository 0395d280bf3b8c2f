//! Global logging system.

use std::{
    path::Path,
    fs::File,
    sync::Arc,
    env,
    panic,
};
use anyhow::*;
use backtrace::Backtrace;
use tracing_subscriber::{
    fmt::{
        self,
        time::uptime,
    },
    prelude::*,
    Registry,
    EnvFilter,
};


/// Default logging environment filter. Our crates are debug, everything else is warn.
const DEFAULT_FILTER: &'static str = "warn,pseudo3d=debug,sandbox=debug";

pub const LOG_FILE_NAME: &'static str = "log";

/// Log to stdout and [`LOG_FILE_NAME`] in the working directory. See [`init_logging_to`].
pub fn init_logging() -> Result<()> {
    init_logging_to(LOG_FILE_NAME)
}

/// Install a `tracing` backend writing to stdout and to a fresh file at `log_path`.
///
/// `RUST_LOG` filters are appended to the defaults. Also routes panic messages, with a
/// backtrace, through the logging system. Errors if the log file can't be created or a global
/// subscriber is already installed, in which case the panic hook is left alone.
pub fn init_logging_to(log_path: impl AsRef<Path>) -> Result<()> {
    let log_path = log_path.as_ref();
    let format = fmt::format()
        .compact()
        .with_timer(uptime())
        .with_line_number(true);
    let stdout_log = fmt::layer()
        .event_format(format);

    let log_file = File::create(log_path)
        .with_context(|| format!("unable to create log file {}", log_path.display()))?;
    let log_file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    let mut filter = DEFAULT_FILTER.to_owned();
    if let Some(env_filter) = env::var(EnvFilter::DEFAULT_ENV).ok() {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(stdout_log)
        .with(log_file_log);
    tracing::subscriber::set_global_default(subscriber)
        .context("unable to install log subscriber")?;
    info!(path = %log_path.display(), "logging initialized");

    panic::set_hook(Box::new(|info| {
        error!("{}", info);
        if env::var("RUST_BACKTRACE").map(|val| val == "1").unwrap_or(true) {
            error!("{:?}", Backtrace::new());
        }
    }));
    trace!("installed custom panic hook");
    Ok(())
}


#[test]
fn test_init_logging_once() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("pseudo3d-{}-log", std::process::id()));
    init_logging_to(&path).unwrap();
    assert!(path.exists());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("logging initialized"), "log was {:?}", contents);

    // only one global subscriber per process
    let again = dir.join(format!("pseudo3d-{}-log-again", std::process::id()));
    assert!(init_logging_to(&again).is_err());
    assert!(init_logging_to(dir.join("no-such-dir").join("log")).is_err());
    std::fs::remove_file(&path).ok();
    std::fs::remove_file(&again).ok();
}
