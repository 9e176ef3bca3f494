use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Installs the global subscriber, appending to `log_file`.
//
// The filter comes from `TASK_BOARD_LOG` (default `task_board=info`);
// `TASK_BOARD_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_env("TASK_BOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("task_board=info,warn"));
    let format = std::env::var("TASK_BOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);
    let writer = Mutex::new(file);

    match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(writer))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
            .try_init(),
    }
    .context("tracing subscriber already installed")
}
