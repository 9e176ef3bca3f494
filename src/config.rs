use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal task board", long_about = None)]
pub struct Config {
    /// JSON document the task list is seeded from.
    #[arg(long, env = "TASK_BOARD_SOURCE", default_value = "data/db.json")]
    pub source: PathBuf,

    /// How often the UI polls for input, in milliseconds.
    #[arg(long, env = "TASK_BOARD_TICK_MS", default_value_t = 250)]
    pub tick_ms: u64,

    /// How often the "Updated at" clock refreshes, in seconds.
    #[arg(long, env = "TASK_BOARD_CLOCK_INTERVAL_SECS", default_value_t = 60)]
    pub clock_interval_secs: u64,

    /// Where diagnostics go; the terminal belongs to the UI.
    #[arg(long, env = "TASK_BOARD_LOG_FILE", default_value = "task_board.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_secs(self.clock_interval_secs.max(1))
    }
}
