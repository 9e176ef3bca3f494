use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;

use task_board::app::controller::TaskController;
use task_board::app::source::JsonFileSource;
use task_board::app::storage::TaskStore;
use task_board::app::ui::{draw_ui, run_app, TerminalView};
use task_board::app::view::DisplayConfig;
use task_board::config::Config;
use task_board::logging::init_tracing;

// Start the app.
// The controller is built here and lent to the event loop; nothing is global.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config.log_file)?;
    tracing::info!(source = %config.source.display(), "starting task board");

    let store = TaskStore::new(JsonFileSource::new(&config.source))?;
    let mut controller = TaskController::new(store, TerminalView::default(), DisplayConfig::default())
        .with_clock_interval(config.clock_interval());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Show the loading state while the document is read
    let res = match terminal.draw(|f| draw_ui(f, controller.view_mut())) {
        Ok(_) => {
            controller.initialize().await;
            run_app(&mut terminal, &mut controller, config.tick_rate())
        }
        Err(err) => Err(err),
    };
    controller.detach_input();

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }

    tracing::info!("task board closed");
    Ok(())
}
