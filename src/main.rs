use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use taskboard::{
    config::{Cli, Config},
    error::AppError,
    logging,
    storage::{FileStorage, KeyValueStorage, MemoryStorage},
    theme::Theme,
    ui, BoardController, TaskStore,
};

fn main() -> Result<(), AppError> {
    let config = Cli::parse().resolve()?;
    logging::init(&config.log_file)?;
    tracing::info!(data_dir = %config.data_dir.display(), ephemeral = config.ephemeral, "starting taskboard");

    let result = if config.ephemeral {
        run(MemoryStorage::new(), &config)
    } else {
        run(FileStorage::new(&config.data_dir), &config)
    };
    if let Err(err) = &result {
        tracing::error!(error = %err, "taskboard exited with an error");
    }
    result
}

fn run<S: KeyValueStorage>(storage: S, config: &Config) -> Result<(), AppError> {
    let store = TaskStore::open(storage, config.storage_key.as_str());
    let mut board = BoardController::new(store);
    let theme = Theme::from(config.theme);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut board, &theme);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.map_err(AppError::from)
}
