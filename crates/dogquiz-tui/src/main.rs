//! dogquiz - a terminal dog breed quiz.
//!
//! Shows random dog photos from the Dog CEO API and asks which breed is
//! pictured. A second tab browses the full breed list.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dogquiz_core::{open_repository, BreedRepository, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the terminal UI owns the screen
const LOG_FILE_NAME: &str = "dogquiz.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for one-shot commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file so output does not corrupt the terminal UI.
/// The returned guard must live until shutdown to flush buffered lines.
fn init_tui_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        init_cli_tracing();
        if let Some(e) = config_error {
            warn!(error = %e, "Failed to load config, using defaults");
        }
        let repo = open_repository(&config)?;
        return run_command(command, &repo).await;
    }

    let _log_guard = init_tui_tracing(&config.cache_dir()?)?;
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(base_url = %config.api_base_url(), "dogquiz starting");

    let repo = open_repository(&config)?;
    let mut app = App::new(repo);
    app.start_quiz();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("dogquiz shutting down");
    Ok(())
}

/// Run a one-shot command and exit
async fn run_command(command: &str, repo: &BreedRepository) -> Result<()> {
    match command {
        "--list-breeds" => {
            let breeds = repo.all_breeds_with_refresh().await?;
            println!("{}", serde_json::to_string_pretty(breeds.as_ref())?);
            eprintln!("{} breeds", breeds.len());
        }
        "--random-image" => {
            println!("{}", repo.random_image().await?);
        }
        "--clear-cache" => {
            repo.clear_cache().await?;
            eprintln!("Breed cache cleared");
        }
        "--help" | "-h" => print_usage(),
        other => {
            print_usage();
            anyhow::bail!("Unknown argument: {}", other);
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: dogquiz [--list-breeds | --random-image | --clear-cache]");
    eprintln!();
    eprintln!("Without arguments, starts the interactive quiz.");
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Windows reports releases too
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
