mod app;
mod azure;
mod cli;
mod config;
mod edit;
mod event;
mod filter;
mod model;
mod pipeline;
mod state;
mod ui;
mod util;

use std::io;
use std::panic;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use app::{Action, App};
use azure::client::AzureDevOpsClient;

#[tokio::main]
async fn main() -> Result<()> {
    // The terminal belongs to the UI, so logs always go to a file
    let log_dir = config::data_dir().join("logs");
    prepare_log_dir(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "hours.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_dashboard().await,
        Some("add") => cli::handle_add(&args[1..]).await,
        Some("projects") => cli::list_projects(),
        Some("remove") => cli::handle_remove(&args[1..]),
        Some("help" | "-h" | "--help") => {
            cli::print_help();
            Ok(())
        }
        Some(other) => {
            cli::print_help();
            bail!("Unknown command '{other}'");
        }
    }
}

fn prepare_log_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))
}

async fn run_dashboard() -> Result<()> {
    let config_path = config::config_path();
    let config = config::load_config_from(&config_path)?;
    tracing::info!(projects = config.projects.len(), "starting dashboard");

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let client = Arc::new(AzureDevOpsClient::new());
    let mut app = App::new(config, config_path, client, action_tx.clone());

    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Restore the terminal before the panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    app.start();

    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(action) = action_rx.recv().await {
            app.update(action);
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    tracing::info!("dashboard closed");

    Ok(())
}
