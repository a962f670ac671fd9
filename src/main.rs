mod api;
mod config;
mod controller;
mod form;
mod settings;
#[cfg(test)]
mod test_support;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::Show;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ConfigClient;
use crate::controller::ConfigController;
use crate::form::Form;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Terminal editor for the color filter tracker's configuration",
    long_about = "Loads the tracker configuration from its web API, lets you adjust the HSV\n\
                  thresholds, mouse sensitivity and USB ids, and saves it back.\n\
                  Diagnostics go to a log file since the terminal is used for the form."
)]
struct Args {
    /// Backend base URL
    #[arg(short = 'S', long)]
    server: Option<String>,

    /// Path prefix of the API routes
    #[arg(long)]
    api_base: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long)]
    settings: Option<std::path::PathBuf>,

    /// Milliseconds a success message stays visible
    #[arg(long)]
    clear_after_ms: Option<u64>,

    /// Log file
    #[arg(long)]
    log_file: Option<std::path::PathBuf>,
}

fn init_logging(path: &Path) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::resolve(&args)?;

    // Guard flushes the log file on exit
    let _log_guard = init_logging(&settings.log_file)?;

    let client = ConfigClient::new(&settings.server, &settings.api_base);
    let endpoint = client.endpoint().to_string();
    info!("filter_config starting, backend {}", endpoint);

    // Network tasks and status timers run here; the UI loop stays on this thread
    let rt = tokio::runtime::Runtime::new()?;
    let _rt_guard = rt.enter();

    enable_raw_mode()?;
    let mut stdout_handle = io::stdout();
    stdout_handle.execute(EnterAlternateScreen)?;
    stdout_handle.flush()?;
    let backend = CrosstermBackend::new(stdout_handle);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    // Setup panic handler to ensure terminal cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = io::stdout().execute(Show);
        original_hook(panic_info);
    }));

    let mut controller = ConfigController::new(Form::standard(), client, settings.clear_after());
    let result = tui::run(&mut terminal, &mut controller, &endpoint);

    terminal.show_cursor()?;
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;

    if let Err(ref e) = result {
        tracing::error!("UI loop failed: {:#}", e);
    }
    info!("filter_config exiting");
    result
}
