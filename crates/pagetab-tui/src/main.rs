mod input;
mod render;
mod runtime;
mod tracing_setup;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pagetab_core::{Browser, CoreConfig, DocumentFetcher, PreferencesStore};
use tracing::info;

use crate::runtime::run_app;
use ui::App;

#[derive(Parser)]
#[command(name = "pagetab")]
#[command(about = "Tabbed terminal document viewer")]
struct Cli {
    /// Directory holding preferences (bookmarks, quick searches)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Navigation entries kept per tab, and closed tabs kept for reopening
    #[arg(long, value_name = "N")]
    history: Option<usize>,

    /// Address or search to open in the first tab
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing()?;

    let mut config = match cli.data_dir {
        Some(dir) => CoreConfig::new(dir),
        None => CoreConfig::default(),
    };
    if let Some(capacity) = cli.history {
        config = config.with_history_capacity(capacity);
    }

    let prefs = PreferencesStore::open(config.preferences_path())
        .context("Failed to load preferences")?;
    let mut browser = Browser::threaded(
        &config,
        prefs,
        Arc::new(DocumentFetcher::new()),
        tokio::runtime::Handle::current(),
    );
    info!(data_dir = %config.data_dir.display(), "session started");

    if let Some(address) = cli.address.as_deref() {
        // Failures land on the status line.
        let _ = browser.submit_address(address);
    }

    // Set up panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        eprintln!("\n\n=== PANIC ===");
        eprintln!("{}", panic_info);
        eprintln!("=============\n");
        original_hook(panic_info);
    }));

    let mut app = App::new(browser);
    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app).await;
    ui::restore_terminal()?;

    app.browser
        .shutdown()
        .context("Failed to save preferences")?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}
