//! WordKeep - personal vocabulary tracker TUI
//!
//! Record words and meanings, browse them by day, and practice recall with
//! flashcards, multiple choice, and spelling drills.

mod config;
mod error;
mod filter;
mod lookup;
mod models;
mod quiz;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use store::VocabStore;
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "wordkeep")]
#[command(author, version, about = "Personal vocabulary tracker and practice TUI", long_about = None)]
struct Args {
    /// Path of the vocabulary file
    #[arg(short, long)]
    vocab_file: Option<PathBuf>,

    /// Import entries from a CSV file (word,meaning[,date]) and exit
    #[arg(short, long)]
    import: Option<PathBuf>,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let vocab_file = args.vocab_file.unwrap_or_else(VocabStore::default_path);
    let mut store = VocabStore::open(vocab_file)?;

    // Handle import if requested
    if let Some(csv_path) = args.import {
        let added = store.import_csv(&csv_path)?;
        println!("✓ Imported {} words ({} total)", added, store.len());
        return Ok(());
    }

    // Run TUI
    run_tui(store)
}

fn run_tui(store: VocabStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Load config
    let config = config::Config::load().unwrap_or_default();

    // Create app
    let mut app = App::new(store, config);

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}
