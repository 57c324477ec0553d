use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod filter;
mod handler;
mod quote;
mod remote;
mod storage;
mod sync;
mod transfer;
mod tui;
mod ui;

use app::App;
use config::Config;
use filter::CategoryFilter;
use quote::{QuoteBook, ALL_CATEGORIES};
use remote::RemoteClient;
use storage::{FileStore, KeyValueStore};
use sync::SyncEngine;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Collect, filter, and sync quotes from the terminal")]
struct Cli {
    /// Quote server URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a random quote
    Show {
        /// Only pick from this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a new quote and post it to the server
    Add {
        /// Quote text
        text: String,
        /// Quote category
        category: String,
    },
    /// List stored quotes
    List {
        /// Only list this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List known categories
    Categories,
    /// Export all quotes to a JSON document
    Export {
        /// Destination file
        path: PathBuf,
    },
    /// Import quotes from a JSON document
    Import {
        /// Source file
        path: PathBuf,
    },
    /// Reconcile local quotes with the server now
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_init().unwrap_or_else(|_| Config::default());
    let _log_guard = init_logging(&config)?;

    let mut store = FileStore::open_default()?;
    let book = hydrate(&mut store);

    let remote = RemoteClient::new(cli.server.as_deref().unwrap_or(&config.server_url));
    let engine = SyncEngine::new(remote);

    match cli.command {
        None => run_tui(book, Box::new(store), engine, &config).await,
        Some(Commands::Show { category }) => show_random(&book, category.as_deref()),
        Some(Commands::Add { text, category }) => {
            add_quote(book, store, engine, &text, &category).await
        }
        Some(Commands::List { category }) => list_quotes(&book, category.as_deref()),
        Some(Commands::Categories) => list_categories(&book),
        Some(Commands::Export { path }) => export_quotes(&book, &path),
        Some(Commands::Import { path }) => import_quotes(book, store, &path),
        Some(Commands::Sync) => sync_now(book, store, engine).await,
    }
}

/// Route log output to a file so it never corrupts the TUI display.
fn init_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("quotebook");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "quotebook.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::new(config.log_filter.as_deref().unwrap_or("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(guard)
}

/// Load the persisted quote snapshot, seeding the starter set on first run.
fn hydrate(store: &mut FileStore) -> QuoteBook {
    match storage::load_quotes(store) {
        Ok(Some(quotes)) => QuoteBook::with_quotes(quotes),
        Ok(None) => {
            let book = QuoteBook::seeded();
            if let Err(err) = storage::save_quotes(store, book.all()) {
                warn!(error = %err, "could not persist seed quotes");
            }
            book
        }
        Err(err) => {
            warn!(error = %err, "stored quotes unreadable, starting from seed set");
            QuoteBook::seeded()
        }
    }
}

async fn run_tui(
    book: QuoteBook,
    store: Box<dyn KeyValueStore>,
    engine: SyncEngine,
    config: &Config,
) -> Result<()> {
    info!("starting quotebook TUI");

    let filter = CategoryFilter::restore(store.as_ref(), &book);
    let mut app = App::new(book, store, filter, engine);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(Duration::from_secs(config.sync_interval_secs.max(1)));

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

fn show_random(book: &QuoteBook, category: Option<&str>) -> Result<()> {
    let category = category.unwrap_or(ALL_CATEGORIES);
    let visible = book.by_category(category);

    if visible.is_empty() {
        println!("{}", "No quotes in that category".yellow());
        return Ok(());
    }

    let index = rand::thread_rng().gen_range(0..visible.len());
    let quote = visible[index];

    println!("\n{}", quote.text.bold());
    println!("  {}\n", format!("- {}", quote.category).cyan().italic());

    Ok(())
}

async fn add_quote(
    mut book: QuoteBook,
    mut store: FileStore,
    engine: SyncEngine,
    text: &str,
    category: &str,
) -> Result<()> {
    if let Err(err) = book.add(text, category) {
        if err.is_validation() {
            println!("{} {}", "Invalid quote:".red(), err);
            return Ok(());
        }
        return Err(err.into());
    }
    storage::save_quotes(&mut store, book.all())?;

    println!("{} {}", "Added:".green().bold(), text);

    // Best effort: the local add stands even if the server rejects it
    if let Some(quote) = book.all().last().cloned() {
        match engine.post(quote).await? {
            Ok(echoed) => {
                println!("{} {}", "Posted to server:".green(), echoed.text);
            }
            Err(err) => {
                println!("{} {}", "Could not post to server:".yellow(), err);
            }
        }
    }

    Ok(())
}

fn list_quotes(book: &QuoteBook, category: Option<&str>) -> Result<()> {
    let category = category.unwrap_or(ALL_CATEGORIES);
    let visible = book.by_category(category);

    if visible.is_empty() {
        println!("{}", "No quotes to list".yellow());
        return Ok(());
    }

    println!("\n{} quotes:\n", visible.len().to_string().bold().green());

    for (i, quote) in visible.iter().enumerate() {
        println!(
            "{}. {} {}",
            (i + 1).to_string().bold().blue(),
            quote.text,
            format!("[{}]", quote.category).dimmed()
        );
    }

    Ok(())
}

fn list_categories(book: &QuoteBook) -> Result<()> {
    println!("\n{}", "Categories".bold().blue());

    for category in book.categories() {
        let count = book.by_category(&category).len();
        println!("  • {} ({})", category.green(), count.to_string().dimmed());
    }

    Ok(())
}

fn export_quotes(book: &QuoteBook, path: &Path) -> Result<()> {
    transfer::export_quotes(book, path)?;

    println!(
        "{} {} quotes to {}",
        "Exported".green().bold(),
        book.len(),
        path.display()
    );

    Ok(())
}

fn import_quotes(mut book: QuoteBook, mut store: FileStore, path: &Path) -> Result<()> {
    let count = transfer::import_file(&mut book, path)?;
    storage::save_quotes(&mut store, book.all())?;

    println!(
        "{} {} quotes ({} total)",
        "Imported".green().bold(),
        count,
        book.len()
    );

    Ok(())
}

async fn sync_now(mut book: QuoteBook, mut store: FileStore, mut engine: SyncEngine) -> Result<()> {
    println!("Syncing with the quote server...");

    match engine.sync_once(&mut book).await {
        Ok(outcome) => {
            if outcome.replaced {
                storage::save_quotes(&mut store, book.all())?;
            }
            println!("{}", outcome.message().green());
        }
        Err(err) => {
            println!("{}: {}", "Sync failed".red(), err);
            println!(
                "Check that the quote server is reachable, or point at another one: {}",
                "quotebook --server <url> sync".bold()
            );
        }
    }

    Ok(())
}
