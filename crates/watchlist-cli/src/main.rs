//! Watchlist CLI
//!
//! Command-line interface for Watchlist - movies and shows sorted into
//! watched, currently watching, planning to watch, and dropped.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use watchlist_core::{
    Category, CategoryStore, Config, FileStorage, KindFilter, MediaKind, SearchSession,
    WriteBehind,
};

mod commands;
mod editor;
mod output;
mod providers;

use commands::item::EditArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "watchlist")]
#[command(about = "Watchlist - track movies and shows you've watched, are watching, or plan to watch")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List items by category (default command)
    #[command(alias = "ls")]
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<Category>,
        /// Only movies or only shows (all, movie, tv)
        #[arg(short, long, default_value = "all")]
        kind: KindFilter,
    },
    /// Show item details
    Show {
        /// Item ID (full ID or prefix)
        id: String,
    },
    /// Add an item by hand
    Add {
        /// Title
        title: String,
        /// Poster URL
        #[arg(short, long, default_value = "")]
        poster: String,
        /// movie or tv
        #[arg(short, long, default_value = "movie")]
        kind: MediaKind,
        /// Category to add to (defaults to the configured one)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Search movies and shows online and add a result
    Search {
        /// Search text (at least 2 characters)
        query: String,
        /// Add result number N without asking
        #[arg(long)]
        pick: Option<usize>,
        /// Category to add to (defaults to the configured one)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Edit an item (prompts when no field flags are given)
    Edit {
        /// Item ID (full ID or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New poster URL (empty to remove)
        #[arg(short, long)]
        poster: Option<String>,
        /// Score from 1 to 10
        #[arg(short, long, conflicts_with = "clear_score")]
        score: Option<u8>,
        /// Remove the score
        #[arg(long)]
        clear_score: bool,
        /// New notes (empty to remove)
        #[arg(short, long, conflicts_with = "edit_notes")]
        notes: Option<String>,
        /// Edit notes in $EDITOR
        #[arg(long)]
        edit_notes: bool,
    },
    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID (full ID or prefix)
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move an item to another category or position
    #[command(alias = "mv")]
    Move {
        /// Item ID (full ID or prefix)
        id: String,
        /// Destination category
        #[arg(short, long)]
        to: Category,
        /// Position in the destination, starting at 1 (default: end)
        #[arg(short, long)]
        index: Option<usize>,
        /// Count the position among movies or shows only
        #[arg(short, long, default_value = "all")]
        kind: KindFilter,
    },
    /// Export the list as JSON
    Export {
        /// Output file ("-" for stdout)
        path: Option<PathBuf>,
    },
    /// Replace the list with an exported file
    Import {
        /// File to import
        path: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location and counts
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, search_debounce_ms, search_limit, default_category)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = CategoryStore::open(WriteBehind::new(FileStorage::new(&config)));
    if let Some(warning) = store.take_load_warning() {
        output.warning(&warning.to_string());
    }

    let command = cli.command.unwrap_or(Commands::List {
        category: None,
        kind: KindFilter::All,
    });

    let result = match command {
        Commands::List { category, kind } => commands::item::list(&store, category, kind, &output),
        Commands::Show { id } => commands::item::show(&store, id, &output),
        Commands::Add {
            title,
            poster,
            kind,
            category,
        } => commands::item::add(
            &mut store,
            title,
            poster,
            kind,
            category.unwrap_or(config.default_category),
            &output,
        ),
        Commands::Search {
            query,
            pick,
            category,
        } => {
            let provider = providers::default_provider(config.search_limit)?;
            let session = SearchSession::new(provider, config.search_debounce());
            commands::search::search(
                &mut store,
                &session,
                query,
                pick,
                category.unwrap_or(config.default_category),
                &output,
            )
            .await
        }
        Commands::Edit {
            id,
            title,
            poster,
            score,
            clear_score,
            notes,
            edit_notes,
        } => {
            let args = EditArgs {
                title,
                poster,
                score,
                clear_score,
                notes,
                edit_notes,
            };
            commands::item::edit(&mut store, id, args, &output)
        }
        Commands::Delete { id, yes } => commands::item::delete(&mut store, id, yes, &output),
        Commands::Move {
            id,
            to,
            index,
            kind,
        } => commands::item::move_item(&mut store, id, to, index, kind, &output),
        Commands::Export { path } => commands::data::export(&store, path, &output),
        Commands::Import { path } => commands::data::import(&mut store, path, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    // Every change must be on disk before the process exits
    let saved = store.flush();
    result?;
    if let Err(ref e) = saved {
        if let Some(hint) = e.recovery_suggestion() {
            output.warning(hint);
        }
    }
    saved.context("Failed to save watchlist")?;

    Ok(())
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging to the configured file, or stderr
///
/// `RUST_LOG` takes precedence over the verbosity flag.
fn init_logging(config: &Config, verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "watchlist_core={},watchlist_cli={}",
            log_level, log_level
        ))
    });

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
