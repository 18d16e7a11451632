//! jsondb CLI
//!
//! Command-line access to a jsondb store.
//!
//! # Commands
//!
//! - `write` / `insert` / `update` - Store a JSON value
//! - `read` / `read-all` / `list` - Show records
//! - `delete` - Remove a record or a whole collection

mod commands;

use clap::{Parser, Subcommand};
use jsondb_core::{Config, LogLevel, Store, TracingLogger, UpdateMode};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Command-line access to a directory of JSON collections.
#[derive(Parser)]
#[command(name = "jsondb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store root directory
    #[arg(global = true, short, long)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Skip fsync around commits
    #[arg(global = true, long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a record, replacing any existing one
    Write {
        /// Collection name
        collection: String,
        /// Record key
        key: String,
        /// JSON value, or `-` to read it from stdin
        value: String,
    },

    /// Write a record under a generated key and print the key
    Insert {
        /// Collection name
        collection: String,
        /// JSON value, or `-` to read it from stdin
        value: String,
    },

    /// Print a record
    Read {
        /// Collection name
        collection: String,
        /// Record key (with or without `.json`)
        key: String,
    },

    /// Print every record of a collection
    ReadAll {
        /// Collection name
        collection: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the record keys of a collection
    List {
        /// Collection name
        collection: String,
    },

    /// Replace an existing record
    Update {
        /// Collection name
        collection: String,
        /// Record key (with or without `.json`)
        key: String,
        /// JSON value, or `-` to read it from stdin
        value: String,

        /// Replace atomically under one lock instead of delete-then-write
        #[arg(long)]
        atomic: bool,
    },

    /// Delete a record, or the whole collection when no key is given
    Delete {
        /// Collection name
        collection: String,
        /// Record key (with or without `.json`)
        key: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let config = Config::new()
        .logger(Arc::new(TracingLogger::new(level)))
        .sync_writes(!cli.no_sync);
    let root = cli.root;
    let open = |config: Config| -> Result<Store, Box<dyn std::error::Error>> {
        let root = root.clone().ok_or("Store root required (--root)")?;
        Ok(Store::open_with_config(root, config)?)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Write {
            collection,
            key,
            value,
        } => {
            let value = commands::parse_value(&value, io::stdin().lock())?;
            commands::write::write(&open(config)?, &collection, &key, &value, &mut out)?;
        }
        Commands::Insert { collection, value } => {
            let value = commands::parse_value(&value, io::stdin().lock())?;
            commands::write::insert(&open(config)?, &collection, &value, &mut out)?;
        }
        Commands::Read { collection, key } => {
            commands::read::read(&open(config)?, &collection, &key, &mut out)?;
        }
        Commands::ReadAll { collection, format } => {
            commands::read::read_all(&open(config)?, &collection, &format, &mut out)?;
        }
        Commands::List { collection } => {
            commands::read::list(&open(config)?, &collection, &mut out)?;
        }
        Commands::Update {
            collection,
            key,
            value,
            atomic,
        } => {
            let value = commands::parse_value(&value, io::stdin().lock())?;
            let mode = if atomic {
                UpdateMode::Replace
            } else {
                UpdateMode::DeleteThenWrite
            };
            let store = open(config.update_mode(mode))?;
            commands::write::update(&store, &collection, &key, &value, &mut out)?;
        }
        Commands::Delete { collection, key } => {
            commands::delete::run(&open(config)?, &collection, key.as_deref(), &mut out)?;
        }
        Commands::Version => {
            println!("jsondb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("jsondb core v{}", jsondb_core::VERSION);
        }
    }

    Ok(())
}
