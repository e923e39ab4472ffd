//! LAP data CLI
//!
//! Works on a graph snapshot file:
//! - materializing the schema implied by the descriptor bindings
//! - storing JSON records as record trees, loading them back
//! - deleting record trees, finding roots by sample id

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod config;

use commands::Session;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "lapdata")]
#[command(author, version, about = "LAP data: descriptor records on an object-relation graph")]
struct Cli {
    /// Config file (JSON) with default paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph snapshot file (created when missing)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Settings JSON with `descriptors` / `attributes` lists
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize the schema and print classes, descriptors and relations
    Schema,

    /// Store a JSON record as a new record tree, or replace one with --id
    Store {
        /// Record JSON file (`-` for stdin)
        #[arg(long)]
        record: PathBuf,
        /// Root object to replace
        #[arg(long)]
        id: Option<u32>,
        /// Keep default parts of the replaced record
        #[arg(long)]
        keep_default: bool,
    },

    /// Print the record tree under a root as JSON
    Load { id: u32 },

    /// Delete record trees
    Delete {
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Find the root holding a sample id
    Find { sample_id: String },

    /// List the values stored for every bound name
    Values,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    }
    .with_overrides(cli.db, cli.settings);

    let mut session = Session::open(config)?;
    match cli.command {
        Commands::Schema => commands::cmd_schema(&mut session),
        Commands::Store {
            record,
            id,
            keep_default,
        } => commands::cmd_store(&mut session, &record, id, keep_default),
        Commands::Load { id } => commands::cmd_load(&session, id),
        Commands::Delete { ids } => commands::cmd_delete(&mut session, &ids),
        Commands::Find { sample_id } => commands::cmd_find(&session, &sample_id),
        Commands::Values => commands::cmd_values(&session),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
