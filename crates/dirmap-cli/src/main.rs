//! dirmap CLI
//!
//! Inspect a directory tree held in a YAML fixture through the mapping layer

use clap::{Parser, Subcommand};
use dirmap_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dirmap")]
#[command(about = "dirmap - typed views over directory entries", long_about = None)]
struct Cli {
    /// Server configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base path, used when no configuration file is given
    #[arg(long, global = true)]
    base: Option<String>,

    /// Tree layout rules: ldap or kolab
    #[arg(long, global = true)]
    structure: Option<String>,

    /// Directory contents (YAML fixture)
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Log to stderr with the given profile: development or production
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Determine the object type of an entry
    Type(commands::resolve::TypeArgs),
    /// Generate the path a new object would occupy
    Uid(commands::uid::UidArgs),
    /// Compile legacy JSON criteria to a search filter
    Filter(commands::filter::FilterArgs),
    /// List all objects of one type
    List(commands::list::ListArgs),
    /// Show the declared attributes of an entry
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Some(profile) = cli.log.as_deref() {
        init(Profile::parse(profile));
    }

    let ctx = commands::Context {
        config: cli.config,
        base: cli.base,
        structure: cli.structure,
        fixture: cli.fixture,
    };

    let result = match cli.command {
        Commands::Type(args) => commands::resolve::execute(args, &ctx),
        Commands::Uid(args) => commands::uid::execute(args, &ctx),
        Commands::Filter(args) => commands::filter::execute(args, &ctx),
        Commands::List(args) => commands::list::execute(args, &ctx),
        Commands::Show(args) => commands::show::execute(args, &ctx),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
