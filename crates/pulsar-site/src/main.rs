//! Pulsar site CLI.
//!
//! Provides commands for:
//! - `resolve`: Resolve a single `{@inject: ...}` directive
//! - `rewrite`: Rewrite directives in a tree of markdown files
//! - `versions`: Show the documentation version map

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ResolveArgs, RewriteArgs, VersionsArgs};
use output::Output;

/// Pulsar documentation site tooling.
#[derive(Parser)]
#[command(name = "pulsar-site", version, about)]
struct Cli {
    /// Enable info-level logging (otherwise RUST_LOG applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one inject directive into a link.
    Resolve(ResolveArgs),
    /// Rewrite inject directives in markdown files.
    Rewrite(RewriteArgs),
    /// List documentation versions.
    Versions(VersionsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve(args) => args.execute(),
        Commands::Rewrite(args) => args.execute(),
        Commands::Versions(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
