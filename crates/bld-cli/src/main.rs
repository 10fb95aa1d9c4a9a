use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::statement::StatementArgs;
use commands::valuate::ValuateArgs;

#[derive(Parser)]
#[command(name = "bld")]
#[command(about = "Bullion ledger desk CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> desk -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Build a report statement from raw rows and print it as JSON
    Statement(StatementArgs),

    /// Value a weight of metal at a rate
    Valuate(ValuateArgs),
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = bld_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
        Commands::Statement(args) => commands::statement::run(args)?,
        Commands::Valuate(args) => commands::valuate::run(args)?,
    }

    Ok(())
}
