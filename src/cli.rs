//! Command-line interface for mining_game.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mining Game - mine gold, find diamonds, buy better pickaxes
#[derive(Parser, Debug)]
#[command(name = "mining_game")]
#[command(about = "Browser mining game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the store file (overrides config)
        #[arg(long)]
        db_path: Option<String>,

        /// Path to the shop catalog, JSON or TOML (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the scoreboard from a store file and exit
    Scoreboard {
        /// Path to the store file
        #[arg(long, default_value = "mining_game.db")]
        db_path: String,
    },
}
