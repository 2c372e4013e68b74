//! CLI command definitions
//!
//! Defines the clap commands for the checkout test CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the checkout scenario once (default)
    Run {
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the scenario result as JSON
        #[arg(long)]
        json: bool,

        /// Run the browser with a visible window instead of headless
        #[arg(long)]
        headed: bool,
    },

    /// Print the resolved configuration (secrets redacted) and validate it
    Config {
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Query the provider API status of a transaction
    Status {
        /// Transaction id (STX_...)
        transaction_id: String,

        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            config: None,
            json: false,
            headed: false,
        }
    }
}
