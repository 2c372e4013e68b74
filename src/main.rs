//! Checkout UI test runner
//!
//! Runs the hosted checkout flow end to end against a browser and reports a
//! structured pass/fail result. Exit code 0 means every verification held,
//! 1 means a verification failed, 2 means the environment broke.

use checkout_test::commands::Commands;
use checkout_test::{cli, common};
use clap::Parser;

#[derive(Parser)]
#[command(name = "checkout-test", about = "Browser UI test runner for the hosted checkout flow")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    match cli::dispatch(command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
