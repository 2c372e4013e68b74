//! CLI command handling
//!
//! Resolves configuration, wires the runner together, and formats output.

use std::path::Path;

use colored::Colorize;

use crate::api::{ApiClient, Provision};
use crate::commands::Commands;
use crate::common::config::{redact, TestConfig};
use crate::common::Result;
use crate::driver::WebDriverClient;
use crate::runner::{CheckoutRunner, ScenarioStatus};

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run {
            config,
            json,
            headed,
        } => run(config.as_deref(), json, headed).await,

        Commands::Config { config } => show_config(config.as_deref()),

        Commands::Status {
            transaction_id,
            config,
        } => status(&transaction_id, config.as_deref()).await,
    }
}

async fn run(config_path: Option<&Path>, json: bool, headed: bool) -> Result<i32> {
    let mut config = TestConfig::load(config_path)?;
    if headed {
        config.webdriver.headless = false;
    }

    // Fail fast on unusable credentials, before any network or browser work
    config.credentials.validate()?;

    let api = ApiClient::new(&config)?;
    let driver = WebDriverClient::new(&config.webdriver, config.timeouts.request_timeout())?;

    println!(
        "\n{} {}",
        "Running:".blue().bold(),
        "checkout scenario".white().bold()
    );
    println!("  {}", format!("webdriver: {}", config.webdriver.url).dimmed());
    println!("  {}", format!("api: {}", config.api.base_url).dimmed());
    println!("\n{}", "Steps:".cyan());

    let result = CheckoutRunner::new(config, api, driver).run().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match result.status {
            ScenarioStatus::Passed => {
                println!(
                    "\n{} {} ({:.1}s)\n  {}\n",
                    "✓".green().bold(),
                    "Scenario Passed".green().bold(),
                    result.duration.as_secs_f64(),
                    result.message.dimmed()
                );
            }
            ScenarioStatus::Failed => {
                println!(
                    "\n{} {} at '{}' ({:.1}s)\n  {}\n",
                    "✗".red().bold(),
                    "Scenario Failed".red().bold(),
                    result.step_reached,
                    result.duration.as_secs_f64(),
                    result.message
                );
            }
            ScenarioStatus::Errored => {
                println!(
                    "\n{} {} at '{}' ({:.1}s)\n  {}\n",
                    "!".yellow().bold(),
                    "Scenario Errored".yellow().bold(),
                    result.step_reached,
                    result.duration.as_secs_f64(),
                    result.message
                );
            }
        }
    }

    Ok(result.exit_code())
}

fn show_config(config_path: Option<&Path>) -> Result<i32> {
    let config = TestConfig::load(config_path)?;

    println!("{}", "Resolved configuration:".cyan());
    println!("  api.base_url        = {}", config.api.base_url);
    println!("  webdriver.url       = {}", config.webdriver.url);
    println!("  webdriver.headless  = {}", config.webdriver.headless);
    println!("  merchant_ref        = {}", config.checkout.merchant_ref);
    println!("  checkout_template   = {}", config.checkout.checkout_template);
    println!(
        "  client_id           = {}",
        redact(&config.credentials.client_id)
    );
    println!(
        "  client_secret       = {}",
        redact(&config.credentials.client_secret)
    );
    println!(
        "  contract_id         = {}",
        redact(&config.credentials.contract_id)
    );

    config.credentials.validate()?;
    println!("\n{} credentials configured", "✓".green());
    Ok(0)
}

async fn status(transaction_id: &str, config_path: Option<&Path>) -> Result<i32> {
    let config = TestConfig::load(config_path)?;
    config.credentials.validate()?;

    let mut api = ApiClient::new(&config)?;
    api.authenticate(&config.credentials).await?;
    let status = api.transaction_status(transaction_id).await?;

    println!("{transaction_id}: {status}");
    Ok(0)
}
