mod console;

pub use console::Console;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::application::{BankConfig, BankService};
use crate::domain::{format_cents, parse_cents};

/// Kobo - console retail bank
#[derive(Parser)]
#[command(name = "kobo")]
#[command(about = "A single-user retail bank simulator on a local SQLite ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "kobo.db")]
    pub database: String,

    /// Minimum initial deposit required to open an account (e.g., "2000" or "2000.00")
    #[arg(long, default_value = "2000")]
    pub min_deposit: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Start an interactive banking session
    Start,
}

impl Cli {
    /// Install the log subscriber. Logs go to stderr so they never mix with the session.
    pub fn init_logging(&self) {
        let level = if self.verbose { Level::DEBUG } else { Level::WARN };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    fn config(&self) -> Result<BankConfig> {
        let minimum_opening_deposit = parse_cents(&self.min_deposit)
            .context("Invalid minimum deposit. Use '2000.00' or '2000'")?;
        if minimum_opening_deposit < 0 {
            anyhow::bail!("Minimum deposit cannot be negative");
        }
        Ok(BankConfig {
            minimum_opening_deposit,
        })
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config()?;

        match self.command {
            Commands::Init => {
                BankService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Start => {
                let service = BankService::init(&self.database).await?.with_config(config);
                tracing::debug!(
                    database = %self.database,
                    min_deposit = %format_cents(config.minimum_opening_deposit),
                    "session starting"
                );

                let stdin = std::io::stdin();
                let mut console = Console::new(stdin.lock(), std::io::stdout());
                console.run(&service).await?;
            }
        }

        Ok(())
    }
}
