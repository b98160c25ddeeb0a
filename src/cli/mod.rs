use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::Stdout;

use crate::application::{BankError, BankService};
use crate::config::Config;
use crate::domain::{Amount, SystemClock};
use crate::render::{PrintStatementWriter, TabularStatementFormatter};
use crate::storage::SqliteRepository;

type CliService =
    BankService<SqliteRepository, PrintStatementWriter<TabularStatementFormatter<Local>, Stdout>, SystemClock>;

/// bank-ledger - Bank account ledger
#[derive(Parser)]
#[command(name = "bank-ledger")]
#[command(about = "Deposit, withdraw and print statements for bank accounts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "BANK_LEDGER_DB", default_value = "bank-ledger.db")]
    pub database: String,

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

    /// Open an account for a new client
    Open {
        /// Client name (must be unique)
        name: String,
    },

    /// Deposit money on a client's account
    Deposit {
        /// Client name
        client: String,

        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,

        /// Label stored with the operation
        #[arg(short, long, default_value = "deposit")]
        label: String,
    },

    /// Withdraw money from a client's account
    Withdraw {
        /// Client name
        client: String,

        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,
    },

    /// Show the current balance of a client's account
    Balance {
        /// Client name
        client: String,
    },

    /// Print the account statement of a client
    Statement {
        /// Client name
        client: String,
    },

    /// Export a client's operations to CSV or JSON
    Export {
        /// Client name
        client: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::new(&self.database, self.verbose)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();

        match self.command {
            Commands::Init => {
                SqliteRepository::init(&config.database_url_create()).await?;
                println!("Database initialized: {}", config.database_path);
            }

            Commands::Open { name } => {
                let service = connect(&config).await?;
                let client = service.open_account(name).await?;
                tracing::info!(client_id = %client.id, "opened account");
                println!("Opened account: {} ({})", client.name, client.id);
            }

            Commands::Deposit {
                client,
                amount,
                label,
            } => {
                let service = connect(&config).await?;
                let client = service.find_client(&client).await?;
                let amount = parse_amount(&amount)?;

                let operation = service.deposit(client.id, amount, label).await?;
                tracing::info!(client = %client.name, amount = %operation.amount, "deposit recorded");
                println!(
                    "Deposited {} on {}'s account, balance {}",
                    operation.amount.to_currency_string(),
                    client.name,
                    operation.balance.to_currency_string()
                );
            }

            Commands::Withdraw { client, amount } => {
                let service = connect(&config).await?;
                let client = service.find_client(&client).await?;
                let amount = parse_amount(&amount)?;

                let operation = service
                    .withdraw(client.id, amount)
                    .await
                    .inspect_err(|err| {
                        if matches!(err, BankError::InsufficientFunds { .. }) {
                            tracing::warn!(client = %client.name, "withdrawal rejected: {}", err);
                        }
                    })?;
                tracing::info!(client = %client.name, amount = %operation.amount, "withdrawal recorded");
                println!(
                    "Withdrew {} from {}'s account, balance {}",
                    operation.amount.to_currency_string(),
                    client.name,
                    operation.balance.to_currency_string()
                );
            }

            Commands::Balance { client } => {
                let service = connect(&config).await?;
                let client = service.find_client(&client).await?;
                let balance = service.balance(client.id).await?;
                println!("{:<20} {:>15}", client.name, balance.to_currency_string());
            }

            Commands::Statement { client } => {
                let service = connect(&config).await?;
                let client = service.find_client(&client).await?;
                service.print_account_statement(client.id).await?;
            }

            Commands::Export {
                client,
                output,
                format,
            } => {
                let service = connect(&config).await?;
                run_export_command(&service, &client, output.as_deref(), &format).await?;
            }
        }

        Ok(())
    }
}

async fn connect(config: &Config) -> Result<CliService> {
    let repo = SqliteRepository::connect(&config.database_url())
        .await
        .with_context(|| {
            format!(
                "Cannot open database '{}'. Run `bank-ledger init` first",
                config.database_path
            )
        })?;
    let writer = PrintStatementWriter::new(TabularStatementFormatter::in_zone(Local), std::io::stdout());
    Ok(BankService::new(repo, writer, SystemClock))
}

fn parse_amount(input: &str) -> Result<Amount> {
    input
        .parse()
        .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

async fn run_export_command(
    service: &CliService,
    client_name: &str,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let client = service.find_client(client_name).await?;
    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_operations_csv(&client, writer).await?;
            tracing::info!(client = %client.name, count, "exported operations");
            if output.is_some() {
                eprintln!("Exported {} operations", count);
            }
        }
        "json" => {
            let snapshot = exporter.export_account_json(&client, writer).await?;
            tracing::info!(client = %client.name, count = snapshot.operations.len(), "exported account");
            if output.is_some() {
                eprintln!(
                    "Exported account of {}: {} operations, balance {}",
                    snapshot.client.name,
                    snapshot.operations.len(),
                    snapshot.balance.to_currency_string()
                );
            }
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}
