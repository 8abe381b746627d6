//! Ledger CLI - Database migrations and invoice management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ledger-cli migrate
//!
//! # Manage invoices
//! ledger-cli invoice create --customer-id c1 --amount 12.50 --status pending
//! ledger-cli invoice update <ID> --customer-id c1 --amount 20 --status paid
//! ledger-cli invoice delete <ID>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `invoice create|update|delete` - Invoice form actions without HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

mod commands;

use commands::invoice::InvoiceFields;

#[derive(Parser)]
#[command(name = "ledger-cli")]
#[command(author, version, about = "Ledger CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage invoices
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },
}

#[derive(Subcommand)]
enum InvoiceAction {
    /// Create a new invoice
    Create(FieldArgs),
    /// Update an existing invoice
    Update {
        /// Invoice ID
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an invoice
    Delete {
        /// Invoice ID
        id: String,
    },
}

#[derive(Args)]
struct FieldArgs {
    /// Customer ID
    #[arg(short, long)]
    customer_id: String,

    /// Amount in dollars (e.g. 12.50)
    #[arg(short, long, allow_hyphen_values = true)]
    amount: String,

    /// Invoice status (`pending` or `paid`)
    #[arg(short, long, default_value = "pending")]
    status: String,
}

impl From<FieldArgs> for InvoiceFields {
    fn from(args: FieldArgs) -> Self {
        Self {
            customer_id: args.customer_id,
            amount: args.amount,
            status: args.status,
        }
    }
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ledger_cli=info,ledger_dashboard=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Invoice { action } => match action {
            InvoiceAction::Create(fields) => {
                let id = commands::invoice::create(fields.into()).await?;
                tracing::info!(invoice_id = %id, "Invoice created");
            }
            InvoiceAction::Update { id, fields } => {
                commands::invoice::update(&id, fields.into()).await?;
            }
            InvoiceAction::Delete { id } => {
                commands::invoice::delete(&id).await?;
            }
        },
    }
    Ok(())
}
