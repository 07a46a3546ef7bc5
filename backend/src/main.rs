//! Cash Flow Agent CLI - forecasting and receipt extraction
//!
//! # Main Commands
//!
//! ```bash
//! cashflow serve                     # Start HTTP server (port 5001)
//! cashflow forecast --days 90        # Print a 90-day forecast
//! cashflow extract receipt.jpg       # Extract a receipt image
//! cashflow balance                   # Current balance and monthly averages
//! cashflow receipts list             # Manage stored receipts
//! ```
//!
//! Settings come from the environment (and `.env`); see [`cashflow::config`].

use clap::{Parser, Subcommand};
use cashflow::error::ForecastError;
use cashflow::forecast::is_supported_period;
use cashflow::ledger::DEFAULT_AVERAGE_MONTHS;
use cashflow::{forecast, ForecastOutcome, Ledger, ReceiptExtractor, ReceiptRegistry, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "cashflow")]
#[command(about = "Cash flow forecasting and receipt extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT or 5001)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a cash flow forecast
    Forecast {
        /// Forecast horizon: 30, 90 or 180 days
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Extract structured data from a receipt image
    Extract {
        /// JPG, JPEG or PNG image
        image: PathBuf,
    },

    /// Show the current balance and monthly averages
    Balance,

    /// Manage stored receipts
    Receipts {
        #[command(subcommand)]
        action: ReceiptAction,
    },
}

#[derive(Subcommand)]
enum ReceiptAction {
    /// List all stored receipts
    List,

    /// Show a stored receipt
    Show {
        /// Receipt ID
        id: String,
    },

    /// Delete a stored receipt
    Delete {
        /// Receipt ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match Settings::from_env() {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: Settings) -> CmdResult {
    match command {
        Commands::Serve { port } => cmd_serve(settings, port).await,
        Commands::Forecast { days } => cmd_forecast(&settings, days).await,
        Commands::Extract { image } => cmd_extract(&settings, &image).await,
        Commands::Balance => cmd_balance(&settings),
        Commands::Receipts { action } => cmd_receipts(&settings, action),
    }
}

async fn cmd_serve(mut settings: Settings, port: Option<u16>) -> CmdResult {
    if let Some(port) = port {
        settings.port = port;
    }
    cashflow::server::start_server(settings).await?;
    Ok(())
}

async fn cmd_forecast(settings: &Settings, days: u32) -> CmdResult {
    if !is_supported_period(days) {
        return Err(ForecastError::UnsupportedPeriod(days).into());
    }

    eprintln!("📈 Forecasting {} days from {}", days, settings.ledger_path.display());
    let ledger = Ledger::load(&settings.ledger_path)?;
    let client = settings.ai_client();
    let today = chrono::Local::now().date_naive();

    match forecast(client.as_ref(), &ledger, days, today).await {
        ForecastOutcome::Ready { forecast_text, metadata } => {
            eprintln!(
                "   Period: {} to {}",
                metadata.forecast_start, metadata.forecast_end
            );
            eprintln!("   Current balance: ${:.2}\n", metadata.current_balance);
            println!("{}", forecast_text);
            Ok(())
        }
        ForecastOutcome::Failed { error } => Err(error.into()),
    }
}

async fn cmd_extract(settings: &Settings, image: &Path) -> CmdResult {
    let filename = image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    eprintln!("🧾 Extracting: {}", image.display());

    let bytes = fs::read(image)?;
    let client = settings.ai_client();
    let extractor = ReceiptExtractor::new(client.as_ref(), settings.upload_dir.clone());
    let mut data = extractor.extract(filename, &bytes).await?;

    let mut registry = ReceiptRegistry::with_dir(&settings.receipts_dir);
    let id = registry.save(data.clone(), filename)?;
    data["receipt_id"] = serde_json::json!(id);
    eprintln!("✅ Receipt saved with ID: {}", id);

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_balance(settings: &Settings) -> CmdResult {
    let ledger = Ledger::load(&settings.ledger_path)?;
    let today = chrono::Local::now().date_naive();
    let averages = ledger.monthly_averages(DEFAULT_AVERAGE_MONTHS, today);

    println!("💰 Current balance: ${:.2}", ledger.balance());
    println!("   Transactions: {}", ledger.all().len());
    println!("   Last {} months (monthly average):", DEFAULT_AVERAGE_MONTHS);
    println!("     Income:   ${:.2}", averages.avg_monthly_income);
    println!("     Expenses: ${:.2}", averages.avg_monthly_expenses);
    println!("     Net:      ${:.2}", averages.avg_monthly_net);
    Ok(())
}

fn cmd_receipts(settings: &Settings, action: ReceiptAction) -> CmdResult {
    let mut registry = ReceiptRegistry::with_dir(&settings.receipts_dir);

    match action {
        ReceiptAction::List => {
            let receipts = registry.list();
            if receipts.is_empty() {
                eprintln!("📋 No receipts stored yet.");
                eprintln!("   Use 'cashflow extract <image>' to add one.");
                return Ok(());
            }

            eprintln!("📋 Stored receipts ({}):\n", receipts.len());
            for r in receipts {
                println!("  🧾 {} ({})", r.vendor(), r.id);
                println!("     File: {}", r.original_filename);
                match r.total() {
                    Some(total) => println!("     Total: {:.2}", total),
                    None => println!("     Total: N/A"),
                }
                println!("     Created: {}", r.created_at);
                println!();
            }
        }

        ReceiptAction::Show { id } => {
            let record = registry
                .get(&id)
                .ok_or_else(|| format!("Receipt not found: {}", id))?;
            println!("🧾 Receipt: {} ({})\n", record.vendor(), record.id);
            println!("File: {}", record.original_filename);
            println!("Created: {}", record.created_at);
            println!("\nData:");
            println!("{}", serde_json::to_string_pretty(&record.data)?);
        }

        ReceiptAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("🗑️  Receipt deleted: {}", id);
        }
    }

    Ok(())
}
