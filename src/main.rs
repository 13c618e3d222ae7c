//! StockPro trade journal.
//!
//! Walks through capital and trade setup screens, sizes the position so that
//! hitting the stop loses 1% of capital, and appends the trade to a
//! worksheet journal.

mod db;
mod identity;
mod journal;
mod models;
mod trading;
mod wizard;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::db::SqliteJournal;
use crate::identity::Identity;
use crate::journal::{CsvWorksheet, JournalStore, DEFAULT_WORKSHEET};
use crate::trading::WizardConfig;
use crate::wizard::{journal_table, sizing_report, Terminal, Wizard};

/// StockPro trade journal CLI.
#[derive(Parser)]
#[command(name = "stockpro")]
#[command(about = "Size stock trades at a fixed 1% risk and keep a trade journal", long_about = None)]
struct Cli {
    /// Database URL for the SQLite journal
    #[arg(short, long, env = "STOCKPRO_DATABASE", default_value = "sqlite:./stockpro.db?mode=rwc")]
    database: String,

    /// Journal backend
    #[arg(long, env = "STOCKPRO_STORE", value_enum, default_value_t = StoreKind::Sqlite)]
    store: StoreKind,

    /// Directory holding CSV worksheets (csv backend)
    #[arg(long, env = "STOCKPRO_CSV_DIR", default_value = ".")]
    csv_dir: String,

    /// Worksheet name inside the journal
    #[arg(short, long, env = "STOCKPRO_WORKSHEET", default_value = DEFAULT_WORKSHEET)]
    worksheet: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// SQLite database
    Sqlite,
    /// One CSV file per worksheet
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive trade entry wizard
    Wizard {
        /// Email stamped on saved rows (falls back to STOCKPRO_USER_EMAIL)
        #[arg(short, long)]
        email: Option<String>,

        /// Skip the simulated analysis and confirmation delays
        #[arg(long)]
        fast: bool,
    },

    /// Size a single trade and print the results
    Calc {
        /// Total capital
        #[arg(short, long)]
        capital: Decimal,

        /// Entry price
        #[arg(short, long)]
        entry: Decimal,

        /// Original stop loss
        #[arg(short, long)]
        stop_loss: Decimal,
    },

    /// Show the saved journal
    Journal {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging; screens own stdout
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = WizardConfig::default();

    match cli.command {
        Commands::Wizard { ref email, fast } => {
            let store = open_store(&cli).await?;
            let identity = Identity::resolve(email.as_deref(), &config.fallback_email);
            let config = if fast { config.without_delays() } else { config };

            info!(
                store = %store.describe(),
                user = %identity.email(),
                "Starting wizard session"
            );

            let mut wizard = Wizard::new(store, identity, config);
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            Terminal::new(input, std::io::stdout()).run(&mut wizard).await?;
        }

        Commands::Calc {
            capital,
            entry,
            stop_loss,
        } => {
            println!();
            for line in sizing_report(capital, entry, stop_loss, &config.currency_symbol)? {
                println!("{}", line);
            }
        }

        Commands::Journal { json } => {
            let store = open_store(&cli).await?;
            let rows = store.read().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            if rows.is_empty() {
                println!("No trades in {}. Use 'stockpro wizard' to record one.", store.describe());
                return Ok(());
            }

            println!("\n=== Journal: {} ({} rows) ===\n", store.describe(), rows.len());
            for line in journal_table(&rows, &config.currency_symbol) {
                println!("{}", line);
            }
        }

        Commands::Config => {
            println!("\n=== Journal ===\n");
            match cli.store {
                StoreKind::Sqlite => {
                    let db = SqliteJournal::new(&cli.database, &cli.worksheet).await?;
                    println!("Backend:          SQLite ({})", cli.database);
                    println!("Worksheet:        {}", db.worksheet());
                    println!("Rows:             {}", db.row_count().await?);
                }
                StoreKind::Csv => {
                    let sheet = CsvWorksheet::new(&cli.csv_dir, &cli.worksheet);
                    println!("Backend:          CSV");
                    println!("Worksheet file:   {}", sheet.path().display());
                    println!("Rows:             {}", sheet.read().await?.len());
                }
            }

            println!("\n=== Sizing ===\n");
            println!("Risk per Trade:   {}%", (trading::RISK_FRACTION * Decimal::from(100)).normalize());
            println!("Reward:Risk:      {}:1", trading::REWARD_MULTIPLE);

            println!("\n=== Wizard ===\n");
            println!("Currency:         {}", config.currency_symbol);
            println!("Default Capital:  {}", config.default_capital);
            println!("Default Stock:    {}", config.default_stock);
            println!("Default Entry:    {}", config.default_entry_price);
            println!("Default SL:       {}", config.default_stop_loss);
            println!(
                "Analysis Delay:   {}ms ({} ticks)",
                config.analysis_tick_ms * u64::from(config.analysis_ticks),
                config.analysis_ticks
            );
            println!("Confirm Delay:    {}ms", config.confirm_delay_ms);
            println!(
                "User:             {}",
                Identity::resolve(None, &config.fallback_email).email()
            );
        }
    }

    Ok(())
}

/// Open the journal backend selected on the command line.
async fn open_store(cli: &Cli) -> Result<Arc<dyn JournalStore>> {
    let store: Arc<dyn JournalStore> = match cli.store {
        StoreKind::Sqlite => Arc::new(SqliteJournal::new(&cli.database, &cli.worksheet).await?),
        StoreKind::Csv => Arc::new(CsvWorksheet::new(&cli.csv_dir, &cli.worksheet)),
    };
    Ok(store)
}
