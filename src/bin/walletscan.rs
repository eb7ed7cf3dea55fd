use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use solana_wallet_activity::history::validate_wallet;
use solana_wallet_activity::{
    AppConfig, Cancellation, ClassificationResponse, ErrorResponse, HistoryFetcher,
    HistoryResponse, LedgerSource, RpcLedger, TimeWindow, TransactionClassifier,
    TransactionRecord, WalletActivity,
};

#[derive(Parser)]
#[command(author, version, about = "Classify Solana wallet trades and walk wallet history", long_about = None)]
struct Cli {
    /// JSON config file; flags and SOLANA_RPC_URL override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// RPC endpoint URL (can also be set via SOLANA_RPC_URL)
    #[arg(long, global = true, env = "SOLANA_RPC_URL")]
    rpc_url: Option<String>,
    /// Abort after this many seconds and print what was gathered
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// -v for debug, -vv for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a transaction by signature and classify it for a wallet
    Classify {
        #[arg(long)]
        signature: String,
        #[arg(long)]
        wallet: String,
    },
    /// Classify a transaction record stored as JSON
    ClassifyFile {
        /// Path to a `getTransaction` result (jsonParsed encoding)
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        wallet: String,
    },
    /// Walk a wallet's signatures inside a trailing window
    History {
        #[arg(long)]
        wallet: String,
        /// Window size in days; defaults to the configured window
        #[arg(long)]
        days: Option<u32>,
        /// Also fetch and classify every transaction
        #[arg(long)]
        full: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_max_level(level)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;
    let cancel = match cli.timeout_secs {
        Some(secs) => Cancellation::never().with_timeout(Duration::from_secs(secs)),
        None => Cancellation::never(),
    };

    match cli.command {
        Commands::Classify { signature, wallet } => {
            let ledger = RpcLedger::from_config(&config)?;
            tracing::info!(rpc_url = ledger.url(), signature = %signature, "classifying");
            let registry = config.registry();
            let record = match ledger.transaction(&signature).await {
                Ok(record) => record,
                Err(err) => {
                    tracing::error!(signature = %signature, error = %err, "fetch failed");
                    return print_json(&ErrorResponse::new("Error fetching transaction", &err));
                }
            };
            let classification =
                TransactionClassifier::new(&registry).classify(record.as_ref(), &wallet);
            print_json(&ClassificationResponse::from(&classification))?;
        }
        Commands::ClassifyFile { file, wallet } => {
            let data = fs::read(&file).with_context(|| format!("failed to read {:?}", file))?;
            let record: TransactionRecord = serde_json::from_slice(&data)
                .with_context(|| format!("failed to parse JSON in {:?}", file))?;
            let registry = config.registry();
            let classification =
                TransactionClassifier::new(&registry).classify(Some(&record), &wallet);
            print_json(&ClassificationResponse::from(&classification))?;
        }
        Commands::History { wallet, days, full } => {
            validate_wallet(&wallet)?;
            let window = TimeWindow::trailing_days(days.unwrap_or(config.history.window_days));
            let ledger = RpcLedger::from_config(&config)?;
            tracing::info!(
                rpc_url = ledger.url(),
                wallet = %wallet,
                ?days,
                full,
                "fetching history"
            );

            if full {
                let activity = WalletActivity::from_config(ledger, &config);
                match activity.scan(&wallet, window, &cancel).await {
                    Ok(report) => print_json(&HistoryResponse::from(report))?,
                    Err(err) => {
                        print_json(&ErrorResponse::new("Error fetching transactions", &err))?
                    }
                }
            } else {
                let fetcher = HistoryFetcher::with_config(ledger, config.history.clone());
                match fetcher.signatures(&wallet, window, &cancel).await {
                    Ok(history) => print_json(&HistoryResponse::from(history))?,
                    Err(err) => {
                        print_json(&ErrorResponse::new("Error fetching signatures", &err))?
                    }
                }
            }
        }
    }

    Ok(())
}
