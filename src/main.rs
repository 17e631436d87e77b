//! slotmail
//!
//! Sends and receives end-to-end encrypted messages hidden in a ledger
//! contract's storage, talking to the wallet through its local bridge.
//!
//! # Architecture Overview
//!
//! ```text
//!   send:  recipients ──▶ messaging ──▶ crypto ──▶ codec ──┐
//!                                                          ▼
//!                                   ledger ──▶ bridge ══ websocket ══▶ wallet / daemon
//!                                     ▲
//!   sync:  inbox ◀── crypto ◀── codec ◀── sync (slot walker)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use slotmail::config::validation::validate_config;
use slotmail::config::{load_or_default, ConfigError, StoreConfig, WalletKeyType};
use slotmail::crypto::{self, CryptoError, HexSecretDecoder, KeyDecoder, MnemonicDecoder};
use slotmail::messaging::{load_private_key, parse_recipient, MessageSender};
use slotmail::observability::{logging, metrics};
use slotmail::sync::{Inbox, SyncEngine};
use slotmail::{AppConfig, Bridge, Ledger};

#[derive(Parser)]
#[command(name = "slotmail")]
#[command(version, about = "Encrypted messages in ledger contract storage", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal a message offline and print the blob
    Seal {
        /// Recipient address or public key (hex, compressed)
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        #[arg(short, long)]
        message: String,
    },
    /// Seal a message and store it on the ledger
    Send {
        /// Recipient address, public key (hex) or registered name
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        #[arg(short, long)]
        message: String,
        /// Ring size for the carrier transfer
        #[arg(long)]
        ringsize: Option<u64>,
    },
    /// Fetch new messages addressed to the wallet key
    Sync,
    /// Print stored messages, oldest first
    Inbox,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "slotmail starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match cli.command {
        Commands::Seal { to, message } => seal(&to, &message)?,
        Commands::Send {
            to,
            message,
            ringsize,
        } => send(&config, &to, &message, ringsize).await?,
        Commands::Sync => sync(&config).await?,
        Commands::Inbox => inbox(&config.store)?,
    }
    Ok(())
}

fn seal(to: &[String], message: &str) -> slotmail::Result<()> {
    let recipients = to
        .iter()
        .map(|entry| {
            parse_recipient(entry).ok_or_else(|| {
                CryptoError::InvalidRecipient(format!("'{}' is not an address or key", entry))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let sealed = crypto::seal(&recipients, message)?;
    println!("{}", sealed.blob.encode());
    Ok(())
}

/// Connect to the bridge and close it on Ctrl-C.
async fn connect(config: &AppConfig) -> slotmail::Result<Arc<Bridge>> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let bridge = Arc::new(Bridge::connect(&config.bridge).await?);
    let interrupted = bridge.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, closing bridge");
            interrupted.close().await;
        }
    });
    Ok(bridge)
}

async fn send(
    config: &AppConfig,
    to: &[String],
    message: &str,
    ringsize: Option<u64>,
) -> slotmail::Result<()> {
    let bridge = connect(config).await?;
    let ledger = Ledger::new(bridge.clone(), config.ledger.scid.as_str());

    let ringsize = ringsize.unwrap_or(config.ledger.ringsize);
    let result = MessageSender::new(&ledger).send(to, message, ringsize).await;
    bridge.close().await;

    let receipt = result?;
    tracing::info!(recipients = receipt.recipients, "Message sent");
    println!("{}", receipt.txid);
    Ok(())
}

async fn sync(config: &AppConfig) -> slotmail::Result<()> {
    let mut inbox = open_inbox(&config.store)?;
    let bridge = connect(config).await?;
    let ledger = Ledger::new(bridge.clone(), config.ledger.scid.as_str());

    let result = async {
        let decoder: &dyn KeyDecoder = match config.sync.key_type {
            WalletKeyType::Mnemonic => &MnemonicDecoder,
            WalletKeyType::SecretKey => &HexSecretDecoder,
        };
        let key = load_private_key(&ledger, decoder).await?;
        let delay = Duration::from_millis(config.sync.fetch_delay_ms);
        let added = SyncEngine::new(&ledger, &key, delay).sync(&mut inbox).await?;
        Ok::<_, slotmail::Error>(added)
    }
    .await;
    bridge.close().await;

    // Messages found before a failure are kept; the watermark is not.
    inbox.save_to_file()?;
    let added = result?;
    println!("{} new message(s), {} total", added, inbox.len());
    Ok(())
}

fn inbox(store: &StoreConfig) -> slotmail::Result<()> {
    let inbox = open_inbox(store)?;
    for message in inbox.sorted() {
        let time = message
            .approximate_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", message.source_height, time, message.plaintext);
    }
    Ok(())
}

fn open_inbox(store: &StoreConfig) -> std::io::Result<Inbox> {
    match &store.path {
        Some(path) => Inbox::load_from_file(path),
        None => Ok(Inbox::new(None)),
    }
}
