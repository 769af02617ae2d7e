// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use courier::config::CONFIG;
use courier::messages::MessageService;
use courier::scheduler::SendScheduler;
use courier::sender::OsaScriptSender;
use courier::store::{gate, SqliteCliStore};

#[derive(Parser)]
#[command(
    name = "courier",
    about = "Message history and scheduled delivery bridge for the local Messages store",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the Messages store is reachable and queryable
    Check,
    /// List messages exchanged with a phone number, newest first
    Read {
        phone_number: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List unread inbound messages
    Unread {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List the most recent messages across all conversations
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Send a message now
    Send { phone_number: String, message: String },
    /// Schedule a message for a future instant (RFC 3339)
    Schedule {
        phone_number: String,
        message: String,
        scheduled_time: DateTime<Utc>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(SqliteCliStore::at_default_location()?);
    let sender = Arc::new(OsaScriptSender);
    let service = MessageService::new(store.clone(), sender.clone());

    match cli.command {
        Command::Check => {
            if gate::check_access(store.as_ref()).await {
                println!("Messages store is accessible");
            } else {
                println!("Messages store is NOT accessible");
            }
        }
        Command::Read {
            phone_number,
            limit,
        } => {
            let messages = service
                .read_by_phone(&phone_number, limit.unwrap_or(CONFIG.read_default_limit))
                .await;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Command::Unread { limit } => {
            let messages = service
                .read_unread(limit.unwrap_or(CONFIG.read_default_limit))
                .await;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Command::Recent { limit } => {
            let messages = service
                .read_recent(limit.unwrap_or(CONFIG.recent_default_limit))
                .await;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Command::Send {
            phone_number,
            message,
        } => {
            let ack = service.send_message(&phone_number, &message).await?;
            info!("Message sent to {phone_number}");
            if !ack.is_empty() {
                println!("{ack}");
            }
        }
        Command::Schedule {
            phone_number,
            message,
            scheduled_time,
        } => {
            let scheduler = SendScheduler::new(sender);
            let entry = scheduler
                .schedule(&phone_number, &message, scheduled_time)
                .await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);

            // The registry is in-memory only: stay alive until the timer
            // fires, with a grace window in case the send itself is slow.
            let wait = (scheduled_time - Utc::now()).to_std().unwrap_or_default();
            let deadline = tokio::time::Instant::now() + wait + Duration::from_secs(30);
            tokio::time::sleep(wait).await;
            while !scheduler.scheduled().await.is_empty()
                && tokio::time::Instant::now() < deadline
            {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }

    Ok(())
}
