use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use telegram_driver::api::{ApiServer, ApiState};
use telegram_driver::driver::{extract_event, matcher, message, outbound};
use telegram_driver::{Config, HttpTransport, IncomingMessage, PeerId, RawUpdate, ReqwestTransport};

/// Buffered messages between the webhook and the consumer
const INBOX_CAPACITY: usize = 256;

/// Telegram Driver - Telegram webhook adapter for messaging frameworks
#[derive(Parser)]
#[command(name = "telegram-driver", version, about)]
struct Cli {
    /// Config file (default: ~/.config/telegram-driver/config.toml)
    #[arg(short, long, env = "TELEGRAM_DRIVER_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server (default)
    Serve,
    /// Show how a webhook payload is matched and normalized
    Inspect {
        /// Payload file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Send a typing indicator to a chat
    Typing {
        /// Chat id or `@channelusername`
        #[arg(long)]
        chat_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,telegram_driver=info",
        1 => "info,telegram_driver=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config.as_deref()).await,
        Command::Inspect { input } => inspect(&input),
        Command::Typing { chat_id } => typing(cli.config.as_deref(), &chat_id).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Run the webhook server until interrupted
async fn serve(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);

    let (tx, mut rx) = mpsc::channel::<IncomingMessage>(INBOX_CAPACITY);
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            tracing::info!(
                sender = ?message.sender_id,
                recipient = ?message.recipient_id,
                text = message.text.as_deref().unwrap_or_default(),
                "incoming telegram message"
            );
        }
    });

    let state = ApiState::new(config.driver, config.webhook)
        .with_transport(transport)
        .with_inbox(tx);
    let server = ApiServer::new(state, config.server.bind_addr());

    tracing::info!(addr = %config.server.bind_addr(), "starting telegram driver");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

/// Print the match verdict and normalized messages for a payload
fn inspect(input: &str) -> anyhow::Result<()> {
    let body = if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(input)?
    };

    let update = RawUpdate::parse(&body);
    let event = extract_event(&update);
    let verdict = matcher::evaluate(&update, event.as_ref());

    let report = serde_json::json!({
        "matched": verdict.is_accepted(),
        "verdict": verdict.to_string(),
        "source": event.as_ref().map(|e| e.source.key()),
        "messages": message::normalize(&update, event.as_ref()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Send one typing indicator
async fn typing(config_path: Option<&Path>, chat_id: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let recipient = chat_id
        .parse::<i64>()
        .map_or_else(|_| PeerId::Text(chat_id.to_string()), PeerId::Numeric);

    let request = outbound::typing_request(&config.driver, &recipient);
    ReqwestTransport::new()?.post(&request).await?;

    println!("typing indicator sent to {recipient}");
    Ok(())
}
