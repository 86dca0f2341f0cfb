use clap::Parser;
use std::net::SocketAddr;

use fxbot::api::{OandaClient, TelegramClient};
use fxbot::bot::Dispatcher;
use fxbot::config::{load_instruments, Config};
use fxbot::server::{run_server, AppState};
use fxbot::Result;

/// Webhook-driven trading utility bot: chat commands in, broker candles and
/// position sizing out
#[derive(Debug, Parser)]
#[command(name = "fxbot", version, about)]
struct Args {
    /// Listen address, overriding LISTEN_ADDR
    #[arg(long)]
    listen: Option<String>,

    /// Instrument list path, overriding INSTRUMENTS_PATH
    #[arg(long)]
    instruments: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("🚀 fxbot starting");

    let args = Args::parse();
    let mut config = Config::load()?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(path) = args.instruments {
        config.instruments_path = path;
    }

    let addr: SocketAddr = config.listen_addr.parse()?;
    let instruments = load_instruments(&config.instruments_path)?;

    tracing::info!("📊 Configuration:");
    tracing::info!("  Listen: {}", addr);
    tracing::info!("  Instruments ({}):", instruments.len());
    for instrument in &instruments {
        tracing::info!("    - {}", instrument.symbol);
    }

    let mut oanda = OandaClient::new(config.oanda_token.clone())?;
    if let Some(base) = config.oanda_api_base.clone() {
        tracing::info!("  Broker API base: {}", base);
        oanda = oanda.with_api_base(base);
    }

    let mut telegram = TelegramClient::new(config.telegram_token.clone())?;
    if let Some(base) = config.telegram_api_base.clone() {
        telegram = telegram.with_api_base(base);
    }

    let dispatcher = Dispatcher::new(oanda, instruments);
    let state = AppState::new(dispatcher, telegram);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("⚠️  Received Ctrl+C, shutting down...");
        }
        result = run_server(state, addr) => {
            result?;
        }
    }

    tracing::info!("👋 fxbot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fxbot=info")),
        )
        .init();
}
