//! Relays lines typed on stdin to a device reachable over TCP, framed exactly as they would be
//! written to the UART characteristic. Lines sent back by the device are treated as
//! notifications.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream;
use log::info;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use mixia_ble::protocol::{CHUNK_DELAY, MAX_CHUNK_SIZE};
use mixia_ble::{
    pump_notifications, relay_transcripts, BleSession, ChunkedSender, StreamCharacteristic,
    TranscriptEvent,
};
use mixia_types::LogLevel;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Cli {
    /// Address of the device bridge, as HOST:PORT
    #[clap(long)]
    connect: String,

    /// Largest number of characters in a single write
    #[clap(long, default_value_t = MAX_CHUNK_SIZE)]
    chunk_size: usize,

    /// Pause between writes, in milliseconds, when a line needs more than one write
    #[clap(long, default_value_t = CHUNK_DELAY.as_millis() as u64)]
    chunk_delay_ms: u64,

    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    TermLogger::init(
        args.log_level.into(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Could not configure the logger")?;

    let socket = TcpStream::connect(&args.connect)
        .await
        .with_context(|| format!("Unable to connect to {}", args.connect))?;
    let (reader, writer) = socket.into_split();

    let sender = ChunkedSender::new(args.chunk_size, Duration::from_millis(args.chunk_delay_ms));
    let mut session = BleSession::new(sender);
    session.connect(StreamCharacteristic::new(writer));
    session.on_notification(|text| info!("Device: {}", text));

    let notify_handle = tokio::spawn(pump_notifications(
        reader,
        session.notifications(),
        session.link(),
    ));

    let stdin = BufReader::new(tokio::io::stdin()).lines();
    let transcripts = stream::unfold(stdin, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((TranscriptEvent::Final(line), lines)),
            _ => None,
        }
    });

    let stats = relay_transcripts(transcripts, &mut session).await;
    info!(
        "Input closed: {} sent, {} failed, {} skipped",
        stats.sent, stats.failed, stats.skipped
    );

    session.disconnect();
    notify_handle.abort();
    Ok(())
}
