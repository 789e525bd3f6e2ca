use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use strum::IntoEnumIterator;
use tokio::sync::{mpsc, oneshot};
use tokio::{join, signal};

use mixia_types::Instrument;

use crate::cli::Cli;
use crate::mixer::Mixer;
use crate::primary_worker::spawn_mixer_worker;
use crate::servers::http_server::{spawn_http_server, AppData, HttpSettings};
use crate::settings::Settings;
use crate::shutdown::Shutdown;

mod cli;
mod mixer;
mod primary_worker;
mod servers;
mod settings;
mod shutdown;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        args.log_level.into(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    info!("Starting MixIA Mock Firmware v{}", VERSION);
    let settings = Settings::read(&args.config)?;

    let http_settings = HttpSettings {
        bind_address: args.http_bind_address,
        port: args.http_port,
        cors_enabled: !args.cors_disable,
    };
    if !http_settings.cors_enabled {
        warn!("CORS disabled, browser clients on other origins will be refused");
    }

    let mixer = Mixer::new(settings.startup_state());
    let status = mixer.status();
    for instrument in Instrument::iter() {
        let channel = status[instrument];
        info!(
            "Initial state: {} volume {} {}",
            instrument,
            channel.volume,
            if channel.muted { "(muted)" } else { "" }
        );
    }

    let shutdown = Shutdown::new();

    let (mixer_tx, mixer_rx) = mpsc::channel(32);
    let mixer_handle = tokio::spawn(spawn_mixer_worker(mixer_rx, shutdown.clone(), mixer));

    let (httpd_tx, httpd_rx) = oneshot::channel();
    let app_data = AppData::new(mixer_tx, settings.firmware_version().to_string());
    let http_handle = tokio::spawn(spawn_http_server(app_data, httpd_tx, http_settings));

    // If the server failed to bind, the handle sender is dropped and we bail here.
    let server = match httpd_rx.await {
        Ok(server) => server,
        Err(_) => {
            shutdown.trigger();
            return http_handle
                .await
                .context("HTTP Server task panicked")?
                .context("Unable to start the HTTP Server");
        }
    };

    info!("Available endpoints:");
    info!("  POST /setVolume     - Set instrument volume");
    info!("  POST /muteChannel   - Toggle instrument mute");
    info!("  GET  /status        - Get mixer status");
    info!("  POST /reset         - Reset mixer to defaults");
    info!("  GET  /health        - Health check");

    tokio::spawn(await_ctrl_c(shutdown.clone()));

    let mut shutdown_rx = shutdown.clone();
    shutdown_rx.recv().await;
    info!("Shutting down mock firmware");

    let _ = join!(mixer_handle, server.stop(true), http_handle);
    Ok(())
}

async fn await_ctrl_c(shutdown: Shutdown) {
    if signal::ctrl_c().await.is_ok() {
        shutdown.trigger();
    }
}
