use crate::cli::{Cli, SubCommands};
use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use mixia_ipc::client::Client;
use mixia_ipc::clients::web::web_client::WebClient;
use mixia_ipc::{FirmwareRequest, FirmwareResponse};
use mixia_types::{Instrument, MixerState};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use strum::IntoEnumIterator;

pub async fn run_cli() -> Result<()> {
    let cli: Cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("Could not configure the logger")?;

    let mut client: Box<dyn Client> = Box::new(WebClient::new(cli.url.clone()));
    let request = build_request(&cli.subcommands);

    debug!("Sending {:?} to {}", request, cli.url);
    let response = client.send(request).await?;

    if cli.json {
        println!("{}", to_json(&response)?);
        return Ok(());
    }

    for line in summarise(&response) {
        println!("{}", line);
    }

    // A single channel changed, show it alongside the rest of the mixer.
    if changes_channel(&response) {
        client.poll_status().await?;
        for line in channel_table(&client.status().mixer) {
            println!("{}", line);
        }
    }
    Ok(())
}

pub fn build_request(command: &SubCommands) -> FirmwareRequest {
    match command {
        SubCommands::Volume { instrument, volume } => {
            FirmwareRequest::SetVolume(*instrument, *volume)
        }
        SubCommands::Mute { instrument } => FirmwareRequest::ToggleMute(*instrument),
        SubCommands::Status => FirmwareRequest::GetStatus,
        SubCommands::Reset => FirmwareRequest::Reset,
        SubCommands::Health => FirmwareRequest::Health,
    }
}

fn changes_channel(response: &FirmwareResponse) -> bool {
    matches!(
        response,
        FirmwareResponse::VolumeSet(_) | FirmwareResponse::MuteToggled(_)
    )
}

fn to_json(response: &FirmwareResponse) -> Result<String> {
    let value = match response {
        FirmwareResponse::VolumeSet(body) => serde_json::to_value(body),
        FirmwareResponse::MuteToggled(body) => serde_json::to_value(body),
        FirmwareResponse::Status(body) => serde_json::to_value(body),
        FirmwareResponse::Reset(body) => serde_json::to_value(body),
        FirmwareResponse::Health(body) => serde_json::to_value(body),
    }?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn summarise(response: &FirmwareResponse) -> Vec<String> {
    match response {
        FirmwareResponse::VolumeSet(body) => vec![body.message.clone()],
        FirmwareResponse::MuteToggled(body) => vec![body.message.clone()],
        FirmwareResponse::Status(body) => {
            let mut lines = vec![format!(
                "Firmware {} at {}",
                body.firmware_version, body.timestamp
            )];
            lines.extend(channel_table(&body.mixer));
            lines
        }
        FirmwareResponse::Reset(body) => {
            let mut lines = vec![body.message.clone()];
            lines.extend(channel_table(&body.state));
            lines
        }
        FirmwareResponse::Health(body) => {
            vec![format!("{} (up {:.1}s)", body.status, body.uptime)]
        }
    }
}

fn channel_table(mixer: &MixerState) -> Vec<String> {
    Instrument::iter()
        .map(|instrument| {
            let channel = mixer[instrument];
            format!(
                "  {:<10}{:>3}{}",
                instrument.to_string(),
                channel.volume,
                if channel.muted { "  muted" } else { "" }
            )
        })
        .collect()
}
