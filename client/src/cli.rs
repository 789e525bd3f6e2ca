use clap::{Parser, Subcommand};
use mixia_types::Instrument;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// Base URL of the mixer firmware (or the mock firmware)
    #[clap(long, default_value = "http://localhost:3001")]
    pub url: String,

    /// Print the raw JSON response rather than a summary
    #[clap(long)]
    pub json: bool,

    /// Show what the client is doing
    #[clap(long)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub subcommands: SubCommands,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Set the volume of an instrument (0-10), this also unmutes it
    Volume {
        #[clap(value_enum)]
        instrument: Instrument,

        #[clap(value_parser = clap::value_parser!(u8).range(0..=10))]
        volume: u8,
    },

    /// Toggle the mute state of an instrument
    Mute {
        #[clap(value_enum)]
        instrument: Instrument,
    },

    /// Show the volume and mute state of every channel
    Status,

    /// Return every channel to the default volume, unmuted
    Reset,

    /// Check whether the firmware is up
    Health,
}
