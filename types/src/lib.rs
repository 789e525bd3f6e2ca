#[cfg(feature = "clap")]
use clap::ValueEnum;
use enum_map::{Enum, EnumMap};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

pub const MIN_VOLUME: u8 = 0;
pub const MAX_VOLUME: u8 = 10;

/// Volume every channel returns to when the mixer is reset.
pub const DEFAULT_VOLUME: u8 = 5;

/// The channels exposed by the mixer firmware. The wire names are the ones the device uses,
/// the English names are accepted as aliases wherever an instrument is parsed. Matching is
/// case sensitive, as it is on the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount, Enum)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Instrument {
    #[strum(to_string = "piano")]
    #[cfg_attr(feature = "serde", serde(rename = "piano"))]
    #[cfg_attr(feature = "clap", value(name = "piano"))]
    Piano,

    #[strum(to_string = "guitarra", serialize = "guitar")]
    #[cfg_attr(feature = "serde", serde(rename = "guitarra", alias = "guitar"))]
    #[cfg_attr(feature = "clap", value(name = "guitarra", alias = "guitar"))]
    Guitar,

    #[strum(to_string = "bateria", serialize = "drums")]
    #[cfg_attr(feature = "serde", serde(rename = "bateria", alias = "drums"))]
    #[cfg_attr(feature = "clap", value(name = "bateria", alias = "drums"))]
    Drums,

    #[strum(to_string = "bajo", serialize = "bass")]
    #[cfg_attr(feature = "serde", serde(rename = "bajo", alias = "bass"))]
    #[cfg_attr(feature = "clap", value(name = "bajo", alias = "bass"))]
    Bass,

    #[strum(to_string = "voz", serialize = "vocals")]
    #[cfg_attr(feature = "serde", serde(rename = "voz", alias = "vocals"))]
    #[cfg_attr(feature = "clap", value(name = "voz", alias = "vocals"))]
    Vocals,
}

impl Instrument {
    /// The volume a channel holds when the firmware first boots, before any reset.
    pub fn startup_volume(&self) -> u8 {
        match self {
            Instrument::Piano => 5,
            Instrument::Guitar => 6,
            Instrument::Drums => 7,
            Instrument::Bass => 4,
            Instrument::Vocals => 8,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelState {
    pub volume: u8,
    pub muted: bool,
}

impl ChannelState {
    pub fn new(volume: u8) -> Self {
        Self {
            volume,
            muted: false,
        }
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

pub type MixerState = EnumMap<Instrument, ChannelState>;

/// Verbosity accepted by every MixIA binary on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

pub fn volume_in_range(volume: i64) -> bool {
    (i64::from(MIN_VOLUME)..=i64::from(MAX_VOLUME)).contains(&volume)
}
