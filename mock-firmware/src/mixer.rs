use log::{info, warn};
use mixia_types::{ChannelState, Instrument, MixerState, DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME};
use serde_json::Number;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MixerError {
    #[error("Missing {0}")]
    Validation(&'static str),

    #[error("Volume must be between {} and {}", MIN_VOLUME, MAX_VOLUME)]
    Range(Number),

    #[error("Instrument '{0}' not found")]
    NotFound(String),
}

/// The emulated channel state of the mixer. Each instance is fully independent, the firmware
/// worker owns exactly one.
#[derive(Debug, Clone)]
pub struct Mixer {
    channels: MixerState,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(MixerState::from_fn(|instrument| {
            ChannelState::new(instrument.startup_volume())
        }))
    }
}

impl Mixer {
    pub fn new(channels: MixerState) -> Self {
        Self { channels }
    }

    /// Sets a channel's volume, this will always unmute the channel.
    pub fn set_volume(
        &mut self,
        instrument: Option<&str>,
        volume: Option<&Number>,
    ) -> Result<(Instrument, ChannelState), MixerError> {
        let (Some(name), Some(requested)) = (present(instrument), volume) else {
            return Err(MixerError::Validation("instrument or volume parameter"));
        };

        let Some(volume) = whole_volume(requested) else {
            warn!("Rejected volume {} for {}", requested, name);
            return Err(MixerError::Range(requested.clone()));
        };
        let instrument = find_instrument(name)?;

        let channel = &mut self.channels[instrument];
        channel.volume = volume;
        channel.muted = false;

        info!("Volume set: {} = {}", instrument, volume);
        Ok((instrument, *channel))
    }

    pub fn toggle_mute(
        &mut self,
        instrument: Option<&str>,
    ) -> Result<(Instrument, ChannelState), MixerError> {
        let Some(name) = present(instrument) else {
            return Err(MixerError::Validation("instrument parameter"));
        };
        let instrument = find_instrument(name)?;

        let channel = &mut self.channels[instrument];
        channel.muted = !channel.muted;

        info!("Mute toggled: {} = {}", instrument, channel.muted);
        Ok((instrument, *channel))
    }

    pub fn status(&self) -> MixerState {
        self.channels.clone()
    }

    pub fn reset(&mut self) -> MixerState {
        self.channels = MixerState::from_fn(|_| ChannelState::new(DEFAULT_VOLUME));
        info!("Mixer reset to default values");
        self.channels.clone()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

// Channels only hold whole steps, so a fraction is as invalid as 11.
fn whole_volume(volume: &Number) -> Option<u8> {
    let value = volume.as_f64()?;
    let range = f64::from(MIN_VOLUME)..=f64::from(MAX_VOLUME);
    if value.fract() != 0.0 || !range.contains(&value) {
        return None;
    }
    Some(value as u8)
}

fn find_instrument(name: &str) -> Result<Instrument, MixerError> {
    name.parse()
        .map_err(|_| MixerError::NotFound(name.to_string()))
}
