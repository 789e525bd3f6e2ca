use anyhow::{bail, Context, Result};
use log::{debug, info};
use mixia_ipc::MOCK_FIRMWARE_VERSION;
use mixia_types::{volume_in_range, ChannelState, Instrument, MixerState, MAX_VOLUME, MIN_VOLUME};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    firmware_version: Option<String>,

    /// Per channel volumes to boot with, channels not listed keep the firmware defaults.
    startup_volumes: HashMap<Instrument, u8>,
}

impl Settings {
    pub fn read(path: &Path) -> Result<Settings> {
        let settings: Settings = match File::open(path) {
            Ok(reader) => serde_json::from_reader(reader).context(format!(
                "Could not parse mock firmware settings file at {}",
                path.to_string_lossy()
            ))?,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.to_string_lossy());
                Settings::default()
            }
            Err(error) => {
                return Err(error).context(format!(
                    "Could not open mock firmware settings file for reading at {}",
                    path.to_string_lossy()
                ));
            }
        };

        settings.validate().context(format!(
            "Invalid mock firmware settings in {}",
            path.to_string_lossy()
        ))?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (instrument, volume) in &self.startup_volumes {
            if !volume_in_range(i64::from(*volume)) {
                bail!(
                    "Startup volume {} for {} is not between {} and {}",
                    volume,
                    instrument,
                    MIN_VOLUME,
                    MAX_VOLUME
                );
            }
        }
        Ok(())
    }

    pub fn firmware_version(&self) -> &str {
        self.firmware_version
            .as_deref()
            .unwrap_or(MOCK_FIRMWARE_VERSION)
    }

    pub fn startup_state(&self) -> MixerState {
        MixerState::from_fn(|instrument| {
            let volume = match self.startup_volumes.get(&instrument) {
                Some(volume) => {
                    info!("Overriding startup volume for {}: {}", instrument, volume);
                    *volume
                }
                None => instrument.startup_volume(),
            };
            ChannelState::new(volume)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_settings(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mixia-settings-{}-{}.json", name, std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = Settings::read(Path::new("/nonexistent/mixia/settings.json")).unwrap();
        assert_eq!(settings.firmware_version(), "mock-1.0.0");
        assert_eq!(settings.startup_state()[Instrument::Drums].volume, 7);
    }

    #[test]
    fn overrides_are_applied() {
        let path = write_settings(
            "overrides",
            r#"{"firmware_version": "mock-2.0.0", "startup_volumes": {"voz": 1, "drums": 10}}"#,
        );
        let settings = Settings::read(&path).unwrap();
        let state = settings.startup_state();

        assert_eq!(settings.firmware_version(), "mock-2.0.0");
        assert_eq!(state[Instrument::Vocals], ChannelState::new(1));
        assert_eq!(state[Instrument::Drums], ChannelState::new(10));
        assert_eq!(state[Instrument::Piano], ChannelState::new(5));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn out_of_range_startup_volume_is_rejected() {
        let path = write_settings("range", r#"{"startup_volumes": {"piano": 11}}"#);
        let error = Settings::read(&path).unwrap_err();
        assert!(format!("{:#}", error).contains("between 0 and 10"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_instruments_are_rejected() {
        let path = write_settings("unknown", r#"{"startup_volumes": {"kazoo": 3}}"#);
        assert!(Settings::read(&path).is_err());
        let _ = std::fs::remove_file(path);
    }
}
