use clap::Parser;
use directories::ProjectDirs;
use mixia_types::LogLevel;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// Minimum log level to print out
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Location of the mock firmware settings file on disk
    #[clap(long, default_value_os_t = default_config_location())]
    pub config: PathBuf,

    /// Address the HTTP Server should bind to
    #[clap(long, default_value = "localhost")]
    pub http_bind_address: String,

    /// Define the port the HTTP Server should listen on
    #[clap(long, default_value = "3001")]
    pub http_port: u16,

    /// Disable CORS, only same-origin pages will be able to drive the mock
    #[clap(long)]
    pub cors_disable: bool,
}

fn default_config_location() -> PathBuf {
    match ProjectDirs::from("org", "MixIA", "MixIA-Mock-Firmware") {
        Some(proj_dirs) => proj_dirs.config_dir().join("settings.json"),
        None => PathBuf::from("settings.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["mixia-mock-firmware"]);
        assert_eq!(cli.http_port, 3001);
        assert_eq!(cli.http_bind_address, "localhost");
        assert!(!cli.cors_disable);
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn log_level_is_parsed() {
        let cli = Cli::parse_from(["mixia-mock-firmware", "--log-level", "debug"]);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }
}
