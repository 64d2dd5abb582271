pub mod cli;
pub mod config;

pub use cli::{build_cli_command, Cli, Commands, EnvArgs, GraphCommands, OutputFormat};
pub use config::{load_config, DlrConfig, WeatherConfig, WeatherSourceKind};
