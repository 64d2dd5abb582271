use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use dlr_core::{LoadScenario, DEFAULT_CONDUCTOR};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dlr", author, version, about = "Dynamic line ratings and grid stress", long_about = None)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, then `info`)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (default: <config dir>/dlr/dlr.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Threads for the N-1 screen: `auto` or a number
    #[arg(long, global = true, default_value = "auto")]
    pub threads: String,

    /// Extra conductor types (CSV) added to the built-in catalog
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub conductors: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON document
    Json,
}

/// Weather and loading conditions shared by the grid commands.
///
/// Values come from `--weather` (or the configured live source), then any
/// explicit flag overrides them.
#[derive(Args, Debug, Clone, Default)]
pub struct EnvArgs {
    /// Ambient temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    pub ambient: Option<f64>,

    /// Wind speed (m/s)
    #[arg(long)]
    pub wind_speed: Option<f64>,

    /// Direction the wind blows from (degrees clockwise from north)
    #[arg(long)]
    pub wind_dir: Option<f64>,

    /// Weather observation(s) as JSON, one object or an hourly array
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub weather: Option<PathBuf>,

    /// Load scenario applied to nominal flows
    #[arg(long, default_value = "nominal", value_parser = parse_scenario)]
    pub scenario: LoadScenario,
}

impl EnvArgs {
    pub fn has_overrides(&self) -> bool {
        self.ambient.is_some() || self.wind_speed.is_some() || self.wind_dir.is_some()
    }
}

fn parse_scenario(input: &str) -> Result<LoadScenario, String> {
    input.parse()
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ampacity of one conductor under given conditions
    Rate {
        /// Conductor name or code word
        #[arg(long, default_value = DEFAULT_CONDUCTOR)]
        conductor: String,
        /// Ambient temperature (°C)
        #[arg(long, default_value_t = 25.0, allow_hyphen_values = true)]
        ambient: f64,
        /// Wind speed (m/s)
        #[arg(long, default_value_t = 0.61)]
        wind_speed: f64,
        /// Direction the wind blows from (degrees)
        #[arg(long, default_value_t = 0.0)]
        wind_dir: f64,
        /// Line azimuth (degrees)
        #[arg(long, default_value_t = 90.0)]
        azimuth: f64,
        /// Maximum operating temperature (°C)
        #[arg(long, default_value_t = 100.0)]
        mot: f64,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the conductor catalog
    Conductors {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Per-line stress and system summary
    Stress {
        /// Grid directory with buses.csv and lines.csv
        #[arg(value_hint = ValueHint::DirPath)]
        grid_dir: PathBuf,
        #[command(flatten)]
        env: EnvArgs,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Rank single-line outages by the stress they put on neighboring lines
    Nminus1 {
        /// Grid directory with buses.csv and lines.csv
        #[arg(value_hint = ValueHint::DirPath)]
        grid_dir: PathBuf,
        #[command(flatten)]
        env: EnvArgs,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Stress after taking lines out of service
    Outage {
        /// Grid directory with buses.csv and lines.csv
        #[arg(value_hint = ValueHint::DirPath)]
        grid_dir: PathBuf,
        /// Line ids to cut, comma separated
        #[arg(long, value_delimiter = ',')]
        cut: Vec<String>,
        /// Also cut every line touching a bus inside this polygon (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        region: Option<PathBuf>,
        #[command(flatten)]
        env: EnvArgs,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats {
        /// Grid directory with buses.csv and lines.csv
        grid_dir: PathBuf,
    },
    /// Find islands in the grid
    Islands {
        /// Grid directory with buses.csv and lines.csv
        grid_dir: PathBuf,
        /// Emit bus-to-island assignments
        #[arg(long)]
        emit: bool,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
