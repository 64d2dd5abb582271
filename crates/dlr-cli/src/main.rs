use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use dlr_cli::{load_config, Cli, Commands};

mod commands;
mod common;

use crate::commands::util::configure_threads;
use crate::commands::{completions, conductors, graph, nminus1, outage, rate, stress};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config errors are reported after logging is up
    let config = load_config(cli.config.as_deref());
    let level = cli.log_level.unwrap_or_else(|| match &config {
        Ok(config) => config.logging.level.parse().unwrap_or(Level::INFO),
        Err(_) => Level::INFO,
    });
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a global tracing subscriber was already set");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    configure_threads(&cli.threads);

    let engine = match common::build_engine(&config, cli.conductors.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let weather = common::WeatherContext::from_config(&config.weather);

    let result = match &cli.command {
        Commands::Rate {
            conductor,
            ambient,
            wind_speed,
            wind_dir,
            azimuth,
            mot,
            format,
        } => rate::handle(
            &engine,
            conductor,
            rate::Conditions {
                ambient: *ambient,
                wind_speed: *wind_speed,
                wind_dir: *wind_dir,
                azimuth: *azimuth,
                mot: *mot,
            },
            *format,
        ),
        Commands::Conductors { format } => conductors::handle(&engine, *format),
        Commands::Stress {
            grid_dir,
            env,
            format,
        } => stress::handle(&engine, &weather, grid_dir, env, *format),
        Commands::Nminus1 {
            grid_dir,
            env,
            format,
        } => nminus1::handle(&engine, &weather, grid_dir, env, *format),
        Commands::Outage {
            grid_dir,
            cut,
            region,
            env,
            format,
        } => outage::handle(
            &engine,
            &weather,
            grid_dir,
            cut,
            region.as_deref(),
            env,
            *format,
        ),
        Commands::Graph { command } => graph::handle(command),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    };

    match result {
        Ok(()) => {
            info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
