//! Entry point: config loading, logging setup, command dispatch.

mod cli;
mod error_fmt;
mod track;

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let _ = JSON_MODE.set(json);

    if let Err(e) = run(cli) {
        eprintln!("{}", error_fmt::render(&e, json));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = load_config_or_default(&cli.config)?;
    init_tracing(&cli, &cfg)?;

    match cli.cmd {
        Commands::Track { direct, duration_s } => {
            let final_steps = track::run_track(&cfg, direct, duration_s, cli.json)?;
            if cli.json {
                println!("{}", serde_json::json!({ "final_steps": final_steps }));
            } else {
                println!("tracking stopped at {final_steps} steps");
            }
        }
        Commands::Steps => {
            let steps = track::query_steps(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "steps_today": steps }));
            } else {
                println!("{steps}");
            }
        }
        Commands::Reset => {
            track::reset_steps(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "reset": true }));
            } else {
                println!("step count reset");
            }
        }
        Commands::SensorInfo => println!("{}", track::sensor_info(&cfg, cli.json)?),
        Commands::SelfCheck => println!("{}", track::self_check(&cfg, cli.json)?),
        Commands::Health => println!("{}", track::health(&cfg)?),
    }
    Ok(())
}

/// A missing config file is not an error; every field has a default.
fn load_config_or_default(path: &Path) -> eyre::Result<stride_config::Config> {
    if path.exists() {
        stride_config::load_config(path)
    } else {
        Ok(stride_config::Config::default())
    }
}

fn init_tracing(cli: &Cli, cfg: &stride_config::Config) -> eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_owned());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &cfg.logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stride.log".to_owned());
        let appender = match cfg.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        FILE_GUARD
            .set(guard)
            .map_err(|_| eyre::eyre!("logging initialized twice"))?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false);
        if cli.json {
            builder.json().try_init().map_err(|e| eyre::eyre!(e))?;
        } else {
            builder.try_init().map_err(|e| eyre::eyre!(e))?;
        }
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        if cli.json {
            builder.json().try_init().map_err(|e| eyre::eyre!(e))?;
        } else {
            builder.try_init().map_err(|e| eyre::eyre!(e))?;
        }
    }
    Ok(())
}
