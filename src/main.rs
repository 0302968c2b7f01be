//! Entry point for the read-along driver.
//!
//! Loads the engine configuration and a story script, then plays each page
//! through a frame loop, logging highlights as they fire.

mod cancellation;
mod driver;
mod script;

use crate::cancellation::CancellationToken;
use crate::driver::{DriverOptions, run_story};
use crate::script::load_script;
use anyhow::{Context, Result, anyhow};
use readalong_core::config::load_config;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str =
    "Usage: readalong <story.json> [--config <path>] [--realtime] [--swipe <line>]";

struct Args {
    script_path: PathBuf,
    config_path: PathBuf,
    options: DriverOptions,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        script = %args.script_path.display(),
        level = %config.log_level,
        realtime = args.options.realtime,
        "Starting read-along driver"
    );

    let script = load_script(&args.script_path)?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C; stopping playback");
        handler_token.cancel();
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }

    let report = run_story(&script, &config, &args.options, &cancel)?;
    if report.cancelled {
        info!("Stopped early");
    }
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut script_path = None;
    let mut config_path = PathBuf::from("conf/config.toml");
    let mut options = DriverOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config_path = PathBuf::from(value);
            }
            "--realtime" => options.realtime = true,
            "--swipe" => {
                let value = args.next().ok_or_else(|| anyhow!("--swipe needs a line index"))?;
                let line = value
                    .parse::<usize>()
                    .with_context(|| format!("Invalid line index: {value}"))?;
                options.swipe_line = Some(line);
            }
            other if other.starts_with("--") => {
                return Err(anyhow!("Unknown option {other}\n{USAGE}"));
            }
            other => script_path = Some(PathBuf::from(other)),
        }
    }

    let script_path = script_path.ok_or_else(|| anyhow!(USAGE))?;
    if !script_path.exists() {
        return Err(anyhow!("File not found: {}", script_path.display()));
    }
    Ok(Args {
        script_path,
        config_path,
        options,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn options_are_parsed_in_any_order() {
        let parsed = parse_args(args(&["--swipe", "2", "--realtime", "Cargo.toml"])).unwrap();
        assert_eq!(parsed.script_path, PathBuf::from("Cargo.toml"));
        assert_eq!(parsed.options.swipe_line, Some(2));
        assert!(parsed.options.realtime);
        assert_eq!(parsed.config_path, PathBuf::from("conf/config.toml"));
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--swipe", "x", "Cargo.toml"])).is_err());
        assert!(parse_args(args(&["--bogus", "Cargo.toml"])).is_err());
        assert!(parse_args(args(&["missing-story.json"])).is_err());
    }
}
