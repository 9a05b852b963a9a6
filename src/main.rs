//! Kleine kiosk controller.
//!
//! Loads the layered configuration, builds the devices, and hands over to
//! [`kleine::lifecycle::run`] until the kiosk stops.
//!
//! ```text
//! kleine                       # config from the platform config dir
//! kleine --config ./config     # explicit config directory
//! kleine --headless            # PNG frames, no window, no buttons
//! kleine --print-config        # dump the effective config and exit
//! RUST_LOG=kleine::gps=trace kleine
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context as _, Result};
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};

use kleine::config::AppConfig;
use kleine::context::Context;
use kleine::scheduler::StopReason;
use kleine::{drivers, lifecycle};

#[derive(Parser, Debug)]
#[command(name = "kleine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of TOML config files (main.toml first, then alphabetical)
    #[arg(short, long, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Write frames as PNG files and ignore button input
    #[arg(long)]
    headless: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn config_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.config {
        return dir.clone();
    }
    directories::ProjectDirs::from("", "", "kleine")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("config"))
}

/// `None` when only the config was printed.
fn run(cli: &Cli) -> Result<Option<StopReason>> {
    let dir = config_dir(cli);
    let config = AppConfig::load_dir(&dir).with_context(|| format!("loading config from {}", dir.display()))?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config).context("serializing config")?);
        return Ok(None);
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&interrupt))
            .with_context(|| format!("registering handler for signal {}", signal))?;
    }

    let ctx = Context::new(config);
    log::info!("{} starting, config from {}", ctx.config().app.name, dir.display());
    let mut devices =
        drivers::build(&ctx.scoped("kleine::drivers"), cli.headless, Arc::clone(&interrupt)).context("building devices")?;

    Ok(Some(lifecycle::run(&ctx, &mut devices, &interrupt)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str())).init();

    match run(&cli) {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(StopReason::Failed(message))) => {
            log::error!("stopped after failure: {}", message);
            ExitCode::FAILURE
        }
        Ok(Some(reason)) => {
            log::info!("stopped: {:?}", reason);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
