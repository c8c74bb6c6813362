use std::path::Path;

use tracing_subscriber::EnvFilter;

mod cli;
use cli::{parse_cli_mode, run, CliMode, USAGE};
use shift_planner::storage::config::Config;

fn main() -> anyhow::Result<()> {
    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            Config::default()
        }
    };
    setup_logging(&config.logging.directory, &config.logging.level);

    let args = match parse_cli_mode() {
        Ok(CliMode::Run(args)) => args,
        Ok(CliMode::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args, &config) {
        tracing::error!("Command failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn setup_logging(log_dir: &Path, default_level: &str) {
    std::fs::create_dir_all(log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "shift-planner.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("shift-planner started");
}
