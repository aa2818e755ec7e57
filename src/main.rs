//! Speedtest API - HTTP server binary

use anyhow::Context;
use clap::Parser;
use speedtest_api::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::AppError,
    logging::init_logging,
    server, BUILD_TIME, GIT_COMMIT, PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);

        let code = e
            .downcast_ref::<AppError>()
            .map(AppError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.write_env_example {
        EnvManager::save_example_env_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote example environment file to {}", path.display());
        return Ok(());
    }

    let config = load_config(cli).context("loading configuration")?;
    init_logging(&config).context("initializing logging")?;

    tracing::info!(
        version = VERSION,
        build_time = BUILD_TIME,
        commit = GIT_COMMIT.unwrap_or("unknown"),
        "{} starting",
        PKG_NAME
    );
    match &config.env_file {
        Some(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        None => tracing::debug!("no environment file, using defaults and process environment"),
    }
    for line in display_config_summary(&config).lines() {
        tracing::debug!("{}", line);
    }

    server::serve(config).await.context("running HTTP server")?;
    Ok(())
}
