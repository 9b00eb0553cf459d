mod cli;
mod config;
mod error;
mod model;
mod pipeline;
mod providers;
mod util;

use anyhow::Result;
use log::{error, info};

use pipeline::RunOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = cli::parse_args(&args)?;
    if args.help {
        cli::print_help();
        return Ok(());
    }

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    // Load config
    let path = args.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&path)?;

    let clients = providers::create_clients(&config);
    let options = RunOptions {
        release_version: args.release_version,
    };

    let summary = match pipeline::run(&config, &clients, &options).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Step '{}' failed, aborting", e.step());
            return Err(e.into());
        }
    };

    info!(
        "Done: {} defects fetched, Confluence {}, {} defects updated",
        summary.fetched,
        if summary.published { "updated" } else { "skipped" },
        summary.updated
    );
    if let Some(file) = &summary.changes_file {
        info!("Changes written to {}", file.display());
    }

    Ok(())
}
