use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dw_cli::commands::{options, run, status};
use dw_cli::{Cli, Commands, Config, OptionsAction};
use dw_core::OptionsPatch;
use dw_core::options::parse_threshold;

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<dw_store::Store> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create store directory")?;
    }

    dw_store::Store::open(&config.database_path).context("failed to open store")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support. Logs go to stderr: stdout
    // carries the daemon's wire protocol.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Run) => {
            let store = open_store(cli.config.as_deref())?;
            let runtime =
                tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
            runtime.block_on(run::run(store))?;
        }
        Some(Commands::Status) => {
            let store = open_store(cli.config.as_deref())?;
            let mut stdout = std::io::stdout();
            status::run(&mut stdout, &store)?;
        }
        Some(Commands::Options { action }) => match action {
            OptionsAction::Show => {
                let store = open_store(cli.config.as_deref())?;
                let mut stdout = std::io::stdout();
                options::show(&mut stdout, &store)?;
            }
            OptionsAction::Set {
                domain,
                threshold_minutes,
                discord_webhook_url,
                enable_discord,
                enable_local_notif,
                enable_overlay,
                tracking_enabled,
            } => {
                let patch = OptionsPatch {
                    domain: domain.clone(),
                    threshold_minutes: threshold_minutes.as_deref().map(parse_threshold),
                    discord_webhook_url: discord_webhook_url.clone(),
                    enable_discord: *enable_discord,
                    enable_local_notif: *enable_local_notif,
                    enable_overlay: *enable_overlay,
                    tracking_enabled: *tracking_enabled,
                };
                if patch.is_empty() {
                    anyhow::bail!("no options given; see dw options set --help");
                }
                let mut store = open_store(cli.config.as_deref())?;
                let runtime =
                    tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
                let mut stdout = std::io::stdout();
                runtime.block_on(options::set(&mut stdout, &mut store, &patch))?;
            }
        },
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
