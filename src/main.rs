use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsguard::app::AppContext;
use newsguard::cli::{commands, CacheAction, Cli, Commands};
use newsguard::config::Config;
use newsguard::fetcher::http_fetcher::HttpSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui))?;

    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Live { filters } => {
            commands::live(&ctx, filters.selection()).await?;
        }
        Commands::All { pages } => {
            commands::all(&ctx, pages).await?;
        }
        Commands::Watch { filters } => {
            commands::watch(&ctx, filters.selection()).await?;
        }
        Commands::Check { title, meta } => {
            let source = HttpSource::new(&ctx.config.api.base_url, ctx.config.api_timeout())?;
            commands::check(&source, &title, meta).await?;
        }
        Commands::Tui => {
            newsguard::tui::run(Arc::new(ctx)).await?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Status => commands::cache_status(&ctx)?,
            CacheAction::Clear => commands::cache_clear(&ctx)?,
        },
    }

    Ok(())
}

/// The TUI owns the terminal, so its logs go to a file in the data directory.
fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    if to_file {
        let path = AppContext::data_dir()?.join("newsguard.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
    Ok(())
}
