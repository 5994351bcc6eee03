use crate::config::cli::Commands;
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::infrastructure::{ChromeLauncher, FileSystemStore};
use crate::services::Orchestrator;
use tracing::{info, warn, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let level: Level = config
        .args
        .log_level
        .parse()
        .map_err(|_| ScrapeError::Config(format!("unknown log level '{}'", config.args.log_level)))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    match &config.args.command {
        Some(Commands::Ppg { path }) => {
            let updated = services::ppg::add_ppg(path).await?;
            info!("Added ppg to {updated} players");
        }
        None | Some(Commands::Scrape) => scrape(&config).await?,
    }

    Ok(())
}

async fn scrape(config: &Config) -> Result<()> {
    if let Some(path) = config.overrides_source() {
        info!("Loaded source overrides from {:?}", path);
    }
    config.ensure_directories()?;
    let sources = config.descriptors()?;
    let years = config.years()?;

    let launcher = ChromeLauncher::new(config.browser_options());
    let orchestrator = Orchestrator::new(
        FileSystemStore::new(&config.args.data_dir),
        config.args.strict,
    );

    let summary = orchestrator.scrape_all(&launcher, &sources, &years).await?;

    for report in &summary.years {
        match &report.error {
            Some(error) => warn!("{} {}: failed ({error})", report.source, report.year),
            None => info!(
                "{} {}: {} records{}",
                report.source,
                report.year,
                report.records,
                report
                    .artifact
                    .as_deref()
                    .map(|path| format!(" -> {path}"))
                    .unwrap_or_default()
            ),
        }
    }

    info!(
        "Scraping completed: {} records written, {} years failed",
        summary.records_written, summary.years_failed
    );
    Ok(())
}
