use crate::config::cli::{Args, Commands};
use crate::domain::{SourceDescriptor, SourceKey};
use crate::error::{Result, ScrapeError};
use crate::infrastructure::BrowserOptions;
use clap::Parser;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

/// Per-source settings that replace the built-in descriptor values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceOverride {
    pub url_template: Option<String>,
    pub max_attempts: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub sources: FxHashMap<SourceKey, SourceOverride>,
}

pub struct Config {
    pub args: Args,
    pub scraper_config: ScraperConfig,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        if !args.settle_scale.is_finite() || args.settle_scale < 0.0 {
            return Err(ScrapeError::Config(format!(
                "settle scale must be a non-negative number, got {}",
                args.settle_scale
            )));
        }

        // Overrides only matter when scraping
        let scraper_config = match (&args.config_file, &args.command) {
            (Some(path), None | Some(Commands::Scrape)) => {
                serde_json::from_str(&std::fs::read_to_string(path)?)?
            }
            _ => ScraperConfig::default(),
        };

        Ok(Self {
            args,
            scraper_config,
        })
    }

    /// Override file in effect for this run, if any was loaded.
    pub fn overrides_source(&self) -> Option<&std::path::Path> {
        match self.args.command {
            None | Some(Commands::Scrape) => self.args.config_file.as_deref(),
            Some(Commands::Ppg { .. }) => None,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }

        info!("Data dir {:?} exists", self.args.data_dir);
        Ok(())
    }

    /// Selected sources in the order given, without repeats.
    pub fn source_keys(&self) -> Result<Vec<SourceKey>> {
        if self.args.sources.iter().any(|s| s.trim() == "all") {
            return Ok(SourceKey::ALL.to_vec());
        }

        let mut keys = Vec::new();
        for name in &self.args.sources {
            let key: SourceKey = name.parse().map_err(ScrapeError::Config)?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Err(ScrapeError::Config("no sources selected".into()));
        }
        Ok(keys)
    }

    pub fn years(&self) -> Result<Vec<u16>> {
        if self.args.years.is_empty() {
            return Err(ScrapeError::Config("no years selected".into()));
        }
        Ok(self.args.years.clone())
    }

    /// Built-in descriptors with file overrides, then CLI overrides, applied.
    pub fn descriptors(&self) -> Result<Vec<SourceDescriptor>> {
        let descriptors = self
            .source_keys()?
            .into_iter()
            .map(|key| {
                let mut source = SourceDescriptor::builtin(key, &self.args.team);

                if let Some(over) = self.scraper_config.sources.get(&key) {
                    if let Some(template) = &over.url_template {
                        source.url_template = template.clone();
                    }
                    if let (Some(max), Some(pagination)) =
                        (over.max_attempts, source.pagination.as_mut())
                    {
                        pagination.max_attempts = max;
                    }
                    if let Some(secs) = over.timeout_secs {
                        source.load.timeout = Duration::from_secs(secs);
                    }
                }

                if let Some(secs) = self.args.nav_timeout_secs {
                    source.load.timeout = Duration::from_secs(secs);
                }
                source.scale_delays(self.args.settle_scale);
                source
            })
            .collect();

        Ok(descriptors)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: !self.args.headful,
            executable: self.args.chrome_path.clone(),
            ..BrowserOptions::default()
        }
    }
}
