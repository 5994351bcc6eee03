mod chrome;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::{BrowserOptions, ChromeLauncher};

use crate::domain::{LoadStrategy, WaitUntil};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// What a "reveal more" control looks like right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Absent,
    /// Present but hidden or disabled.
    Inert,
    Ready,
}

/// The page operations the pipeline needs from an automated browser.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str, wait: WaitUntil, timeout: Duration) -> Result<()>;
    async fn html(&mut self) -> Result<String>;
    async fn control_state(&mut self, selector: &str) -> Result<ControlState>;
    async fn click(&mut self, selector: &str) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageDriver>>;
}

/// One browser process and one page, owned by a single run.
///
/// Release it with [`Session::release`]; a session dropped without release
/// leaves teardown to the driver's own `Drop`.
pub struct Session {
    driver: Box<dyn PageDriver>,
    current_url: Option<String>,
    released: bool,
}

impl Session {
    pub async fn acquire(launcher: &dyn BrowserLauncher) -> Result<Self> {
        let driver = launcher.launch().await?;
        info!("Browser session acquired");
        Ok(Self {
            driver,
            current_url: None,
            released: false,
        })
    }

    /// Navigates and waits for the page to settle. A failed navigation leaves
    /// the session without a ready page.
    pub async fn navigate(&mut self, url: &str, load: &LoadStrategy) -> Result<()> {
        self.current_url = None;
        debug!("Navigating to {url}");

        match timeout(load.timeout, self.driver.goto(url, load.wait, load.timeout)).await {
            Ok(Ok(())) => {}
            Ok(Err(e @ ScrapeError::NavigationTimeout { .. })) => return Err(e),
            Ok(Err(ScrapeError::Navigation { reason, .. })) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason,
                })
            }
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ScrapeError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: load.timeout,
                })
            }
        }

        if !load.settle.is_zero() {
            sleep(load.settle).await;
        }

        self.current_url = Some(url.to_string());
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.current_url.is_some()
    }

    /// Serialized DOM of the loaded page.
    pub async fn page_source(&mut self) -> Result<String> {
        if !self.is_ready() {
            return Err(ScrapeError::PageNotReady);
        }
        self.driver.html().await
    }

    pub async fn control_state(&mut self, selector: &str) -> Result<ControlState> {
        if !self.is_ready() {
            return Err(ScrapeError::PageNotReady);
        }
        self.driver.control_state(selector).await
    }

    pub async fn click(&mut self, selector: &str) -> Result<()> {
        if !self.is_ready() {
            return Err(ScrapeError::PageNotReady);
        }
        self.driver.click(selector).await
    }

    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        self.current_url = None;
        let result = self.driver.close().await;
        match &result {
            Ok(()) => info!("Browser session released"),
            Err(e) => warn!("Browser session did not close cleanly: {e}"),
        }
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.released {
            warn!("Browser session dropped without release");
        }
    }
}
