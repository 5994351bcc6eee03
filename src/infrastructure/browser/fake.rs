//! Scripted in-memory browser for tests.

use super::{BrowserLauncher, ControlState, PageDriver};
use crate::domain::WaitUntil;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A page whose DOM grows by one state per click.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    /// `states[n]` is the HTML after `n` clicks; the last state sticks.
    pub states: Vec<String>,
    /// `controls[n]` is the control state after `n` clicks; absent past the end.
    pub controls: Vec<ControlState>,
    pub unreachable: bool,
    pub hangs: bool,
    /// Click number (0-based) that fails.
    pub click_error_at: Option<usize>,
    /// Control check that fails once this many clicks have been made.
    pub state_error_at: Option<usize>,
    /// Loads, but the network never goes idle.
    pub never_idle: bool,
}

impl FakePage {
    pub fn html(html: &str) -> Self {
        Self {
            states: vec![html.to_string()],
            ..Self::default()
        }
    }

    pub fn growing(states: Vec<String>, controls: Vec<ControlState>) -> Self {
        Self {
            states,
            controls,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn never_idle() -> Self {
        Self {
            states: vec![String::new()],
            never_idle: true,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hangs: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    pages: FxHashMap<String, FakePage>,
    fail: bool,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>> {
        if self.fail {
            return Err(ScrapeError::Launch("no browser executable".into()));
        }
        self.events.lock().unwrap().push("launch".into());
        Ok(Box::new(FakeDriver {
            pages: self.pages.clone(),
            current: None,
            clicks: 0,
            events: Arc::clone(&self.events),
        }))
    }
}

pub struct FakeDriver {
    pages: FxHashMap<String, FakePage>,
    current: Option<String>,
    clicks: usize,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeDriver {
    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn page(&self) -> Result<&FakePage> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or(ScrapeError::PageNotReady)
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str, _wait: WaitUntil, timeout: Duration) -> Result<()> {
        self.log(format!("goto {url}"));
        self.current = None;
        self.clicks = 0;

        let page = self.pages.get(url).cloned().unwrap_or_else(FakePage::unreachable);
        if page.hangs {
            std::future::pending::<()>().await;
        }
        if page.never_idle {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            });
        }
        if page.unreachable {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn html(&mut self) -> Result<String> {
        let page = self.page()?;
        let index = self.clicks.min(page.states.len().saturating_sub(1));
        Ok(page.states.get(index).cloned().unwrap_or_default())
    }

    async fn control_state(&mut self, _selector: &str) -> Result<ControlState> {
        let page = self.page()?;
        if page.state_error_at == Some(self.clicks) {
            return Err(ScrapeError::Browser("Execution context was destroyed".into()));
        }
        Ok(page
            .controls
            .get(self.clicks)
            .copied()
            .unwrap_or(ControlState::Absent))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let failing = self.page()?.click_error_at == Some(self.clicks);
        self.log(format!("click {selector}"));
        if failing {
            return Err(ScrapeError::Browser("Node is detached from document".into()));
        }
        self.clicks += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log("close".into());
        Ok(())
    }
}
