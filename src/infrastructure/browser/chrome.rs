use super::{BrowserLauncher, ControlState, PageDriver};
use crate::domain::WaitUntil;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub executable: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            viewport: (1920, 1080),
            executable: None,
        }
    }
}

/// Launches Chromium over CDP with a desktop user agent and viewport, so
/// sites serve the full table markup instead of the mobile layout.
pub struct ChromeLauncher {
    options: BrowserOptions,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.options.viewport;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            })
            .arg(format!("--user-agent={}", self.options.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(ScrapeError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>> {
        let (browser, mut handler) = Browser::launch(self.config()?)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {e}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(ScrapeError::Launch(e.to_string()));
            }
        };
        page.set_user_agent(user_agent_override(&self.options.user_agent)).await?;

        Ok(Box::new(ChromeDriver {
            browser,
            page,
            handler_task,
        }))
    }
}

fn user_agent_override(user_agent: &str) -> SetUserAgentOverrideParams {
    SetUserAgentOverrideParams::new(user_agent)
}

struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeDriver {
    /// chromiumoxide has no network-idle lifecycle hook, so poll until the
    /// document is complete and the resource count has been stable for 500ms.
    async fn wait_for_network_idle(&self, url: &str, timeout: Duration) -> Result<()> {
        let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;
        let script = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = 500;
                const interval = 100;
                const start = Date.now();
                let last = performance.getEntriesByType('resource').length;
                let stable = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const now = performance.getEntriesByType('resource').length;
                    if (document.readyState === 'complete' && now === last) {{
                        stable += interval;
                        if (stable >= idleMs) return true;
                    }} else {{
                        stable = 0;
                    }}
                    last = now;
                }}
                return false;
            }})()"#
        );

        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ScrapeError::Browser)?;
        let idle: bool = self.page.evaluate_expression(params).await?.into_value()?;
        if idle {
            Ok(())
        } else {
            Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            })
        }
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&mut self, url: &str, wait: WaitUntil, timeout: Duration) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if wait == WaitUntil::NetworkIdle {
            self.wait_for_network_idle(url, timeout).await?;
        }
        Ok(())
    }

    async fn html(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn control_state(&mut self, selector: &str) -> Result<ControlState> {
        let selector = serde_json::to_string(selector)?;
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return 'absent';
                const style = window.getComputedStyle(el);
                const visible = el.getClientRects().length > 0
                    && style.visibility !== 'hidden'
                    && style.display !== 'none';
                const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
                return visible && enabled ? 'ready' : 'inert';
            }})()"#
        );

        let state: String = self.page.evaluate(script).await?.into_value()?;
        Ok(match state.as_str() {
            "absent" => ControlState::Absent,
            "ready" => ControlState::Ready,
            _ => ControlState::Inert,
        })
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Waiting for browser exit failed: {e}");
        }
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_override_carries_desktop_agent() {
        let params = user_agent_override(DESKTOP_USER_AGENT);
        assert_eq!(params.user_agent, DESKTOP_USER_AGENT);
        assert!(params.user_agent.contains("Macintosh"));
    }

    #[test]
    fn default_options_are_headless_desktop() {
        let options = BrowserOptions::default();
        assert!(options.headless);
        assert_eq!(options.viewport, (1920, 1080));
        assert_eq!(options.user_agent, DESKTOP_USER_AGENT);
    }
}
