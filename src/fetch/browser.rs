use super::http::USER_AGENT;
use super::{FetchedPage, Fetcher};
use crate::config::ScrapeConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern};
use headless_chrome::protocol::cdp::Network::ErrorReason;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Masks the usual automation markers before any page script runs
const STEALTH_JS: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
window.chrome = { runtime: {} };
"#;

/// How often `document.readyState` is checked while a page loads
const READY_POLL: Duration = Duration::from_millis(100);

/// Resource types that never reach the network
const BLOCKED_RESOURCES: [&str; 3] = ["Image", "Font", "Media"];

/// One Chrome instance with a single tab, shared by every browser-driven
/// source in a run. Navigation is strictly sequential.
pub struct BrowserSession {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
    nav_timeout: Duration,
    settle: Duration,
}

impl BrowserSession {
    /// Launch Chrome and prepare the shared tab
    pub fn launch(config: &ScrapeConfig) -> Result<Self> {
        info!("Launching Chrome (headless={})...", config.headless);

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((1366, 768)))
            .idle_browser_timeout(config.nav_timeout() * 4)
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-setuid-sandbox"),
            ])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(config.nav_timeout());

        prepare_tab(&tab)?;

        Ok(Self {
            _browser: browser,
            tab,
            nav_timeout: config.nav_timeout(),
            settle: config.settle(),
        })
    }
}

/// Fingerprint and resource-blocking setup, applied once per session
fn prepare_tab(tab: &Arc<Tab>) -> Result<()> {
    tab.set_user_agent(USER_AGENT, Some("en-US"), None)
        .context("Failed to set user agent")?;

    let headers = HashMap::from([
        ("Accept", "text/html,application/xhtml+xml,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
    ]);
    tab.set_extra_http_headers(headers)
        .context("Failed to set extra headers")?;

    tab.call_method(Emulation::SetTimezoneOverride {
        timezone_id: "Africa/Nairobi".to_string(),
    })
    .context("Failed to override timezone")?;

    tab.call_method(Page::AddScriptToEvaluateOnNewDocument {
        source: STEALTH_JS.to_string(),
        world_name: None,
        include_command_line_api: None,
        run_immediately: None,
    })
    .context("Failed to inject stealth script")?;

    let patterns = BLOCKED_RESOURCES
        .iter()
        .map(|resource| serde_json::from_value(json!({ "urlPattern": "*", "resourceType": resource })))
        .collect::<Result<Vec<RequestPattern>, _>>()
        .context("Failed to build request patterns")?;

    // Only the blocked resource types are paused, so every paused request fails
    tab.enable_fetch(Some(patterns.as_slice()), None)
        .context("Failed to enable request interception")?;
    tab.enable_request_interception(Arc::new(
        |_transport, _session_id, intercepted: RequestPausedEvent| {
            RequestPausedDecision::Fail(FailRequest {
                request_id: intercepted.params.request_id,
                error_reason: ErrorReason::BlockedByClient,
            })
        },
    ))
    .context("Failed to install request interceptor")?;

    debug!("Browser tab prepared: stealth script + {:?} blocked", BLOCKED_RESOURCES);
    Ok(())
}

#[async_trait]
impl Fetcher for BrowserSession {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let tab = Arc::clone(&self.tab);
        let target = url.to_string();
        let settle = self.settle;
        let nav_timeout = self.nav_timeout;

        let html = tokio::task::spawn_blocking(move || -> Result<String> {
            tab.navigate_to(&target)?;
            // Done once the DOM is parsed; network idle is never awaited
            poll_until(nav_timeout, READY_POLL, || {
                let state = tab.evaluate("document.readyState", false)?;
                Ok(dom_parsed(state.value.as_ref()))
            })?;
            thread::sleep(settle);
            tab.get_content()
        })
        .await
        .context("Browser task panicked")?
        .with_context(|| format!("Navigation error {url}"))?;

        debug!("Rendered {} bytes from {}", html.len(), url);
        Ok(FetchedPage::new(url, html))
    }
}

/// `readyState` has moved past `loading`
fn dom_parsed(ready_state: Option<&Value>) -> bool {
    matches!(
        ready_state.and_then(Value::as_str),
        Some("interactive") | Some("complete")
    )
}

/// Call `check` every `interval` until it returns true or `timeout` passes
fn poll_until<F>(timeout: Duration, interval: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check()? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("DOM not ready after {:.0}s", timeout.as_secs_f64());
        }
        thread::sleep(interval);
    }
}
