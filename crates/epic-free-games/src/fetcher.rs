//! Headless-browser page fetcher.
//!
//! A thin shim over `headless_chrome`: launch an isolated browser, render the
//! free-games page, and reduce it to a [`RenderedPage`]. The browser handle is
//! function-local, so the process is torn down on every exit path.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};

use crate::page::RenderedPage;
use crate::types::{ScrapeError, ScrapeResult};

/// The promotional page this crate scrapes.
pub const FREE_GAMES_URL: &str = "https://store.epicgames.com/en-US/free-games";

/// User agent presented to the store; a realistic desktop Chrome string.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Bounded navigation wait.
const NAV_TIMEOUT: Duration = Duration::from_secs(30);
/// Extra settle time for late-rendering client-side content.
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// One resolved launch-and-navigate configuration. Environment differences
/// (hardened container vs. local desktop) are expressed purely as field
/// values, keeping the fetch logic itself environment-agnostic.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub target_url: String,
    /// Explicit browser binary; `None` lets the launcher autodetect.
    pub browser_path: Option<PathBuf>,
    /// Chromium sandbox; disabled in hardened container environments.
    pub sandbox: bool,
    /// Additional launch flags, e.g. the container stability set.
    pub extra_args: Vec<String>,
    pub user_agent: String,
    pub window_size: (u32, u32),
    pub nav_timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for FetchConfig {
    /// Local-desktop profile.
    fn default() -> Self {
        Self {
            target_url: FREE_GAMES_URL.to_string(),
            browser_path: None,
            sandbox: true,
            extra_args: Vec::new(),
            user_agent: USER_AGENT.to_string(),
            window_size: (1920, 1080),
            nav_timeout: NAV_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Launch a browser, render the target page, and flatten it for extraction.
///
/// Blocking: navigation plus the settle delay. Callers inside an async runtime
/// should wrap this in `spawn_blocking`.
pub fn fetch_rendered_page(config: &FetchConfig) -> ScrapeResult<RenderedPage> {
    let args: Vec<&OsStr> = config.extra_args.iter().map(|a| OsStr::new(a.as_str())).collect();

    let options = LaunchOptions {
        headless: true,
        sandbox: config.sandbox,
        window_size: Some(config.window_size),
        path: config.browser_path.clone(),
        args,
        ..Default::default()
    };

    let browser = Browser::new(options).map_err(|e| ScrapeError::Launch(e.to_string()))?;

    let tab = browser
        .new_tab()
        .map_err(|e| ScrapeError::Launch(e.to_string()))?;
    tab.set_user_agent(&config.user_agent, None, None)
        .map_err(|e| ScrapeError::Launch(e.to_string()))?;
    tab.set_default_timeout(config.nav_timeout);

    tracing::info!(url = %config.target_url, "navigating to free-games page");
    tab.navigate_to(&config.target_url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| ScrapeError::Navigation(e.to_string()))?;

    // The promotion rail renders client-side after network idle.
    std::thread::sleep(config.settle_delay);

    let visible_text = tab
        .evaluate("document.body.innerText", false)
        .map_err(|e| ScrapeError::Evaluate(e.to_string()))?
        .value
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let html = tab
        .get_content()
        .map_err(|e| ScrapeError::Evaluate(e.to_string()))?;

    let page = RenderedPage::from_parts(&visible_text, &html);
    tracing::debug!(
        lines = page.lines.len(),
        images = page.images.len(),
        anchors = page.anchors.len(),
        "page rendered"
    );
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_local_desktop_profile() {
        let config = FetchConfig::default();
        assert_eq!(config.target_url, FREE_GAMES_URL);
        assert!(config.sandbox);
        assert!(config.browser_path.is_none());
        assert!(config.extra_args.is_empty());
        assert_eq!(config.window_size, (1920, 1080));
        assert_eq!(config.nav_timeout, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_secs(3));
    }
}
