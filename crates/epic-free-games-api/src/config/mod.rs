//! Configuration resolution: flags and environment collapse into one value
//! per concern before the server starts.

use std::path::{Path, PathBuf};

use epic_free_games::{Catalog, FetchConfig, ScrapeResult};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Launch flags applied in hardened container environments, where the
/// browser runs without a sandbox or GPU and shared memory is scarce.
const HARDENED_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--disable-web-security",
    "--disable-features=VizDisplayCompositor",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--single-process",
    "--disable-extensions",
    "--disable-default-apps",
    "--disable-sync",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Resolve the browser launch configuration.
///
/// Browser binary: explicit flag > `EPIC_API_BROWSER` env > autodetect.
/// `EPIC_API_HARDENED=1` selects the container profile (sandbox off plus the
/// stability flag set); anything else keeps the local-desktop defaults.
pub fn resolve_fetch_config(browser_flag: Option<&str>) -> FetchConfig {
    let mut config = FetchConfig::default();

    config.browser_path = browser_flag
        .map(str::to_string)
        .or_else(|| std::env::var("EPIC_API_BROWSER").ok())
        .map(PathBuf::from);

    if hardened_environment() {
        tracing::info!("hardened environment: sandbox disabled, stability flags applied");
        config.sandbox = false;
        config.extra_args = HARDENED_ARGS.iter().map(|s| s.to_string()).collect();
    }

    config
}

fn hardened_environment() -> bool {
    std::env::var("EPIC_API_HARDENED").map(|v| v == "1").unwrap_or(false)
}

/// Resolve the lookup-table catalog: explicit flag > `EPIC_API_CATALOG` env >
/// builtin tables. Override files merge over the builtins.
pub fn resolve_catalog(path_flag: Option<&str>) -> ScrapeResult<Catalog> {
    let path = path_flag
        .map(str::to_string)
        .or_else(|| std::env::var("EPIC_API_CATALOG").ok());

    match path {
        Some(p) => Catalog::load(Path::new(&p)),
        None => Ok(Catalog::builtin()),
    }
}

/// Resolve the listen address: explicit flag > `EPIC_API_ADDR` env > default.
pub fn resolve_addr(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("EPIC_API_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
}
