//! Epic Free Weekly API server — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use epic_free_games::{extract_free_games, fetch_rendered_page, ScrapeError};
use epic_free_games_api::config::{resolve_addr, resolve_catalog, resolve_fetch_config};
use epic_free_games_api::types::ScrapeSuccess;
use epic_free_games_api::ApiServer;

#[derive(Parser)]
#[command(
    name = "epic-free-games-api",
    about = "HTTP API for Epic Games Store free-game promotions",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (default).
    Serve {
        /// Listen address (host:port). Also reads EPIC_API_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Browser binary path. Also reads EPIC_API_BROWSER.
        #[arg(long)]
        browser: Option<String>,

        /// JSON catalog override file. Also reads EPIC_API_CATALOG.
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Run one fetch+extract cycle and print the JSON envelope to stdout.
    Scrape {
        /// Browser binary path. Also reads EPIC_API_BROWSER.
        #[arg(long)]
        browser: Option<String>,

        /// JSON catalog override file. Also reads EPIC_API_CATALOG.
        #[arg(long)]
        catalog: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print service metadata and routes as JSON.
    Info,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        browser: None,
        catalog: None,
    }) {
        Commands::Serve {
            addr,
            browser,
            catalog,
        } => {
            let addr = resolve_addr(addr.as_deref());
            let fetch_config = resolve_fetch_config(browser.as_deref());
            let catalog = resolve_catalog(catalog.as_deref())?;
            tracing::info!("Epic Free Weekly API server");
            let server = ApiServer::new(fetch_config, catalog);
            server.run(&addr).await?;
        }

        Commands::Scrape {
            browser,
            catalog,
            pretty,
        } => {
            let fetch_config = resolve_fetch_config(browser.as_deref());
            let catalog = resolve_catalog(catalog.as_deref())?;

            let games = tokio::task::spawn_blocking(move || {
                let page = fetch_rendered_page(&fetch_config)?;
                Ok::<_, ScrapeError>(extract_free_games(&page, &catalog))
            })
            .await??;

            let envelope = ScrapeSuccess::new(games);
            if pretty {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                println!("{}", serde_json::to_string(&envelope)?);
            }
        }

        Commands::Info => {
            let info = serde_json::json!({
                "service": "Epic Games Scraper API",
                "version": env!("CARGO_PKG_VERSION"),
                "target": epic_free_games::FREE_GAMES_URL,
                "endpoints": {
                    "/api/epic/weekly-free": "GET - Scrape Epic Games free games list",
                    "/api/health": "GET - API health check",
                    "/": "GET - Demo and documentation page"
                },
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "epic-free-games-api",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
