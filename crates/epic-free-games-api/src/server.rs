//! HTTP surface — axum router, CORS, and request handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use epic_free_games::{extract_free_games, fetch_rendered_page, Catalog, FetchConfig, ScrapeError};

use crate::types::{now_rfc3339, ScrapeFailure, ScrapeSuccess};

/// Embedded demo/documentation page served at `/`.
const DEMO_PAGE: &str = include_str!("../assets/index.html");

/// Shared server state passed to all handlers via axum State.
pub struct AppState {
    pub fetch_config: FetchConfig,
    pub catalog: Arc<Catalog>,
}

/// HTTP server for the scraper API.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(fetch_config: FetchConfig, catalog: Catalog) -> Self {
        Self {
            state: Arc::new(AppState {
                fetch_config,
                catalog: Arc::new(catalog),
            }),
        }
    }

    /// Build the router. Exposed separately so tests can drive it in-process.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any);

        Router::new()
            .route(
                "/api/epic/weekly-free",
                get(handle_weekly_free).fallback(handle_method_not_allowed),
            )
            .route(
                "/api/health",
                get(handle_health).fallback(handle_method_not_allowed),
            )
            .layer(cors)
            .route("/", get(handle_demo_page))
            .with_state(self.state.clone())
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("API listening on {addr}");
        axum::serve(listener, self.router()).await
    }
}

/// GET /api/epic/weekly-free — one full fetch+extract cycle per request.
///
/// The browser session is blocking, so it runs on the blocking pool; the
/// handle never outlives the closure, success or error.
async fn handle_weekly_free(State(state): State<Arc<AppState>>) -> Response {
    let fetch_config = state.fetch_config.clone();
    let catalog = state.catalog.clone();

    let scraped = tokio::task::spawn_blocking(move || {
        let page = fetch_rendered_page(&fetch_config)?;
        Ok::<_, ScrapeError>(extract_free_games(&page, &catalog))
    })
    .await;

    match scraped {
        Ok(Ok(games)) => {
            tracing::info!(count = games.len(), "scrape succeeded");
            (StatusCode::OK, Json(ScrapeSuccess::new(games))).into_response()
        }
        Ok(Err(e)) => scrape_failure(e.to_string()),
        Err(e) => scrape_failure(format!("scrape task failed: {e}")),
    }
}

fn scrape_failure(message: String) -> Response {
    tracing::error!(%message, "scrape failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ScrapeFailure::new(message)),
    )
        .into_response()
}

/// GET /api/health — static service metadata, no side effects.
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "Epic Games Scraper API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/epic/weekly-free": "GET - Scrape Epic Games free games list",
            "/api/health": "GET - API health check"
        },
        "timestamp": now_rfc3339(),
    }))
}

/// Non-GET verbs on the API routes are rejected before any browser work.
async fn handle_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

async fn handle_demo_page() -> Html<&'static str> {
    Html(DEMO_PAGE)
}
