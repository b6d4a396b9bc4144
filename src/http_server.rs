//! DNS query proxy
//!
//! Forwards `GET /api/query?name=<name>&type=<type>` to a DNS-over-HTTPS
//! JSON endpoint and passes the upstream JSON through unchanged, so browser
//! and CLI clients can run live comparisons without talking DoH themselves.

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{Method, StatusCode, header::ACCEPT, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, trace};

use crate::config::ZoneDiffConfig;
use crate::doh::QUERY_PATH;

/// Plain-text answer for paths other than the API routes
pub const BANNER: &str = "zonediff DNS query API";

/// Query type used when the request does not name one
pub const DEFAULT_QUERY_TYPE: &str = "A";

/// HTTP server forwarding DNS queries to a DoH upstream
pub struct ProxyServer {
    bind_addr: SocketAddr,
    upstream_url: String,
    enable_cors: bool,
    client: reqwest::Client,
}

#[derive(Clone)]
struct AppState {
    client: reqwest::Client,
    upstream_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    name: Option<String>,
    #[serde(rename = "type")]
    rtype: Option<String>,
}

impl ProxyServer {
    pub fn new(config: &ZoneDiffConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .user_agent(concat!("zonediff/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            bind_addr: config.http_bind_addr,
            upstream_url: config.upstream_doh_url.clone(),
            enable_cors: config.enable_cors,
            client,
        }
    }

    /// Build the HTTP router with all proxy endpoints
    pub fn router(&self) -> Router {
        let state = AppState {
            client: self.client.clone(),
            upstream_url: self.upstream_url.clone(),
        };

        let mut router = Router::new()
            .route(QUERY_PATH, get(handle_query).options(empty_ok))
            .route("/health", get(health_check).options(empty_ok))
            .fallback(fallback)
            .with_state(state);

        if self.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .max_age(Duration::from_secs(3600));

            router = router.layer(cors);
        }

        router.layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
    }

    /// Bind the configured address and serve until ctrl-c
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!("Starting DNS query proxy on {}", listener.local_addr()?);
        info!("Forwarding queries to {}", self.upstream_url);

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("DNS query proxy stopped");
        Ok(())
    }

    /// Serve on an already bound listener until the task is dropped
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Forward one query to the DoH upstream
async fn handle_query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    let Some(name) = params.name.filter(|name| !name.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing name parameter");
    };
    let rtype = params
        .rtype
        .filter(|rtype| !rtype.is_empty())
        .unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string());

    match forward_query(&state, &name, &rtype).await {
        Ok(body) => {
            debug!("Answered {} {}", name, rtype);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Upstream query for {} {} failed: {}", name, rtype, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn forward_query(state: &AppState, name: &str, rtype: &str) -> reqwest::Result<Value> {
    state
        .client
        .get(&state.upstream_url)
        .query(&[("name", name), ("type", rtype)])
        .header(ACCEPT, "application/dns-json")
        .send()
        .await?
        .json::<Value>()
        .await
}

/// Basic health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

async fn empty_ok() -> StatusCode {
    StatusCode::OK
}

/// Empty body for OPTIONS on any path, banner for everything else
async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        empty_ok().await.into_response()
    } else {
        BANNER.into_response()
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    trace!("{} {} {} {:?}", method, uri, response.status(), start.elapsed());

    response
}
