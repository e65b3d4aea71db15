//! Ipgeum Web Server
//!
//! Axum-based REST API over the ipgeum core:
//! - Parse preview for pasted notification text
//! - SMS intake (parse, evaluate, store; unparsed texts are kept for review)
//! - Companies, matching members and the deposit ledger
//!
//! Errors are sanitized: internal failures are logged and answered with a
//! generic message.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use ipgeum_core::db::Database;
use ipgeum_core::LookupFailurePolicy;

mod handlers;
mod lookup;

pub use lookup::TimedLookup;

/// Default bound on a single matching-member lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3000);

/// Maximum accepted request body (raw SMS texts are small)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Upper bound on one matching-member lookup; a timeout counts as a failure
    pub lookup_timeout: Duration,
    /// Flags reported when the lookup fails
    pub lookup_failure: LookupFailurePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            lookup_failure: LookupFailurePolicy::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Parse a comma-separated list of CORS origins
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let valid = s.parse::<HeaderValue>().is_ok();
            if !valid {
                warn!(origin = *s, "Ignoring invalid CORS origin");
            }
            valid
        })
        .map(String::from)
        .collect()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let cors = build_cors(&config);
    let state = Arc::new(AppState { db, config });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/parse", post(handlers::parse_text))
        // Deposits
        .route(
            "/deposits",
            get(handlers::list_deposits).post(handlers::create_deposit),
        )
        .route("/deposits/receive-sms", post(handlers::receive_sms))
        .route("/deposits/unchecked-count", get(handlers::unchecked_count))
        .route("/deposits/companies", get(handlers::deposit_companies))
        .route(
            "/deposits/:id",
            get(handlers::get_deposit).delete(handlers::delete_deposit),
        )
        .route("/deposits/:id/check", put(handlers::check_deposit))
        // Companies
        .route(
            "/companies",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route("/companies/:name", delete(handlers::delete_company))
        .route("/companies/:name/approval", put(handlers::set_company_approval))
        // Matching members
        .route(
            "/matching",
            get(handlers::list_matching_members).post(handlers::create_matching_member),
        )
        .route(
            "/matching/:id",
            put(handlers::update_matching_member).delete(handlers::delete_matching_member),
        );

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: same-origin only
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        lookup_timeout_ms = config.lookup_timeout.as_millis() as u64,
        lookup_failure = %config.lookup_failure,
        "Matching lookup configured"
    );

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map core errors that carry a client-facing meaning
    pub fn from_core(err: ipgeum_core::Error) -> Self {
        match err {
            ipgeum_core::Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            ipgeum_core::Error::InvalidData(msg) => Self::bad_request(&msg),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}
