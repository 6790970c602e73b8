//! HTTP surface — axum router over TCP.
//!
//! ```text
//! ┌──────────┐   POST /api/generate-code   ┌──────────────┐     ┌────────────────────┐
//! │  client  │────────────────────────────▶│  router      │────▶│ ConversationEngine │
//! └──────────┘   GET /api/components       │  (axum)      │     └─────────┬──────────┘
//!                GET /health               └──────┬───────┘               │
//!                                                 │                       ▼
//!                                          ┌──────▼───────┐       ┌───────────────┐
//!                                          │   Catalog    │◀──────│ ToolRegistry  │
//!                                          └──────────────┘       └───────────────┘
//! ```
//!
//! The generation handler awaits the whole conversation before answering.
//! Every failure is a JSON [`ErrorResponse`].

pub mod types;

use std::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span, warn};

use uiforge_config::AppConfig;

pub use types::*;

use crate::catalog::Catalog;
use crate::cost::PricingModel;
use crate::engine::{ConversationEngine, EngineError, EngineSettings};
use crate::extract::CodeExtractor;
use crate::llm::LlmProvider;
use crate::session::{HeaderSessionProvider, Identity, SessionProvider};
use crate::tools::ToolRegistry;

/// Shared state accessible to all route handlers.
pub struct AppState {
    /// `None` when no model credential is configured.
    pub engine: Option<ConversationEngine>,
    pub catalog: Catalog,
    pub pricing: PricingModel,
    pub extractor: CodeExtractor,
    pub sessions: Arc<dyn SessionProvider>,
    pub require_identity: bool,
    /// Include the error chain in 500 responses.
    pub expose_detail: bool,
    /// Variable named in the missing-credential error.
    pub api_key_env: String,
}

impl AppState {
    /// Wire the catalog, tools and engine described by `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Option<Arc<dyn LlmProvider>>,
    ) -> Result<Self, regex::Error> {
        let catalog = Catalog::from_config(&config.catalog);
        let tools = Arc::new(ToolRegistry::for_catalog(catalog.clone()));
        let engine = provider.map(|provider| {
            ConversationEngine::new(provider, tools, EngineSettings::from_config(config))
        });

        Ok(Self {
            engine,
            catalog,
            pricing: PricingModel::from_config(&config.pricing),
            extractor: CodeExtractor::new(&config.agent.code_language)?,
            sessions: Arc::new(HeaderSessionProvider::from_config(&config.session)),
            require_identity: config.session.require_identity,
            expose_detail: config.server.is_development(),
            api_key_env: config.llm.api_key_env.clone(),
        })
    }
}

/// Request-level failures, each mapped to a status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{env_var} environment variable is not set")]
    MissingCredential { env_var: String },

    #[error("No documentation files found in {dir}")]
    EmptyCatalog { dir: String },

    #[error("Failed to generate code")]
    Generation {
        #[source]
        source: EngineError,
        expose_detail: bool,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MissingCredential { .. } | Self::EmptyCatalog { .. } | Self::Generation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, detail) = match &self {
            Self::Generation {
                source,
                expose_detail,
            } => (
                Some(source.to_string()),
                expose_detail.then(|| error_chain(source)),
            ),
            _ => (None, None),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            message,
            detail,
        };
        (self.status(), Json(body)).into_response()
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(e) = source {
        parts.push(e.to_string());
        source = e.source();
    }
    parts.join(": ")
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(handle_health))
        .route("/api/components", get(handle_components))
        .route("/api/generate-code", post(handle_generate))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("HTTP server shutting down");
        })
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        build_profile: crate::build_info::BUILD_PROFILE.to_string(),
    })
}

async fn handle_components(State(state): State<Arc<AppState>>) -> Json<ComponentsResponse> {
    let components = state
        .catalog
        .all_metadata()
        .await
        .into_iter()
        .map(|(name, metadata)| ComponentInfo::new(name, metadata))
        .collect();
    Json(ComponentsResponse { components })
}

async fn handle_generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<GenerateCodeRequest>, JsonRejection>,
) -> Result<Json<GenerateCodeResponse>, ApiError> {
    let identity = state.sessions.identity(&headers);
    let span = info_span!(
        "generate_code",
        identity = identity.as_ref().map_or("anonymous", Identity::as_str)
    );
    generate(&state, identity, body).instrument(span).await
}

async fn generate(
    state: &AppState,
    identity: Option<Identity>,
    body: Result<Json<GenerateCodeRequest>, JsonRejection>,
) -> Result<Json<GenerateCodeResponse>, ApiError> {
    if state.require_identity && identity.is_none() {
        warn!("Rejecting anonymous generation request");
        return Err(ApiError::Unauthenticated);
    }

    let Json(request) = body.map_err(|rejection| {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query is required".to_string()))?;

    let Some(engine) = state.engine.as_ref() else {
        error!(env_var = %state.api_key_env, "No model credential configured");
        return Err(ApiError::MissingCredential {
            env_var: state.api_key_env.clone(),
        });
    };

    let available_components = state.catalog.list_components().await;
    if available_components.is_empty() {
        error!(dir = %state.catalog.dir().display(), "Catalog is empty");
        return Err(ApiError::EmptyCatalog {
            dir: state.catalog.dir().display().to_string(),
        });
    }

    info!(
        components = available_components.len(),
        query_len = query.len(),
        "Generating code"
    );

    let outcome = engine.run(&query).await.map_err(|source| {
        error!(error = %source, "Error generating code");
        ApiError::Generation {
            source,
            expose_detail: state.expose_detail,
        }
    })?;

    let code = state.extractor.extract(&outcome.final_text);
    if code.is_empty() {
        warn!(language = state.extractor.language(), "Final answer had no code block");
    }
    let token_usage = outcome.usage(&state.pricing);

    info!(
        api_calls = token_usage.api_calls,
        total_tokens = token_usage.total_tokens,
        estimated_cost = token_usage.estimated_cost,
        "Code generated"
    );

    Ok(Json(GenerateCodeResponse {
        code,
        token_usage,
        available_components,
        success: true,
    }))
}
