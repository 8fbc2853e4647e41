use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, Store};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::Services;

/// Shared handler state: the services plus what the middleware and health check need
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub tokens: TokenIssuer,
    /// Present only when the Postgres store is active
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, pool: Option<PgPool>, config: &AppConfig) -> Self {
        let tokens = TokenIssuer::from_config(&config.security);
        let services = Services::new(store, tokens.clone(), &config.sessions);
        Self { services, tokens, pool }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(form_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::permissive().allow_origin(origins)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
}

fn form_public_routes() -> Router<AppState> {
    use handlers::public::forms;

    Router::new()
        // Respondent flow: load, open a session, answer, submit
        .route("/forms/:form_id", get(forms::form_get))
        .route("/forms/:form_id/session", post(forms::session_post))
        .route("/forms/:form_id/responses", post(forms::responses_post))
        .route("/forms/:form_id/submit/:session_id", post(forms::submit_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{folders, forms, user, workspaces};

    Router::new()
        // Current user
        .route("/api/user", get(user::get))
        .route("/api/user/profile", put(user::profile_put))
        .route("/api/user/theme", put(user::theme_put))
        // Workspaces and sharing
        .route("/api/workspaces", get(workspaces::list))
        .route("/api/workspaces/share", post(workspaces::share_post))
        .route("/api/workspaces/share/link", post(workspaces::share_link_post))
        .route("/api/workspaces/:workspace_id", get(workspaces::get))
        // Folders
        .route(
            "/api/workspaces/:workspace_id/folders",
            get(folders::list).post(folders::post),
        )
        .route(
            "/api/workspaces/:workspace_id/folders/:folder_id",
            get(folders::get).delete(folders::delete),
        )
        // Forms
        .route(
            "/api/workspaces/:workspace_id/forms",
            get(forms::list).post(forms::post),
        )
        .route(
            "/api/workspaces/:workspace_id/forms/:form_id",
            axum::routing::delete(forms::delete),
        )
        .route("/api/forms/:form_id/elements", put(forms::elements_put))
        .route("/api/forms/:form_id/responses", get(forms::responses_get))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Formspace API",
            "version": version,
            "description": "Form builder backend: workspaces, sharing and session-based responses",
            "endpoints": {
                "home": "/ (public)",
                "public_auth": "/auth/signup, /auth/login (public - token acquisition)",
                "forms": "/forms/:form_id[/session|/responses|/submit/:session_id] (public - respondents)",
                "user": "/api/user[/profile|/theme] (protected)",
                "workspaces": "/api/workspaces[/:workspace_id], /api/workspaces/share[/link] (protected)",
                "folders": "/api/workspaces/:workspace_id/folders[/:folder_id] (protected)",
                "builder": "/api/workspaces/:workspace_id/forms[/:form_id], /api/forms/:form_id/* (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = &state.pool else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
