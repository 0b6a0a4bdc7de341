use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use mini_crm_api::database::manager::DatabaseManager;
use mini_crm_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = mini_crm_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Mini CRM API in {:?} mode", config.environment);

    // Idempotent schema bootstrap. A failure here is logged, not fatal, so
    // the server still comes up and reports degraded health.
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("Schema bootstrap failed, requests will retry: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CRM_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Mini CRM API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_routes())
        // Bearer-protected API
        .merge(protected_routes().layer(axum::middleware::from_fn(jwt_auth_middleware)))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use mini_crm_api::handlers::public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes() -> Router {
    use axum::routing::{patch, post};
    use mini_crm_api::handlers::protected::{analytics, contacts, deals, notes};

    Router::new()
        // Contacts and their notes subresource
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/contacts/{id}",
            get(contacts::get)
                .patch(contacts::patch)
                .delete(contacts::delete),
        )
        .route("/contacts/{id}/notes", get(notes::list).post(notes::create))
        // Deals
        .route("/deals", get(deals::list).post(deals::create))
        .route("/deals/{id}", patch(deals::patch).delete(deals::delete))
        // Analytics
        .route("/analytics", get(analytics::get))
        .route("/analytics:recalc", post(analytics::recalc))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Mini CRM API",
        "version": version,
        "description": "Contacts, notes, deals and per-user analytics over REST",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/auth/signup, /auth/login (public - token acquisition)",
            "contacts": "/contacts[/{id}] (bearer)",
            "notes": "/contacts/{id}/notes (bearer)",
            "deals": "/deals[/{id}] (bearer)",
            "analytics": "/analytics, /analytics:recalc (bearer)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({ "ok": true })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::response::Json(json!({ "ok": false, "error": "database unavailable" })),
            )
        }
    }
}
