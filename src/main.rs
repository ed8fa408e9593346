use std::net::SocketAddr;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use navhub::middleware::rate_limit::rate_limit_middleware;
use navhub::{config, db, handlers, mail, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cfg = config::config();
    tracing::info!("Starting navhub in {:?} mode", cfg.environment);

    let pool = db::connect_lazy().unwrap_or_else(|e| panic!("database setup failed: {}", e));
    let mailer = mail::from_config(&cfg.mail)
        .unwrap_or_else(|e| panic!("mail transport setup failed: {}", e));

    let app = app(AppState { pool, mailer });

    // Allow tests or deployments to override the port via env
    let port = std::env::var("NAVHUB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("navhub listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}

fn app(state: AppState) -> Router {
    let cfg = config::config();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api_routes())
        .fallback(not_found)
        // Global middleware; the limiter sits at the boundary, before routing
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(DefaultBodyLimit::max(cfg.api.max_request_size_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(category_routes())
        .merge(navigation_routes())
        .merge(quicklink_routes())
        .merge(user_routes())
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/me", get(auth::me))
}

fn category_routes() -> Router<AppState> {
    use handlers::categories;

    Router::new()
        .route(
            "/categories",
            get(categories::find_public).post(categories::create),
        )
        .route("/categories/all", get(categories::find_all))
        .route("/categories/batch/order", patch(categories::update_order))
        .route(
            "/categories/:id",
            get(categories::find_one)
                .patch(categories::update)
                .delete(categories::remove),
        )
}

fn navigation_routes() -> Router<AppState> {
    use handlers::navigation;

    Router::new()
        .route(
            "/navigation",
            get(navigation::find_public).post(navigation::create),
        )
        .route("/navigation/all", get(navigation::find_all))
        .route("/navigation/public", get(navigation::find_public))
        .route("/navigation/private", get(navigation::find_private))
        .route("/navigation/batch/order", patch(navigation::update_order))
        .route(
            "/navigation/:id",
            get(navigation::find_one)
                .patch(navigation::update)
                .delete(navigation::remove),
        )
        .route("/navigation/:id/click", post(navigation::click))
}

fn quicklink_routes() -> Router<AppState> {
    use handlers::quicklinks;

    Router::new()
        .route(
            "/quicklinks",
            get(quicklinks::find_active).post(quicklinks::create),
        )
        .route("/quicklinks/all", get(quicklinks::find_all))
        .route("/quicklinks/batch/order", patch(quicklinks::update_order))
        .route(
            "/quicklinks/:id",
            get(quicklinks::find_one)
                .patch(quicklinks::update)
                .delete(quicklinks::remove),
        )
        .route("/quicklinks/:id/toggle", patch(quicklinks::toggle))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::find_all))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/me/password", patch(users::change_password))
        .route("/users/me/stats", get(users::me_stats))
        .route(
            "/users/:id",
            get(users::find_one)
                .patch(users::update)
                .delete(users::remove),
        )
}

async fn root() -> Json<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "code": 1,
        "data": {
            "name": "navhub",
            "version": version,
            "description": "Navigation hub backend API built with Rust (Axum)",
            "endpoints": {
                "auth": "/api/auth/* (register, login, forgot-password, reset-password, me)",
                "categories": "/api/categories[/:id] (admin-gated writes)",
                "navigation": "/api/navigation[/:id] (public/private listings, click counter)",
                "quicklinks": "/api/quicklinks[/:id] (admin-curated shortcuts)",
                "users": "/api/users[/:id] (admin) plus /api/users/me",
                "health": "/health (public)",
            },
        },
        "message": "success",
        "status": "SUCCESS",
    }))
}

async fn not_found() -> navhub::error::ApiError {
    navhub::error::ApiError::not_found("Resource not found")
}

// Infra endpoint; reports degraded state with 503 instead of the error
// envelope so load balancers see the conventional status code.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "code": 1,
                "data": { "status": "ok", "timestamp": now, "database": "ok" },
                "message": "success",
                "status": "SUCCESS",
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "code": 0,
                    "data": { "status": "degraded", "timestamp": now, "database": "unreachable" },
                    "message": "database unavailable",
                    "status": "INTERNAL_ERROR",
                })),
            )
        }
    }
}
