pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Multipart framing on top of the raw upload limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);
    let body_limit = (state.settings.storage.max_upload_bytes + MULTIPART_OVERHEAD) as usize;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me).put(routes::auth::update_me))
        .route("/me/avatar", post(routes::auth::upload_avatar));

    let employee_routes = Router::new()
        .route("/", get(routes::employee::list).post(routes::employee::create))
        .route("/{employee_id}", get(routes::employee::get))
        .route("/{employee_id}", put(routes::employee::update))
        .route("/{employee_id}", delete(routes::employee::delete))
        .route("/{employee_id}/avatar", post(routes::employee::upload_avatar));

    let leave_routes = Router::new()
        .route(
            "/",
            get(routes::leave_request::list).post(routes::leave_request::create),
        )
        .route("/{request_id}", put(routes::leave_request::update))
        .route("/{request_id}", delete(routes::leave_request::delete))
        .route("/{request_id}/status", put(routes::leave_request::decide));

    let resignation_routes = Router::new()
        .route(
            "/",
            get(routes::resignation::list).post(routes::resignation::create),
        )
        .route("/{resignation_id}", put(routes::resignation::update))
        .route("/{resignation_id}", delete(routes::resignation::delete));

    let team_routes = Router::new()
        .route("/", get(routes::team::list).post(routes::team::create))
        .route("/{team_id}", get(routes::team::get))
        .route("/{team_id}", put(routes::team::update))
        .route("/{team_id}", delete(routes::team::delete));

    let document_routes = Router::new()
        .route("/", get(routes::document::list).post(routes::document::create))
        .route("/upload", post(routes::document::upload))
        .route("/{document_id}", delete(routes::document::delete));

    let chat_routes = Router::new()
        .route("/unread", get(routes::chat::unread))
        .route(
            "/{conversation}/message",
            get(routes::chat::list).post(routes::chat::send),
        )
        .route(
            "/{conversation}/message/{message_id}",
            delete(routes::chat::delete),
        )
        .route(
            "/{conversation}/attachment",
            post(routes::chat::upload_attachment),
        )
        .route("/{conversation}/read", post(routes::chat::mark_read));

    let wifi_bill_routes = Router::new()
        .route("/", get(routes::wifi_bill::list).post(routes::wifi_bill::create))
        .route("/{bill_id}", put(routes::wifi_bill::update))
        .route("/{bill_id}", delete(routes::wifi_bill::delete))
        .route("/{bill_id}/pay", post(routes::wifi_bill::pay));

    let announcement_routes = Router::new()
        .route(
            "/",
            get(routes::announcement::list).post(routes::announcement::create),
        )
        .route("/{announcement_id}", delete(routes::announcement::delete));

    // Compose API
    let api = Router::new()
        .nest("/auth", auth_routes)
        .route("/dashboard", get(routes::dashboard::summary))
        .nest("/employee", employee_routes)
        .nest("/leave-request", leave_routes)
        .nest("/resignation", resignation_routes)
        .nest("/team", team_routes)
        .nest("/document", document_routes)
        .route("/storage/{*key}", get(routes::storage::download))
        .nest("/chat", chat_routes)
        .nest("/wifi-bill", wifi_bill_routes)
        .nest("/announcement", announcement_routes)
        .route("/feedback/analyze", post(routes::feedback::analyze));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
