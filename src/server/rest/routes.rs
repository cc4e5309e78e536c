use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::server::rest::{
    handlers,
    logging_middleware::request_logging_middleware,
    middleware::{ownership_middleware, USER_ID_HEADER},
    openapi::ApiDoc,
};
use crate::shared::models::AppState;

pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    // Owner only
    let protected_routes = Router::new()
        .route("/cycles", get(handlers::cycles::get_cycles))
        .route("/state", get(handlers::service::get_state))
        .route("/console", get(handlers::service::get_console))
        .route("/run", post(handlers::service::run_command))
        .route("/env", get(handlers::service::get_env))
        .route("/start", post(handlers::service::start_service))
        .route("/stop", post(handlers::service::stop_service))
        .route("/create", post(handlers::service::create_service))
        .route("/remove", delete(handlers::service::remove_service))
        .route("/validate", post(handlers::service::validate_config))
        .layer(middleware::from_fn_with_state(state.clone(), ownership_middleware));

    let api_routes = public_routes.merge(protected_routes).with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
}

async fn health() -> StatusCode {
    StatusCode::OK
}
