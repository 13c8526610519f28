use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::{extract::require_session, openapi::ApiDoc, state::ServerState};

pub mod analytics;
pub mod auth;
pub mod products;
pub mod settings;
pub mod transactions;
pub mod users;

pub const API_PREFIX: &str = "/api/v1";

#[utoipa::path(get, path = "/api/v1/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public routes, session-protected
/// routes, and the OpenAPI document.
pub fn build_router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/organization", put(auth::select_organization))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", put(users::update))
        .route("/users/:id/reset-password", post(users::reset_password))
        .route("/products", get(products::list).post(products::create))
        .route("/products/search", get(products::search))
        .route("/products/:id", get(products::get).put(products::update).delete(products::delete))
        .route("/transactions", get(transactions::list).post(transactions::create))
        .route("/transactions/:id", get(transactions::get).delete(transactions::delete))
        .route("/transactions/:id/items", get(transactions::items))
        .route("/settings/:key", get(settings::get).put(settings::put))
        .route("/analytics/today-summary", get(analytics::today_summary))
        .route("/analytics/top-selling", get(analytics::top_selling))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .nest(API_PREFIX, public.merge(protected))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
