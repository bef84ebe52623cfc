use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::curator_auth_middleware;
use super::openapi;
use super::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router());

    let memory_routes = Router::new()
        .route("/memory", post(handlers::memories::create_memory))
        .route(
            "/memory/{id}",
            get(handlers::memories::get_memory)
                .patch(handlers::memories::update_memory)
                .delete(handlers::memories::delete_memory),
        )
        .route("/memories", get(handlers::memories::list_memories));

    let auth_routes = Router::new().route("/auth/session", post(handlers::auth::create_session));

    let admin_routes = Router::new()
        .route(
            "/admin/bulk-memories",
            post(handlers::admin::bulk_seed).delete(handlers::admin::bulk_purge),
        )
        .route("/admin/index:repair", post(handlers::admin::repair_index))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            curator_auth_middleware,
        ));

    let api = Router::new()
        .merge(public_routes)
        .merge(memory_routes)
        .merge(auth_routes)
        .merge(admin_routes);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
