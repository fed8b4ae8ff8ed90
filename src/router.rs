use crate::config::API_PREFIX;
use crate::handlers::file;
use crate::middleware::logging;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/list", get(file::list_files))
        .route("/dir/create", post(file::create_dir))
        .route("/file/content", get(file::read_file))
        .route("/items/copy", post(file::copy_items))
        .route("/items/move", post(file::move_items))
        .route("/item/move", post(file::move_item))
        .route(
            "/items/upload",
            post(file::upload_items)
                .layer(DefaultBodyLimit::max(state.config.max_upload_size)),
        )
        .route("/items/remove", post(file::remove_items));

    let static_files = ServeDir::new(state.storage.root().path());
    let router = Router::new().nest(API_PREFIX, api_routes);
    let router = if state.config.static_prefix == "/" {
        router.fallback_service(static_files)
    } else {
        router.nest_service(&state.config.static_prefix, static_files)
    };

    router
        .layer(cors_layer())
        .layer(middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            HeaderName::from_static("path"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
}
