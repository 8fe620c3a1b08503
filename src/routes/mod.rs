use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{MemberService, MovieService, PostService},
};

pub mod members;
pub mod movies;
pub mod posts;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub movies: MovieService,
    pub posts: PostService,
    pub members: MemberService,
}

/// Creates the application router with all routes
///
/// `max_upload_bytes` caps request bodies, multipart image uploads included.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest("/members", member_routes())
        .nest("/posts", post_routes())
        .nest("/movies", movie_routes())
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

fn member_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(members::create_member))
        .route("/:member_id", get(members::get_member))
}

fn post_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(posts::create_post))
        .route("/member/:member_id", get(posts::list_member_posts))
        .route(
            "/:post_id",
            patch(posts::update_post).delete(posts::delete_post),
        )
        .route("/:post_id/image", delete(posts::remove_post_image))
}

fn movie_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/daily-boxoffice", get(movies::daily_box_office))
        .route("/recommend/:post_id", get(movies::recommend_by_post))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
