use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{error::AppResult, models::MovieListResponse, routes::AppState};

/// Yesterday's box office, each entry enriched with its genre
pub async fn daily_box_office(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<MovieListResponse>> {
    let movies = state.movies.fetch_daily_box_office_with_genres().await?;
    Ok(Json(movies.into()))
}

/// Up to three box office titles matching the post's tags
pub async fn recommend_by_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> AppResult<Json<MovieListResponse>> {
    let movies = state.movies.recommend_movies_by_post_id(post_id).await?;
    Ok(Json(movies.into()))
}
