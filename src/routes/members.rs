use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CreateMember, Member},
    routes::AppState,
};

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.members.create_member(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<Member>> {
    let member = state.members.get_member(member_id).await?;
    Ok(Json(member))
}
