use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CreatePostRequest, PostInfo, PostList, UpdatePostRequest},
    routes::AppState,
    services::storage::UploadFile,
};

const REQUEST_PART: &str = "request";
const IMAGE_PART: &str = "image";

/// Multipart post form: a JSON `request` part and an optional `image` file part
#[derive(Debug)]
pub struct PostForm<T> {
    pub request: T,
    pub image: Option<UploadFile>,
}

impl<T: DeserializeOwned> PostForm<T> {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut request = None;
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                REQUEST_PART => request = Some(read_request_part(field).await?),
                IMAGE_PART => image = Some(read_image_part(field).await?),
                other => tracing::debug!(part = other, "Ignoring unknown multipart part"),
            }
        }

        let request = request.ok_or_else(|| {
            AppError::InvalidInput(format!("Missing multipart part '{}'", REQUEST_PART))
        })?;

        Ok(Self { request, image })
    }
}

async fn read_request_part<T: DeserializeOwned>(field: Field<'_>) -> AppResult<T> {
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read request part: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::InvalidInput(format!("Invalid request part: {}", e)))
}

async fn read_image_part(field: Field<'_>) -> AppResult<UploadFile> {
    let file_name = field.file_name().unwrap_or(IMAGE_PART).to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::S3UploadFail(format!("Failed to read {}: {}", file_name, e)))?;

    Ok(UploadFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostInfo>)> {
    let form = PostForm::<CreatePostRequest>::from_multipart(multipart).await?;
    let post = state.posts.create_post(form.request, form.image).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_member_posts(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<PostList>> {
    let posts = state.posts.list_posts_by_member(member_id).await?;
    Ok(Json(posts))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<PostInfo>> {
    let form = PostForm::<UpdatePostRequest>::from_multipart(multipart).await?;
    let post = state
        .posts
        .update_post(post_id, form.request, form.image)
        .await?;
    Ok(Json(post))
}

pub async fn remove_post_image(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> AppResult<Json<PostInfo>> {
    let post = state.posts.remove_post_image(post_id, request).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.posts.delete_post(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
