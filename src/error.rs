use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Movie API returned an empty response: {0}")]
    MovieApiResponseNull(String),

    #[error("Movie API response body is malformed: {0}")]
    MovieApiBodyMalformed(String),

    #[error("Movie API item list is malformed: {0}")]
    MovieApiItemMalformed(String),

    #[error("No movies matched the recommended tags")]
    MovieApiNoResult,

    #[error("Tag recommendation returned no tags")]
    TagRecommendationEmpty,

    #[error("Post not found: {0}")]
    PostNotFound(i64),

    #[error("Member not found: {0}")]
    MemberNotFound(i64),

    #[error("Failed to upload file to object storage: {0}")]
    S3UploadFail(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MovieApiResponseNull(_) => "MOVIE_API_RESPONSE_NULL",
            AppError::MovieApiBodyMalformed(_) => "MOVIE_API_BODY_MALFORMED",
            AppError::MovieApiItemMalformed(_) => "MOVIE_API_ITEM_MALFORMED",
            AppError::MovieApiNoResult => "MOVIE_API_NO_RESULT",
            AppError::TagRecommendationEmpty => "TAG_RECOMMENDATION_EMPTY",
            AppError::PostNotFound(_) => "POST_NOT_FOUND",
            AppError::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            AppError::S3UploadFail(_) => "S3_UPLOAD_FAIL",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::HttpClient(_) => "HTTP_CLIENT_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MovieApiResponseNull(_)
            | AppError::MovieApiBodyMalformed(_)
            | AppError::MovieApiItemMalformed(_)
            | AppError::ExternalApi(_)
            | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::MovieApiNoResult
            | AppError::TagRecommendationEmpty
            | AppError::PostNotFound(_)
            | AppError::MemberNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::S3UploadFail(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::info!(error = %self, code = self.code(), "Request rejected");
        }

        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
