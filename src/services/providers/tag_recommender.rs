use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::providers::TagRecommender,
};

#[derive(Debug, Serialize)]
struct TagRecommendationRequest<'a> {
    contents: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct TagRecommendationResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// HTTP client for the tag recommendation model server
#[derive(Clone)]
pub struct TagRecommendationClient {
    http_client: HttpClient,
    api_url: String,
}

impl TagRecommendationClient {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl TagRecommender for TagRecommendationClient {
    async fn recommend_tags(&self, contents: &str) -> AppResult<Vec<String>> {
        let response = self
            .http_client
            .post(&self.api_url)
            .json(&TagRecommendationRequest { contents })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Tag recommendation API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let tags = parse_recommended_tags(&body)?;

        tracing::info!(tags = ?tags, "Tags recommended");

        Ok(tags)
    }
}

/// Reads `{"tags": [...]}`; an empty body, `null` or a missing field yield no tags
pub fn parse_recommended_tags(body: &str) -> AppResult<Vec<String>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let response: Option<TagRecommendationResponse> = serde_json::from_str(body).map_err(|e| {
        AppError::ExternalApi(format!("Failed to parse tag recommendation response: {}", e))
    })?;

    Ok(response.and_then(|r| r.tags).unwrap_or_default())
}
