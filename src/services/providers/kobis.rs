/// KOBIS (Korean Film Council) open API provider
///
/// API Flow:
/// 1. Daily box office: `searchDailyBoxOfficeList.json?key=..&targetDt=YYYYMMDD`
/// 2. Movie detail: `searchMovieInfo.json?key=..&movieCd=..` → genres
use crate::{
    error::{AppError, AppResult},
    models::{BoxOfficeEntry, KobisBoxOfficeItem, KobisMovieInfo, MovieDetail},
    services::providers::MovieDataProvider,
};
use reqwest::Client as HttpClient;
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct KobisClient {
    http_client: HttpClient,
    api_key: String,
    box_office_url: String,
    movie_info_url: String,
}

impl KobisClient {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        box_office_url: String,
        movie_info_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            box_office_url,
            movie_info_url,
        }
    }

    /// Issues a GET and returns the raw body text
    async fn get_body(&self, url: &str, query: &[(&str, &str)]) -> AppResult<String> {
        let response = self.http_client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "KOBIS API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        tracing::debug!(url = %url, response = %body, "Raw KOBIS API response");

        Ok(body)
    }
}

#[async_trait::async_trait]
impl MovieDataProvider for KobisClient {
    async fn fetch_daily_box_office(&self, target_date: &str) -> AppResult<Vec<BoxOfficeEntry>> {
        tracing::info!(target_date = %target_date, provider = "kobis", "Fetching daily box office");

        let body = self
            .get_body(
                &self.box_office_url,
                &[("key", self.api_key.as_str()), ("targetDt", target_date)],
            )
            .await?;

        let entries = parse_daily_box_office(&body)?;

        tracing::info!(
            target_date = %target_date,
            results = entries.len(),
            provider = "kobis",
            "Daily box office fetched"
        );

        Ok(entries)
    }

    async fn fetch_movie_detail(&self, movie_code: &str) -> AppResult<MovieDetail> {
        let body = self
            .get_body(
                &self.movie_info_url,
                &[("key", self.api_key.as_str()), ("movieCd", movie_code)],
            )
            .await?;

        parse_movie_detail(&body)
    }

    fn name(&self) -> &'static str {
        "kobis"
    }
}

/// Parses a body that must be a JSON document, treating an empty or `null` body as absent
fn parse_body(body: &str, what: &str) -> AppResult<Value> {
    if body.trim().is_empty() {
        return Err(AppError::MovieApiResponseNull(format!(
            "{} response body is empty",
            what
        )));
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::MovieApiBodyMalformed(format!("{} response is not valid JSON: {}", what, e))
    })?;

    if value.is_null() {
        return Err(AppError::MovieApiResponseNull(format!(
            "{} response body is null",
            what
        )));
    }

    Ok(value)
}

fn object_field<'a>(value: &'a Value, field: &str) -> AppResult<&'a Map<String, Value>> {
    value
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::MovieApiBodyMalformed(format!("`{}` is not an object", field)))
}

/// Extracts `boxOfficeResult.dailyBoxOfficeList` into entries
pub fn parse_daily_box_office(body: &str) -> AppResult<Vec<BoxOfficeEntry>> {
    let value = parse_body(body, "Daily box office")?;
    let result = object_field(&value, "boxOfficeResult")?;

    let items = result
        .get("dailyBoxOfficeList")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::MovieApiItemMalformed("`dailyBoxOfficeList` is not a list".to_string())
        })?;

    items
        .iter()
        .map(|item| {
            if !item.is_object() {
                return Err(AppError::MovieApiItemMalformed(
                    "box office item is not an object".to_string(),
                ));
            }
            serde_json::from_value::<KobisBoxOfficeItem>(item.clone())
                .map(BoxOfficeEntry::from)
                .map_err(|e| AppError::MovieApiItemMalformed(e.to_string()))
        })
        .collect()
}

/// Extracts `movieInfoResult.movieInfo.genres` into a comma-joined genre string
pub fn parse_movie_detail(body: &str) -> AppResult<MovieDetail> {
    let value = parse_body(body, "Movie detail")?;
    let result = object_field(&value, "movieInfoResult")?;

    let info = result.get("movieInfo").filter(|v| v.is_object()).ok_or_else(|| {
        AppError::MovieApiBodyMalformed("`movieInfo` is not an object".to_string())
    })?;

    serde_json::from_value::<KobisMovieInfo>(info.clone())
        .map(MovieDetail::from)
        .map_err(|e| AppError::MovieApiItemMalformed(e.to_string()))
}
