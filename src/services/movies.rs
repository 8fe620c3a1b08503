use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};

use crate::{
    db::PostRepository,
    error::{AppError, AppResult},
    models::BoxOfficeEntry,
    services::providers::{MovieDataProvider, TagRecommender},
};

/// Maximum number of movies returned for one post
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Box office enrichment and tag-based movie recommendation
///
/// Every call is a request-scoped pipeline: fetch the daily list, resolve
/// genres per entry, optionally filter by tags recommended for a post.
#[derive(Clone)]
pub struct MovieService {
    movie_provider: Arc<dyn MovieDataProvider>,
    tag_recommender: Arc<dyn TagRecommender>,
    posts: Arc<dyn PostRepository>,
    enrichment_concurrency: usize,
}

impl MovieService {
    pub fn new(
        movie_provider: Arc<dyn MovieDataProvider>,
        tag_recommender: Arc<dyn TagRecommender>,
        posts: Arc<dyn PostRepository>,
        enrichment_concurrency: usize,
    ) -> Self {
        Self {
            movie_provider,
            tag_recommender,
            posts,
            enrichment_concurrency: enrichment_concurrency.max(1),
        }
    }

    /// Yesterday's box office with genres resolved per entry
    pub async fn fetch_daily_box_office_with_genres(&self) -> AppResult<Vec<BoxOfficeEntry>> {
        let target_date = box_office_target_date(Local::now().date_naive());
        self.fetch_box_office_with_genres_for(&target_date).await
    }

    /// Box office for `target_date` (`YYYYMMDD`) with genres resolved per entry
    ///
    /// Fails only when the list itself cannot be fetched. A failed detail lookup
    /// leaves that one entry without a genre.
    pub async fn fetch_box_office_with_genres_for(
        &self,
        target_date: &str,
    ) -> AppResult<Vec<BoxOfficeEntry>> {
        let entries = self
            .movie_provider
            .fetch_daily_box_office(target_date)
            .await?;

        let total = entries.len();
        let enriched = self.enrich_with_genres(entries).await;

        tracing::info!(
            target_date = %target_date,
            total,
            with_genre = enriched.iter().filter(|e| !e.genre.is_empty()).count(),
            provider = self.movie_provider.name(),
            "Box office enriched"
        );

        Ok(enriched)
    }

    /// Looks up details concurrently, at most `enrichment_concurrency` at a time
    ///
    /// Lookups run on the caller's task and stop when its future is dropped.
    /// Results keep list order.
    async fn enrich_with_genres(&self, entries: Vec<BoxOfficeEntry>) -> Vec<BoxOfficeEntry> {
        stream::iter(entries)
            .map(|entry| self.enrich_entry(entry))
            .buffered(self.enrichment_concurrency)
            .collect()
            .await
    }

    /// Resolves one entry's genre; any lookup failure leaves the entry unchanged
    async fn enrich_entry(&self, entry: BoxOfficeEntry) -> BoxOfficeEntry {
        if !entry.has_movie_code() {
            tracing::warn!(title = %entry.title, "Movie code missing, skipping genre lookup");
            return entry;
        }

        match self.movie_provider.fetch_movie_detail(&entry.movie_code).await {
            Ok(detail) => entry.with_genre(detail.genre),
            Err(e) => {
                tracing::warn!(
                    movie_code = %entry.movie_code,
                    provider = self.movie_provider.name(),
                    error = %e,
                    "Movie detail lookup failed, keeping entry without genre"
                );
                entry
            }
        }
    }

    /// Recommends up to [`MAX_RECOMMENDATIONS`] box office movies for a post
    ///
    /// Tags recommended from the post's contents are matched against movie titles.
    pub async fn recommend_movies_by_post_id(&self, post_id: i64) -> AppResult<Vec<BoxOfficeEntry>> {
        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        let tags = self.tag_recommender.recommend_tags(&post.contents).await?;
        if tags.is_empty() {
            return Err(AppError::TagRecommendationEmpty);
        }

        let movies = self.fetch_daily_box_office_with_genres().await?;
        let matches = filter_movies_by_tags(movies, &tags);

        if matches.is_empty() {
            return Err(AppError::MovieApiNoResult);
        }

        tracing::info!(post_id, tags = ?tags, matches = matches.len(), "Movies recommended");

        Ok(matches)
    }
}

/// The provider publishes a day's figures the following day, so ask for yesterday
pub fn box_office_target_date(today: NaiveDate) -> String {
    today
        .pred_opt()
        .unwrap_or(today)
        .format("%Y%m%d")
        .to_string()
}

/// Keeps movies whose title contains any tag, in list order, at most [`MAX_RECOMMENDATIONS`]
pub fn filter_movies_by_tags(movies: Vec<BoxOfficeEntry>, tags: &[String]) -> Vec<BoxOfficeEntry> {
    movies
        .into_iter()
        .filter(|movie| movie.title_matches_any(tags))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
