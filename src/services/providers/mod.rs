/// Outbound data provider abstractions
///
/// The movie data provider supplies the daily box office list and per-movie details;
/// the tag recommender turns free text into tag suggestions. Both are stateless and
/// shared across requests behind `Arc<dyn ...>`.
use crate::{
    error::AppResult,
    models::{BoxOfficeEntry, MovieDetail},
};

pub mod kobis;
pub mod tag_recommender;

pub use kobis::KobisClient;
pub use tag_recommender::TagRecommendationClient;

/// Trait for box office data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieDataProvider: Send + Sync {
    /// Fetch the daily box office list for a `YYYYMMDD` date
    ///
    /// Entries come back with whatever genre the list carries, usually none.
    async fn fetch_daily_box_office(&self, target_date: &str) -> AppResult<Vec<BoxOfficeEntry>>;

    /// Fetch genre details for one movie code
    async fn fetch_movie_detail(&self, movie_code: &str) -> AppResult<MovieDetail>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for tag recommendation backends
///
/// Absent data degrades to an empty list; only transport and status failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TagRecommender: Send + Sync {
    async fn recommend_tags(&self, contents: &str) -> AppResult<Vec<String>>;
}
