use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinepost_api::{
    config::Config,
    db::{create_pool, run_migrations, PgStore},
    routes::{create_router, AppState},
    services::{
        providers::{KobisClient, TagRecommendationClient},
        storage::S3Storage,
        MemberService, MovieService, PostService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinepost_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let store = Arc::new(PgStore::new(pool));

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("cinepost-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let movie_provider = Arc::new(KobisClient::new(
        http_client.clone(),
        config.movie_api_key.clone(),
        config.box_office_url.clone(),
        config.movie_info_url.clone(),
    ));
    let tag_recommender = Arc::new(TagRecommendationClient::new(
        http_client,
        config.tag_recommendation_url.clone(),
    ));
    let storage = Arc::new(
        S3Storage::connect(
            config.s3_bucket.clone(),
            config.s3_region.clone(),
            config.s3_public_url.clone(),
        )
        .await,
    );

    let state = AppState {
        movies: MovieService::new(
            movie_provider,
            tag_recommender.clone(),
            store.clone(),
            config.enrichment_concurrency,
        ),
        posts: PostService::new(store.clone(), store.clone(), tag_recommender, storage),
        members: MemberService::new(store),
    };

    let app = create_router(state, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
