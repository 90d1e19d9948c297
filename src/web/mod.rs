mod handlers;
mod markup;
mod views;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::scrape::PageFetcher;

/// Shared by every request. All mutable state lives in the database.
#[derive(Clone)]
pub struct AppState {
    pub repository: Repository,
    pub fetcher: Arc<PageFetcher>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let fetcher = PageFetcher::new(&config)?;

        Ok(Self {
            repository,
            fetcher: Arc::new(fetcher),
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/scrape", get(handlers::scrape))
        .route("/deleteAll", get(handlers::delete_all))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/notes", get(handlers::list_notes))
        .route(
            "/articles/{id}",
            get(handlers::get_article)
                .post(handlers::save_note)
                .put(handlers::delete_article)
                .delete(handlers::delete_article),
        )
        .route("/app.js", get(handlers::script))
        .route("/style.css", get(handlers::stylesheet))
        .with_state(state)
}
