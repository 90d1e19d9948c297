use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::Repository;

pub fn test_config(source_url: &str) -> Config {
    Config {
        source_url: source_url.to_string(),
        fetch_timeout_secs: 5,
        ..Config::default()
    }
}

pub async fn temp_repo() -> (Repository, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let repo = Repository::new(path.to_str().unwrap()).await.unwrap();
    (repo, dir)
}

/// Serves `body` at `/news` on an ephemeral local port and returns its URL.
pub async fn serve_page(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/news", get(move || async move { (status, Html(body)) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/news")
}
