use axum::body::Bytes;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleWithNote, NewNote, Note};
use crate::scrape::run_scrape;

use super::views::{render_home, Banner, HomeView};
use super::AppState;

const APP_JS: &str = include_str!("../../assets/app.js");
const STYLE_CSS: &str = include_str!("../../assets/style.css");

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeleteAck {
    pub deleted: usize,
}

/// Note fields from either a JSON or a form-encoded body. A request with
/// no content type and no body saves an empty note.
#[derive(Debug)]
pub struct NotePayload(pub NewNote);

impl<S> FromRequest<S> for NotePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let note = match content_type {
            Some(ct) if ct.starts_with("application/json") => {
                let Json(note) = Json::<NewNote>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                note
            }
            Some(_) => {
                let Form(note) = Form::<NewNote>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                note
            }
            None => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !body.iter().all(u8::is_ascii_whitespace) {
                    return Err(AppError::BadRequest(
                        "note body needs a Content-Type of application/json or application/x-www-form-urlencoded".to_string(),
                    ));
                }
                NewNote::default()
            }
        };
        Ok(Self(note))
    }
}

/// Ids are opaque to clients; anything that is not a stored id is simply not found.
fn parse_article_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("Article {raw}")))
}

async fn render_landing(state: &AppState, banner: Option<Banner>) -> Result<Html<String>> {
    let articles = state.repository.list_articles().await?;
    Ok(Html(render_home(&HomeView::new(&articles, banner))))
}

pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    render_landing(&state, None).await
}

pub async fn scrape(State(state): State<AppState>) -> Result<Html<String>> {
    let report = run_scrape(
        &state.fetcher,
        &state.repository,
        state.config.scrape_concurrency,
    )
    .await?;
    render_landing(&state, Some(Banner::Scraped(report))).await
}

pub async fn delete_all(State(state): State<AppState>) -> Result<Html<String>> {
    let deleted = state.repository.delete_all_articles().await?;
    tracing::info!(deleted, "Cleared all articles");
    render_landing(&state, Some(Banner::Cleared(deleted))).await
}

pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>> {
    Ok(Json(state.repository.list_articles().await?))
}

pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>> {
    Ok(Json(state.repository.list_notes().await?))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleWithNote>> {
    let id = parse_article_id(&id)?;
    Ok(Json(state.repository.get_article_with_note(id).await?))
}

pub async fn save_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    NotePayload(note): NotePayload,
) -> Result<Json<Article>> {
    let id = parse_article_id(&id)?;
    let article = state
        .repository
        .save_note(id, note, state.config.discard_replaced_notes)
        .await?;
    tracing::info!(article_id = id, note_id = ?article.note_id, "Saved note");
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>> {
    let id = parse_article_id(&id)?;
    let deleted = state.repository.delete_article(id).await?;
    tracing::info!(article_id = id, deleted, "Deleted article");
    Ok(Json(DeleteAck { deleted }))
}

pub async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}
