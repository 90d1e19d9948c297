use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleWithNote, NewArticle, NewNote, Note};

use super::schema::SCHEMA;

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Article operations

    pub async fn create_article(&self, article: NewArticle) -> Result<Article> {
        let created = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO articles (title, link, published) VALUES (?1, ?2, ?3)",
                    params![article.title, article.link, article.published],
                )?;
                let id = conn.last_insert_rowid();
                Ok(find_article(conn, id)?)
            })
            .await?;
        created.ok_or_else(|| AppError::NotFound("Created article".to_string()))
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, link, published, note_id, scraped_at FROM articles ORDER BY id",
                )?;
                let articles = stmt
                    .query_map([], article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn get_article_with_note(&self, id: i64) -> Result<ArticleWithNote> {
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT a.id, a.title, a.link, a.published, a.note_id, a.scraped_at,
                              n.id, n.title, n.body, n.created_at
                       FROM articles a
                       LEFT JOIN notes n ON n.id = a.note_id
                       WHERE a.id = ?1"#,
                )?;
                let article = stmt
                    .query_row(params![id], |row| {
                        let article = article_from_row(row)?;
                        let note = match row.get::<_, Option<i64>>(6)? {
                            Some(note_id) => Some(Note {
                                id: note_id,
                                title: row.get(7)?,
                                body: row.get(8)?,
                                created_at: timestamp(row, 9),
                            }),
                            None => None,
                        };
                        Ok(article.with_note(note))
                    })
                    .optional()?;
                Ok(article)
            })
            .await?;
        article.ok_or_else(|| AppError::NotFound(format!("Article {id}")))
    }

    /// Returns the number of rows removed (0 when the id is unknown).
    pub async fn delete_article(&self, id: i64) -> Result<usize> {
        let deleted = self
            .conn
            .call(move |conn| Ok(conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?))
            .await?;
        Ok(deleted)
    }

    pub async fn delete_all_articles(&self) -> Result<usize> {
        let deleted = self
            .conn
            .call(|conn| Ok(conn.execute("DELETE FROM articles", [])?))
            .await?;
        Ok(deleted)
    }

    // Note operations

    pub async fn create_note(&self, note: NewNote) -> Result<Note> {
        let created = self
            .conn
            .call(move |conn| {
                let id = insert_note(conn, &note)?;
                Ok(find_note(conn, id)?)
            })
            .await?;
        created.ok_or_else(|| AppError::NotFound("Created note".to_string()))
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let notes = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, title, body, created_at FROM notes ORDER BY id")?;
                let notes = stmt
                    .query_map([], note_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?;
        Ok(notes)
    }

    /// Points the article at `note_id`, replacing whatever it referenced before.
    pub async fn set_article_note(&self, article_id: i64, note_id: i64) -> Result<Article> {
        let updated = self
            .conn
            .call(move |conn| {
                if point_article_at(conn, article_id, note_id)? == 0 {
                    return Ok(None);
                }
                Ok(find_article(conn, article_id)?)
            })
            .await?;
        updated.ok_or_else(|| AppError::NotFound(format!("Article {article_id}")))
    }

    /// Creates a note and attaches it to the article in one transaction.
    ///
    /// Nothing is written when the article does not exist. The previously
    /// attached note is left in place unless `discard_previous` is set, in
    /// which case it is deleted once nothing references it.
    pub async fn save_note(
        &self,
        article_id: i64,
        note: NewNote,
        discard_previous: bool,
    ) -> Result<Article> {
        let updated = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                let previous: Option<Option<i64>> = tx
                    .query_row(
                        "SELECT note_id FROM articles WHERE id = ?1",
                        params![article_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                let Some(previous) = previous else {
                    return Ok(None);
                };

                let note_id = insert_note(&tx, &note)?;
                point_article_at(&tx, article_id, note_id)?;

                if discard_previous {
                    if let Some(old_id) = previous {
                        tx.execute(
                            "DELETE FROM notes WHERE id = ?1 AND NOT EXISTS (SELECT 1 FROM articles WHERE note_id = ?1)",
                            params![old_id],
                        )?;
                    }
                }

                let article = find_article(&tx, article_id)?;
                tx.commit()?;
                Ok(article)
            })
            .await?;
        updated.ok_or_else(|| AppError::NotFound(format!("Article {article_id}")))
    }
}

#[cfg(test)]
impl Repository {
    /// Makes every insert of an article titled `title` fail.
    pub async fn reject_article_title(&self, title: &str) -> Result<()> {
        let sql = format!(
            "CREATE TRIGGER reject_title BEFORE INSERT ON articles WHEN NEW.title = '{}' \
             BEGIN SELECT RAISE(ABORT, 'rejected title'); END;",
            title.replace('\'', "''")
        );
        self.conn
            .call(move |conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn insert_note(conn: &rusqlite::Connection, note: &NewNote) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO notes (title, body) VALUES (?1, ?2)",
        params![note.title, note.body],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns the number of articles updated (0 when the id is unknown).
fn point_article_at(
    conn: &rusqlite::Connection,
    article_id: i64,
    note_id: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE articles SET note_id = ?1 WHERE id = ?2",
        params![note_id, article_id],
    )
}

fn find_article(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Article>> {
    conn.query_row(
        "SELECT id, title, link, published, note_id, scraped_at FROM articles WHERE id = ?1",
        params![id],
        article_from_row,
    )
    .optional()
}

fn find_note(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        "SELECT id, title, body, created_at FROM notes WHERE id = ?1",
        params![id],
        note_from_row,
    )
    .optional()
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn timestamp(row: &Row, idx: usize) -> DateTime<Utc> {
    row.get::<_, String>(idx)
        .ok()
        .and_then(|s| parse_datetime(&s))
        .unwrap_or_else(Utc::now)
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        link: row.get(2)?,
        published: row.get(3)?,
        note_id: row.get(4)?,
        scraped_at: timestamp(row, 5),
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created_at: timestamp(row, 3),
    })
}
