use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Note;

/// A listing pulled off the source page, before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub published: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub published: String,
    /// Id of the attached note, if any.
    #[serde(rename = "note")]
    pub note_id: Option<i64>,
    pub scraped_at: DateTime<Utc>,
}

/// An article with its note inlined in place of the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleWithNote {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub published: String,
    pub note: Option<Note>,
    pub scraped_at: DateTime<Utc>,
}

impl Article {
    pub fn with_note(self, note: Option<Note>) -> ArticleWithNote {
        ArticleWithNote {
            id: self.id,
            title: self.title,
            link: self.link,
            published: self.published,
            note,
            scraped_at: self.scraped_at,
        }
    }
}
