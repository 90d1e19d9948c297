mod article;
mod note;

pub use article::{Article, ArticleWithNote, NewArticle};
pub use note::{NewNote, Note};
