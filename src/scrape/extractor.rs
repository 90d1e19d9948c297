use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::NewArticle;

const CONTAINER_SELECTOR: &str = "article";
const TITLE_SELECTOR: &str = "h2";
const LINK_SELECTOR: &str = "a";
const PUBLISHED_SELECTOR: &str = "p time";

struct Selectors {
    container: Selector,
    title: Selector,
    link: Selector,
    published: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            container: create_selector(CONTAINER_SELECTOR)?,
            title: create_selector(TITLE_SELECTOR)?,
            link: create_selector(LINK_SELECTOR)?,
            published: create_selector(PUBLISHED_SELECTOR)?,
        })
    }
}

/// Extracts one listing per `<article>` element, in document order.
///
/// Fields whose element is missing come back as empty strings; a malformed
/// container never drops the item or fails the page.
pub fn extract_articles(html: &str) -> Result<Vec<NewArticle>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let articles = document
        .select(&selectors.container)
        .map(|container| extract_one(container, &selectors))
        .collect();

    Ok(articles)
}

fn extract_one(container: ElementRef, selectors: &Selectors) -> NewArticle {
    // Title and link both come from the first heading.
    let heading = container.select(&selectors.title).next();

    let title = heading.map(trimmed_text).unwrap_or_default();

    let link = heading
        .and_then(|h| h.select(&selectors.link).next())
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let published = container
        .select(&selectors.published)
        .next()
        .map(trimmed_text)
        .unwrap_or_default();

    NewArticle {
        title,
        link,
        published,
    }
}

fn trimmed_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str)
        .map_err(|e| AppError::Other(anyhow::anyhow!("invalid selector {sel_str}: {e}")))
}
