use url::Url;

use crate::models::Article;
use crate::scrape::ScrapeReport;

use super::markup::{document, Element};

/// Status line shown above the article list after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Scraped(ScrapeReport),
    Cleared(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub published: String,
    pub has_note: bool,
}

impl From<&Article> for ArticleCard {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            link: article.link.clone(),
            published: article.published.clone(),
            has_note: article.note_id.is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeView {
    pub banner: Option<Banner>,
    pub articles: Vec<ArticleCard>,
}

impl HomeView {
    pub fn new(articles: &[Article], banner: Option<Banner>) -> Self {
        Self {
            banner,
            articles: articles.iter().map(ArticleCard::from).collect(),
        }
    }
}

pub fn render_home(view: &HomeView) -> String {
    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text("Headline Notes"))
        .child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("href", "/style.css"),
        );

    let mut main = Element::new("main").child(nav());
    if let Some(banner) = view.banner {
        main = main.child(banner_element(banner));
    }
    main = main.child(article_list(&view.articles)).child(note_panel());

    let body = Element::new("body")
        .child(main)
        .child(Element::new("script").attr("src", "/app.js"));

    document(
        Element::new("html")
            .attr("lang", "en")
            .child(head)
            .child(body),
    )
}

fn nav() -> Element {
    Element::new("header")
        .class("masthead")
        .child(Element::new("h1").text("Headline Notes"))
        .child(
            Element::new("nav")
                .child(Element::new("a").class("button").attr("href", "/scrape").text("Scrape new articles"))
                .child(Element::new("a").class("button danger").attr("href", "/deleteAll").text("Clear articles")),
        )
}

fn banner_element(banner: Banner) -> Element {
    let message = match banner {
        Banner::Scraped(report) if report.failed > 0 => format!(
            "Found {}, saved {}, {} could not be saved.",
            articles(report.found),
            report.saved,
            report.failed
        ),
        Banner::Scraped(report) => {
            format!("Found {}, saved {}.", articles(report.found), report.saved)
        }
        Banner::Cleared(count) => format!("Removed {}.", articles(count)),
    };
    Element::new("p").class("banner").attr("role", "status").text(message)
}

fn articles(count: usize) -> String {
    if count == 1 {
        "1 article".to_string()
    } else {
        format!("{count} articles")
    }
}

/// Scraped links are only made clickable when they are relative or http(s).
fn safe_href(link: &str) -> Option<&str> {
    if link.is_empty() {
        return None;
    }
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(link),
        Ok(_) => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(link),
        Err(_) => None,
    }
}

fn article_list(cards: &[ArticleCard]) -> Element {
    let list = Element::new("section").id("articles");
    if cards.is_empty() {
        return list.child(
            Element::new("p")
                .class("empty")
                .text("No articles yet. Scrape to fetch the latest listings."),
        );
    }
    list.children(cards.iter().map(article_card))
}

fn article_card(card: &ArticleCard) -> Element {
    let title = if card.title.is_empty() {
        "(untitled)"
    } else {
        card.title.as_str()
    };
    let note_label = if card.has_note { "Edit note" } else { "Add note" };

    Element::new("article")
        .class("card")
        .attr("data-id", card.id.to_string())
        .child(Element::new("h3").text(title))
        .child(link_element(&card.link))
        .child(Element::new("p").class("published").text(card.published.clone()))
        .child(
            Element::new("button")
                .class("note-button")
                .attr("type", "button")
                .attr("data-id", card.id.to_string())
                .text(note_label),
        )
}

fn link_element(link: &str) -> Element {
    match safe_href(link) {
        Some(href) => Element::new("a")
            .attr("href", href)
            .attr("rel", "noopener")
            .attr("target", "_blank")
            .text(link),
        None => Element::new("span").class("link").text(link),
    }
}

fn note_panel() -> Element {
    Element::new("aside")
        .id("note-panel")
        .attr("hidden", "hidden")
        .child(Element::new("h2").id("note-heading"))
        .child(
            Element::new("form")
                .id("note-form")
                .child(Element::new("label").attr("for", "titleinput").text("Title"))
                .child(
                    Element::new("input")
                        .id("titleinput")
                        .attr("name", "title")
                        .attr("type", "text"),
                )
                .child(Element::new("label").attr("for", "bodyinput").text("Note"))
                .child(
                    Element::new("textarea")
                        .id("bodyinput")
                        .attr("name", "body")
                        .attr("rows", "4"),
                )
                .child(
                    Element::new("button")
                        .id("savenote")
                        .attr("type", "submit")
                        .text("Save note"),
                )
                .child(
                    Element::new("button")
                        .id("closenote")
                        .attr("type", "button")
                        .text("Close"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(id: i64, title: &str, note_id: Option<i64>) -> Article {
        Article {
            id,
            title: title.to_string(),
            link: format!("https://example.com/{id}"),
            published: "Jan 1".to_string(),
            note_id,
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn lists_every_article_with_its_note_state() {
        let articles = [article(1, "First", None), article(2, "Second", Some(9))];
        let html = render_home(&HomeView::new(&articles, None));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<article class="card" data-id="1"><h3>First</h3>"#));
        assert!(html.contains(r#"<a href="https://example.com/2""#));
        assert!(html.contains(r#"<p class="published">Jan 1</p>"#));
        assert!(html.contains(r#"data-id="1">Add note</button>"#));
        assert!(html.contains(r#"data-id="2">Edit note</button>"#));
        assert!(html.contains(r#"<script src="/app.js"></script>"#));
        assert!(!html.contains("class=\"banner\""));
    }

    #[test]
    fn scraped_titles_are_escaped() {
        let articles = [article(1, "<b>Loud</b> & clear", None)];
        let html = render_home(&HomeView::new(&articles, None));
        assert!(html.contains("<h3>&lt;b&gt;Loud&lt;/b&gt; &amp; clear</h3>"));
    }

    #[test]
    fn empty_title_and_empty_list_have_placeholders() {
        let html = render_home(&HomeView::new(&[article(1, "", None)], None));
        assert!(html.contains("<h3>(untitled)</h3>"));

        let html = render_home(&HomeView::default());
        assert!(html.contains("No articles yet."));
    }

    #[test]
    fn banners_report_outcomes() {
        let report = ScrapeReport {
            found: 4,
            saved: 3,
            failed: 1,
        };
        let html = render_home(&HomeView::new(&[], Some(Banner::Scraped(report))));
        assert!(html.contains("Found 4 articles, saved 3, 1 could not be saved."));

        let html = render_home(&HomeView::new(&[], Some(Banner::Cleared(12))));
        assert!(html.contains("Removed 12 articles."));
    }

    #[test]
    fn single_counts_are_singular() {
        let report = ScrapeReport {
            found: 1,
            saved: 1,
            failed: 0,
        };
        let html = render_home(&HomeView::new(&[], Some(Banner::Scraped(report))));
        assert!(html.contains("Found 1 article, saved 1."));

        let html = render_home(&HomeView::new(&[], Some(Banner::Cleared(1))));
        assert!(html.contains("Removed 1 article."));
    }

    #[test]
    fn only_relative_and_http_links_are_clickable() {
        let mut cards = [
            article(1, "Scripted", None),
            article(2, "Relative", None),
            article(3, "Plain", None),
        ];
        cards[0].link = "javascript:alert(1)".to_string();
        cards[1].link = "/music/x".to_string();
        let html = render_home(&HomeView::new(&cards, None));

        assert!(!html.contains(r#"href="javascript:"#));
        assert!(html.contains(r#"<span class="link">javascript:alert(1)</span>"#));
        assert!(html.contains(r#"<a href="/music/x""#));
        assert!(html.contains(r#"<a href="https://example.com/3""#));
    }
}
