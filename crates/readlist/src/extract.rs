//! Page metadata extraction
//!
//! Fetches a page and derives a [`LinkMetadata`] record from its Open Graph
//! tags, `<title>` and body text. Every field is best-effort: a selector
//! that matches nothing leaves the field empty. Only failing to fetch the
//! page is an error.

use crate::error::FetchError;
use crate::types::LinkMetadata;
use crate::DEFAULT_USER_AGENT;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Elements dropped from the document before the outline is taken
const REMOVED_ELEMENTS: &[&str] = &["script", "noscript", "style", "header", "nav", "footer"];

/// Two or more consecutive ASCII whitespace characters; `&nbsp;` and other
/// Unicode spaces are content and stay as they are
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\n\f\r ]{2,}").unwrap());

/// Options for fetching a page
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
}

/// Fetch a URL and extract its metadata
///
/// Uses the default User-Agent. For custom options, use
/// [`extract_with_options`].
pub async fn extract(url: &str) -> Result<LinkMetadata, FetchError> {
    extract_with_options(url, &ExtractOptions::default()).await
}

/// Fetch a URL with custom options and extract its metadata
///
/// Non-success HTTP statuses are not treated as errors: whatever body the
/// server returned is parsed.
pub async fn extract_with_options(
    url: &str,
    options: &ExtractOptions,
) -> Result<LinkMetadata, FetchError> {
    if url.is_empty() {
        return Err(FetchError::MissingUrl);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }
    Url::parse(url).map_err(FetchError::InvalidUrl)?;

    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html, application/xhtml+xml, */*;q=0.8"),
    );

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(FetchError::ClientBuildError)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    debug!(url, status = response.status().as_u16(), "Fetched page");

    let html = response.text().await.map_err(FetchError::BodyError)?;

    Ok(parse_metadata(&html, url))
}

/// Extract metadata from an already fetched HTML document
pub fn parse_metadata(html: &str, url: &str) -> LinkMetadata {
    let mut document = Html::parse_document(html);

    let title = find_title(&document);
    let site_name = meta_property(&document, "og:site_name").unwrap_or_default();
    let image = meta_property(&document, "og:image").unwrap_or_default();
    let kind = meta_property(&document, "og:type").unwrap_or_default();
    let outline = find_outline(&mut document);

    LinkMetadata {
        url: url.to_string(),
        title,
        kind,
        image,
        site_name,
        outline,
    }
}

/// Collapse runs of whitespace in a single-line value to one space
pub fn collapse_spaces(text: &str) -> String {
    SPACES.replace_all(text, " ").into_owned()
}

/// Collapse runs of whitespace in body text to a single newline
pub fn collapse_into_lines(text: &str) -> String {
    SPACES.replace_all(text, "\n").into_owned()
}

fn find_title(doc: &Html) -> String {
    let title = meta_property(doc, "og:title")
        .filter(|t| !t.is_empty())
        .or_else(|| first_text(doc, "head title"))
        .unwrap_or_default();

    collapse_spaces(&title)
}

fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.to_string())
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

fn find_outline(doc: &mut Html) -> String {
    remove_elements(doc, REMOVED_ELEMENTS);
    let doc: &Html = doc;

    let text = first_text(doc, "article")
        .filter(|t| !t.is_empty())
        .or_else(|| first_text(doc, "body").filter(|t| !t.is_empty()))
        .unwrap_or_else(|| doc.root_element().text().collect());

    collapse_into_lines(&text)
}

/// Detach every element with one of the given tag names from the tree
fn remove_elements(doc: &mut Html, tags: &[&str]) {
    let selector_list = tags.join(", ");
    let Ok(selector) = Selector::parse(&selector_list) else {
        return;
    };

    let ids: Vec<_> = doc.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/post";

    #[test]
    fn test_og_title_wins_over_title_tag() {
        let html = r#"<html><head>
            <title>Page Title</title>
            <meta property="og:title" content="OG   Title"/>
        </head><body></body></html>"#;
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "OG Title");
    }

    #[test]
    fn test_title_tag_fallback_collapses_spaces() {
        let html = "<html><head><title>Foo  Bar</title></head><body></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "Foo Bar");
    }

    #[test]
    fn test_empty_og_title_falls_back() {
        let html = r#"<html><head>
            <meta property="og:title" content=""/>
            <title>Fallback</title>
        </head></html>"#;
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "Fallback");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let html = "<html><head></head><body><p>text</p></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "");
    }

    #[test]
    fn test_single_spaces_in_title_are_kept() {
        let html = r#"<meta property="og:title" content="A title with words">"#;
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "A title with words");
    }

    #[test]
    fn test_og_fields() {
        let html = r#"<html><head>
            <meta property="og:type" content="article"/>
            <meta property="og:image" content="https://example.com/cover.png"/>
            <meta property="og:site_name" content="Example Blog"/>
        </head></html>"#;
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.url, URL);
        assert_eq!(meta.kind, "article");
        assert_eq!(meta.image, "https://example.com/cover.png");
        assert_eq!(meta.site_name, "Example Blog");
    }

    #[test]
    fn test_missing_og_fields_are_empty() {
        let html = r#"<html><head><meta property="og:type"/></head></html>"#;
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.kind, "");
        assert_eq!(meta.image, "");
        assert_eq!(meta.site_name, "");
    }

    #[test]
    fn test_outline_prefers_article() {
        let html = "<html><body><nav>Menu</nav><p>Sidebar</p>\
            <article><p>Story text</p></article><footer>Footer</footer></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "Story text");
    }

    #[test]
    fn test_outline_uses_first_article_only() {
        let html = "<html><body><article>First</article><article>Second</article></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "First");
    }

    #[test]
    fn test_outline_skips_empty_article() {
        let html = "<html><body><article><script>var x = 1;</script></article>\
            <p>Body text</p></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "Body text");
    }

    #[test]
    fn test_outline_body_strips_removed_elements() {
        let html = "<html><head><style>p { color: red }</style></head><body>\
            <header>Site header</header><p>Hello</p><noscript>Enable JS</noscript>\
            <script>alert('bad');</script></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "Hello");
    }

    #[test]
    fn test_outline_falls_back_to_document() {
        let html = "<html><head><title>Only Title</title></head>\
            <body><nav>Links</nav></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "Only Title");
    }

    #[test]
    fn test_outline_collapses_whitespace_into_newlines() {
        let html = "<html><body><p>One</p>   \n  <p>Two</p> <p>Three</p></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.outline, "One\nTwo Three");
    }

    #[test]
    fn test_collapse_helpers() {
        assert_eq!(collapse_spaces("a  b\t\tc d"), "a b c d");
        assert_eq!(collapse_into_lines("a  b\n\n\nc d"), "a\nb\nc d");
    }

    #[test]
    fn test_non_breaking_spaces_are_kept() {
        let html = "<html><head><title>A\u{a0}\u{a0}B</title></head>\
            <body><p>x\u{a0}\u{a0}y</p></body></html>";
        let meta = parse_metadata(html, URL);
        assert_eq!(meta.title, "A\u{a0}\u{a0}B");
        assert_eq!(meta.outline, "x\u{a0}\u{a0}y");

        assert_eq!(collapse_spaces("a\u{2003}\u{2003}b"), "a\u{2003}\u{2003}b");
        assert_eq!(collapse_into_lines("a \u{a0} b"), "a \u{a0} b");
    }

    #[tokio::test]
    async fn test_extract_empty_url() {
        let result = extract("").await;
        assert!(matches!(result, Err(FetchError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_extract_invalid_scheme() {
        let result = extract("ftp://example.com").await;
        assert!(matches!(result, Err(FetchError::InvalidUrlScheme)));
    }

    #[tokio::test]
    async fn test_extract_unparseable_url() {
        let result = extract("http://").await;
        match result {
            Err(err @ FetchError::InvalidUrl(_)) => {
                assert!(err.to_string().starts_with("Invalid URL: "));
                assert!(!err.to_string().contains("must start with"));
            }
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_options_default() {
        let options = ExtractOptions::default();
        assert!(options.user_agent.is_none());
    }
}
