//! HTML parser for extracting links, title and visible text
//!
//! This module handles parsing fetched content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title
//! - Visible document text for term derivation

use crate::url::is_crawlable_scheme;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from a fetched page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Visible text, whitespace-separated
    pub text: String,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// Parses page content and extracts links, title and text
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that does not resolve to http, https or file
///
/// Plain text content parses as a document with a single text body, so
/// non-HTML text pages still contribute terms.
///
/// # Example
///
/// ```
/// use sumi_index::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: extract_text(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().filter_map(ElementRef::wrap).any(|element| {
            HIDDEN_ELEMENTS.contains(&element.value().name())
        });
        if hidden {
            continue;
        }

        let fragment = fragment.trim();
        if !fragment.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(fragment);
        }
    }

    text
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL, or None if it should be skipped
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| href.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    is_crawlable_scheme(absolute_url.scheme()).then(|| absolute_url.to_string())
}
