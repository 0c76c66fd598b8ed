use crate::crawler::parse_html;
use crate::index::query::QueryTerms;
use crate::index::tokenizer::tokenize;
use crate::url::normalize_url;
use std::collections::BTreeSet;
use url::Url;

/// A successfully fetched page, immutable once built
#[derive(Debug, Clone)]
pub struct IndexedPage {
    url: Url,
    final_url: Url,
    content: String,
    title: Option<String>,
    terms: BTreeSet<String>,
    links: Vec<Url>,
}

impl IndexedPage {
    /// Builds a page from its raw content
    ///
    /// Terms come from the document text (title included). Links are resolved
    /// against `final_url` and normalized; unusable links are dropped.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the page was requested as, used as its identity
    /// * `final_url` - The URL the content was served from after redirects
    /// * `content` - Raw page text, HTML or plain
    pub fn new(url: Url, final_url: Url, content: String) -> Self {
        let parsed = parse_html(&content, &final_url);

        let mut terms = tokenize(&parsed.text);
        if let Some(title) = &parsed.title {
            terms.extend(tokenize(title));
        }

        let mut links: Vec<Url> = Vec::with_capacity(parsed.links.len());
        for link in &parsed.links {
            match normalize_url(link) {
                Ok(normalized) => {
                    if !links.contains(&normalized) {
                        links.push(normalized);
                    }
                }
                Err(e) => tracing::debug!("Dropping link {} from {}: {}", link, url, e),
            }
        }

        Self {
            url,
            final_url,
            content,
            title: parsed.title,
            terms,
            links,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Where the content was served from; equals `url()` unless redirected
    pub fn final_url(&self) -> &Url {
        &self.final_url
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn terms(&self) -> &BTreeSet<String> {
        &self.terms
    }

    /// Outbound links, normalized and deduplicated, in document order
    pub fn links(&self) -> &[Url] {
        &self.links
    }

    /// Returns true iff every query term is in this page's term set
    pub fn contains_all(&self, terms: &QueryTerms) -> bool {
        terms.iter().all(|term| self.terms.contains(term.as_str()))
    }
}
