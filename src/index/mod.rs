//! In-memory keyword index over crawled pages
//!
//! This module holds everything needed to answer boolean-AND keyword queries:
//! - `tokenizer`: lowercase, word-boundary term splitting
//! - `page`: an immutable indexed page with its derived term set and links
//! - `query`: query terms and the aggregate result returned to the session
//!
//! Pages are kept in insertion order and never evicted.

mod page;
mod query;
mod tokenizer;

pub use page::IndexedPage;
pub use query::{QueryResult, QueryTerms};
pub use tokenizer::{tokenize, tokenize_query};

use url::Url;

/// Ordered collection of indexed pages
#[derive(Debug, Default)]
pub struct PageIndex {
    pages: Vec<IndexedPage>,
}

impl PageIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a page, deriving its term set and outbound links from `content`
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the page was requested as
    /// * `final_url` - The URL the content was served from, used as the link base
    /// * `content` - Raw page text
    pub fn add_page(&mut self, url: Url, final_url: Url, content: String) {
        self.insert(IndexedPage::new(url, final_url, content));
    }

    /// Stores an already built page
    pub fn insert(&mut self, page: IndexedPage) {
        tracing::trace!(
            "Indexed {} ({} terms, {} links)",
            page.url(),
            page.terms().len(),
            page.links().len()
        );
        self.pages.push(page);
    }

    /// Returns true iff every term in `terms` is present in `page`
    pub fn contains_all(&self, page: &IndexedPage, terms: &QueryTerms) -> bool {
        page.contains_all(terms)
    }

    /// Iterates over all stored pages in insertion order
    ///
    /// Each call starts a fresh pass over the collection.
    pub fn iter(&self) -> std::slice::Iter<'_, IndexedPage> {
        self.pages.iter()
    }

    /// Number of stored pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no page has been indexed yet
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Evaluates a boolean-AND query against every stored page
    ///
    /// An empty index yields `QueryResult::empty()` rather than dividing by zero.
    pub fn query(&self, terms: &QueryTerms) -> QueryResult {
        let count = self.pages.len();
        if count == 0 {
            return QueryResult::empty();
        }

        let matching = self
            .iter()
            .filter(|page| self.contains_all(page, terms))
            .count();

        QueryResult::new(matching as f64 / count as f64, count)
    }
}

impl<'a> IntoIterator for &'a PageIndex {
    type Item = &'a IndexedPage;
    type IntoIter = std::slice::Iter<'a, IndexedPage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    fn sample_index() -> PageIndex {
        let mut index = PageIndex::new();
        index.add_page(url("/a"), url("/a"), "Cat and dog".to_string());
        index.add_page(url("/b"), url("/b"), "A cat".to_string());
        index
    }

    #[test]
    fn test_empty_index_query() {
        let index = PageIndex::new();
        let result = index.query(&QueryTerms::from_input("cat"));
        assert_eq!(result, QueryResult::new(0.0, 0));
    }

    #[test]
    fn test_query_all_match() {
        let result = sample_index().query(&QueryTerms::from_input("cat"));
        assert_eq!(result, QueryResult::new(1.0, 2));
    }

    #[test]
    fn test_query_half_match() {
        let result = sample_index().query(&QueryTerms::from_input("dog"));
        assert_eq!(result, QueryResult::new(0.5, 2));
    }

    #[test]
    fn test_query_no_match() {
        let result = sample_index().query(&QueryTerms::from_input("fish"));
        assert_eq!(result, QueryResult::new(0.0, 2));
    }

    #[test]
    fn test_query_requires_every_term() {
        let index = sample_index();
        assert_eq!(
            index.query(&QueryTerms::from_input("cat dog")),
            QueryResult::new(0.5, 2)
        );
        assert_eq!(
            index.query(&QueryTerms::from_input("dog fish")),
            QueryResult::new(0.0, 2)
        );
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let result = sample_index().query(&QueryTerms::from_input("CAT"));
        assert_eq!(result.fraction_matching, 1.0);
    }

    #[test]
    fn test_iteration_is_ordered_and_restartable() {
        let index = sample_index();

        let first: Vec<_> = index.iter().map(|p| p.url().path().to_string()).collect();
        let second: Vec<_> = (&index)
            .into_iter()
            .map(|p| p.url().path().to_string())
            .collect();

        assert_eq!(first, vec!["/a", "/b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_contains_all() {
        let index = sample_index();
        let page = index.iter().next().unwrap();

        assert!(index.contains_all(page, &QueryTerms::from_input("dog, cat")));
        assert!(!index.contains_all(page, &QueryTerms::from_input("cat bird")));
    }

    #[test]
    fn test_len() {
        let index = sample_index();
        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
    }
}
