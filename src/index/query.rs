use crate::index::tokenizer::tokenize_query;
use std::fmt;

/// Ordered lowercase query terms
///
/// An empty sequence is the sentinel that ends a query session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms(Vec<String>);

impl QueryTerms {
    /// Builds query terms from already split words, lowercasing each one
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            terms
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Tokenizes free-text input into query terms
    pub fn from_input(input: &str) -> Self {
        Self(tokenize_query(input))
    }

    /// The end-of-session sentinel
    pub fn terminate() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Aggregate answer to one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryResult {
    /// Fraction of indexed pages containing every term, in `[0, 1]`
    pub fraction_matching: f64,

    /// Number of pages indexed when the query was evaluated
    pub total_indexed_pages: usize,
}

impl QueryResult {
    pub fn new(fraction_matching: f64, total_indexed_pages: usize) -> Self {
        Self {
            fraction_matching,
            total_indexed_pages,
        }
    }

    /// Result for an empty index; also primes a query session
    pub fn empty() -> Self {
        Self::new(0.0, 0)
    }

    /// Matching fraction expressed as a percentage
    pub fn percentage(&self) -> f64 {
        self.fraction_matching * 100.0
    }

    /// Returns true if there is something worth reporting
    pub fn has_pages(&self) -> bool {
        self.total_indexed_pages > 0
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% of {} total pages matched.",
            self.percentage(),
            self.total_indexed_pages
        )
    }
}
