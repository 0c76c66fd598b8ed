use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\W+").expect("separator pattern is valid"))
}

fn split_terms(text: &str) -> impl Iterator<Item = String> + '_ {
    separator()
        .split(text)
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Derives the lowercase term set of a piece of text
///
/// Splits on runs of non-word characters; no stemming, no stop words.
///
/// ```
/// use sumi_index::tokenize;
///
/// let terms = tokenize("Cat, Dog!");
/// assert!(terms.contains("cat") && terms.contains("dog"));
/// assert_eq!(terms.len(), 2);
/// ```
pub fn tokenize(text: &str) -> BTreeSet<String> {
    split_terms(text).collect()
}

/// Splits free-text query input into ordered lowercase terms
pub fn tokenize_query(input: &str) -> Vec<String> {
    split_terms(input).collect()
}
