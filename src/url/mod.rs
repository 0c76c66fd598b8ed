//! URL handling module for Sumi-Index
//!
//! Normalized URLs are the identity used by the frontier and the visited set,
//! so two spellings of the same page are only ever fetched once.

mod normalize;

pub use normalize::{is_crawlable_scheme, normalize_url};
