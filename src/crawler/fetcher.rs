//! Page retrieval for fetch workers
//!
//! This module handles every way a page can be retrieved:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with status and Content-Type checks
//! - Reading `file://` URLs from the local filesystem
//! - Classifying failures into `FetchError`

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Text retrieved for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the content was actually served from, after any redirects
    pub final_url: Url,

    pub content: String,
}

impl FetchedPage {
    pub fn new(final_url: Url, content: impl Into<String>) -> Self {
        Self {
            final_url,
            content: content.into(),
        }
    }
}

/// Something that can turn a URL into page text
///
/// Implementations must report every retrieval problem as a `FetchError`;
/// workers rely on this never panicking.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `Name/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header names textual content
fn is_text_content(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/") || mime == "application/xhtml+xml"
}

fn classify_request_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect
    } else {
        FetchError::Request(error.to_string())
    }
}

/// Retrieves pages over HTTP(S), and from disk for `file://` URLs
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Creates a page source with a freshly built client
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Identity sent with every request
    /// * `crawler` - Supplies the request and connect timeouts
    ///
    /// # Returns
    ///
    /// * `Ok(HttpPageSource)` - Ready to fetch
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent, crawler)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_http(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        if &final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content = match content_type {
            Some(content_type) => {
                if !is_text_content(&content_type) {
                    return Err(FetchError::ContentMismatch(content_type));
                }
                response
                    .text()
                    .await
                    .map_err(|e| FetchError::Body(e.to_string()))?
            }
            // Undeclared content is accepted only if it is valid UTF-8
            None => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::Body(e.to_string()))?;
                String::from_utf8(bytes.to_vec()).map_err(|_| {
                    FetchError::ContentMismatch("undeclared non-UTF-8 content".to_string())
                })?
            }
        };

        Ok(FetchedPage::new(final_url, content))
    }

    async fn fetch_file(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::Io(format!("not a local path: {}", url)))?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        Ok(FetchedPage::new(url.clone(), content))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match url.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" => self.fetch_file(url).await,
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}
