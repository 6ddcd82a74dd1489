//! Page fetching for the handbook builder.
//!
//! This crate provides:
//! - [`PageFetcher`]: the seam between the pipeline and the network
//! - [`HttpFetcher`]: blocking-in-order HTTP fetcher backed by `reqwest`
//! - [`parse_document`]: body → `scraper` DOM

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use handbook_shared::{FetchConfig, HandbookError, Result};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("Handbook/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// Fetches the raw HTML of a page.
///
/// There is no retry: any failure is returned to the caller as-is.
pub trait PageFetcher {
    /// Fetch the body of `url`.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>>;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// HTTP page fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);

        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HandbookError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HandbookError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandbookError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HandbookError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(status = status.as_u16(), content_len = body.len(), "page fetched");
        Ok(body)
    }
}

/// Parse a fetched body into a DOM.
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Fetch `url` and parse it in one step.
pub async fn fetch_and_parse<F: PageFetcher>(fetcher: &F, url: &Url) -> Result<Html> {
    let body = fetcher.fetch(url).await?;
    Ok(parse_document(&body))
}
