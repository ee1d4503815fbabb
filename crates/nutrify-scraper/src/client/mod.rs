//! HTTP client for the Open Food Facts product API and product pages.

use std::time::Duration;

use nutrify_core::Barcode;
use reqwest::{Client, Response, Url};

use crate::aggregate::AggregatorConfig;
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::OffProductResponse;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A fetched product page together with the URL it was served from after
/// redirects. Relative links on the page resolve against `url`.
#[derive(Debug)]
pub struct ProductPage {
    pub url: Url,
    pub body: String,
}

/// Client for one Open Food Facts deployment.
///
/// 404 and other non-2xx responses surface as typed errors. Transient
/// failures (network, 429, 5xx) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct OffClient {
    client: Client,
    api_host: Url,
    web_host: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl OffClient {
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if either host is not an absolute URL.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(config: &AggregatorConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            api_host: parse_host(&config.api_host)?,
            web_host: parse_host(&config.web_host)?,
            max_retries: config.max_retries,
            backoff_base_secs: config.backoff_base_secs,
        })
    }

    /// Fetches `GET {api_host}/api/v0/product/{barcode}.json`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] on HTTP 404.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn fetch_product(
        &self,
        barcode: &Barcode,
    ) -> Result<OffProductResponse, ScraperError> {
        let url = product_api_url(&self.api_host, barcode)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let response = check_status(response, &url)?;

                let body = response.text().await?;
                serde_json::from_str::<OffProductResponse>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("product {barcode} from {url}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Fetches the human-facing page `GET {web_host}/product/{barcode}`.
    ///
    /// # Errors
    ///
    /// Same HTTP failures as [`OffClient::fetch_product`]; the body is not
    /// parsed here.
    pub async fn fetch_product_page(&self, barcode: &Barcode) -> Result<ProductPage, ScraperError> {
        let url = product_page_url(&self.web_host, barcode)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .send()
                    .await?;
                let response = check_status(response, &url)?;

                // Capture the final URL before the body consumes the response.
                let final_url = response.url().clone();
                let body = response.text().await?;
                Ok(ProductPage {
                    url: final_url,
                    body,
                })
            }
        })
        .await
    }
}

fn check_status(response: Response, url: &Url) -> Result<Response, ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            url: url.to_string(),
            retry_after_secs,
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_string(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// Parses a configured host. A trailing slash is ignored; a path prefix is
/// kept so deployments behind a sub-path still work.
fn parse_host(host: &str) -> Result<Url, ScraperError> {
    let url = Url::parse(host).map_err(|e| ScraperError::InvalidUrl {
        url: host.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: host.to_owned(),
            reason: "expected an absolute http(s) URL".to_owned(),
        });
    }
    Ok(url)
}

fn with_segments(base: &Url, segments: &[&str]) -> Result<Url, ScraperError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| ScraperError::InvalidUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `{api_host}/api/v0/product/{barcode}.json`. The barcode is
/// percent-encoded as a single path segment.
fn product_api_url(api_host: &Url, barcode: &Barcode) -> Result<Url, ScraperError> {
    let file = format!("{barcode}.json");
    with_segments(api_host, &["api", "v0", "product", &file])
}

/// `{web_host}/product/{barcode}`.
fn product_page_url(web_host: &Url, barcode: &Barcode) -> Result<Url, ScraperError> {
    with_segments(web_host, &["product", barcode.as_str()])
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
