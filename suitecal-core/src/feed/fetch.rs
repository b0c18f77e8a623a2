//! Feed retrieval over HTTP.

use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Response, Url};
use tracing::debug;

use crate::error::{SuiteCalError, SuiteCalResult};

/// HTTP client for booking feeds.
///
/// Redirects are handled by hand: exactly one hop is followed, a second
/// redirect fails the fetch.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> SuiteCalResult<Self> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(FeedClient { http })
    }

    /// Fetch the feed body at `url`.
    pub async fn fetch(&self, url: &str) -> SuiteCalResult<String> {
        let url = normalize_feed_url(url);
        let mut response = self.get(&url).await?;

        if response.status().is_redirection() {
            let target = redirect_target(&response, &url)?;
            debug!(from = %url, to = %target, "following feed redirect");

            response = self.get(target.as_str()).await?;
            if response.status().is_redirection() {
                return Err(SuiteCalError::TooManyRedirects(url));
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(SuiteCalError::HttpStatus {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    async fn get(&self, url: &str) -> SuiteCalResult<Response> {
        Ok(self.http.get(url).send().await?)
    }
}

/// `webcal://` is a plain HTTPS feed under another name.
pub fn normalize_feed_url(url: &str) -> String {
    let url = url.trim();
    match url.get(..9) {
        Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &url[9..])
        }
        _ => url.to_string(),
    }
}

/// Resolve the Location header, relative targets included, against the request URL.
fn redirect_target(response: &Response, url: &str) -> SuiteCalResult<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| SuiteCalError::MissingLocation(url.to_string()))?;

    let base = Url::parse(url).map_err(|e| SuiteCalError::Http(e.to_string()))?;
    base.join(location)
        .map_err(|e| SuiteCalError::Http(format!("Invalid redirect target '{location}': {e}")))
}
