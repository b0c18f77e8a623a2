//! Where the calendar view gets its availability records from.
//!
//! Loading a record is the renderer's only suspension point; everything after
//! it is synchronous.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;

use crate::availability::{AvailabilityRecord, AvailabilityStore, validate_suite_id};
use crate::error::{SuiteCalError, SuiteCalResult};

pub trait AvailabilitySource {
    fn load(
        &self,
        suite_id: &str,
    ) -> impl Future<Output = SuiteCalResult<AvailabilityRecord>> + Send;
}

impl AvailabilitySource for AvailabilityStore {
    async fn load(&self, suite_id: &str) -> SuiteCalResult<AvailabilityRecord> {
        let path = self.record_path(suite_id)?;
        let content = tokio::fs::read_to_string(&path).await?;
        AvailabilityRecord::from_json(&content)
    }
}

/// Records served by the published site, at `<base>availability/<suite-id>.json`.
#[derive(Clone)]
pub struct HttpAvailability {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpAvailability {
    pub fn new(base_url: &str, timeout: Duration) -> SuiteCalResult<Self> {
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&base).map_err(|e| SuiteCalError::Http(e.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpAvailability { http, base_url })
    }

    pub fn record_url(&self, suite_id: &str) -> SuiteCalResult<Url> {
        validate_suite_id(suite_id)?;
        self.base_url
            .join(&format!("availability/{suite_id}.json"))
            .map_err(|e| SuiteCalError::Http(e.to_string()))
    }
}

impl AvailabilitySource for HttpAvailability {
    async fn load(&self, suite_id: &str) -> SuiteCalResult<AvailabilityRecord> {
        let url = self.record_url(suite_id)?;
        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuiteCalError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        AvailabilityRecord::from_json(&response.text().await?)
    }
}
