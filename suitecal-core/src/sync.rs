//! Feed synchronization.
//!
//! For each configured suite: fetch its feed, parse booked dates, replace its
//! availability record. Suites are processed one at a time and a failure in
//! one never stops the others.

use tracing::{info, warn};

use crate::availability::{AvailabilityRecord, AvailabilityStore, validate_suite_id};
use crate::error::{SuiteCalError, SuiteCalResult};
use crate::feed::{FeedClient, parse_feed};
use crate::feed_config::{BookingFeedConfig, SuiteFeed};

#[derive(Debug)]
pub enum SuiteOutcome {
    /// Record replaced with this many booked days
    Updated { booked_days: usize },
    /// No feed URL configured
    Skipped,
    /// Fetch or write failed; the previous record is untouched
    Failed(SuiteCalError),
}

#[derive(Debug)]
pub struct SuiteReport {
    pub suite_id: String,
    pub name: String,
    pub outcome: SuiteOutcome,
}

/// Outcome of one sync run, in config order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub suites: Vec<SuiteReport>,
}

impl SyncReport {
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SuiteOutcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SuiteOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SuiteOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SuiteOutcome) -> bool) -> usize {
        self.suites.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Sync every suite in `config` that has a feed URL.
pub async fn synchronize(
    config: &BookingFeedConfig,
    client: &FeedClient,
    store: &AvailabilityStore,
) -> SyncReport {
    let mut report = SyncReport::default();

    for (suite_id, feed) in config.suites() {
        let name = display_name(suite_id, feed);

        let outcome = if !feed.has_feed() {
            warn!(suite = suite_id, "Skipping {name}: no iCal URL set");
            SuiteOutcome::Skipped
        } else {
            match sync_suite(suite_id, feed, client, store).await {
                Ok(booked_days) => SuiteOutcome::Updated { booked_days },
                Err(e) => {
                    warn!(suite = suite_id, error = %e, "Failed to sync {name}");
                    SuiteOutcome::Failed(e)
                }
            }
        };

        report.suites.push(SuiteReport {
            suite_id: suite_id.to_string(),
            name,
            outcome,
        });
    }

    report
}

/// Fetch, parse and persist one suite. Returns the number of booked days written.
pub async fn sync_suite(
    suite_id: &str,
    feed: &SuiteFeed,
    client: &FeedClient,
    store: &AvailabilityStore,
) -> SuiteCalResult<usize> {
    validate_suite_id(suite_id)?;

    info!(suite = suite_id, "Fetching iCal for {}", display_name(suite_id, feed));
    let body = client.fetch(&feed.feed_url).await?;
    let parsed = parse_feed(&body);

    if parsed.duration_ignored > 0 {
        warn!(
            suite = suite_id,
            events = parsed.duration_ignored,
            "Events with DURATION and no DTEND were counted as a single day"
        );
    }

    let record = AvailabilityRecord::new(parsed.booked_dates());
    store.write(suite_id, &record).await?;

    let booked_days = record.booked_dates.len();
    let path = store.record_path(suite_id)?;
    info!(
        suite = suite_id,
        booked_days,
        "Saved availability to {}",
        path.display()
    );

    Ok(booked_days)
}

fn display_name(suite_id: &str, feed: &SuiteFeed) -> String {
    if feed.name.is_empty() {
        suite_id.to_string()
    } else {
        feed.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20250310\r\n\
DTEND;VALUE=DATE:20250312\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20250401\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn client() -> FeedClient {
        FeedClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_synchronize_writes_sorted_record() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/loft.ics")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let store = AvailabilityStore::new(dir.path());
        let config = BookingFeedConfig::default().with_suite(
            "loft",
            "The Loft",
            &format!("{}/loft.ics", server.url()),
        );

        let report = synchronize(&config, &client(), &store).await;
        assert_eq!(report.updated(), 1);

        let written = std::fs::read_to_string(dir.path().join("loft.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "bookedDates": ["2025-03-10", "2025-03-11", "2025-04-01"] })
        );
    }

    #[tokio::test]
    async fn test_resync_of_unchanged_feed_is_byte_identical() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/loft.ics")
            .with_status(200)
            .with_body(FEED)
            .expect(2)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let store = AvailabilityStore::new(dir.path());
        let config = BookingFeedConfig::default().with_suite(
            "loft",
            "The Loft",
            &format!("{}/loft.ics", server.url()),
        );

        synchronize(&config, &client(), &store).await;
        let first = std::fs::read(dir.path().join("loft.json")).unwrap();
        synchronize(&config, &client(), &store).await;
        let second = std::fs::read(dir.path().join("loft.json")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failures_are_contained_per_suite() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/good.ics")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/broken.ics")
            .with_status(500)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let store = AvailabilityStore::new(dir.path());
        let previous = AvailabilityRecord::placeholder();
        store.write("broken", &previous).await.unwrap();

        let config = BookingFeedConfig::default()
            .with_suite("broken", "Broken", &format!("{}/broken.ics", server.url()))
            .with_suite("good", "Good", &format!("{}/good.ics", server.url()))
            .with_suite("unlisted", "Unlisted", "");

        let report = synchronize(&config, &client(), &store).await;

        assert_eq!(report.updated(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(store.read("broken").unwrap(), previous);
        assert_eq!(store.read("good").unwrap().booked_dates.len(), 3);
        assert!(!dir.path().join("unlisted.json").exists());
    }

    #[tokio::test]
    async fn test_double_redirect_fails_suite() {
        let mut server = mockito::Server::new_async().await;
        let _hop1 = server
            .mock("GET", "/loft.ics")
            .with_status(302)
            .with_header("location", "/hop.ics")
            .create_async()
            .await;
        let _hop2 = server
            .mock("GET", "/hop.ics")
            .with_status(302)
            .with_header("location", "/final.ics")
            .create_async()
            .await;
        let _final = server
            .mock("GET", "/final.ics")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let store = AvailabilityStore::new(dir.path());
        let config = BookingFeedConfig::default().with_suite(
            "loft",
            "The Loft",
            &format!("{}/loft.ics", server.url()),
        );

        let report = synchronize(&config, &client(), &store).await;
        assert!(matches!(
            report.suites[0].outcome,
            SuiteOutcome::Failed(SuiteCalError::TooManyRedirects(_))
        ));
        assert!(!dir.path().join("loft.json").exists());
    }

    #[tokio::test]
    async fn test_invalid_suite_id_fails_without_fetching() {
        let dir = TempDir::new().unwrap();
        let store = AvailabilityStore::new(dir.path());
        let config = BookingFeedConfig::default().with_suite(
            "../escape",
            "Escape",
            "http://127.0.0.1:9/feed.ics",
        );

        let report = synchronize(&config, &client(), &store).await;
        assert!(matches!(
            report.suites[0].outcome,
            SuiteOutcome::Failed(SuiteCalError::InvalidSuiteId(_))
        ));
    }
}
