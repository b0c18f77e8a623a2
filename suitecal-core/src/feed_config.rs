//! Suite → booking feed mapping.
//!
//! Stored as JSON keyed by suite id:
//!
//! ```json
//! { "garden-suite": { "name": "Garden Suite", "icalUrl": "https://..." } }
//! ```
//!
//! The site builder seeds entries with empty URLs; sync only reads them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::availability::write_atomic;
use crate::error::{SuiteCalError, SuiteCalResult};

/// Booking feed for one suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteFeed {
    #[serde(default)]
    pub name: String,

    /// Empty when the suite has no feed yet. Anything but a string reads as empty.
    #[serde(
        rename = "icalUrl",
        alias = "feedUrl",
        default,
        deserialize_with = "string_or_empty"
    )]
    pub feed_url: String,
}

impl SuiteFeed {
    pub fn has_feed(&self) -> bool {
        !self.feed_url.trim().is_empty()
    }
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Mapping from suite id to its feed. Ordered by id so saves are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingFeedConfig {
    suites: BTreeMap<String, SuiteFeed>,
}

impl BookingFeedConfig {
    /// Load the config, failing if it is missing or unparseable.
    pub fn load(path: &Path) -> SuiteCalResult<Self> {
        if !path.exists() {
            return Err(SuiteCalError::ConfigMissing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load the config, or fall back to an empty one.
    ///
    /// Used on the seeding path, where an unreadable config is rebuilt from
    /// scratch. The reason for falling back is returned alongside.
    pub fn load_or_empty(path: &Path) -> (Self, Option<SuiteCalError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn from_json_str(content: &str) -> SuiteCalResult<Self> {
        serde_json::from_str(content).map_err(|e| SuiteCalError::Config(e.to_string()))
    }

    /// Write the config back as pretty JSON, replacing the file atomically.
    pub async fn save(&self, path: &Path) -> SuiteCalResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, content.as_bytes()).await
    }

    pub fn with_suite(mut self, id: &str, name: &str, feed_url: &str) -> Self {
        self.suites.insert(
            id.to_string(),
            SuiteFeed {
                name: name.to_string(),
                feed_url: feed_url.to_string(),
            },
        );
        self
    }

    /// Add a suite with an empty feed URL, or refresh the name of an existing one.
    /// An existing URL is never touched. Returns true if the suite was new.
    pub fn seed_suite(&mut self, id: &str, name: &str) -> bool {
        match self.suites.get_mut(id) {
            Some(feed) => {
                feed.name = name.to_string();
                false
            }
            None => {
                self.suites.insert(
                    id.to_string(),
                    SuiteFeed {
                        name: name.to_string(),
                        feed_url: String::new(),
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&SuiteFeed> {
        self.suites.get(id)
    }

    pub fn suites(&self) -> impl Iterator<Item = (&str, &SuiteFeed)> {
        self.suites.iter().map(|(id, feed)| (id.as_str(), feed))
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}
