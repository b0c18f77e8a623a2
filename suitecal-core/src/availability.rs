//! Per-suite availability records.
//!
//! Each suite gets one JSON document at `<dir>/<suite-id>.json`:
//!
//! ```json
//! { "bookedDates": ["2025-03-10", "2025-03-11"] }
//! ```
//!
//! Records are replaced wholesale on every successful sync.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_NOTE;
use crate::date::CalendarDate;
use crate::error::{SuiteCalError, SuiteCalResult};

/// Booked dates for one suite. Serialized sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub booked_dates: BTreeSet<CalendarDate>,

    /// Human-readable hint on seeded records. Never read back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AvailabilityRecord {
    pub fn new(booked_dates: BTreeSet<CalendarDate>) -> Self {
        AvailabilityRecord {
            booked_dates,
            note: None,
        }
    }

    /// Empty record written at site-build time, before any sync has run.
    pub fn placeholder() -> Self {
        AvailabilityRecord {
            booked_dates: BTreeSet::new(),
            note: Some(PLACEHOLDER_NOTE.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.booked_dates.is_empty()
    }

    pub fn is_booked(&self, date: &CalendarDate) -> bool {
        self.booked_dates.contains(date)
    }

    pub fn to_json(&self) -> SuiteCalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> SuiteCalResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Directory of availability records, one file per suite.
#[derive(Debug, Clone)]
pub struct AvailabilityStore {
    dir: PathBuf,
}

impl AvailabilityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        AvailabilityStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, suite_id: &str) -> SuiteCalResult<PathBuf> {
        validate_suite_id(suite_id)?;
        Ok(self.dir.join(format!("{suite_id}.json")))
    }

    pub fn read(&self, suite_id: &str) -> SuiteCalResult<AvailabilityRecord> {
        let path = self.record_path(suite_id)?;
        let content = std::fs::read_to_string(&path)?;
        AvailabilityRecord::from_json(&content)
    }

    /// Replace the suite's record. Readers see either the old or the new file.
    pub async fn write(&self, suite_id: &str, record: &AvailabilityRecord) -> SuiteCalResult<()> {
        let path = self.record_path(suite_id)?;
        write_atomic(&path, record.to_json()?.as_bytes()).await
    }

    /// Write a placeholder record unless one already exists.
    /// Returns true if a file was created.
    pub async fn ensure_placeholder(&self, suite_id: &str) -> SuiteCalResult<bool> {
        let path = self.record_path(suite_id)?;
        if tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        write_atomic(&path, AvailabilityRecord::placeholder().to_json()?.as_bytes()).await?;
        Ok(true)
    }
}

/// Suite ids become file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_suite_id(suite_id: &str) -> SuiteCalResult<()> {
    let valid = !suite_id.is_empty()
        && suite_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(SuiteCalError::InvalidSuiteId(suite_id.to_string()))
    }
}

/// Write via a sibling temp file and rename over the target.
/// The temp file never outlives a failed write.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> SuiteCalResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    if let Err(e) = tokio::fs::write(&temp_path, contents).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    // rename is atomic on POSIX when both paths share a filesystem
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}
