use std::time::Duration;

/// Months shown by the availability calendar when nothing else is asked for
pub const DEFAULT_MONTHS_TO_SHOW: u32 = 6;

/// Upper bound on a single feed request, redirect hop included
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Advisory note written into freshly seeded, empty records
pub const PLACEHOLDER_NOTE: &str = "Add iCal URL in data/config.json and run sync";

pub const DEFAULT_FEED_CONFIG_PATH: &str = "data/config.json";

pub const DEFAULT_AVAILABILITY_DIR: &str = "public/availability";
