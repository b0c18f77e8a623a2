//! Booking feed retrieval and parsing.
//!
//! Feeds are all-day-event calendars (RFC 5545). Only VEVENT start/end dates
//! matter here; every other property is ignored.

mod fetch;
mod parse;

pub use fetch::{FeedClient, normalize_feed_url};
pub use parse::{FeedEvent, ParsedFeed, parse_feed};
