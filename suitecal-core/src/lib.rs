//! Core of the suite availability pipeline.
//!
//! Two halves that only share the persisted record format:
//! - `sync` pulls each suite's booking feed, parses it into booked dates
//!   and writes one `AvailabilityRecord` per suite
//! - `view` turns a suite's record into a multi-month `CalendarView`

pub mod availability;
pub mod constants;
pub mod date;
pub mod error;
pub mod feed;
pub mod feed_config;
pub mod settings;
pub mod source;
pub mod sync;
pub mod view;

pub use availability::{AvailabilityRecord, AvailabilityStore};
pub use date::CalendarDate;
pub use error::{SuiteCalError, SuiteCalResult};
pub use feed_config::{BookingFeedConfig, SuiteFeed};
pub use view::{CalendarView, DayCell, GridCell, MonthGrid, PlaceholderReason};
