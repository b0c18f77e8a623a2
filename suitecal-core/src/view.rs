//! Multi-month availability calendar.
//!
//! A `CalendarView` is derived fresh from a suite's record on every call and
//! holds no state between calls. Mapping it onto actual widgets or terminal
//! output is left to the caller.

use chrono::{Datelike, Local, Months, NaiveDate};
use tracing::debug;

use crate::availability::AvailabilityRecord;
use crate::constants::DEFAULT_MONTHS_TO_SHOW;
use crate::date::CalendarDate;
use crate::source::AvailabilitySource;

/// Weekday column headers. Weeks start on Sunday.
pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Why no grid could be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// The record loaded but has no booked dates yet
    NoData,
    /// The record is missing, malformed or could not be fetched
    Unavailable,
}

impl PlaceholderReason {
    pub fn message(&self) -> &'static str {
        match self {
            PlaceholderReason::NoData => {
                "No availability loaded yet. Add the iCal URL in data/config.json and run sync."
            }
            PlaceholderReason::Unavailable => {
                "Availability not found. Add the iCal URL in data/config.json and run sync."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: CalendarDate,
    pub is_booked: bool,
    pub is_today: bool,
    pub is_past: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    /// Filler before day 1 so it lands in its weekday column
    Padding,
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    fn build(first: NaiveDate, record: &AvailabilityRecord, today: CalendarDate) -> Self {
        let padding = first.weekday().num_days_from_sunday() as usize;
        let mut cells = vec![GridCell::Padding; padding];

        let days = first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .map(CalendarDate::from);

        cells.extend(days.map(|date| {
            GridCell::Day(DayCell {
                date,
                is_booked: record.is_booked(&date),
                is_today: date == today,
                is_past: date < today,
            })
        }));

        MonthGrid {
            year: first.year(),
            month: first.month(),
            cells,
        }
    }

    /// e.g. "March 2025"
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn leading_padding(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| matches!(c, GridCell::Padding))
            .count()
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|c| match c {
            GridCell::Day(day) => Some(day),
            GridCell::Padding => None,
        })
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|d| d.date.day() == day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarView {
    Placeholder(PlaceholderReason),
    Months(Vec<MonthGrid>),
}

impl CalendarView {
    /// Build the view from an already loaded record. `None` means the record
    /// could not be loaded.
    pub fn build(
        record: Option<&AvailabilityRecord>,
        reference: CalendarDate,
        months_to_show: u32,
    ) -> Self {
        let record = match record {
            None => return CalendarView::Placeholder(PlaceholderReason::Unavailable),
            Some(r) if r.is_empty() => return CalendarView::Placeholder(PlaceholderReason::NoData),
            Some(r) => r,
        };

        let reference_naive = reference.naive();
        let Some(first) = NaiveDate::from_ymd_opt(reference_naive.year(), reference_naive.month(), 1)
        else {
            return CalendarView::Placeholder(PlaceholderReason::Unavailable);
        };

        let months = (0..months_to_show)
            .map_while(|i| first.checked_add_months(Months::new(i)))
            .map(|month_start| MonthGrid::build(month_start, record, reference))
            .collect();

        CalendarView::Months(months)
    }

    pub fn months(&self) -> &[MonthGrid] {
        match self {
            CalendarView::Months(months) => months,
            CalendarView::Placeholder(_) => &[],
        }
    }

    pub fn month(&self, year: i32, month: u32) -> Option<&MonthGrid> {
        self.months()
            .iter()
            .find(|m| m.year == year && m.month == month)
    }
}

/// Load the suite's record from `source` and build its view.
///
/// Any load failure degrades to the `Unavailable` placeholder.
pub async fn render<S: AvailabilitySource>(
    source: &S,
    suite_id: &str,
    reference: CalendarDate,
    months_to_show: u32,
) -> CalendarView {
    let record = match source.load(suite_id).await {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(suite = suite_id, error = %e, "availability record unavailable");
            None
        }
    };

    CalendarView::build(record.as_ref(), reference, months_to_show)
}

/// `render` for today's local date and the default number of months.
pub async fn render_today<S: AvailabilitySource>(source: &S, suite_id: &str) -> CalendarView {
    let today = CalendarDate::from(Local::now().date_naive());
    render(source, suite_id, today, DEFAULT_MONTHS_TO_SHOW).await
}
