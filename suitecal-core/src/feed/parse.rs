//! Feed tokenizer.
//!
//! Lines are unfolded, split into `NAME[;params]:value` tokens and fed through
//! a two-state machine (outside an event / inside an event). Each finished
//! event block yields at most one `FeedEvent`.

use std::collections::BTreeSet;

use icalendar::parser::unfold;

use crate::date::CalendarDate;

/// An all-day booking span `[start, end_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEvent {
    pub start: CalendarDate,
    pub end_exclusive: CalendarDate,
}

impl FeedEvent {
    pub fn dates(&self) -> impl Iterator<Item = CalendarDate> {
        self.start.iter_until(self.end_exclusive)
    }
}

/// Result of tokenizing one feed document.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub events: Vec<FeedEvent>,
    /// Event blocks without a usable DTSTART
    pub skipped_blocks: usize,
    /// Events that had a DURATION but no usable DTEND and were read as one day
    pub duration_ignored: usize,
}

impl ParsedFeed {
    /// Union of every event's dates.
    pub fn booked_dates(&self) -> BTreeSet<CalendarDate> {
        self.events.iter().flat_map(FeedEvent::dates).collect()
    }
}

/// Raw values of the first DTSTART/DTEND seen in an event block.
#[derive(Default)]
struct EventBlock<'a> {
    dtstart: Option<&'a str>,
    dtend: Option<&'a str>,
    has_duration: bool,
    /// Depth of nested components such as VALARM
    nested: usize,
}

enum State<'a> {
    Outside,
    InEvent(EventBlock<'a>),
}

pub fn parse_feed(content: &str) -> ParsedFeed {
    let unfolded = unfold(content);
    let mut parsed = ParsedFeed::default();
    let mut state = State::Outside;

    for line in unfolded.lines() {
        let Some((name, value)) = split_property(line) else {
            continue;
        };

        state = match state {
            State::Outside => {
                if is_marker(name, "BEGIN", value, "VEVENT") {
                    State::InEvent(EventBlock::default())
                } else {
                    State::Outside
                }
            }
            State::InEvent(mut block) => {
                if name.eq_ignore_ascii_case("BEGIN") {
                    if block.nested == 0 && value.eq_ignore_ascii_case("VEVENT") {
                        // unterminated block: close it and start over
                        finish_block(block, &mut parsed);
                        State::InEvent(EventBlock::default())
                    } else {
                        block.nested += 1;
                        State::InEvent(block)
                    }
                } else if name.eq_ignore_ascii_case("END") {
                    if block.nested > 0 {
                        block.nested -= 1;
                        State::InEvent(block)
                    } else {
                        finish_block(block, &mut parsed);
                        State::Outside
                    }
                } else {
                    if block.nested == 0 {
                        record_property(&mut block, name, value);
                    }
                    State::InEvent(block)
                }
            }
        };
    }

    if let State::InEvent(block) = state {
        finish_block(block, &mut parsed);
    }

    parsed
}

/// Split `NAME;PARAM=x:VALUE` into (NAME, VALUE).
///
/// The value is taken after the last colon so quoted parameters such as
/// `TZID="Europe/Paris"` never leak into it.
fn split_property(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    let name_end = line.find([';', ':'])?;
    let (_, value) = line.rsplit_once(':')?;
    Some((&line[..name_end], value.trim()))
}

fn is_marker(name: &str, expected_name: &str, value: &str, expected_value: &str) -> bool {
    name.eq_ignore_ascii_case(expected_name) && value.eq_ignore_ascii_case(expected_value)
}

fn record_property<'a>(block: &mut EventBlock<'a>, name: &str, value: &'a str) {
    if name.eq_ignore_ascii_case("DTSTART") {
        block.dtstart.get_or_insert(value);
    } else if name.eq_ignore_ascii_case("DTEND") {
        block.dtend.get_or_insert(value);
    } else if name.eq_ignore_ascii_case("DURATION") {
        block.has_duration = true;
    }
}

fn finish_block(block: EventBlock<'_>, parsed: &mut ParsedFeed) {
    let Some(start) = block.dtstart.and_then(CalendarDate::parse_feed_value) else {
        parsed.skipped_blocks += 1;
        return;
    };

    // DTEND is exclusive; a missing, malformed or non-increasing one means a single day
    let end = block
        .dtend
        .and_then(CalendarDate::parse_feed_value)
        .filter(|end| *end > start);

    let end_exclusive = match end {
        Some(end) => end,
        None => {
            if block.has_duration {
                parsed.duration_ignored += 1;
            }
            let Some(next_day) = start.succ() else {
                parsed.skipped_blocks += 1;
                return;
            };
            next_day
        }
    };

    parsed.events.push(FeedEvent {
        start,
        end_exclusive,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(parsed: &ParsedFeed) -> Vec<String> {
        parsed.booked_dates().iter().map(|d| d.to_string()).collect()
    }

    fn feed(events: &[&str]) -> String {
        let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
        for event in events {
            ics.push_str("BEGIN:VEVENT\r\n");
            ics.push_str(event);
            ics.push_str("END:VEVENT\r\n");
        }
        ics.push_str("END:VCALENDAR\r\n");
        ics
    }

    #[test]
    fn test_start_only_event_is_one_day() {
        let parsed = parse_feed(&feed(&["UID:1\r\nDTSTART;VALUE=DATE:20250101\r\n"]));
        assert_eq!(dates(&parsed), vec!["2025-01-01"]);
    }

    #[test]
    fn test_end_date_is_exclusive() {
        let parsed = parse_feed(&feed(&[
            "DTSTART;VALUE=DATE:20250310\r\nDTEND;VALUE=DATE:20250313\r\nSUMMARY:Reserved\r\n",
        ]));
        assert_eq!(dates(&parsed), vec!["2025-03-10", "2025-03-11", "2025-03-12"]);
    }

    #[test]
    fn test_datetime_values_keep_only_the_date() {
        let parsed = parse_feed(&feed(&[
            "DTSTART:20250310T150000Z\r\nDTEND;TZID=\"Europe/Paris\":20250312T110000\r\n",
        ]));
        assert_eq!(dates(&parsed), vec!["2025-03-10", "2025-03-11"]);
    }

    #[test]
    fn test_malformed_end_falls_back_to_single_day() {
        let parsed = parse_feed(&feed(&["DTSTART:20250310\r\nDTEND:soon\r\n"]));
        assert_eq!(dates(&parsed), vec!["2025-03-10"]);
    }

    #[test]
    fn test_end_before_start_falls_back_to_single_day() {
        let parsed = parse_feed(&feed(&["DTSTART:20250310\r\nDTEND:20250301\r\n"]));
        assert_eq!(dates(&parsed), vec!["2025-03-10"]);
    }

    #[test]
    fn test_block_without_start_is_skipped() {
        let parsed = parse_feed(&feed(&[
            "SUMMARY:Not available\r\nDTEND:20250105\r\n",
            "DTSTART:bogus\r\n",
            "DTSTART:20250201\r\n",
        ]));
        assert_eq!(parsed.skipped_blocks, 2);
        assert_eq!(dates(&parsed), vec!["2025-02-01"]);
    }

    #[test]
    fn test_overlapping_events_deduplicate() {
        let overlapping = parse_feed(&feed(&[
            "DTSTART:20250310\r\nDTEND:20250313\r\n",
            "DTSTART:20250312\r\nDTEND:20250315\r\n",
            "DTSTART:20250310\r\nDTEND:20250313\r\n",
        ]));
        let merged = parse_feed(&feed(&["DTSTART:20250310\r\nDTEND:20250315\r\n"]));
        assert_eq!(overlapping.booked_dates(), merged.booked_dates());
        assert_eq!(overlapping.booked_dates().len(), 5);
    }

    #[test]
    fn test_ignores_dates_outside_events_and_in_nested_components() {
        let ics = "BEGIN:VCALENDAR\n\
DTSTART:20240101\n\
BEGIN:VTIMEZONE\n\
BEGIN:STANDARD\n\
DTSTART:19701025T030000\n\
END:STANDARD\n\
END:VTIMEZONE\n\
BEGIN:VEVENT\n\
BEGIN:VALARM\n\
DTSTART:20240505\n\
END:VALARM\n\
DTSTART:20250601\n\
DTEND:20250603\n\
END:VEVENT\n\
END:VCALENDAR\n";
        let parsed = parse_feed(ics);
        assert_eq!(dates(&parsed), vec!["2025-06-01", "2025-06-02"]);
    }

    #[test]
    fn test_unterminated_blocks_still_count() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250101\n\
BEGIN:VEVENT\n\
DTSTART:20250201\n";
        let parsed = parse_feed(ics);
        assert_eq!(dates(&parsed), vec!["2025-01-01", "2025-02-01"]);
    }

    #[test]
    fn test_folded_date_line_is_unfolded() {
        let parsed = parse_feed(&feed(&["DTSTART;VALUE=DATE:2025\r\n 0704\r\n"]));
        assert_eq!(dates(&parsed), vec!["2025-07-04"]);
    }

    #[test]
    fn test_duration_without_end_is_flagged() {
        let parsed = parse_feed(&feed(&["DTSTART:20250704\r\nDURATION:P3D\r\n"]));
        assert_eq!(parsed.duration_ignored, 1);
        assert_eq!(dates(&parsed), vec!["2025-07-04"]);
    }

    #[test]
    fn test_property_names_are_matched_exactly() {
        let parsed = parse_feed(&feed(&["DTSTAMP:20240101T000000Z\r\nDTSTART:20250704\r\n"]));
        assert_eq!(dates(&parsed), vec!["2025-07-04"]);
    }
}
