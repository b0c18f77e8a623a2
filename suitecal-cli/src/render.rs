//! Terminal rendering for calendar views.
//!
//! Booked days are red, today is bold and underlined, past days are dimmed.

use owo_colors::OwoColorize;
use suitecal_core::view::WEEKDAY_HEADERS;
use suitecal_core::{CalendarView, DayCell, GridCell, MonthGrid};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DayCell {
    fn render(&self) -> String {
        let num = format!("{:>3}", self.date.day());
        let styled = if self.is_booked {
            num.red().to_string()
        } else {
            num.green().to_string()
        };

        if self.is_today {
            styled.bold().underline().to_string()
        } else if self.is_past {
            styled.dimmed().to_string()
        } else {
            styled
        }
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = vec![format!("{:^28}", self.title()).bold().to_string()];

        lines.push(
            WEEKDAY_HEADERS
                .iter()
                .map(|d| format!("{:>4}", d))
                .collect::<String>()
                .dimmed()
                .to_string(),
        );

        for week in self.cells.chunks(7) {
            let row: String = week
                .iter()
                .map(|cell| match cell {
                    GridCell::Padding => "    ".to_string(),
                    GridCell::Day(day) => format!(" {}", day.render()),
                })
                .collect();
            lines.push(row);
        }

        lines.join("\n")
    }
}

impl Render for CalendarView {
    fn render(&self) -> String {
        match self {
            CalendarView::Placeholder(reason) => reason.message().dimmed().to_string(),
            CalendarView::Months(months) => {
                let mut blocks: Vec<String> = months.iter().map(|m| m.render()).collect();
                blocks.push(format!(
                    "{} booked  {} available  {}",
                    "■".red(),
                    "■".green(),
                    "today".bold().underline()
                ));
                blocks.join("\n\n")
            }
        }
    }
}
