use anyhow::{Context, Result};
use chrono::Local;
use suitecal_core::settings::SiteSettings;
use suitecal_core::source::HttpAvailability;
use suitecal_core::view::render;
use suitecal_core::{AvailabilityStore, CalendarDate};

use crate::render::Render;
use crate::utils::tui;

pub async fn run(
    settings: &SiteSettings,
    suite: &str,
    months: Option<u32>,
    today: Option<&str>,
    url: Option<&str>,
) -> Result<()> {
    let reference = match today {
        Some(s) => s
            .parse::<CalendarDate>()
            .with_context(|| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))?,
        None => CalendarDate::from(Local::now().date_naive()),
    };
    let months = months.unwrap_or(settings.months_to_show);

    let view = match url {
        Some(base) => {
            let source = HttpAvailability::new(base, settings.fetch_timeout())?;
            let spinner = tui::create_spinner(format!("Loading {suite}"));
            let view = render(&source, suite, reference, months).await;
            spinner.finish_and_clear();
            view
        }
        None => {
            let store = AvailabilityStore::new(settings.availability_dir());
            render(&store, suite, reference, months).await
        }
    };

    println!("{}", view.render());
    Ok(())
}
