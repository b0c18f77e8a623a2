use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use suitecal_core::feed::FeedClient;
use suitecal_core::settings::SiteSettings;
use suitecal_core::sync::{SuiteOutcome, synchronize};
use suitecal_core::{AvailabilityStore, BookingFeedConfig};

/// Only a missing or unreadable config fails the run. Per-suite feed
/// failures are reported and the exit status stays zero.
pub async fn run(settings: &SiteSettings) -> Result<()> {
    let config_path = settings.feed_config_path();
    let config = BookingFeedConfig::load(&config_path).with_context(|| {
        format!(
            "Could not load {}. Run `suitecal seed` to create it.",
            config_path.display()
        )
    })?;

    if config.is_empty() {
        println!("No suites found in {}.", config_path.display());
        return Ok(());
    }

    let store = AvailabilityStore::new(settings.availability_dir());

    let client = FeedClient::new(settings.fetch_timeout())?;
    let report = synchronize(&config, &client, &store).await;

    for suite in &report.suites {
        match &suite.outcome {
            SuiteOutcome::Updated { booked_days } => println!(
                "{} {} ({} booked {})",
                "✓".green(),
                suite.name,
                booked_days,
                if *booked_days == 1 { "day" } else { "days" }
            ),
            SuiteOutcome::Skipped => {
                println!("{} {} {}", "-".dimmed(), suite.name, "(no iCal URL)".dimmed())
            }
            SuiteOutcome::Failed(e) => {
                println!("{} {} {}", "✗".red(), suite.name, e.to_string().red())
            }
        }
    }

    println!(
        "\nSynced: {} updated, {} skipped, {} failed",
        report.updated(),
        report.skipped(),
        report.failed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_fails_the_run() {
        let site = TempDir::new().unwrap();
        let settings = SiteSettings::load(site.path()).unwrap();

        assert!(run(&settings).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_config_fails_the_run() {
        let site = TempDir::new().unwrap();
        let settings = SiteSettings::load(site.path()).unwrap();
        let path = settings.feed_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(run(&settings).await.is_err());
    }

    #[tokio::test]
    async fn test_feed_failures_do_not_fail_the_run() {
        let site = TempDir::new().unwrap();
        let settings = SiteSettings::load(site.path()).unwrap();
        BookingFeedConfig::default()
            .with_suite("loft", "The Loft", "http://127.0.0.1:9/loft.ics")
            .with_suite("garden", "Garden Suite", "")
            .save(&settings.feed_config_path())
            .await
            .unwrap();

        assert!(run(&settings).await.is_ok());
        assert!(!settings.availability_dir().join("loft.json").exists());
    }

    #[tokio::test]
    async fn test_unwritable_availability_dir_does_not_fail_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/loft.ics")
            .with_status(200)
            .with_body("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART:20250310\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n")
            .create_async()
            .await;

        let site = TempDir::new().unwrap();
        let settings = SiteSettings::load(site.path()).unwrap();
        BookingFeedConfig::default()
            .with_suite("loft", "The Loft", &format!("{}/loft.ics", server.url()))
            .save(&settings.feed_config_path())
            .await
            .unwrap();

        // a plain file where the availability directory should be
        let dir = settings.availability_dir();
        std::fs::create_dir_all(dir.parent().unwrap()).unwrap();
        std::fs::write(&dir, "").unwrap();

        assert!(run(&settings).await.is_ok());
        assert!(dir.is_file());
    }
}
