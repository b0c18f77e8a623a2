use anyhow::{Result, bail};
use suitecal_core::availability::validate_suite_id;
use suitecal_core::settings::SiteSettings;
use suitecal_core::{AvailabilityStore, BookingFeedConfig, SuiteCalError};
use tracing::warn;

/// Parse a `--suite` argument: `<id>=<name>`, or a bare `<id>` named after itself.
pub fn parse_suite_arg(arg: &str) -> Result<(String, String), String> {
    let (id, name) = match arg.split_once('=') {
        Some((id, name)) => (id.trim(), name.trim()),
        None => (arg.trim(), arg.trim()),
    };
    validate_suite_id(id).map_err(|e| e.to_string())?;
    Ok((id.to_string(), name.to_string()))
}

/// Add the given suites to the feed config and make sure every configured
/// suite has a record the calendar can load.
///
/// New suites get an empty feed URL; existing ones only have their name
/// refreshed. A missing config is created. A corrupt one is left on disk
/// and treated as empty.
pub async fn run(settings: &SiteSettings, suites: &[(String, String)]) -> Result<()> {
    let config_path = settings.feed_config_path();
    let (mut config, fallback) = BookingFeedConfig::load_or_empty(&config_path);

    let writable = match fallback {
        Some(SuiteCalError::ConfigMissing(_)) | None => true,
        Some(reason) => {
            if !suites.is_empty() {
                bail!(
                    "Refusing to add suites to unreadable {}: {}",
                    config_path.display(),
                    reason
                );
            }
            warn!(error = %reason, "Treating feed config as empty");
            false
        }
    };

    let mut added = 0;
    for (suite_id, name) in suites {
        if config.seed_suite(suite_id, name) {
            added += 1;
        }
    }

    if writable && (!suites.is_empty() || !config_path.exists()) {
        config.save(&config_path).await?;
        println!(
            "Wrote {} ({} new {})",
            config_path.display(),
            added,
            if added == 1 { "suite" } else { "suites" }
        );
    }

    let store = AvailabilityStore::new(settings.availability_dir());
    let mut created = 0;

    for (suite_id, _) in config.suites() {
        match store.ensure_placeholder(suite_id).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => warn!(suite = suite_id, error = %e, "Could not seed availability record"),
        }
    }

    println!(
        "Seeded {} availability {} in {}",
        created,
        if created == 1 { "record" } else { "records" },
        store.dir().display()
    );

    Ok(())
}
