//! Job Scraper
//!
//! Collects remote programming jobs from RemoteOK and WeWorkRemotely and
//! saves them to Supabase, or to data/jobs.json when Supabase is not
//! configured.

mod remoteok;
mod sink;
mod weworkremotely;

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use browser::Settings;
use common::NewJob;
use sink::{FileSink, SupabaseSink};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USER_AGENT: &str = "Mozilla/5.0";

/// Keeps the first listing for each URL. Listings without one are dropped.
fn dedup_by_url(jobs: Vec<NewJob>) -> Vec<NewJob> {
    let mut seen_urls = HashSet::new();
    jobs.into_iter()
        .filter(|job| !job.url.is_empty() && seen_urls.insert(job.url.clone()))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("🔍 Starting Job Scraper...");
    let settings = Settings::from_env().context("failed to read settings")?;
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()?;

    let mut jobs = Vec::new();
    match remoteok::fetch(&client).await {
        Ok(found) => jobs.extend(found),
        Err(e) => error!("❌ {:#}", e),
    }

    let today = common::today();
    for (url, category) in weworkremotely::CATEGORIES {
        // One broken page should not stop the others.
        match weworkremotely::fetch(&client, url, category, today).await {
            Ok(found) => jobs.extend(found),
            Err(e) => error!("❌ {:#}", e),
        }
    }

    let jobs = dedup_by_url(jobs);
    info!("📊 Total unique jobs found: {}", jobs.len());

    let saved = match settings.supabase()? {
        Some(config) => SupabaseSink::new(&config)?.save(&jobs).await,
        None => FileSink::new(&settings.jobs_path).save(&jobs)?,
    };

    info!("✨ Scraping complete! Saved {} of {} jobs.", saved, jobs.len());
    Ok(())
}
