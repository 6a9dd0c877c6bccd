//! RemoteOK public API.
//!
//! `GET https://remoteok.com/api` returns a JSON array whose first element is
//! a legal notice, followed by one object per listing.

use anyhow::Context;
use common::{parse_posted_date, NewJob};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

pub const API_URL: &str = "https://remoteok.com/api";
const SITE: &str = "https://remoteok.com";

/// The fields of a listing the board keeps.
#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    pub position: Option<String>,
    pub company: Option<String>,
    pub tags: Option<Tags>,
    pub date: Option<String>,
    pub url: Option<String>,
}

/// Usually a list, occasionally a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    One(String),
}

pub fn map_listing(listing: Listing) -> NewJob {
    let tags = match listing.tags {
        Some(Tags::List(tags)) => tags,
        Some(Tags::One(tag)) if !tag.trim().is_empty() => vec![tag],
        _ => Vec::new(),
    };

    let url = match listing.url {
        Some(url) if url.starts_with("http") => url,
        Some(path) => format!("{SITE}{path}"),
        None => String::new(),
    };

    NewJob {
        title: listing.position.unwrap_or_else(|| "Unknown Title".to_string()),
        company: listing.company.unwrap_or_else(|| "Unknown Company".to_string()),
        tags,
        date_posted: listing.date.as_deref().and_then(parse_posted_date),
        url,
    }
}

/// Skips the leading notice and any entry that is not a listing.
pub fn parse_feed(entries: Vec<Value>) -> Vec<NewJob> {
    entries
        .into_iter()
        .skip(1)
        .filter_map(|entry| match serde_json::from_value::<Listing>(entry) {
            Ok(listing) => Some(map_listing(listing)),
            Err(e) => {
                warn!("⚠️  Skipping unreadable RemoteOK entry: {}", e);
                None
            }
        })
        .collect()
}

pub async fn fetch(client: &reqwest::Client) -> anyhow::Result<Vec<NewJob>> {
    info!("📡 Fetching jobs from RemoteOK API...");
    let entries: Vec<Value> = client
        .get(API_URL)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .context("failed to fetch RemoteOK feed")?
        .json()
        .await
        .context("RemoteOK feed is not a JSON array")?;

    let jobs = parse_feed(entries);
    info!("✅ Found {} jobs on RemoteOK", jobs.len());
    Ok(jobs)
}
