//! WeWorkRemotely category pages, scraped from HTML.

use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use common::NewJob;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

const SITE: &str = "https://weworkremotely.com";

/// Category pages and the tag their listings get.
pub const CATEGORIES: &[(&str, &str)] = &[
    (
        "https://weworkremotely.com/remote-software-developer-jobs",
        "software-development",
    ),
    (
        "https://weworkremotely.com/categories/remote-full-stack-programming-jobs",
        "full-stack",
    ),
    (
        "https://weworkremotely.com/categories/remote-back-end-programming-jobs",
        "back-end",
    ),
    (
        "https://weworkremotely.com/categories/remote-front-end-programming-jobs",
        "front-end",
    ),
];

struct Selectors {
    job: Selector,
    title: Selector,
    company: Selector,
    link: Selector,
    age: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        // Literal CSS, known to parse.
        let parse = |css: &'static str| {
            Selector::parse(css).unwrap_or_else(|e| panic!("bad selector {css}: {e:?}"))
        };
        Selectors {
            job: parse("li.feature, .new-listing-container"),
            title: parse(".new-listing__header__title"),
            company: parse(".new-listing__company-name"),
            link: parse(".listing-link--unlocked, ._blank"),
            age: parse(".new-listing__header__icons__date"),
        }
    })
}

fn age_pattern() -> &'static Regex {
    static AGE: OnceLock<Regex> = OnceLock::new();
    AGE.get_or_init(|| {
        Regex::new(r"(?i)^(\d+)\s*(h|d|w|mo|m|y)").unwrap_or_else(|e| panic!("bad age regex: {e}"))
    })
}

/// Turns an age label such as `3d`, `2w` or `New` into the posting date.
pub fn posted_from_age(label: &str, today: NaiveDate) -> Option<NaiveDate> {
    let label = label.trim();
    if label.eq_ignore_ascii_case("new") || label.eq_ignore_ascii_case("today") {
        return Some(today);
    }

    let caps = age_pattern().captures(label)?;
    let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
    let days = match caps.get(2)?.as_str().to_ascii_lowercase().as_str() {
        "h" => 0,
        "d" => amount,
        "w" => amount * 7,
        "m" | "mo" => amount * 30,
        "y" => amount * 365,
        _ => return None,
    };
    today.checked_sub_days(Days::new(days))
}

fn text_of(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Listings on one category page. Entries without a title or link are dropped.
pub fn parse_listings(html: &str, category: &str, today: NaiveDate) -> Vec<NewJob> {
    let selectors = selectors();
    let document = Html::parse_document(html);

    let mut jobs = Vec::new();
    for element in document.select(&selectors.job) {
        let Some(title) = text_of(element, &selectors.title) else {
            continue;
        };
        let Some(url) = element
            .select(&selectors.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| {
                if href.starts_with("http") {
                    href.to_string()
                } else {
                    format!("{SITE}{href}")
                }
            })
        else {
            continue;
        };

        let company =
            text_of(element, &selectors.company).unwrap_or_else(|| "Unknown Company".to_string());
        let date_posted = text_of(element, &selectors.age)
            .as_deref()
            .and_then(|label| posted_from_age(label, today));

        debug!("📋 Found: {} at {}", title, company);
        jobs.push(NewJob {
            title,
            company,
            tags: vec![category.to_string()],
            date_posted,
            url,
        });
    }
    jobs
}

pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    category: &str,
    today: NaiveDate,
) -> anyhow::Result<Vec<NewJob>> {
    info!("📡 Fetching jobs from: {}", url);
    let html = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("failed to fetch {url}"))?
        .text()
        .await
        .context("failed to read response body")?;
    info!("✅ Fetched {} bytes from {}", html.len(), url);

    Ok(parse_listings(&html, category, today))
}
