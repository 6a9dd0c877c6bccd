//! Job Board API Server
//!
//! Serves paginated, filtered job listings from Supabase, or from the
//! scraper's local JSON file when no Supabase project is configured.

mod api;

use std::path::Path;

use anyhow::Context;
use browser::{JobService, JobStore, MemoryStore, Settings, SupabaseStore};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads the scraper's output. A missing file is an empty board, not an error.
fn load_local(path: &Path) -> anyhow::Result<MemoryStore> {
    if !path.exists() {
        warn!(
            "⚠️  No {} found, serving an empty board. Run the scraper first: cargo run -p scraper",
            path.display()
        );
        return Ok(MemoryStore::default());
    }

    let store = MemoryStore::load(path)
        .with_context(|| format!("failed to load jobs from {}", path.display()))?;
    info!("📂 Loaded {} jobs from {}", store.len(), path.display());
    Ok(store)
}

async fn serve<S: JobStore + 'static>(
    listener: TcpListener,
    service: JobService<S>,
) -> anyhow::Result<()> {
    let app = api::router(service);
    info!("🌐 Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("server error")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("🚀 Starting Job Board Server...");

    let settings = Settings::from_env().context("failed to read settings")?;
    let listener = TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;

    match settings.supabase()? {
        Some(config) => {
            info!("☁️  Using Supabase at {}", config.url);
            let store = SupabaseStore::new(&config)?;
            serve(listener, JobService::new(store).with_page_size(settings.page_size)).await
        }
        None => {
            let store = load_local(&settings.jobs_path)?;
            serve(listener, JobService::new(store).with_page_size(settings.page_size)).await
        }
    }
}
