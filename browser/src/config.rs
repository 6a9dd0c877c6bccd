use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("SUPABASE_URL and SUPABASE_KEY must be set together")]
    IncompleteSupabase,

    #[error("SUPABASE_KEY is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Process settings, read from the environment.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub listen_addr: String,
    pub jobs_path: PathBuf,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_source(Environment::default())
    }

    fn from_source(env: Environment) -> Result<Self, SettingsError> {
        let conf = Config::builder()
            .set_default("listen_addr", "127.0.0.1:3000")?
            .set_default("jobs_path", "data/jobs.json")?
            .set_default("page_size", 10)?
            .set_default("request_timeout_secs", 10)?
            .add_source(env)
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        s.supabase_url = s.supabase_url.filter(|v| !v.trim().is_empty());
        s.supabase_key = s.supabase_key.filter(|v| !v.trim().is_empty());
        s.page_size = s.page_size.max(1);
        Ok(s)
    }

    /// The Supabase connection, when one is configured.
    pub fn supabase(&self) -> Result<Option<SupabaseConfig>, SettingsError> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Ok(Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                api_key: key.clone(),
                timeout: Duration::from_secs(self.request_timeout_secs),
            })),
            (None, None) => Ok(None),
            _ => Err(SettingsError::IncompleteSupabase),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// REST endpoint of `table`.
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// HTTP client that authenticates every request with the API key.
    pub fn http_client(&self) -> Result<reqwest::Client, SettingsError> {
        let client = reqwest::Client::builder()
            .default_headers(self.auth_headers()?)
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }

    fn auth_headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        Ok(headers)
    }
}
