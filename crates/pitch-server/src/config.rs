use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub auth_secret: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub public_url: String,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub session_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let auth_secret = var("PITCH_AUTH_SECRET").unwrap_or_default();
        if auth_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&auth_secret.as_str()) {
            bail!("PITCH_AUTH_SECRET is unset or still a placeholder");
        }

        let port = or("PITCH_PORT", "3000").parse().context("PITCH_PORT must be a port number")?;
        let cache_ttl_secs: u64 = or("PITCH_CACHE_TTL_SECS", "60")
            .parse()
            .context("PITCH_CACHE_TTL_SECS must be a whole number of seconds")?;
        let cache_max_entries: u64 = or("PITCH_CACHE_MAX_ENTRIES", "10000")
            .parse()
            .context("PITCH_CACHE_MAX_ENTRIES must be a whole number")?;
        let session_days: i64 = or("PITCH_SESSION_DAYS", "30")
            .parse()
            .context("PITCH_SESSION_DAYS must be a whole number of days")?;

        Ok(Self {
            host: or("PITCH_HOST", "0.0.0.0"),
            port,
            db_path: or("PITCH_DB_PATH", "pitch.db").into(),
            static_dir: or("PITCH_STATIC_DIR", "static").into(),
            auth_secret,
            github_client_id: or("PITCH_GITHUB_CLIENT_ID", ""),
            github_client_secret: or("PITCH_GITHUB_CLIENT_SECRET", ""),
            public_url: or("PITCH_PUBLIC_URL", "http://localhost:3000").trim_end_matches('/').to_string(),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_max_entries,
            session_days,
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback/github", self.public_url)
    }

    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}
