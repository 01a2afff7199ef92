mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use pitch_api::cache::CachedStore;
use pitch_api::oauth::GithubProvider;
use pitch_api::store::{ContentStore, SqliteStore};
use pitch_api::{AppState, AppStateInner, build_router};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitch_server=debug,pitch_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.github_client_id.is_empty() || config.github_client_secret.is_empty() {
        warn!("PITCH_GITHUB_CLIENT_ID / PITCH_GITHUB_CLIENT_SECRET not set; sign-in will fail");
    }

    // Init database
    let db = Arc::new(pitch_db::Database::open(&config.db_path)?);

    let sqlite: Arc<dyn ContentStore> = Arc::new(SqliteStore::new(db));
    let store: Arc<dyn ContentStore> = Arc::new(CachedStore::new(sqlite, config.cache_ttl, config.cache_max_entries));

    let provider = GithubProvider::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.redirect_uri(),
    )?;

    let state: AppState = Arc::new(AppStateInner {
        store,
        provider: Arc::new(provider),
        auth_secret: config.auth_secret.clone(),
        session_days: config.session_days,
        secure_cookies: config.secure_cookies(),
    });

    let app = build_router(state, &config.static_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Pitchdeck listening on {}", addr);
    info!(
        "Read cache TTL: {}s, up to {} entries",
        config.cache_ttl.as_secs(),
        config.cache_max_entries
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
