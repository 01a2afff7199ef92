//! Shared fixtures for router-level tests: an in-memory SQLite store, a
//! scripted store with injectable delays and failures, and a fake OAuth
//! provider.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use pitch_api::auth::AuthError;
use pitch_api::oauth::IdentityProvider;
use pitch_api::store::{ContentStore, Freshness, SqliteStore};
use pitch_api::{AppStateInner, build_router};
use pitch_db::Database;
use pitch_types::api::IdentityAssertion;
use pitch_types::models::{Author, AuthorSummary, NewAuthor, NewStartup, Playlist, Startup};

pub const TEST_SECRET: &str = "test-secret";

pub fn sqlite_store() -> (Arc<Database>, Arc<dyn ContentStore>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    (db.clone(), Arc::new(SqliteStore::new(db)))
}

pub fn author_count(db: &Database) -> i64 {
    db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM authors", [], |r| r.get(0))?))
        .unwrap()
}

pub fn identity(external_id: &str, login: &str) -> IdentityAssertion {
    IdentityAssertion {
        external_id: external_id.into(),
        username: login.into(),
        bio: None,
        name: format!("{login} (display)"),
        email: format!("{login}@example.com"),
        avatar_url: Some(format!("https://avatars.example/{login}.png")),
    }
}

pub async fn seed_author(store: &dyn ContentStore, external_id: &str, name: &str) -> Author {
    store
        .create_author(NewAuthor {
            external_id: external_id.into(),
            username: name.to_lowercase(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            image: None,
            bio: String::new(),
        })
        .await
        .unwrap()
}

pub async fn seed_startup(
    store: &dyn ContentStore,
    author: &Author,
    title: &str,
    category: &str,
    pitch: Option<&str>,
) -> Startup {
    store
        .create_startup(NewStartup {
            title: title.into(),
            slug: None,
            category: category.into(),
            description: format!("{title} in one line"),
            image: "https://img.example/pitch.png".into(),
            pitch: pitch.map(Into::into),
            author_id: author.id,
        })
        .await
        .unwrap()
}

/// A startup value that never touched a real store.
pub fn startup(title: &str, pitch: Option<&str>) -> Startup {
    Startup {
        id: Uuid::new_v4(),
        title: title.into(),
        slug: title.to_lowercase().replace(' ', "-"),
        category: "Energy".into(),
        description: format!("{title} in one line"),
        image: "https://img.example/pitch.png".into(),
        pitch: pitch.map(Into::into),
        views: 0,
        created_at: Utc::now(),
        author: AuthorSummary {
            id: Uuid::new_v4(),
            username: "ada".into(),
            name: "Ada".into(),
            image: None,
        },
    }
}

// -- Router --

pub fn app(store: Arc<dyn ContentStore>) -> Router {
    app_with_provider(store, Arc::new(FakeProvider::new(identity("583231", "octocat"))))
}

pub fn app_with_provider(store: Arc<dyn ContentStore>, provider: Arc<FakeProvider>) -> Router {
    let state = Arc::new(AppStateInner {
        store,
        provider,
        auth_secret: TEST_SECRET.into(),
        session_days: 30,
        secure_cookies: false,
    });
    build_router(state, Path::new("static"))
}

pub struct Page {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Page {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }

    /// Value of the `name=value` pair from the Set-Cookie header for `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.set_cookies()
            .into_iter()
            .find_map(|c| c.strip_prefix(&prefix).map(|rest| rest.split(';').next().unwrap_or("").to_string()))
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, cookie: Option<&str>) -> Page {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let response = app.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Page {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Page {
    send(app, "GET", uri, None).await
}

/// Polls `check` until it holds or `timeout` passes. Detached tasks land
/// after the response, so their effects need a short wait.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// -- Fakes --

pub struct FakeProvider {
    identity: IdentityAssertion,
    pub exchanges: AtomicUsize,
}

impl FakeProvider {
    pub fn new(identity: IdentityAssertion) -> Self {
        Self {
            identity,
            exchanges: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?state={state}")
    }

    async fn exchange(&self, _code: &str) -> Result<IdentityAssertion, AuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        Ok(self.identity.clone())
    }
}

/// In-memory store with per-query delays, failure switches and call counters.
#[derive(Default)]
pub struct ScriptedStore {
    pub startups: Mutex<Vec<Startup>>,
    pub picks: Mutex<Vec<Startup>>,
    pub authors: Mutex<Vec<Author>>,
    pub startup_delay: Duration,
    pub playlist_delay: Duration,
    pub unreachable: bool,
    pub fail_increments: bool,
    pub increments: AtomicUsize,
    pub startup_reads: AtomicUsize,
}

impl ScriptedStore {
    pub fn with_startups(startups: Vec<Startup>) -> Self {
        Self {
            startups: Mutex::new(startups),
            ..Default::default()
        }
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn author_by_external_id(&self, external_id: &str, _freshness: Freshness) -> Result<Option<Author>> {
        self.check_reachable()?;
        let authors = self.authors.lock().unwrap();
        Ok(authors.iter().find(|a| a.external_id == external_id).cloned())
    }

    async fn author_by_id(&self, id: Uuid, _freshness: Freshness) -> Result<Option<Author>> {
        self.check_reachable()?;
        let authors = self.authors.lock().unwrap();
        Ok(authors.iter().find(|a| a.id == id).cloned())
    }

    async fn create_author(&self, author: NewAuthor) -> Result<Author> {
        self.check_reachable()?;
        let created = Author {
            id: Uuid::new_v4(),
            external_id: author.external_id,
            username: author.username,
            name: author.name,
            email: author.email,
            image: author.image,
            bio: author.bio,
        };
        self.authors.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn search_startups(&self, search: Option<&str>, _freshness: Freshness) -> Result<Vec<Startup>> {
        self.check_reachable()?;
        let startups = self.startups.lock().unwrap();
        Ok(startups
            .iter()
            .filter(|s| search.is_none_or(|q| s.title.contains(q)))
            .cloned()
            .collect())
    }

    async fn startup_by_id(&self, id: Uuid, _freshness: Freshness) -> Result<Option<Startup>> {
        tokio::time::sleep(self.startup_delay).await;
        self.check_reachable()?;
        self.startup_reads.fetch_add(1, Ordering::SeqCst);
        let startups = self.startups.lock().unwrap();
        Ok(startups.iter().find(|s| s.id == id).cloned())
    }

    async fn playlist_by_slug(&self, slug: &str, _freshness: Freshness) -> Result<Option<Playlist>> {
        tokio::time::sleep(self.playlist_delay).await;
        self.check_reachable()?;
        Ok(Some(Playlist {
            slug: slug.to_string(),
            title: "Editor Picks".into(),
            startups: self.picks.lock().unwrap().clone(),
        }))
    }

    async fn increment_views(&self, _id: Uuid) -> Result<()> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments {
            return Err(anyhow!("write token expired"));
        }
        Ok(())
    }

    async fn create_startup(&self, _startup: NewStartup) -> Result<Startup> {
        Err(anyhow!("scripted store is read-only"))
    }
}
