use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use pitch_db::Database;
use pitch_db::models::{AuthorRow, PlaylistRow, StartupRow};
use pitch_types::models::{Author, AuthorSummary, NewAuthor, NewStartup, Playlist, Startup};

/// Whether a read may be served from the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Listing and detail reads; a short-lived stale answer is fine.
    Cached,
    /// Bypass every cache. Identity reconciliation reads this way so a cached
    /// "not found" can't trigger a second author insert.
    Fresh,
}

/// Read and write contract of the content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn author_by_external_id(&self, external_id: &str, freshness: Freshness) -> Result<Option<Author>>;

    /// Lookup by the internal id carried on the session.
    async fn author_by_id(&self, id: Uuid, freshness: Freshness) -> Result<Option<Author>>;

    /// Creates the author, or returns the existing one if another request
    /// already claimed `external_id`.
    async fn create_author(&self, author: NewAuthor) -> Result<Author>;

    /// `None` disables filtering.
    async fn search_startups(&self, search: Option<&str>, freshness: Freshness) -> Result<Vec<Startup>>;

    async fn startup_by_id(&self, id: Uuid, freshness: Freshness) -> Result<Option<Startup>>;

    async fn playlist_by_slug(&self, slug: &str, freshness: Freshness) -> Result<Option<Playlist>>;

    async fn increment_views(&self, id: Uuid) -> Result<()>;

    async fn create_startup(&self, startup: NewStartup) -> Result<Startup>;
}

/// SQLite-backed store. Every call runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| anyhow!("spawn_blocking join error: {}", e))?
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn author_by_external_id(&self, external_id: &str, _freshness: Freshness) -> Result<Option<Author>> {
        let external_id = external_id.to_string();
        let row = self.blocking(move |db| db.get_author_by_external_id(&external_id)).await?;
        row.map(author_from_row).transpose()
    }

    async fn author_by_id(&self, id: Uuid, _freshness: Freshness) -> Result<Option<Author>> {
        let row = self.blocking(move |db| db.get_author_by_id(&id.to_string())).await?;
        row.map(author_from_row).transpose()
    }

    async fn create_author(&self, author: NewAuthor) -> Result<Author> {
        let id = Uuid::new_v4().to_string();
        let (row, created) = self.blocking(move |db| db.insert_author_if_absent(&id, &author)).await?;
        if !created {
            tracing::debug!("Author {} already existed, reusing {}", row.external_id, row.id);
        }
        author_from_row(row)
    }

    async fn search_startups(&self, search: Option<&str>, _freshness: Freshness) -> Result<Vec<Startup>> {
        let search = search.map(str::to_string);
        let rows = self.blocking(move |db| db.search_startups(search.as_deref())).await?;
        rows.into_iter().map(startup_from_row).collect()
    }

    async fn startup_by_id(&self, id: Uuid, _freshness: Freshness) -> Result<Option<Startup>> {
        let row = self.blocking(move |db| db.get_startup(&id.to_string())).await?;
        row.map(startup_from_row).transpose()
    }

    async fn playlist_by_slug(&self, slug: &str, _freshness: Freshness) -> Result<Option<Playlist>> {
        let slug = slug.to_string();
        let found = self.blocking(move |db| db.get_playlist(&slug)).await?;
        found.map(|(playlist, rows)| playlist_from_rows(playlist, rows)).transpose()
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        let updated = self.blocking(move |db| db.increment_views(&id.to_string())).await?;
        if !updated {
            return Err(anyhow!("no startup with id {}", id));
        }
        Ok(())
    }

    async fn create_startup(&self, startup: NewStartup) -> Result<Startup> {
        let id = Uuid::new_v4().to_string();
        let row = self.blocking(move |db| db.insert_startup(&id, &startup)).await?;
        startup_from_row(row)
    }
}

fn author_from_row(row: AuthorRow) -> Result<Author> {
    Ok(Author {
        id: row.id.parse().map_err(|e| anyhow!("corrupt author id '{}': {}", row.id, e))?,
        external_id: row.external_id,
        username: row.username,
        name: row.name,
        email: row.email,
        image: row.image,
        bio: row.bio,
    })
}

fn startup_from_row(row: StartupRow) -> Result<Startup> {
    Ok(Startup {
        id: row.id.parse().map_err(|e| anyhow!("corrupt startup id '{}': {}", row.id, e))?,
        created_at: parse_timestamp(&row.created_at)?,
        title: row.title,
        slug: row.slug,
        category: row.category,
        description: row.description,
        image: row.image,
        pitch: row.pitch,
        views: row.views,
        author: AuthorSummary {
            id: row
                .author_id
                .parse()
                .map_err(|e| anyhow!("corrupt author_id '{}' on startup '{}': {}", row.author_id, row.id, e))?,
            username: row.author_username,
            name: row.author_name,
            image: row.author_image,
        },
    })
}

fn playlist_from_rows(playlist: PlaylistRow, rows: Vec<StartupRow>) -> Result<Playlist> {
    Ok(Playlist {
        slug: playlist.slug,
        title: playlist.title,
        startups: rows.into_iter().map(startup_from_row).collect::<Result<_>>()?,
    })
}

// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without timezone.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| anyhow!("corrupt timestamp '{}': {}", raw, e))
}
