use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use uuid::Uuid;

use pitch_types::models::{Author, NewAuthor, NewStartup, Playlist, Startup};

use crate::store::{ContentStore, Freshness};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    AuthorByExternalId(String),
    AuthorById(Uuid),
    Search(Option<String>),
    Startup(Uuid),
    Playlist(String),
}

#[derive(Clone)]
enum Cached {
    Author(Option<Author>),
    Startups(Vec<Startup>),
    Startup(Option<Startup>),
    Playlist(Option<Playlist>),
}

/// Read-through TTL cache in front of another store, standing in for a CDN.
///
/// `Freshness::Cached` reads may be answered from memory for up to `ttl`.
/// `Freshness::Fresh` reads and all writes go straight to the inner store.
/// Writes never invalidate, so cached reads lag them by at most `ttl`.
/// At most `max_entries` answers are held; misses count too.
pub struct CachedStore {
    inner: Arc<dyn ContentStore>,
    entries: Option<Cache<CacheKey, Cached>>,
}

impl CachedStore {
    /// A zero `ttl` or `max_entries` turns caching off.
    pub fn new(inner: Arc<dyn ContentStore>, ttl: Duration, max_entries: u64) -> Self {
        let entries = (!ttl.is_zero() && max_entries > 0)
            .then(|| Cache::builder().max_capacity(max_entries).time_to_live(ttl).build());
        Self { inner, entries }
    }

    fn usable(&self, freshness: Freshness) -> Option<&Cache<CacheKey, Cached>> {
        match freshness {
            Freshness::Cached => self.entries.as_ref(),
            Freshness::Fresh => None,
        }
    }
}

#[async_trait]
impl ContentStore for CachedStore {
    async fn author_by_external_id(&self, external_id: &str, freshness: Freshness) -> Result<Option<Author>> {
        let Some(entries) = self.usable(freshness) else {
            return self.inner.author_by_external_id(external_id, freshness).await;
        };
        let key = CacheKey::AuthorByExternalId(external_id.to_string());
        if let Some(Cached::Author(hit)) = entries.get(&key).await {
            return Ok(hit);
        }
        let value = self.inner.author_by_external_id(external_id, freshness).await?;
        entries.insert(key, Cached::Author(value.clone())).await;
        Ok(value)
    }

    async fn author_by_id(&self, id: Uuid, freshness: Freshness) -> Result<Option<Author>> {
        let Some(entries) = self.usable(freshness) else {
            return self.inner.author_by_id(id, freshness).await;
        };
        let key = CacheKey::AuthorById(id);
        if let Some(Cached::Author(hit)) = entries.get(&key).await {
            return Ok(hit);
        }
        let value = self.inner.author_by_id(id, freshness).await?;
        entries.insert(key, Cached::Author(value.clone())).await;
        Ok(value)
    }

    async fn create_author(&self, author: NewAuthor) -> Result<Author> {
        self.inner.create_author(author).await
    }

    async fn search_startups(&self, search: Option<&str>, freshness: Freshness) -> Result<Vec<Startup>> {
        let Some(entries) = self.usable(freshness) else {
            return self.inner.search_startups(search, freshness).await;
        };
        let key = CacheKey::Search(search.map(str::to_string));
        if let Some(Cached::Startups(hit)) = entries.get(&key).await {
            return Ok(hit);
        }
        let value = self.inner.search_startups(search, freshness).await?;
        entries.insert(key, Cached::Startups(value.clone())).await;
        Ok(value)
    }

    async fn startup_by_id(&self, id: Uuid, freshness: Freshness) -> Result<Option<Startup>> {
        let Some(entries) = self.usable(freshness) else {
            return self.inner.startup_by_id(id, freshness).await;
        };
        let key = CacheKey::Startup(id);
        if let Some(Cached::Startup(hit)) = entries.get(&key).await {
            return Ok(hit);
        }
        let value = self.inner.startup_by_id(id, freshness).await?;
        entries.insert(key, Cached::Startup(value.clone())).await;
        Ok(value)
    }

    async fn playlist_by_slug(&self, slug: &str, freshness: Freshness) -> Result<Option<Playlist>> {
        let Some(entries) = self.usable(freshness) else {
            return self.inner.playlist_by_slug(slug, freshness).await;
        };
        let key = CacheKey::Playlist(slug.to_string());
        if let Some(Cached::Playlist(hit)) = entries.get(&key).await {
            return Ok(hit);
        }
        let value = self.inner.playlist_by_slug(slug, freshness).await?;
        entries.insert(key, Cached::Playlist(value.clone())).await;
        Ok(value)
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        self.inner.increment_views(id).await
    }

    async fn create_startup(&self, startup: NewStartup) -> Result<Startup> {
        self.inner.create_startup(startup).await
    }
}
