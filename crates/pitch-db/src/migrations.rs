use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE authors (
                id          TEXT PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                username    TEXT NOT NULL,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                image       TEXT,
                bio         TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE TABLE startups (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                slug        TEXT NOT NULL,
                author_id   TEXT NOT NULL REFERENCES authors(id),
                views       INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
                description TEXT NOT NULL DEFAULT '',
                category    TEXT NOT NULL CHECK (length(category) BETWEEN 1 AND 20),
                image       TEXT NOT NULL CHECK (length(image) > 0),
                pitch       TEXT,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_startups_created ON startups(created_at);

            CREATE TABLE playlists (
                slug    TEXT PRIMARY KEY,
                title   TEXT NOT NULL
            );

            CREATE TABLE playlist_entries (
                playlist_slug   TEXT NOT NULL REFERENCES playlists(slug) ON DELETE CASCADE,
                startup_id      TEXT NOT NULL REFERENCES startups(id) ON DELETE CASCADE,
                position        INTEGER NOT NULL,
                PRIMARY KEY (playlist_slug, startup_id)
            );

            -- Seed the curated list every detail page reads
            INSERT OR IGNORE INTO playlists (slug, title) VALUES ('editor-picks', 'Editor Picks');

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
