use crate::Database;
use crate::models::{AuthorRow, PlaylistRow, StartupRow};
use anyhow::{Result, anyhow};
use pitch_types::models::{NewAuthor, NewStartup};
use rusqlite::{Connection, Row};

const AUTHOR_COLUMNS: &str = "id, external_id, username, name, email, image, bio, created_at";

// Startups joined with their author; `s` and `a` aliases are fixed by callers.
const STARTUP_SELECT: &str = "SELECT s.id, s.title, s.slug, s.category, s.description, s.image, s.pitch,
        s.views, s.created_at, s.author_id, a.username, a.name, a.image
     FROM startups s
     JOIN authors a ON s.author_id = a.id";

impl Database {
    // -- Authors --

    pub fn get_author_by_external_id(&self, external_id: &str) -> Result<Option<AuthorRow>> {
        self.with_conn(|conn| query_author(conn, "external_id", external_id))
    }

    pub fn get_author_by_id(&self, id: &str) -> Result<Option<AuthorRow>> {
        self.with_conn(|conn| query_author(conn, "id", id))
    }

    /// Inserts the author unless one already owns `external_id`, then returns
    /// whichever row holds it. The bool is true when this call created it.
    pub fn insert_author_if_absent(&self, id: &str, author: &NewAuthor) -> Result<(AuthorRow, bool)> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO authors (id, external_id, username, name, email, image, bio)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(external_id) DO NOTHING",
                rusqlite::params![
                    id,
                    author.external_id,
                    author.username,
                    author.name,
                    author.email,
                    author.image,
                    author.bio,
                ],
            )?;

            let row = query_author(conn, "external_id", &author.external_id)?
                .ok_or_else(|| anyhow!("author {} vanished after insert", author.external_id))?;
            Ok((row, inserted == 1))
        })
    }

    // -- Startups --

    pub fn insert_startup(&self, id: &str, startup: &NewStartup) -> Result<StartupRow> {
        startup.validate()?;
        let slug = startup.resolved_slug();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO startups (id, title, slug, author_id, description, category, image, pitch)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    startup.title,
                    slug,
                    startup.author_id.to_string(),
                    startup.description,
                    startup.category.trim(),
                    startup.image.trim(),
                    startup.pitch,
                ],
            )?;

            query_startup(conn, id)?.ok_or_else(|| anyhow!("startup {} vanished after insert", id))
        })
    }

    pub fn get_startup(&self, id: &str) -> Result<Option<StartupRow>> {
        self.with_conn(|conn| query_startup(conn, id))
    }

    /// Newest first. `None` returns every startup; otherwise a case-insensitive
    /// substring match on title, category or author name.
    pub fn search_startups(&self, search: Option<&str>) -> Result<Vec<StartupRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{STARTUP_SELECT}
                 WHERE ?1 IS NULL
                    OR instr(fold_case(s.title), ?1) > 0
                    OR instr(fold_case(s.category), ?1) > 0
                    OR instr(fold_case(a.name), ?1) > 0
                 ORDER BY s.created_at DESC, s.rowid DESC"
            );
            let needle = search.map(str::to_lowercase);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![needle], startup_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no startup has this id.
    pub fn increment_views(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE startups SET views = views + 1 WHERE id = ?1", [id])?;
            Ok(changed == 1)
        })
    }

    // -- Playlists --

    pub fn get_playlist(&self, slug: &str) -> Result<Option<(PlaylistRow, Vec<StartupRow>)>> {
        self.with_conn(|conn| {
            let playlist = conn
                .query_row("SELECT slug, title FROM playlists WHERE slug = ?1", [slug], |row| {
                    Ok(PlaylistRow {
                        slug: row.get(0)?,
                        title: row.get(1)?,
                    })
                })
                .optional()?;

            let Some(playlist) = playlist else {
                return Ok(None);
            };

            let sql = format!(
                "{STARTUP_SELECT}
                 JOIN playlist_entries e ON e.startup_id = s.id
                 WHERE e.playlist_slug = ?1
                 ORDER BY e.position ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let startups = stmt
                .query_map([slug], startup_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(Some((playlist, startups)))
        })
    }

    /// Appends a startup to the end of a playlist. Re-adding is a no-op.
    pub fn add_to_playlist(&self, slug: &str, startup_id: &str) -> Result<()> {
        self.with_tx(|tx| {
            let next: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_entries WHERE playlist_slug = ?1",
                [slug],
                |r| r.get(0),
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO playlist_entries (playlist_slug, startup_id, position)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![slug, startup_id, next],
            )?;
            Ok(())
        })
    }
}

fn query_author(conn: &Connection, column: &str, value: &str) -> Result<Option<AuthorRow>> {
    // `column` is only ever one of our own literals
    let mut stmt = conn.prepare(&format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE {column} = ?1"))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(AuthorRow {
                id: row.get(0)?,
                external_id: row.get(1)?,
                username: row.get(2)?,
                name: row.get(3)?,
                email: row.get(4)?,
                image: row.get(5)?,
                bio: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_startup(conn: &Connection, id: &str) -> Result<Option<StartupRow>> {
    let mut stmt = conn.prepare(&format!("{STARTUP_SELECT} WHERE s.id = ?1"))?;
    let row = stmt.query_row([id], startup_from_row).optional()?;
    Ok(row)
}

fn startup_from_row(row: &Row<'_>) -> rusqlite::Result<StartupRow> {
    Ok(StartupRow {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        image: row.get(5)?,
        pitch: row.get(6)?,
        views: row.get(7)?,
        created_at: row.get(8)?,
        author_id: row.get(9)?,
        author_username: row.get(10)?,
        author_name: row.get(11)?,
        author_image: row.get(12)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
