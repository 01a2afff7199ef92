/// Database row types. These map directly to SQLite rows.
/// Distinct from pitch-types models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct AuthorRow {
    pub id: String,
    pub external_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: String,
    pub created_at: String,
}

/// A startup joined with the author fields cards need.
#[derive(Debug, Clone)]
pub struct StartupRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub pitch: Option<String>,
    pub views: i64,
    pub created_at: String,
    pub author_id: String,
    pub author_username: String,
    pub author_name: String,
    pub author_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlaylistRow {
    pub slug: String,
    pub title: String,
}
