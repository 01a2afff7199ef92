use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Slug of the curated collection shown beside every pitch.
pub const EDITOR_PICKS_SLUG: &str = "editor-picks";

const CATEGORY_MIN_CHARS: usize = 1;
const CATEGORY_MAX_CHARS: usize = 20;

/// A profile linked to an external identity. One per `external_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub external_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthor {
    pub external_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: String,
}

/// The slice of an author shown on cards and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Startup {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub description: String,
    pub image: String,
    /// Markdown source. `None` when the author never wrote one.
    pub pitch: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub slug: String,
    pub title: String,
    pub startups: Vec<Startup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStartup {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub category: String,
    pub description: String,
    pub image: String,
    #[serde(default)]
    pub pitch: Option<String>,
    pub author_id: Uuid,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Image is required")]
    MissingImage,

    #[error("Category is required (1-20 characters, got {0})")]
    CategoryLength(usize),
}

impl NewStartup {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let category_len = self.category.trim().chars().count();
        if !(CATEGORY_MIN_CHARS..=CATEGORY_MAX_CHARS).contains(&category_len) {
            return Err(ValidationError::CategoryLength(category_len));
        }
        if self.image.trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }
        Ok(())
    }

    /// Explicit slug if given, otherwise derived from the title.
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(&self.title),
        }
    }
}

pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_dash = false;
    for c in source.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(category: &str, image: &str) -> NewStartup {
        NewStartup {
            title: "Solar Kites".into(),
            slug: None,
            category: category.into(),
            description: "Airborne wind power".into(),
            image: image.into(),
            pitch: None,
            author_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn category_bounds() {
        assert!(draft("Energy", "https://img.example/kite.png").validate().is_ok());
        assert_eq!(
            draft("", "https://img.example/kite.png").validate(),
            Err(ValidationError::CategoryLength(0))
        );
        assert_eq!(
            draft("A category that is far too long", "https://img.example/kite.png").validate(),
            Err(ValidationError::CategoryLength(31))
        );
        assert!(draft(&"x".repeat(20), "https://img.example/kite.png").validate().is_ok());
    }

    #[test]
    fn image_required() {
        assert_eq!(draft("Energy", "  ").validate(), Err(ValidationError::MissingImage));
    }

    #[test]
    fn slug_from_title() {
        assert_eq!(slugify("Solar Kites: Take 2!"), "solar-kites-take-2");
        assert_eq!(slugify("  --hello--  "), "hello");

        let mut d = draft("Energy", "x");
        assert_eq!(d.resolved_slug(), "solar-kites");
        d.slug = Some("Custom Slug".into());
        assert_eq!(d.resolved_slug(), "custom-slug");
    }
}
