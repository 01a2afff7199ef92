use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::NewAuthor;

// -- Session token --

/// Claims carried by the signed session cookie.
///
/// `sub` is the external provider id. `id` is the internal author id resolved
/// at sign-in; it stays `None` if the author lookup came back empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
    pub exp: usize,
}

/// What handlers see of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

// -- OAuth --

/// Provider profile as returned by `GET https://api.github.com/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubProfile {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct GithubTokenResponse {
    pub access_token: String,
}

/// A successful third-party handshake, flattened into one record.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityAssertion {
    pub external_id: String,
    pub username: String,
    pub bio: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl IdentityAssertion {
    /// Display name falls back to the login, email to `fallback_email`
    /// (the primary verified address when the profile hides it).
    pub fn from_github(profile: GithubProfile, fallback_email: Option<String>) -> Self {
        Self {
            external_id: profile.id.to_string(),
            name: profile.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| profile.login.clone()),
            username: profile.login,
            bio: profile.bio,
            email: profile.email.or(fallback_email).unwrap_or_default(),
            avatar_url: profile.avatar_url,
        }
    }

    pub fn to_new_author(&self) -> NewAuthor {
        NewAuthor {
            external_id: self.external_id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.avatar_url.clone(),
            bio: self.bio.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// -- Listing --

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

impl SearchParams {
    /// Blank and absent queries both mean "no filter".
    pub fn search(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}
