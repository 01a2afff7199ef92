use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use pitch_types::api::{Claims, IdentityAssertion, OAuthCallback, Session};

use crate::error::AppError;
use crate::oauth::IdentityProvider;
use crate::store::{ContentStore, Freshness};

pub const SESSION_COOKIE: &str = "pitch_session";
pub const STATE_COOKIE: &str = "pitch_oauth_state";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn ContentStore>,
    pub provider: Arc<dyn IdentityProvider>,
    pub auth_secret: String,
    pub session_days: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("content store unavailable during sign-in: {0}")]
    Store(#[from] anyhow::Error),

    #[error("identity provider error: {0}")]
    Provider(#[from] reqwest::Error),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("OAuth state mismatch")]
    StateMismatch,
}

// -- Reconciliation --

/// Binds an external identity to an author, creating the author on first
/// sign-in. Any store failure aborts the sign-in.
pub async fn sign_in(store: &dyn ContentStore, identity: &IdentityAssertion) -> Result<bool, AuthError> {
    let existing = store
        .author_by_external_id(&identity.external_id, Freshness::Fresh)
        .await?;

    if existing.is_none() {
        let author = store.create_author(identity.to_new_author()).await?;
        info!("Created author {} ({}) on first sign-in", author.id, author.username);
    }

    Ok(true)
}

/// Token issuance hook. With provider data present, resolves the internal
/// author id onto the claims; otherwise the claims pass through untouched.
pub async fn issue_token(
    store: &dyn ContentStore,
    mut claims: Claims,
    identity: Option<&IdentityAssertion>,
) -> Result<Claims, AuthError> {
    if let Some(identity) = identity {
        let author = store
            .author_by_external_id(&identity.external_id, Freshness::Fresh)
            .await?;
        if author.is_none() {
            warn!("No author for external id {} at token issuance", identity.external_id);
        }
        claims.id = author.map(|a| a.id);
    }
    Ok(claims)
}

pub fn session(claims: &Claims) -> Session {
    Session {
        id: claims.id,
        name: claims.name.clone(),
        email: claims.email.clone(),
        image: claims.image.clone(),
    }
}

pub fn create_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    let token = encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())?;
    Ok(data.claims)
}

// -- Handlers --

/// GET /auth/signin. Starts the OAuth handshake.
pub async fn signin(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut nonce = [0u8; 32];
    rand::rng().fill(&mut nonce);
    let oauth_state = B64.encode(nonce);

    let url = state.provider.authorize_url(&oauth_state);
    let jar = jar.add(cookie(&state, STATE_COOKIE, oauth_state));
    (jar, Redirect::to(&url))
}

/// GET /auth/callback/github. Finishes the handshake, reconciles the author
/// and sets the session cookie.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallback>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = params.error.as_deref() {
        warn!("Provider rejected sign-in: {}", error);
        return Err(AppError::AccessDenied);
    }

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    match (expected.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(got)) if !expected.is_empty() && expected == got => {}
        _ => return Err(AuthError::StateMismatch.into()),
    }

    let code = params.code.as_deref().ok_or(AppError::BadRequest("missing code"))?;
    let identity = state.provider.exchange(code).await?;

    if !sign_in(state.store.as_ref(), &identity).await? {
        return Err(AppError::AccessDenied);
    }

    let claims = Claims {
        sub: identity.external_id.clone(),
        id: None,
        name: identity.name.clone(),
        email: identity.email.clone(),
        image: identity.avatar_url.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(state.session_days)).timestamp() as usize,
    };
    let claims = issue_token(state.store.as_ref(), claims, Some(&identity)).await?;
    let token = create_token(&state.auth_secret, &claims)?;

    info!("{} signed in", identity.username);

    let jar = jar
        .remove(Cookie::build(STATE_COOKIE).path("/"))
        .add(cookie(&state, SESSION_COOKIE, token));
    Ok((jar, Redirect::to("/")))
}

/// POST /auth/signout
pub async fn signout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

fn cookie(state: &AppStateInner, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset_secs: i64) -> Claims {
        Claims {
            sub: "583231".into(),
            id: Some(uuid::Uuid::new_v4()),
            name: "The Octocat".into(),
            email: "octocat@example.com".into(),
            image: None,
            exp: (chrono::Utc::now().timestamp() + exp_offset_secs) as usize,
        }
    }

    #[test]
    fn token_roundtrip_keeps_author_id() {
        let c = claims(3600);
        let token = create_token("test-secret", &c).unwrap();
        let decoded = decode_token("test-secret", &token).unwrap();
        assert_eq!(decoded, c);
        assert_eq!(session(&decoded).id, c.id);
    }

    #[test]
    fn wrong_secret_or_expired_token_fails() {
        let token = create_token("test-secret", &claims(3600)).unwrap();
        assert!(decode_token("other-secret", &token).is_err());

        let expired = create_token("test-secret", &claims(-3600)).unwrap();
        assert!(decode_token("test-secret", &expired).is_err());
    }
}
