use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use pitch_types::api::Session;

use crate::auth::{AppState, SESSION_COOKIE, decode_token, session};

/// Per-request view of who is signed in. Inserted by [`load_session`] and
/// read by handlers through `Extension<RequestContext>`.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session: Option<Session>,
}

/// Decode the session cookie, if any. Bad or expired tokens mean anonymous,
/// never an error response.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let session = jar.get(SESSION_COOKIE).and_then(|cookie| {
        decode_token(&state.auth_secret, cookie.value())
            .map_err(|e| debug!("Ignoring session cookie: {}", e))
            .ok()
            .map(|claims| session(&claims))
    });

    req.extensions_mut().insert(RequestContext { session });
    next.run(req).await
}
