use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use pitch_types::models::{EDITOR_PICKS_SLUG, Startup};

use crate::auth::AppState;
use crate::error::AppError;
use crate::markup::render_markdown;
use crate::middleware::RequestContext;
use crate::render;
use crate::store::{ContentStore, Freshness};

#[derive(Debug)]
pub enum Detail {
    NotFound,
    Found { startup: Startup, picks: Vec<Startup> },
}

/// Fetch the startup and the editor picks concurrently. A missing startup
/// short-circuits before the view counter is touched; either fetch failing
/// fails the whole load.
pub async fn load_detail(store: Arc<dyn ContentStore>, id: Uuid) -> anyhow::Result<Detail> {
    let (startup, playlist) = tokio::try_join!(
        store.startup_by_id(id, Freshness::Cached),
        store.playlist_by_slug(EDITOR_PICKS_SLUG, Freshness::Cached),
    )?;

    let Some(startup) = startup else {
        return Ok(Detail::NotFound);
    };

    record_view(store, id);

    let picks = playlist.map(|p| p.startups).unwrap_or_default();
    Ok(Detail::Found { startup, picks })
}

/// Best-effort view count bump, detached from the response. No retry, no
/// dedup: every page view is one increment attempt, failures are dropped.
pub fn record_view(store: Arc<dyn ContentStore>, id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.increment_views(id).await {
            Ok(()) => debug!("Recorded view for {}", id),
            Err(e) => warn!("View counter update for {} failed: {}", id, e),
        }
    })
}

/// GET /startup/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let Ok(id) = raw_id.parse::<Uuid>() else {
        return Ok(not_found(&ctx));
    };

    match load_detail(state.store.clone(), id).await? {
        Detail::NotFound => Ok(not_found(&ctx)),
        Detail::Found { startup, picks } => {
            let pitch_html = render_markdown(startup.pitch.as_deref());
            Ok(render::detail_page(&ctx, &startup, pitch_html.as_deref(), &picks).into_response())
        }
    }
}

fn not_found(ctx: &RequestContext) -> Response {
    (StatusCode::NOT_FOUND, render::not_found_page(ctx)).into_response()
}
