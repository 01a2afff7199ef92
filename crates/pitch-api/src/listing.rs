use axum::{
    Extension,
    extract::{Query, State},
};
use maud::Markup;

use pitch_types::api::SearchParams;
use pitch_types::models::Startup;

use crate::auth::AppState;
use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::render;
use crate::store::{ContentStore, Freshness};

/// One store query; filtering and ordering are entirely the store's.
pub async fn list_startups(store: &dyn ContentStore, params: &SearchParams) -> anyhow::Result<Vec<Startup>> {
    store.search_startups(params.search(), Freshness::Cached).await
}

/// GET /?query=
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Markup, AppError> {
    let startups = list_startups(state.store.as_ref(), &params).await?;
    Ok(render::home_page(&ctx, params.search(), &startups))
}
