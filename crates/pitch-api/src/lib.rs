pub mod auth;
pub mod cache;
pub mod detail;
pub mod error;
pub mod listing;
pub mod markup;
pub mod middleware;
pub mod oauth;
pub mod render;
pub mod router;
pub mod store;

pub use auth::{AppState, AppStateInner};
pub use router::build_router;
