use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    #[error("Sign-in was not accepted")]
    AccessDenied,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::Auth(AuthError::StateMismatch) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Provider(_)) => StatusCode::BAD_GATEWAY,
            AppError::Auth(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server-side details stay in the log
        let body = if status.is_server_error() {
            error!("{}", self);
            "Internal server error".to_string()
        } else {
            warn!("{}", self);
            self.to_string()
        };

        (status, body).into_response()
    }
}
