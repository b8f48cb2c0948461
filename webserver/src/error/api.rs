use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::error::CirculationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    CirculationError(#[from] CirculationError),
}

impl IntoResponse for ApiError {
    // Every failure is a plain text 500, whatever its kind.
    fn into_response(self) -> Response {
        tracing::error!(reason = %self, "Failed to compute circulation");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain")],
            self.to_string(),
        )
            .into_response()
    }
}
