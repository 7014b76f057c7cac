use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiError;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error.";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ApiError {
            error: message.into(),
        }),
    )
        .into_response()
}
