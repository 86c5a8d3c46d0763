//! Upload endpoint errors.
//!
//! Recorders only look at the status line and a short plain-text body, so
//! every error maps to one fixed message. Details go to the log.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::IngestError;

use super::types::{
    AUTH_REALM, AUTH_SERVER_HEADER, NO_CONTENT_BODY, UNAUTHORIZED_BODY, UPLOAD_FAILED_BODY, UPLOAD_SERVER_HEADER,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing or invalid credentials")]
    Unauthorized,

    #[error("request body is empty")]
    EmptyBody,

    #[error("upload failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("upload task failed: {0}")]
    Task(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => {
                let challenge = format!("Basic realm=\"{}\"", AUTH_REALM);
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    [
                        (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                        (header::CONNECTION, "close"),
                        (header::SERVER, AUTH_SERVER_HEADER),
                    ],
                    UNAUTHORIZED_BODY,
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                }
                response
            }
            ApiError::EmptyBody => plain_text(StatusCode::BAD_REQUEST, NO_CONTENT_BODY),
            ApiError::Ingest(ref err) => {
                tracing::error!(error = %err, "error processing upload");
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED_BODY)
            }
            ApiError::Task(ref message) => {
                tracing::error!(error = %message, "upload task did not complete");
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED_BODY)
            }
        }
    }
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain"),
            (header::CONNECTION, "close"),
            (header::SERVER, UPLOAD_SERVER_HEADER),
        ],
        body,
    )
        .into_response()
}
