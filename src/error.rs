//! Mapping of resolution failures to HTTP responses

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::content::ContentError;

/// Failure while resolving a post page
///
/// A post that does not exist is not an error; see [`crate::resolver::Outcome::NotFound`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ResolveError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResolveError::Content(ContentError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ResolveError::Content(ContentError::Unavailable(_) | ContentError::Status(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ResolveError::Content(ContentError::InvalidResponse(_) | ContentError::Query(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = status.as_u16(), "post page failed");

        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{code} | {reason}</title>\n</head>\n<body>\n<h1>{code} | {reason}</h1>\n</body>\n</html>",
            code = status.as_u16(),
            reason = status.canonical_reason().unwrap_or("Error"),
        );
        (status, Html(body)).into_response()
    }
}
