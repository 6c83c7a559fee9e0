//! Any errors that zeitgeist-web might generate, and supporting implementations.

use std::error::Error;
use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use backtrace::Backtrace;
use serde_json::json;
use thiserror::Error;
use zeitgeist_trends::TrendsFetchError;

/// Sent when an autocomplete request has no usable term.
pub const INVALID_TERM: &str = "Please provide a valid term for autocomplete";

/// Sent when a request that needs a keyword has no usable keyword.
pub const INVALID_KEYWORD: &str = "Please provide a valid keyword";

/// Sent when a batch request has no keywords or a body that can't be read.
pub const INVALID_BATCH: &str = "Please provide an array of keywords for batch processing";

/// The Standard Error for most of Zeitgeist
pub struct HandlerError {
    /// The wrapped error value.
    kind: HandlerErrorKind,
    /// The backtrace related to the wrapped error.
    pub(crate) backtrace: Backtrace,
}

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// A generic error, when there is nothing more specific to say.
    #[error("Internal error")]
    Internal,

    /// The request was missing something it needs, or had it in an unusable
    /// form. The message is shown to the client.
    #[error("{0}")]
    BadRequest(String),

    /// Trend data could not be fetched.
    #[error(transparent)]
    TrendsFetch(#[from] TrendsFetchError),
}

impl HandlerErrorKind {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal | Self::TrendsFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<HandlerErrorKind> for actix_web::Error {
    fn from(kind: HandlerErrorKind) -> Self {
        let error: HandlerError = kind.into();
        error.into()
    }
}

impl HandlerError {
    /// Access the wrapped error.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    /// Get an `HandlerError` representing an `Internal` error.
    pub fn internal() -> Self {
        HandlerErrorKind::Internal.into()
    }

    /// Get an `HandlerError` for a bad request, showing `message` to the client.
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        HandlerErrorKind::BadRequest(message.into()).into()
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<T> From<T> for HandlerError
where
    HandlerErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        HandlerError {
            kind: HandlerErrorKind::from(item),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        // Name the struct after the kind, so log lines for different errors
        // can be told apart without reading the fields.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.kind().to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use zeitgeist_trends::{QueryType, UpstreamCallError};

    async fn body_of(error: &HandlerError) -> Value {
        let bytes = to_bytes(error.error_response().into_body())
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[actix_rt::test]
    async fn bad_requests_are_400_with_the_message() {
        let error = HandlerError::bad_request(INVALID_KEYWORD);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(&error).await,
            json!({"error": "Please provide a valid keyword"})
        );
    }

    #[actix_rt::test]
    async fn fetch_errors_are_500_and_hide_their_cause() {
        let fetch_error = TrendsFetchError::new(
            QueryType::InterestByRegion,
            UpstreamCallError::new(QueryType::InterestByRegion, anyhow!("secret upstream detail")),
        );
        let error = HandlerError::from(fetch_error);

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(&error).await,
            json!({"error": "Error fetching interest by region data"})
        );
        assert!(error.source().is_some());
    }

    #[actix_rt::test]
    async fn internal_errors_are_500() {
        let error = HandlerError::internal();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(&error).await, json!({"error": "Internal error"}));
    }
}
