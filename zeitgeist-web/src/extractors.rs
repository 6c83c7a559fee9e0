//! Types to extract trend requests from HTTP requests, and to validate them.

use crate::errors::{HandlerError, INVALID_BATCH};
use actix_web::{error::JsonPayloadError, error::QueryPayloadError, HttpRequest};
use serde::Deserialize;
use zeitgeist_trends::StartTime;

/// Query parameters accepted by the trends routes. Every route reads the
/// subset it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendsParams {
    /// The partial term to complete.
    pub term: Option<String>,
    /// The keyword to look up.
    pub keyword: Option<String>,
    /// The region, as an ISO 3166 code.
    pub geo: Option<String>,
    /// The start of the time window.
    pub start_time: Option<String>,
}

impl TrendsParams {
    /// The region, if one was given.
    pub fn geo(&self) -> Option<&str> {
        present(self.geo.as_deref())
    }

    /// The start time, if one was given.
    pub fn start_time(&self) -> Option<StartTime> {
        present(self.start_time.as_deref()).map(StartTime::parse)
    }
}

/// The body of a batch request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchBody {
    /// The keywords to measure interest for.
    pub keywords: Option<Vec<String>>,
    /// The start of the time window, shared by every keyword.
    pub start_time: Option<String>,
}

impl BatchBody {
    /// The keywords of the batch.
    ///
    /// # Errors
    /// If there are none.
    pub fn keywords(&self) -> Result<&[String], HandlerError> {
        match self.keywords.as_deref() {
            Some(keywords) if !keywords.is_empty() => Ok(keywords),
            _ => Err(HandlerError::bad_request(INVALID_BATCH)),
        }
    }

    /// The start time, if one was given.
    pub fn start_time(&self) -> Option<StartTime> {
        present(self.start_time.as_deref()).map(StartTime::parse)
    }
}

/// Treat empty parameters the same as missing ones.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// The first of `candidates` that is present and not empty.
///
/// # Errors
/// A bad request carrying `message`, if none of them are.
pub fn required<'a>(
    candidates: &[Option<&'a str>],
    message: &str,
) -> Result<&'a str, HandlerError> {
    candidates
        .iter()
        .find_map(|candidate| present(*candidate))
        .ok_or_else(|| HandlerError::bad_request(message))
}

/// Turn a batch body that can't be read into a 400 response.
pub fn batch_body_error(error: JsonPayloadError, _request: &HttpRequest) -> actix_web::Error {
    tracing::debug!(r#type = "web.batch.bad-body", %error, "Rejecting batch body");
    HandlerError::bad_request(INVALID_BATCH).into()
}

/// Turn query parameters that can't be read into a 400 response.
pub fn query_error(error: QueryPayloadError, _request: &HttpRequest) -> actix_web::Error {
    HandlerError::bad_request(error.to_string()).into()
}
