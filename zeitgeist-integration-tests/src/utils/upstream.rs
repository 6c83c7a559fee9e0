//! Canned answers from the mock trend provider.

use httpmock::{prelude::HttpMockRequest, Method::GET, Mock, MockServer};
use serde_json::Value;
use std::time::Duration;

/// Path of the interest over time widget, which batches call once per keyword.
pub const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";

/// Answer GET requests to `path` with `payload`, prefixed with the anti-XSSI
/// guard the real provider sends.
pub async fn answer_json<'a>(upstream: &'a MockServer, path: &str, payload: &Value) -> Mock<'a> {
    let body = format!(")]}}',\n{}", payload);
    upstream
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await
}

/// Answer GET requests to `path` with an error status.
pub async fn answer_status<'a>(upstream: &'a MockServer, path: &str, status: u16) -> Mock<'a> {
    upstream
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(status).body("upstream unavailable");
        })
        .await
}

/// The `req` widget parameter of a request, if it has one.
fn widget_request(request: &HttpMockRequest) -> Option<&str> {
    request
        .query_params
        .as_ref()?
        .iter()
        .find(|(name, _)| name == "req")
        .map(|(_, value)| value.as_str())
}

/// If a widget request is for a keyword containing "boom".
pub fn is_for_boom(request: &HttpMockRequest) -> bool {
    widget_request(request).map_or(false, |req| req.contains("boom"))
}

/// If a widget request is for anything except "boom".
pub fn is_not_for_boom(request: &HttpMockRequest) -> bool {
    !is_for_boom(request)
}

/// If a widget request is for a keyword containing "slow".
pub fn is_for_slow(request: &HttpMockRequest) -> bool {
    widget_request(request).map_or(false, |req| req.contains("slow"))
}

/// If a widget request is for anything except "slow".
pub fn is_not_for_slow(request: &HttpMockRequest) -> bool {
    !is_for_slow(request)
}

/// Answer interest over time requests that `matcher` picks with `payload`,
/// after waiting `delay`.
pub async fn answer_multiline_when<'a>(
    upstream: &'a MockServer,
    matcher: fn(&HttpMockRequest) -> bool,
    payload: &Value,
    delay: Duration,
) -> Mock<'a> {
    let body = format!(")]}}',\n{}", payload);
    upstream
        .mock_async(|when, then| {
            when.method(GET).path(MULTILINE_PATH).matches(matcher);
            then.status(200).delay(delay).body(body);
        })
        .await
}

/// Fail interest over time requests that `matcher` picks.
pub async fn fail_multiline_when(
    upstream: &MockServer,
    matcher: fn(&HttpMockRequest) -> bool,
) -> Mock<'_> {
    upstream
        .mock_async(|when, then| {
            when.method(GET).path(MULTILINE_PATH).matches(matcher);
            then.status(500).body("upstream exploded");
        })
        .await
}
