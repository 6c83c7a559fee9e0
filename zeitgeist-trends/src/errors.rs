//! The error taxonomy of the trends service.
//!
//! Providers fail with [`UpstreamCallError`] and the decoder fails with
//! [`DecodeError`]. The service merges both into [`TrendsFetchError`], the only
//! error callers of the service need to handle.

use crate::domain::QueryType;
use thiserror::Error;

/// The provider could not be reached, refused the request, or was asked
/// something that could not be sent.
#[derive(Debug, Error)]
#[error("the trends provider failed to answer a {query_type} request")]
pub struct UpstreamCallError {
    /// The kind of query that failed.
    pub query_type: QueryType,

    /// What went wrong.
    #[source]
    pub source: anyhow::Error,
}

impl UpstreamCallError {
    /// Tag `source` with the query type it happened for.
    pub fn new<E: Into<anyhow::Error>>(query_type: QueryType, source: E) -> Self {
        Self {
            query_type,
            source: source.into(),
        }
    }
}

/// The provider answered, but the payload is not well-formed JSON.
#[derive(Debug, Error)]
#[error("the provider payload is not well-formed JSON")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Either half of a failed fetch.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum FetchFailure {
    #[error(transparent)]
    Upstream(#[from] UpstreamCallError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A trends operation failed.
///
/// The message is fixed per query type, so it is safe to show to API
/// clients. The underlying cause is kept as the error source for logs.
#[derive(Debug, Error)]
#[error("Error fetching {} data", .query_type.description())]
pub struct TrendsFetchError {
    /// The kind of query that failed.
    pub query_type: QueryType,

    /// Whether the provider call or the decoding failed, and why.
    #[source]
    pub cause: FetchFailure,
}

impl TrendsFetchError {
    /// Build a fetch error for `query_type`.
    pub fn new<E: Into<FetchFailure>>(query_type: QueryType, cause: E) -> Self {
        Self {
            query_type,
            cause: cause.into(),
        }
    }

    /// If the provider call itself failed, as opposed to decoding its answer.
    pub fn is_upstream(&self) -> bool {
        matches!(self.cause, FetchFailure::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parameterized::parameterized;
    use std::error::Error as _;

    #[parameterized(
        query_type = {
            QueryType::AutoComplete,
            QueryType::DailyTrends,
            QueryType::InterestOverTime,
            QueryType::InterestByRegion,
            QueryType::RealTimeTrends,
            QueryType::RelatedQueries,
            QueryType::RelatedTopics
        },
        expected = {
            "Error fetching autocomplete data",
            "Error fetching daily trends data",
            "Error fetching interest over time data",
            "Error fetching interest by region data",
            "Error fetching real-time trends data",
            "Error fetching related queries data",
            "Error fetching related topics data"
        }
    )]
    fn fetch_error_messages_are_fixed(query_type: QueryType, expected: &str) {
        let error = TrendsFetchError::new(
            query_type,
            UpstreamCallError::new(query_type, anyhow!("connection refused")),
        );
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn fetch_error_keeps_the_cause() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = TrendsFetchError::new(QueryType::DailyTrends, DecodeError(decode));

        assert!(!error.is_upstream());
        let source = error.source().expect("fetch errors have a source");
        assert_eq!(
            source.to_string(),
            "the provider payload is not well-formed JSON"
        );
    }

    #[test]
    fn upstream_errors_are_tagged() {
        let error = UpstreamCallError::new(QueryType::RealTimeTrends, anyhow!("503"));
        assert_eq!(
            error.to_string(),
            "the trends provider failed to answer a realTimeTrends request"
        );
        assert_eq!(error.source().unwrap().to_string(), "503");
    }
}
