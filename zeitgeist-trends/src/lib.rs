#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Search trend retrieval for [Zeitgeist](../zeitgeist/index.html).
//!
//! Every public operation of [`TrendsService`] follows the same path: the
//! [`Normalizer`] fills in defaults for the caller's input, a
//! [`TrendProvider`] makes one call to the upstream provider, and the
//! [`decoder`] parses the answer into a JSON value.

pub mod decoder;
mod domain;
mod errors;
mod normalizer;
mod service;

use async_trait::async_trait;

pub use crate::domain::{
    AutoCompleteQuery, BatchItemResult, BatchOutcome, BatchResult, DailyTrendsQuery,
    DecodedResult, InterestByRegionQuery, InterestOverTimeQuery, ProviderResult, QuerySpec,
    QueryType, RealTimeTrendsQuery, RelatedQueriesQuery, RelatedTopicsQuery, StartTime,
};
pub use crate::errors::{DecodeError, FetchFailure, TrendsFetchError, UpstreamCallError};
pub use crate::normalizer::{Clock, Normalizer, SystemClock, DEFAULT_GEO};

#[cfg(any(test, feature = "test-support"))]
pub use crate::normalizer::FixedClock;
pub use crate::service::{TrendsService, BATCH_ITEM_ERROR};

/// A backend that can answer trend queries.
///
/// There is one method per query type. Each makes exactly one call to the
/// provider and returns its payload without interpreting it.
#[async_trait]
pub trait TrendProvider: Send + Sync {
    /// An operator-visible name for this provider.
    fn name(&self) -> String;

    /// Suggest keywords for a partial term.
    async fn auto_complete(
        &self,
        query: &AutoCompleteQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// List the trending searches of a day.
    async fn daily_trends(
        &self,
        query: &DailyTrendsQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// Measure interest in a keyword over a time window.
    async fn interest_over_time(
        &self,
        query: &InterestOverTimeQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// Measure interest in a keyword by region.
    async fn interest_by_region(
        &self,
        query: &InterestByRegionQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// List the stories trending right now.
    async fn real_time_trends(
        &self,
        query: &RealTimeTrendsQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// Find queries related to a keyword.
    async fn related_queries(
        &self,
        query: &RelatedQueriesQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// Find topics related to a keyword.
    async fn related_topics(
        &self,
        query: &RelatedTopicsQuery,
    ) -> Result<ProviderResult, UpstreamCallError>;

    /// Send `spec` to the method for its query type. This function should not
    /// normally be overridden by provider implementations.
    async fn call(&self, spec: &QuerySpec) -> Result<ProviderResult, UpstreamCallError> {
        match spec {
            QuerySpec::AutoComplete(query) => self.auto_complete(query).await,
            QuerySpec::DailyTrends(query) => self.daily_trends(query).await,
            QuerySpec::InterestOverTime(query) => self.interest_over_time(query).await,
            QuerySpec::InterestByRegion(query) => self.interest_by_region(query).await,
            QuerySpec::RealTimeTrends(query) => self.real_time_trends(query).await,
            QuerySpec::RelatedQueries(query) => self.related_queries(query).await,
            QuerySpec::RelatedTopics(query) => self.related_topics(query).await,
        }
    }
}
