//! The public operations of the trends service.

use crate::{
    decoder,
    domain::{BatchItemResult, BatchOutcome, BatchResult, DecodedResult, QuerySpec, StartTime},
    errors::TrendsFetchError,
    normalizer::{Clock, Normalizer},
    TrendProvider,
};
use futures::{stream, StreamExt};
use std::sync::Arc;

/// What a batch reports for a keyword that failed. The cause is logged, not
/// returned.
pub const BATCH_ITEM_ERROR: &str = "Error fetching trend data";

/// Fetches trend data from a provider, filling in defaults and decoding the
/// answers.
///
/// Nothing is cached: every call reaches the provider.
#[derive(Clone)]
pub struct TrendsService {
    /// Where trend data comes from.
    provider: Arc<dyn TrendProvider>,

    /// Fills in defaults for optional input.
    normalizer: Normalizer,

    /// The most keywords of a batch fetched at once. `None` is unbounded.
    batch_concurrency: Option<usize>,
}

impl TrendsService {
    /// Create a service that reads the system clock and fetches whole
    /// batches concurrently.
    pub fn new(provider: Arc<dyn TrendProvider>) -> Self {
        Self {
            provider,
            normalizer: Normalizer::default(),
            batch_concurrency: None,
        }
    }

    /// Read the current time from `clock` when computing defaults.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.normalizer = Normalizer::new(clock);
        self
    }

    /// Fetch at most `limit` keywords of a batch at once. `None` is unbounded,
    /// and `Some(1)` fetches keywords one after the other.
    #[must_use]
    pub fn with_batch_concurrency(mut self, limit: Option<usize>) -> Self {
        self.batch_concurrency = limit;
        self
    }

    /// The normalizer used to fill in defaults.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// The name of the provider behind this service.
    pub fn provider_name(&self) -> String {
        self.provider.name()
    }

    /// Suggest keywords for a partial term.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_auto_complete(&self, term: &str) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.auto_complete(term)).await
    }

    /// List yesterday's trending searches in `geo`, `US` by default.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_daily_trends(
        &self,
        geo: Option<&str>,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.daily_trends(geo)).await
    }

    /// Measure interest in `keyword` since `start_time`, one month ago by
    /// default.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded. A start
    /// time that could not be parsed fails as a provider call failure.
    pub async fn fetch_interest_over_time(
        &self,
        keyword: &str,
        start_time: Option<StartTime>,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.interest_over_time(keyword, start_time))
            .await
    }

    /// Measure interest in `keyword` across the regions of `geo`.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_interest_by_region(
        &self,
        keyword: &str,
        start_time: Option<StartTime>,
        geo: Option<&str>,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.interest_by_region(keyword, start_time, geo))
            .await
    }

    /// List the stories trending right now in `geo`, `US` by default.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_real_time_trends(
        &self,
        geo: Option<&str>,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.real_time_trends(geo)).await
    }

    /// Find queries related to `keyword`.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_related_queries(
        &self,
        keyword: &str,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.related_queries(keyword)).await
    }

    /// Find topics related to `keyword`.
    ///
    /// # Errors
    /// If the provider call fails or its answer can't be decoded.
    pub async fn fetch_related_topics(
        &self,
        keyword: &str,
    ) -> Result<DecodedResult, TrendsFetchError> {
        self.run(self.normalizer.related_topics(keyword)).await
    }

    /// Measure interest over time for every keyword in `keywords`.
    ///
    /// Each keyword is fetched on its own, sharing `start_time`. A failure
    /// is recorded in that keyword's entry and does not affect the others,
    /// so this never fails as a whole. Entries are in the order of
    /// `keywords`, no matter which fetch finishes first.
    pub async fn fetch_batch(
        &self,
        keywords: &[String],
        start_time: Option<StartTime>,
    ) -> BatchResult {
        let limit = self.batch_concurrency.unwrap_or(keywords.len()).max(1);
        let mut slots: Vec<Option<BatchItemResult>> = vec![None; keywords.len()];

        let mut fetches = stream::iter(keywords.iter().enumerate())
            .map(|(index, keyword)| {
                let start_time = start_time.clone();
                async move {
                    let outcome = self.fetch_interest_over_time(keyword, start_time).await;
                    (index, outcome)
                }
            })
            .buffer_unordered(limit);

        while let Some((index, outcome)) = fetches.next().await {
            let keyword = &keywords[index];
            let outcome = match outcome {
                Ok(data) => BatchOutcome::Data(data),
                Err(error) => {
                    tracing::warn!(
                        r#type = "trends.batch.item-failed",
                        %keyword,
                        %error,
                        "Keyword of a batch could not be fetched"
                    );
                    BatchOutcome::Error(BATCH_ITEM_ERROR.to_string())
                }
            };
            slots[index] = Some(BatchItemResult {
                keyword: keyword.clone(),
                outcome,
            });
        }

        slots.into_iter().flatten().collect()
    }

    /// Send a resolved query to the provider and decode the answer.
    async fn run(&self, spec: QuerySpec) -> Result<DecodedResult, TrendsFetchError> {
        let query_type = spec.query_type();
        tracing::debug!(
            r#type = "trends.fetch",
            %query_type,
            provider = %self.provider.name(),
            ?spec,
            "Fetching trend data"
        );

        let raw = self.provider.call(&spec).await.map_err(|error| {
            tracing::warn!(
                r#type = "trends.fetch.upstream-error",
                %query_type,
                error = ?error,
                "Trend provider call failed"
            );
            TrendsFetchError::new(query_type, error)
        })?;

        decoder::decode(&raw).map_err(|error| {
            tracing::warn!(
                r#type = "trends.fetch.decode-error",
                %query_type,
                %error,
                "Trend provider answered with a malformed payload"
            );
            TrendsFetchError::new(query_type, error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TrendsService;
    use crate::{
        AutoCompleteQuery, DailyTrendsQuery, FetchFailure, FixedClock, InterestByRegionQuery,
        InterestOverTimeQuery, ProviderResult, QuerySpec, QueryType, RealTimeTrendsQuery,
        RelatedQueriesQuery, RelatedTopicsQuery, StartTime, TrendProvider, UpstreamCallError,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use fake::{faker::lorem::en::Words, Fake};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    };

    /// A provider that records every query it is sent and answers from a
    /// script keyed by keyword.
    #[derive(Default)]
    struct ScriptedProvider {
        /// Every query received, in the order received.
        calls: Mutex<Vec<QuerySpec>>,
        /// Keywords whose calls fail.
        failing: Vec<String>,
        /// Keywords whose payloads are not JSON.
        garbled: Vec<String>,
        /// How long to wait before answering for a keyword.
        delays: HashMap<String, Duration>,
    }

    impl ScriptedProvider {
        fn calls(&self) -> Vec<QuerySpec> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, spec: QuerySpec) -> Result<ProviderResult, UpstreamCallError> {
            self.calls.lock().unwrap().push(spec.clone());
            let query_type = spec.query_type();
            let keyword = spec.keyword().unwrap_or("").to_string();

            if let Some(delay) = self.delays.get(&keyword) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(&keyword) {
                return Err(UpstreamCallError::new(query_type, anyhow!("500 from provider")));
            }
            if self.garbled.contains(&keyword) {
                return Ok(ProviderResult::new("<html>oops</html>"));
            }
            Ok(ProviderResult::new(
                json!({"type": query_type.tag(), "keyword": keyword}).to_string(),
            ))
        }
    }

    #[async_trait]
    impl TrendProvider for ScriptedProvider {
        fn name(&self) -> String {
            "scripted".to_string()
        }

        async fn auto_complete(
            &self,
            query: &AutoCompleteQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::AutoComplete(query.clone())).await
        }

        async fn daily_trends(
            &self,
            query: &DailyTrendsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::DailyTrends(query.clone())).await
        }

        async fn interest_over_time(
            &self,
            query: &InterestOverTimeQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::InterestOverTime(query.clone())).await
        }

        async fn interest_by_region(
            &self,
            query: &InterestByRegionQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::InterestByRegion(query.clone())).await
        }

        async fn real_time_trends(
            &self,
            query: &RealTimeTrendsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::RealTimeTrends(query.clone())).await
        }

        async fn related_queries(
            &self,
            query: &RelatedQueriesQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::RelatedQueries(query.clone())).await
        }

        async fn related_topics(
            &self,
            query: &RelatedTopicsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            self.answer(QuerySpec::RelatedTopics(query.clone())).await
        }
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    fn service_with(provider: Arc<ScriptedProvider>) -> TrendsService {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
        TrendsService::new(provider).with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn operations_decode_the_provider_payload() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = service_with(provider.clone());

        let data = service.fetch_related_queries("rust").await.unwrap();
        assert_eq!(data, json!({"type": "relatedQueries", "keyword": "rust"}));

        let data = service.fetch_real_time_trends(Some("JP")).await.unwrap();
        assert_eq!(data, json!({"type": "realTimeTrends", "keyword": ""}));
        assert_eq!(
            provider.calls()[1],
            QuerySpec::RealTimeTrends(RealTimeTrendsQuery {
                geo: "JP".to_string()
            })
        );
    }

    #[tokio::test]
    async fn keywords_reach_the_provider_unchanged() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = service_with(provider.clone());

        for _ in 0..10 {
            let keyword = format!(" {} ", Words(1..4).fake::<Vec<String>>().join(" "));
            service.fetch_auto_complete(&keyword).await.unwrap();
            service.fetch_related_topics(&keyword).await.unwrap();

            let calls = provider.calls();
            let recent = &calls[calls.len() - 2..];
            assert!(recent
                .iter()
                .all(|spec| spec.keyword() == Some(keyword.as_str())));
        }
    }

    #[tokio::test]
    async fn optional_inputs_get_defaults() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = service_with(provider.clone());

        service.fetch_daily_trends(None).await.unwrap();
        service
            .fetch_interest_by_region("rust", None, None)
            .await
            .unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                QuerySpec::DailyTrends(DailyTrendsQuery {
                    trend_date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
                    geo: "US".to_string(),
                }),
                QuerySpec::InterestByRegion(InterestByRegionQuery {
                    keyword: "rust".to_string(),
                    start_time: StartTime::At(Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()),
                    geo: "US".to_string(),
                }),
            ]
        );
    }

    #[tokio::test]
    async fn daily_trends_use_the_day_before_each_call() {
        let provider = Arc::new(ScriptedProvider::default());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 0).unwrap(),
        ));
        let service = TrendsService::new(provider.clone()).with_clock(clock.clone());

        service.fetch_daily_trends(None).await.unwrap();
        clock.set(Utc.with_ymd_and_hms(2024, 6, 16, 0, 1, 0).unwrap());
        service.fetch_daily_trends(None).await.unwrap();

        let dates: Vec<_> = provider
            .calls()
            .into_iter()
            .map(|spec| match spec {
                QuerySpec::DailyTrends(query) => query.trend_date,
                other => panic!("unexpected query {:?}", other),
            })
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn identical_calls_are_not_cached() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = service_with(provider.clone());

        service.fetch_interest_over_time("rust", None).await.unwrap();
        service.fetch_interest_over_time("rust", None).await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn provider_failures_become_fetch_errors() {
        let provider = Arc::new(ScriptedProvider {
            failing: keywords(&["rust"]),
            ..Default::default()
        });
        let service = service_with(provider);

        let error = service.fetch_related_topics("rust").await.unwrap_err();
        assert_eq!(error.query_type, QueryType::RelatedTopics);
        assert_eq!(error.to_string(), "Error fetching related topics data");
        assert!(error.is_upstream());
    }

    #[tokio::test]
    async fn malformed_payloads_become_fetch_errors() {
        let provider = Arc::new(ScriptedProvider {
            garbled: keywords(&["rust"]),
            ..Default::default()
        });
        let service = service_with(provider);

        let error = service.fetch_auto_complete("rust").await.unwrap_err();
        assert_eq!(error.to_string(), "Error fetching autocomplete data");
        assert!(matches!(error.cause, FetchFailure::Decode(_)));
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let provider = Arc::new(ScriptedProvider {
            failing: keywords(&["b"]),
            ..Default::default()
        });
        let service = service_with(provider);

        let results = service.fetch_batch(&keywords(&["a", "b", "c"]), None).await;

        assert_eq!(results.len(), 3);
        let order: Vec<_> = results.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        assert_eq!(
            results[0].data(),
            Some(&json!({"type": "interestOverTime", "keyword": "a"}))
        );
        assert_eq!(results[0].error(), None);
        assert_eq!(results[1].data(), None);
        assert_eq!(results[1].error(), Some("Error fetching trend data"));
        assert!(results[2].data().is_some());
        assert_eq!(results[2].error(), None);
    }

    #[tokio::test]
    async fn batch_keeps_input_order_when_later_keywords_finish_first() {
        let delays = [("slow", 60), ("medium", 30), ("fast", 0)]
            .into_iter()
            .map(|(keyword, ms)| (keyword.to_string(), Duration::from_millis(ms)))
            .collect();
        let provider = Arc::new(ScriptedProvider {
            delays,
            garbled: keywords(&["medium"]),
            ..Default::default()
        });
        let service = service_with(provider.clone()).with_batch_concurrency(None);

        let results = service
            .fetch_batch(&keywords(&["slow", "medium", "fast"]), None)
            .await;

        let order: Vec<_> = results.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(order, vec!["slow", "medium", "fast"]);
        assert!(results[0].data().is_some());
        assert!(results[1].error().is_some());
        assert!(results[2].data().is_some());
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn sequential_batches_share_the_start_time() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = service_with(provider.clone()).with_batch_concurrency(Some(1));
        let start_time = StartTime::parse("2024-01-01");

        let results = service
            .fetch_batch(&keywords(&["x", "y", "x"]), Some(start_time.clone()))
            .await;

        assert_eq!(results.len(), 3);
        let expected: Vec<_> = ["x", "y", "x"]
            .iter()
            .map(|keyword| {
                QuerySpec::InterestOverTime(InterestOverTimeQuery {
                    keyword: keyword.to_string(),
                    start_time: start_time.clone(),
                })
            })
            .collect();
        assert_eq!(provider.calls(), expected);
    }
}
