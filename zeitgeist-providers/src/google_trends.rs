//! A trend provider that speaks the Google Trends web API.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use zeitgeist_settings::UpstreamSettings;
use zeitgeist_trends::{
    AutoCompleteQuery, Clock, DailyTrendsQuery, InterestByRegionQuery, InterestOverTimeQuery,
    ProviderResult, QueryType, RealTimeTrendsQuery, RelatedQueriesQuery, RelatedTopicsQuery,
    StartTime, SystemClock, TrendProvider, UpstreamCallError,
};

/// The line Google prepends to JSON answers to defeat cross-site script
/// inclusion. It is sometimes followed by a comma.
const XSSI_GUARD: &str = ")]}'";

/// The first day Google Trends has data for. Related searches are asked for
/// over the whole history.
const HISTORY_START: &str = "2004-01-01";

/// Queries a Google Trends compatible HTTP API.
pub struct GoogleTrendsProvider {
    /// The HTTP client to query against the provider.
    client: reqwest::Client,

    /// Base URL that every request path is appended to.
    endpoint: Url,

    /// Sent as `hl` on every request.
    language: String,

    /// Sent as `tz` on every request.
    timezone_offset: i32,

    /// Decides what "today" is when building time windows.
    clock: Arc<dyn Clock>,
}

impl GoogleTrendsProvider {
    /// Create a provider from settings.
    ///
    /// # Errors
    /// If the endpoint is not an absolute URL or the HTTP client can't be
    /// built.
    pub fn new(settings: &UpstreamSettings) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .with_context(|| format!("Invalid upstream endpoint {:?}", settings.endpoint))?;
        if endpoint.cannot_be_a_base() {
            return Err(anyhow!(
                "Upstream endpoint {:?} cannot have paths appended to it",
                settings.endpoint
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Unable to create the Reqwest client")?;

        Ok(Self {
            client,
            endpoint,
            language: settings.language.clone(),
            timezone_offset: settings.timezone_offset,
            clock: Arc::new(SystemClock),
        })
    }

    /// Read "today" from `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the URL for a path below the endpoint. Segments are
    /// percent-encoded.
    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("Upstream endpoint cannot have paths appended to it"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make the single GET request for a query and hand back its payload
    /// with the XSSI guard removed.
    async fn get(
        &self,
        query_type: QueryType,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<ProviderResult, UpstreamCallError> {
        let url = self
            .url(segments)
            .map_err(|error| UpstreamCallError::new(query_type, error))?;
        tracing::debug!(
            r#type = "providers.google-trends.request",
            %query_type,
            %url,
            "Calling trend provider"
        );

        let response = self
            .client
            .get(url)
            .query(&[
                ("hl", self.language.clone()),
                ("tz", self.timezone_offset.to_string()),
            ])
            .query(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| UpstreamCallError::new(query_type, error))?;

        let body = response
            .text()
            .await
            .map_err(|error| UpstreamCallError::new(query_type, error))?;

        Ok(ProviderResult::new(strip_xssi_guard(&body)))
    }

    /// The `"<start> <today>"` window Google expects, with both ends as
    /// calendar dates.
    fn time_window(
        &self,
        query_type: QueryType,
        start_time: &StartTime,
    ) -> Result<String, UpstreamCallError> {
        let start = match start_time {
            StartTime::At(instant) => instant.format("%Y-%m-%d").to_string(),
            StartTime::Invalid(text) => {
                return Err(UpstreamCallError::new(
                    query_type,
                    anyhow!("start time {:?} is not a date", text),
                ))
            }
        };
        Ok(format!("{} {}", start, self.today()))
    }

    /// The current date, as Google formats it in time windows.
    fn today(&self) -> String {
        self.clock.now().format("%Y-%m-%d").to_string()
    }

    /// Options Google requires on every widget request.
    fn request_options() -> Value {
        json!({"property": "", "backend": "IZG", "category": 0})
    }

    /// Ask for related searches of either kind.
    async fn related_searches(
        &self,
        query_type: QueryType,
        keyword: &str,
        keyword_type: &str,
    ) -> Result<ProviderResult, UpstreamCallError> {
        let req = json!({
            "restriction": {
                "geo": {},
                "time": format!("{} {}", HISTORY_START, self.today()),
                "complexKeywordsRestriction": keyword_restriction(keyword),
            },
            "keywordType": keyword_type,
            "metric": ["TOP", "RISING"],
            "language": self.language,
            "requestOptions": Self::request_options(),
        });
        self.get(
            query_type,
            &["trends", "api", "widgetdata", "relatedsearches"],
            &[("req", req.to_string())],
        )
        .await
    }
}

/// Restrict a widget request to a single keyword, matched broadly.
fn keyword_restriction(keyword: &str) -> Value {
    json!({"keyword": [{"type": "BROAD", "value": keyword}]})
}

/// Remove the anti-XSSI guard from a payload, if it has one.
fn strip_xssi_guard(body: &str) -> &str {
    match body.trim_start().strip_prefix(XSSI_GUARD) {
        Some(rest) => rest.strip_prefix(',').unwrap_or(rest),
        None => body,
    }
}

#[async_trait]
impl TrendProvider for GoogleTrendsProvider {
    fn name(&self) -> String {
        "GoogleTrendsProvider".to_owned()
    }

    async fn auto_complete(
        &self,
        query: &AutoCompleteQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        self.get(
            QueryType::AutoComplete,
            &["trends", "api", "autocomplete", &query.keyword],
            &[],
        )
        .await
    }

    async fn daily_trends(
        &self,
        query: &DailyTrendsQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        self.get(
            QueryType::DailyTrends,
            &["trends", "api", "dailytrends"],
            &[
                ("geo", query.geo.clone()),
                ("ed", query.trend_date.format("%Y%m%d").to_string()),
                ("ns", "15".to_string()),
            ],
        )
        .await
    }

    async fn interest_over_time(
        &self,
        query: &InterestOverTimeQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        let query_type = QueryType::InterestOverTime;
        let req = json!({
            "time": self.time_window(query_type, &query.start_time)?,
            "resolution": "DAY",
            "locale": self.language,
            "comparisonItem": [{
                "geo": {},
                "complexKeywordsRestriction": keyword_restriction(&query.keyword),
            }],
            "requestOptions": Self::request_options(),
        });
        self.get(
            query_type,
            &["trends", "api", "widgetdata", "multiline"],
            &[("req", req.to_string())],
        )
        .await
    }

    async fn interest_by_region(
        &self,
        query: &InterestByRegionQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        let query_type = QueryType::InterestByRegion;
        let req = json!({
            "geo": {"country": query.geo},
            "comparisonItem": [{
                "time": self.time_window(query_type, &query.start_time)?,
                "complexKeywordsRestriction": keyword_restriction(&query.keyword),
            }],
            "resolution": "REGION",
            "locale": self.language,
            "requestOptions": Self::request_options(),
        });
        self.get(
            query_type,
            &["trends", "api", "widgetdata", "comparedgeo"],
            &[("req", req.to_string())],
        )
        .await
    }

    async fn real_time_trends(
        &self,
        query: &RealTimeTrendsQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        let params = [
            ("geo", query.geo.as_str()),
            ("cat", "all"),
            ("fi", "0"),
            ("fs", "0"),
            ("ri", "300"),
            ("rs", "20"),
            ("sort", "0"),
        ]
        .map(|(name, value)| (name, value.to_string()));
        self.get(
            QueryType::RealTimeTrends,
            &["trends", "api", "realtimetrends"],
            &params,
        )
        .await
    }

    async fn related_queries(
        &self,
        query: &RelatedQueriesQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        self.related_searches(QueryType::RelatedQueries, &query.keyword, "QUERY")
            .await
    }

    async fn related_topics(
        &self,
        query: &RelatedTopicsQuery,
    ) -> Result<ProviderResult, UpstreamCallError> {
        self.related_searches(QueryType::RelatedTopics, &query.keyword, "ENTITY")
            .await
    }
}
