//! Web handlers for trend data.
//!
//! Two route families share these handlers: the current `/trends/...` routes
//! and the older `/api/v1/...` routes, which some clients still call.

use crate::{
    errors::{HandlerError, INVALID_KEYWORD, INVALID_TERM},
    extractors::{required, BatchBody, TrendsParams},
};
use actix_web::{
    web::{self, Data, Json, Query, ServiceConfig},
    HttpResponse,
};
use cadence::{CountedExt, Histogrammed, StatsdClient};
use serde::Serialize;
use zeitgeist_trends::{BatchResult, DecodedResult, TrendsFetchError, TrendsService};

/// Configure the `/trends` routes.
pub fn configure(config: &mut ServiceConfig) {
    config
        .route("/autocomplete", web::get().to(autocomplete))
        .route("/daily", web::get().to(daily_trends))
        .route("/interestOverTime", web::get().to(interest_over_time))
        .route("/interestByRegion", web::get().to(interest_by_region))
        .route("/realTime", web::get().to(real_time_trends))
        .route("/relatedQueries", web::get().to(related_queries))
        .route("/relatedTopics", web::get().to(related_topics))
        .route("/batch", web::post().to(batch));
}

/// Configure the `/api/v1` routes.
pub fn configure_legacy(config: &mut ServiceConfig) {
    config
        .route("/autocomplete", web::get().to(legacy_autocomplete))
        .route("/daily-trends", web::get().to(daily_trends))
        .route("/interest-over-time", web::get().to(interest_over_time))
        .route("/related-queries", web::get().to(related_queries))
        .route("/batch-trends", web::post().to(batch));
}

/// Response for autocomplete.
#[derive(Debug, Serialize)]
struct TermResponse<'a> {
    /// The term that was completed.
    term: &'a str,
    /// Suggestions from the provider.
    data: DecodedResult,
}

/// Response for queries about a region.
#[derive(Debug, Serialize)]
struct GeoResponse {
    /// The region the data is for, after defaults.
    geo: String,
    /// Trend data from the provider.
    data: DecodedResult,
}

/// Response for queries about a keyword.
#[derive(Debug, Serialize)]
struct KeywordResponse<'a> {
    /// The keyword the data is for.
    keyword: &'a str,
    /// Trend data from the provider.
    data: DecodedResult,
}

/// Response for queries about a keyword in a region.
#[derive(Debug, Serialize)]
struct KeywordGeoResponse<'a> {
    /// The keyword the data is for.
    keyword: &'a str,
    /// The region the data is for, after defaults.
    geo: String,
    /// Trend data from the provider.
    data: DecodedResult,
}

/// Response for batches.
#[derive(Debug, Serialize)]
struct BatchResponse {
    /// One entry per keyword, in request order.
    results: BatchResult,
}

/// Suggest keywords for a partial term, read from `term` or else `keyword`.
async fn autocomplete(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let term = required(
        &[params.term.as_deref(), params.keyword.as_deref()],
        INVALID_TERM,
    )?;
    complete(term, &service, &metrics_client).await
}

/// Suggest keywords for a partial term, read from `keyword` or else `term`.
async fn legacy_autocomplete(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let term = required(
        &[params.keyword.as_deref(), params.term.as_deref()],
        INVALID_TERM,
    )?;
    complete(term, &service, &metrics_client).await
}

/// Shared by both autocomplete routes.
async fn complete(
    term: &str,
    service: &TrendsService,
    metrics_client: &StatsdClient,
) -> Result<HttpResponse, HandlerError> {
    let data = service
        .fetch_auto_complete(term)
        .await
        .map_err(|error| report(metrics_client, error))?;
    Ok(HttpResponse::Ok().json(TermResponse { term, data }))
}

/// List yesterday's trending searches.
async fn daily_trends(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let geo = params.geo();
    let data = service
        .fetch_daily_trends(geo)
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(GeoResponse {
        geo: service.normalizer().resolve_geo(geo),
        data,
    }))
}

/// Measure interest in a keyword over time.
async fn interest_over_time(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let keyword = required(&[params.keyword.as_deref()], INVALID_KEYWORD)?;
    let data = service
        .fetch_interest_over_time(keyword, params.start_time())
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(KeywordResponse { keyword, data }))
}

/// Measure interest in a keyword by region.
async fn interest_by_region(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let keyword = required(&[params.keyword.as_deref()], INVALID_KEYWORD)?;
    let geo = params.geo();
    let data = service
        .fetch_interest_by_region(keyword, params.start_time(), geo)
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(KeywordGeoResponse {
        keyword,
        geo: service.normalizer().resolve_geo(geo),
        data,
    }))
}

/// List the stories trending right now.
async fn real_time_trends(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let geo = params.geo();
    let data = service
        .fetch_real_time_trends(geo)
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(GeoResponse {
        geo: service.normalizer().resolve_geo(geo),
        data,
    }))
}

/// Find queries related to a keyword.
async fn related_queries(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let keyword = required(&[params.keyword.as_deref()], INVALID_KEYWORD)?;
    let data = service
        .fetch_related_queries(keyword)
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(KeywordResponse { keyword, data }))
}

/// Find topics related to a keyword.
async fn related_topics(
    params: Query<TrendsParams>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let keyword = required(&[params.keyword.as_deref()], INVALID_KEYWORD)?;
    let data = service
        .fetch_related_topics(keyword)
        .await
        .map_err(|error| report(&metrics_client, error))?;
    Ok(HttpResponse::Ok().json(KeywordResponse { keyword, data }))
}

/// Measure interest over time for many keywords at once. Keywords that fail
/// are reported in the results instead of failing the request.
async fn batch(
    body: Json<BatchBody>,
    service: Data<TrendsService>,
    metrics_client: Data<StatsdClient>,
) -> Result<HttpResponse, HandlerError> {
    let keywords = body.keywords()?;
    let results = service.fetch_batch(keywords, body.start_time()).await;

    let failures = results.iter().filter(|item| item.error().is_some()).count();
    tracing::info!(
        r#type = "web.batch.completed",
        keyword_count = keywords.len(),
        failures,
        "Batch completed"
    );
    metrics_client
        .histogram("trends.batch.size", keywords.len() as u64)
        .ok();
    metrics_client
        .histogram("trends.batch.failures", failures as u64)
        .ok();

    Ok(HttpResponse::Ok().json(BatchResponse { results }))
}

/// Log and count a failed fetch, and turn it into a handler error.
fn report(metrics_client: &StatsdClient, error: TrendsFetchError) -> HandlerError {
    let cause = if error.is_upstream() {
        "upstream"
    } else {
        "decode"
    };
    tracing::error!(
        r#type = "web.trends.fetch-error",
        query_type = %error.query_type,
        cause,
        error = ?error,
        "Error fetching trend data"
    );
    metrics_client
        .incr_with_tags("trends.fetch.error")
        .with_tag("type", error.query_type.tag())
        .with_tag("cause", cause)
        .send();
    error.into()
}

#[cfg(test)]
mod tests {
    use crate::configure_app;
    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        web::Data,
        App,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use cadence::{NopMetricSink, StatsdClient};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use zeitgeist_trends::{
        AutoCompleteQuery, DailyTrendsQuery, InterestByRegionQuery, InterestOverTimeQuery,
        ProviderResult, QueryType, RealTimeTrendsQuery, RelatedQueriesQuery, RelatedTopicsQuery,
        TrendProvider, TrendsService, UpstreamCallError,
    };

    /// Answers every query with its type and keyword, and fails for the
    /// keyword "boom".
    struct EchoProvider;

    impl EchoProvider {
        fn answer(
            query_type: QueryType,
            keyword: &str,
        ) -> Result<ProviderResult, UpstreamCallError> {
            if keyword == "boom" {
                return Err(UpstreamCallError::new(query_type, anyhow!("503")));
            }
            Ok(ProviderResult::new(
                json!({"type": query_type.tag(), "keyword": keyword}).to_string(),
            ))
        }
    }

    #[async_trait]
    impl TrendProvider for EchoProvider {
        fn name(&self) -> String {
            "echo".to_string()
        }

        async fn auto_complete(
            &self,
            query: &AutoCompleteQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::AutoComplete, &query.keyword)
        }

        async fn daily_trends(
            &self,
            query: &DailyTrendsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::DailyTrends, &query.geo)
        }

        async fn interest_over_time(
            &self,
            query: &InterestOverTimeQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::InterestOverTime, &query.keyword)
        }

        async fn interest_by_region(
            &self,
            query: &InterestByRegionQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::InterestByRegion, &query.keyword)
        }

        async fn real_time_trends(
            &self,
            query: &RealTimeTrendsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::RealTimeTrends, &query.geo)
        }

        async fn related_queries(
            &self,
            query: &RelatedQueriesQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::RelatedQueries, &query.keyword)
        }

        async fn related_topics(
            &self,
            query: &RelatedTopicsQuery,
        ) -> Result<ProviderResult, UpstreamCallError> {
            Self::answer(QueryType::RelatedTopics, &query.keyword)
        }
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(Data::new(TrendsService::new(Arc::new(EchoProvider))))
                    .app_data(Data::new(StatsdClient::from_sink("", NopMetricSink)))
                    .configure(configure_app),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn autocomplete_reads_term_then_keyword() {
        let app = app!();

        let request = TestRequest::get()
            .uri("/trends/autocomplete?term=ru&keyword=ignored")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({"term": "ru", "data": {"type": "autocomplete", "keyword": "ru"}})
        );

        let request = TestRequest::get()
            .uri("/api/v1/autocomplete?term=ignored&keyword=ru")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["term"], json!("ru"));
    }

    #[actix_rt::test]
    async fn geo_routes_echo_the_resolved_geo() {
        let app = app!();

        let request = TestRequest::get().uri("/trends/daily").to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["geo"], json!("US"));

        let request = TestRequest::get()
            .uri("/trends/interestByRegion?keyword=rust&geo=DE")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({
                "keyword": "rust",
                "geo": "DE",
                "data": {"type": "interestByRegion", "keyword": "rust"},
            })
        );
    }

    #[actix_rt::test]
    async fn missing_keywords_are_rejected() {
        let app = app!();

        for uri in [
            "/trends/interestOverTime",
            "/trends/relatedQueries?keyword=",
            "/trends/relatedTopics?term=rust",
            "/api/v1/interest-over-time",
        ] {
            let response = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(response).await;
            assert_eq!(body, json!({"error": "Please provide a valid keyword"}));
        }

        let response = test::call_service(
            &app,
            TestRequest::get().uri("/trends/autocomplete").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body,
            json!({"error": "Please provide a valid term for autocomplete"})
        );
    }

    #[actix_rt::test]
    async fn fetch_failures_are_500() {
        let app = app!();

        let response = test::call_service(
            &app,
            TestRequest::get()
                .uri("/trends/relatedTopics?keyword=boom")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "Error fetching related topics data"}));
    }

    #[actix_rt::test]
    async fn batches_report_failures_per_keyword() {
        let app = app!();

        let request = TestRequest::post()
            .uri("/trends/batch")
            .set_json(json!({"keywords": ["a", "boom", "c"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(
            body,
            json!({"results": [
                {"keyword": "a", "data": {"type": "interestOverTime", "keyword": "a"}},
                {"keyword": "boom", "error": "Error fetching trend data"},
                {"keyword": "c", "data": {"type": "interestOverTime", "keyword": "c"}},
            ]})
        );
    }

    #[actix_rt::test]
    async fn unusable_batches_are_rejected() {
        let app = app!();

        for body in [
            json!({"keywords": []}),
            json!({}),
            json!({"keywords": "a"}),
        ] {
            let request = TestRequest::post()
                .uri("/api/v1/batch-trends")
                .set_json(&body)
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
            let error: Value = test::read_body_json(response).await;
            assert_eq!(
                error,
                json!({"error": "Please provide an array of keywords for batch processing"})
            );
        }

        let request = TestRequest::post()
            .uri("/trends/batch")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
