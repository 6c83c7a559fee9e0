//! Tests of the single-query trends routes, against a mock provider.
#![cfg(test)]

use crate::{
    trends_test,
    utils::upstream::{answer_json, answer_status},
    TestingTools,
};
use anyhow::Result;
use httpmock::Method::GET;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use zeitgeist_web::{INVALID_KEYWORD, INVALID_TERM};

#[actix_rt::test]
async fn autocomplete_wraps_the_provider_answer() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let payload = json!({"default": {"topics": [{"title": "Rust"}]}});
            let mock = answer_json(&upstream_mock, "/trends/api/autocomplete/rus", &payload).await;

            let response = test_client.get("/trends/autocomplete?term=rus").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"term": "rus", "data": payload}));
            mock.assert_async().await;
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn daily_trends_default_to_the_us() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/trends/api/dailytrends")
                        .query_param("geo", "US")
                        .query_param_exists("ed");
                    then.status(200).body(")]}',\n{\"default\":{\"trendingSearchesDays\":[]}}");
                })
                .await;

            let response = test_client.get("/trends/daily").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({"geo": "US", "data": {"default": {"trendingSearchesDays": []}}})
            );
            mock.assert_async().await;
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn interest_by_region_echoes_the_geo() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let payload = json!({"default": {"geoMapData": []}});
            answer_json(&upstream_mock, "/trends/api/widgetdata/comparedgeo", &payload).await;

            let response = test_client
                .get("/trends/interestByRegion?keyword=rust&geo=FR&startTime=2024-01-01")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"keyword": "rust", "geo": "FR", "data": payload}));
            Ok(())
        },
    )
    .await
}

/// Each route, the provider path it calls, and the envelope field naming the
/// request.
const ROUTES: &[(&str, &str, &str)] = &[
    ("/trends/interestOverTime?keyword=rust", "/trends/api/widgetdata/multiline", "keyword"),
    ("/trends/realTime?geo=JP", "/trends/api/realtimetrends", "geo"),
    ("/trends/relatedQueries?keyword=rust", "/trends/api/widgetdata/relatedsearches", "keyword"),
    ("/trends/relatedTopics?keyword=rust", "/trends/api/widgetdata/relatedsearches", "keyword"),
    ("/api/v1/autocomplete?keyword=rust", "/trends/api/autocomplete/rust", "term"),
    ("/api/v1/daily-trends", "/trends/api/dailytrends", "geo"),
    ("/api/v1/interest-over-time?keyword=rust", "/trends/api/widgetdata/multiline", "keyword"),
    ("/api/v1/related-queries?keyword=rust", "/trends/api/widgetdata/relatedsearches", "keyword"),
];

#[actix_rt::test]
async fn routes_call_the_provider_once() -> Result<()> {
    for (route, upstream_path, envelope) in ROUTES {
        trends_test(
            |_| (),
            |TestingTools {
                 test_client,
                 upstream_mock,
                 ..
             }| async move {
                let payload = json!({"default": {"route": route}});
                let mock = answer_json(&upstream_mock, upstream_path, &payload).await;

                let response = test_client.get(route).send().await?;

                assert_eq!(response.status(), StatusCode::OK, "{}", route);
                let body: Value = response.json().await?;
                assert_eq!(body["data"], payload);
                assert!(body[*envelope].is_string(), "{} has no {}", route, envelope);
                assert_eq!(mock.hits_async().await, 1);
                Ok::<(), anyhow::Error>(())
            },
        )
        .await?;
    }
    Ok(())
}

#[actix_rt::test]
async fn identical_requests_both_reach_the_provider() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock = answer_json(
                &upstream_mock,
                "/trends/api/widgetdata/relatedsearches",
                &json!({}),
            )
            .await;

            for _ in 0..2 {
                let response = test_client
                    .get("/trends/relatedQueries?keyword=rust")
                    .send()
                    .await?;
                assert_eq!(response.status(), StatusCode::OK);
            }

            assert_eq!(mock.hits_async().await, 2);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn provider_errors_are_500() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             mut metrics_watcher,
             ..
         }| async move {
            answer_status(&upstream_mock, "/trends/api/realtimetrends", 503).await;

            let response = test_client.get("/trends/realTime").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"error": "Error fetching real-time trends data"}));
            assert!(metrics_watcher.has_counter("trends.fetch.error"));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn malformed_provider_answers_are_500() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.path("/trends/api/autocomplete/rust");
                    then.status(200).body("<html>Sorry, try again later</html>");
                })
                .await;

            let response = test_client.get("/trends/autocomplete?keyword=rust").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"error": "Error fetching autocomplete data"}));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unreadable_start_times_fail_without_calling_the_provider() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let mock =
                answer_json(&upstream_mock, "/trends/api/widgetdata/multiline", &json!({})).await;

            let response = test_client
                .get("/trends/interestOverTime?keyword=rust&startTime=last%20week")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body, json!({"error": "Error fetching interest over time data"}));
            assert_eq!(mock.hits_async().await, 0);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn missing_parameters_are_400() -> Result<()> {
    let cases = [
        ("/trends/autocomplete", INVALID_TERM),
        ("/trends/autocomplete?term=", INVALID_TERM),
        ("/api/v1/autocomplete", INVALID_TERM),
        ("/trends/interestOverTime", INVALID_KEYWORD),
        ("/trends/interestByRegion?geo=US", INVALID_KEYWORD),
        ("/trends/relatedQueries?keyword=", INVALID_KEYWORD),
        ("/trends/relatedTopics", INVALID_KEYWORD),
        ("/api/v1/interest-over-time", INVALID_KEYWORD),
        ("/api/v1/related-queries", INVALID_KEYWORD),
    ];

    for (route, message) in cases {
        trends_test(
            |_| (),
            |TestingTools {
                 test_client,
                 upstream_mock,
                 ..
             }| async move {
                let anything = upstream_mock
                    .mock_async(|_, then| {
                        then.status(200);
                    })
                    .await;

                let response = test_client.get(route).send().await?;

                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
                let body: Value = response.json().await?;
                assert_eq!(body, json!({ "error": message }));
                assert_eq!(anything.hits_async().await, 0);
                Ok::<(), anyhow::Error>(())
            },
        )
        .await?;
    }
    Ok(())
}
