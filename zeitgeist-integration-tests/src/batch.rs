//! Tests of batch interest over time requests.
#![cfg(test)]

use crate::{
    trends_test,
    utils::upstream::{
        answer_multiline_when, fail_multiline_when, is_for_boom, is_for_slow, is_not_for_boom,
        is_not_for_slow,
    },
    TestingTools,
};
use anyhow::Result;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use zeitgeist_web::INVALID_BATCH;

#[actix_rt::test]
async fn one_failing_keyword_does_not_fail_the_batch() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             mut metrics_watcher,
             ..
         }| async move {
            let payload = json!({"default": {"timelineData": []}});
            let good = answer_multiline_when(
                &upstream_mock,
                is_not_for_boom,
                &payload,
                Duration::ZERO,
            )
            .await;
            let bad = fail_multiline_when(&upstream_mock, is_for_boom).await;

            let response = test_client
                .post("/trends/batch")
                .json(&json!({"keywords": ["rust", "boom", "zig"]}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(
                body,
                json!({"results": [
                    {"keyword": "rust", "data": payload},
                    {"keyword": "boom", "error": "Error fetching trend data"},
                    {"keyword": "zig", "data": payload},
                ]})
            );
            assert_eq!(good.hits_async().await, 2);
            assert_eq!(bad.hits_async().await, 1);
            assert!(metrics_watcher.has_histogram("trends.batch.size", 3.0));
            assert!(metrics_watcher.has_histogram("trends.batch.failures", 1.0));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn results_keep_the_request_order() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let payload = json!({"default": {"timelineData": []}});
            answer_multiline_when(
                &upstream_mock,
                is_for_slow,
                &payload,
                Duration::from_millis(300),
            )
            .await;
            answer_multiline_when(&upstream_mock, is_not_for_slow, &payload, Duration::ZERO)
                .await;

            let response = test_client
                .post("/trends/batch")
                .json(&json!({"keywords": ["slow", "fast", "quick"], "startTime": "2024-01-01"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            let keywords: Vec<&str> = body["results"]
                .as_array()
                .map(|results| {
                    results
                        .iter()
                        .filter_map(|item| item["keyword"].as_str())
                        .collect()
                })
                .unwrap_or_default();
            assert_eq!(keywords, vec!["slow", "fast", "quick"]);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn sequential_batches_still_answer_every_keyword() -> Result<()> {
    trends_test(
        |settings| settings.batch.max_concurrency = Some(1),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let payload = json!({"default": {"timelineData": []}});
            let mock =
                answer_multiline_when(&upstream_mock, is_not_for_boom, &payload, Duration::ZERO)
                    .await;

            let response = test_client
                .post("/api/v1/batch-trends")
                .json(&json!({"keywords": ["a", "b", "c", "d"]}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await?;
            assert_eq!(body["results"].as_array().map(Vec::len), Some(4));
            assert_eq!(mock.hits_async().await, 4);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn bad_batch_bodies_are_400() -> Result<()> {
    let bodies = [
        json!({"keywords": []}),
        json!({}),
        json!({"keywords": "rust"}),
        json!({"keywords": [1, 2]}),
    ];

    for request_body in bodies {
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

                let response = test_client
                    .post("/trends/batch")
                    .json(&request_body)
                    .send()
                    .await?;

                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", request_body);
                let body: Value = response.json().await?;
                assert_eq!(body, json!({ "error": INVALID_BATCH }));
                assert_eq!(anything.hits_async().await, 0);
                Ok::<(), anyhow::Error>(())
            },
        )
        .await?;
    }
    Ok(())
}
