//! Tests that Zeitgeist conforms to [Dockerflow](https://github.com/mozilla-services/dockerflow).
#![cfg(test)]

use crate::{trends_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

#[actix_rt::test]
async fn lbheartbeat_works() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__lbheartbeat__").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.content_length(), Some(0));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn heartbeat_reports_version_and_provider() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__heartbeat__").send().await?;

            assert!(response.status().is_success());
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );
            let body: Value = response.json().await?;
            assert!(body["version"].is_string());
            assert_eq!(body["provider"], "GoogleTrendsProvider");
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn version_works() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__version__").send().await?;

            assert!(response.status().is_success());
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );

            #[derive(Deserialize, Debug)]
            #[allow(dead_code)]
            struct VersionInfo {
                source: String,
                version: String,
                commit: String,
                build: String,
            }
            let body: Result<VersionInfo, _> = response.json().await;
            assert!(body.is_ok());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn error_works() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__error__").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], "Internal error");
            Ok(())
        },
    )
    .await
}
