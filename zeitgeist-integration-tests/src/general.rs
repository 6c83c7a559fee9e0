//! Tests of behavior that isn't specific to one route.
#![cfg(test)]

use crate::{trends_test, TestingTools};
use anyhow::Result;
use reqwest::{header::HeaderValue, StatusCode};

#[actix_rt::test]
async fn root_of_services_provides_public_docs() -> Result<()> {
    trends_test(
        |settings| settings.public_documentation = Some("https://example.com/".to_string()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location"),
                Some(&HeaderValue::from_static("https://example.com/"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_of_services_has_a_fallback_message() -> Result<()> {
    trends_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.text().await?,
                "Zeitgeist is a service providing search trend data."
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_paths_are_not_found() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/trends/nonsense").send().await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn cors_is_permissive() -> Result<()> {
    trends_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/__lbheartbeat__")
                .header("origin", "https://dashboard.example.com")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert!(response
                .headers()
                .contains_key("access-control-allow-origin"));
            Ok(())
        },
    )
    .await
}
