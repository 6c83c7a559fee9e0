//! Tests that Zeitgeist logs behave as expected.
//!
//! Request handlers run on the server's worker threads, which don't share the
//! test's subscriber, so these tests only cover what is logged on the test's
//! own thread.
#![cfg(test)]

use crate::{trends_test, TestingTools};
use anyhow::Result;
use tracing::Level;

#[actix_rt::test]
async fn startup_names_the_provider_and_upstream() -> Result<()> {
    trends_test(
        |settings| settings.batch.max_concurrency = Some(3),
        |TestingTools {
             mut log_watcher,
             upstream_mock,
             ..
         }| async move {
            let upstream = upstream_mock.base_url();
            assert!(log_watcher.has(|event| {
                event.has_type("web.configuring")
                    && event.field_contains("provider", "GoogleTrendsProvider")
                    && event.field_contains("upstream", &upstream)
                    && event.field_contains("batch_concurrency", "3")
            }));
            assert!(!log_watcher.has(|event| event.level == Level::ERROR));
            Ok(())
        },
    )
    .await
}
