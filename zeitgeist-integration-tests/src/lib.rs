#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for Zeitgeist that work by reading from the external API only.
//!
//! Since the URL endpoints Zeitgeist exposes to the world are its public API,
//! and other systems depend on them, the paths and envelopes used in tests here
//! are important details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `zeitgeist/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`trends_test`], which starts a mock
//! upstream provider, sets up the application for testing, and provides helpers
//! to inspect the state of the app. It then calls the test function that is
//! passed to it, providing the above tools as an argument.
//!
//! ```no_run
//! use zeitgeist_integration_tests::{trends_test, TestingTools};
//! use reqwest::StatusCode;
//!
//! #[actix_rt::test]
//! async fn lbheartbeat_works() {
//!     trends_test(
//!         |_| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/__lbheartbeat__")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), StatusCode::OK);
//!             assert_eq!(response.content_length(), Some(0));
//!         },
//!     )
//!     .await
//! }
//! ```

mod batch;
mod dockerflow;
mod general;
mod logging;
mod trends;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    metrics::MetricsWatcher,
    test_tools::{trends_test, TestReqwestClient, TestingTools},
};
