//! # Testing strategies
//!
//! There are two major testing strategies used in this repository: unit tests,
//! and integration tests.
//!
//! Unit tests should appear close to the code they are testing, using standard
//! Rust unit tests. Code that reads the clock or calls the provider takes a
//! [`Clock`](../../../zeitgeist_trends/trait.Clock.html) or a
//! [`TrendProvider`](../../../zeitgeist_trends/trait.TrendProvider.html), so
//! tests can pin the date and script the provider's answers.
//!
//! Behavior such as the URLs and envelopes exposed by the web service is
//! tested in [`zeitgeist-integration-tests`][test-crate], which starts an
//! instance of Zeitgeist pointed at an [`httpmock`] upstream. HTTP requests can
//! then be made to that server in order to test its behavior.
//!
//! [test-crate]: ../../../zeitgeist_integration_tests/
//! [`httpmock`]: https://docs.rs/httpmock
//!
//! ```ignore
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
//!
//! For more details, see the documentation of the `zeitgeist-integration-tests`
//! crate.
