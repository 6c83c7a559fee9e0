//! Tools for running tests

use crate::utils::{logging::LogWatcher, metrics::MetricsWatcher};
use httpmock::MockServer;
use reqwest::{redirect, Client, ClientBuilder, RequestBuilder};
use std::{future::Future, net::TcpListener};
use tracing_futures::{Instrument, WithSubscriber};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};
use zeitgeist_settings::Settings;

/// Run a test with a fully configured Zeitgeist server.
///
/// The server will listen on a port assigned arbitrarily by the OS, and talk
/// to a mock trend provider instead of the real one.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server, the mock provider, which answers nothing until the test
/// adds mocks to it, and collectors for logs and metrics.
///
/// # Example
///
/// ```no_run
/// # use zeitgeist_integration_tests::{trends_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     trends_test(
///         |settings| settings.debug = false,
///         |TestingTools { test_client, upstream_mock, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn trends_test<FSettings, FTest, Fut>(settings_changer: FSettings, test: FTest) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: FnOnce(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("trends_test", upstream = tracing::field::Empty);

    // Load settings
    let mut settings = Settings::load_for_tests();

    // Set up logging
    let log_watcher = LogWatcher::default();
    let log_watcher_writer = log_watcher.make_writer();

    let env_filter = tracing_subscriber::EnvFilter::try_from(&settings.logging.levels)
        .expect("Invalid log levels in test settings");
    let tracing_subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(move || log_watcher_writer.clone()),
        )
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());

    let _tracing_subscriber_guard = tracing::subscriber::set_default(tracing_subscriber);

    // Point the service at a mock provider
    let upstream_mock = MockServer::start_async().await;
    settings.upstream.endpoint = upstream_mock.base_url();
    test_span.record("upstream", upstream_mock.base_url().as_str());

    settings_changer(&mut settings);

    let (metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener
        .local_addr()
        .expect("Listener has no address")
        .to_string();
    let server =
        zeitgeist_web::run(listener, metrics_client, settings).expect("Failed to start server");
    let server_handle = server.handle();
    let server_task = actix_rt::spawn(server.with_current_subscriber());
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        upstream_mock,
        log_watcher,
        metrics_watcher,
    };

    // Run the test
    let rv = test(tools).instrument(test_span).await;
    server_handle.stop(false).await;
    server_task.abort();
    rv
}

/// A set of tools for tests, including mock servers and logging helpers.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the
    /// Zeitgeist server under test.
    pub test_client: TestReqwestClient,

    /// The mock trend provider the server under test calls. It has no mock
    /// responses, any needed must be added by the test.
    pub upstream_mock: MockServer,

    /// To make assertions about logs.
    pub log_watcher: LogWatcher,

    /// To make assertions about metrics.
    pub metrics_watcher: MetricsWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// The full URL of `path` on the test server.
    fn url(&self, path: &str) -> String {
        assert!(path.starts_with('/'), "paths should start with /");
        format!("http://{}{}", &self.address, path)
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    /// Start building a POST request to the test server with the path specified.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }
}
