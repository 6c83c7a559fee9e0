#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Zeitgeist](../zeitgeist/index.html)'s public API.

mod dockerflow;
mod endpoints;
mod errors;
mod extractors;
mod logging;
mod middleware;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    get,
    web::{self, Data, JsonConfig, QueryConfig, ServiceConfig},
    App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use cadence::StatsdClient;
use std::{net::TcpListener, sync::Arc};
use tracing_actix_web::TracingLogger;
use zeitgeist_providers::GoogleTrendsProvider;
use zeitgeist_settings::Settings;
use zeitgeist_trends::TrendsService;

use crate::logging::ZeitgeistRootSpanBuilder;

pub use crate::errors::{
    HandlerError, HandlerErrorKind, INVALID_BATCH, INVALID_KEYWORD, INVALID_TERM,
};

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if the trend provider can't be set up from `settings`, or
/// if the server cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down. This is used to run Zeitgeist as a
/// service, such as in production.
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = zeitgeist_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("zeitgeist", cadence::NopMetricSink);
/// zeitgeist_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> Result<Server> {
    let provider = GoogleTrendsProvider::new(&settings.upstream)
        .context("Setting up the trend provider")?;
    let service = TrendsService::new(Arc::new(provider))
        .with_batch_concurrency(settings.batch.max_concurrency);
    tracing::info!(
        r#type = "web.configuring",
        provider = %service.provider_name(),
        upstream = %settings.upstream.endpoint,
        batch_concurrency = ?settings.batch.max_concurrency,
        "Starting trends service"
    );

    let service = Data::new(service);
    let metrics_client = Data::new(metrics_client);
    let num_workers = settings.http.workers;
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(service.clone())
            .app_data(metrics_client.clone())
            .wrap(middleware::Metrics)
            .wrap(TracingLogger::<ZeitgeistRootSpanBuilder>::new())
            .wrap(Cors::permissive())
            .configure(configure_app)
    })
    .listen(listener)
    .context("Listening for connections")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// Add every route and extractor configuration to an app. Does not include
/// middleware or app data.
pub fn configure_app(config: &mut ServiceConfig) {
    config
        .app_data(JsonConfig::default().error_handler(extractors::batch_body_error))
        .app_data(QueryConfig::default().error_handler(extractors::query_error))
        // The core functionality of Zeitgeist
        .service(web::scope("/trends").configure(endpoints::trends::configure))
        .service(web::scope("/api/v1").configure(endpoints::trends::configure_legacy))
        .service(root_info)
        // Add the behavior necessary to satisfy Dockerflow.
        .service(web::scope("").configure(dockerflow::configure));
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this service
/// is. It should redirect to documentation, if it is available, or provide a
/// short message otherwise.
#[get("/")]
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok()
            .content_type("text/plain")
            .body("Zeitgeist is a service providing search trend data."),
    }
}
