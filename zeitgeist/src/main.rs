// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A web API serving search trend data.
//!
//! Zeitgeist is split into several subcrates that work in collaboration.
//!
//! - [zeitgeist-integration-tests](../zeitgeist_integration_tests/index.html)
//! - [zeitgeist-providers](../zeitgeist_providers/index.html)
//! - [zeitgeist-settings](../zeitgeist_settings/index.html)
//! - [zeitgeist-trends](../zeitgeist_trends/index.html)
//! - [zeitgeist-web](../zeitgeist_web/index.html)

mod docs;

use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use std::net::{TcpListener, UdpSocket};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use zeitgeist_settings::{LogFormat, Settings};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;
    tracing::info!(
        r#type = "app.starting",
        env = %settings.env,
        address = %listener.local_addr().context("Reading bound address")?,
        "Starting Zeitgeist"
    );

    zeitgeist_web::run(listener, metrics_client, settings)
        .context("Starting zeitgeist-web server")?
        .await
        .context("Running zeitgeist-web server")?;

    Ok(())
}

/// Set up logging for Zeitgeist, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter = EnvFilter::try_from(&settings.logging.levels)?;

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Create a statsd client that sends metrics to the configured sink.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket
        .set_nonblocking(true)
        .context("Making metrics socket non-blocking")?;

    let sink_address = (
        settings.metrics.sink_host.as_str(),
        settings.metrics.sink_port,
    );
    let udp_sink =
        BufferedUdpMetricSink::from(sink_address, socket).context("Creating metrics sink")?;
    let queuing_sink = QueuingMetricSink::from(udp_sink);

    Ok(StatsdClient::builder("zeitgeist", queuing_sink)
        .with_error_handler(|error| {
            tracing::warn!(r#type = "app.metrics.error", %error, "Could not send metric");
        })
        .build())
}
