#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Zeitgeist Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `ZEITGEIST_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration and secrets if desired.
//! 4. Environment variables that begin with `ZEITGEIST_` and have a separator
//!    for `__`. For example, `Settings::http::workers` can be controlled from
//!    the environment variable `ZEITGEIST_HTTP__WORKERS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format supported
//! by the [config] crate can be used, including JSON and TOML. To choose another
//! format, simply use a different extension for your file, like
//! `config/local.toml`.

mod logging;
mod upstream;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};
pub use upstream::UpstreamSettings;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top level settings object for Zeitgeist.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[doc(inline)]
pub struct Settings {
    /// The environment Zeitgeist is running in. Should only be set with the
    /// `ZEITGEIST_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// A URL the root of the service redirects to. If unset, the root view
    /// returns a short description of the service instead.
    pub public_documentation: Option<String>,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for the upstream trend-data provider.
    pub upstream: UpstreamSettings,

    /// Settings for batch requests.
    pub batch: BatchSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the batch interest-over-time endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSettings {
    /// The maximum number of keywords fetched from the provider at once. If
    /// no value is provided, every keyword in a batch is fetched concurrently.
    /// A value of 1 fetches keywords one after the other.
    pub max_concurrency: Option<usize>,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to, such as "127.0.0.1".
    pub sink_host: String,

    /// The UDP port to send metrics to.
    pub sink_port: u16,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let zeitgeist_env =
            std::env::var("ZEITGEIST_ENV").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            .set_override("env", zeitgeist_env.as_str())?
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("config/{}", zeitgeist_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "ZEITGEIST_" and have
            // "__" to separate levels. For example, `ZEITGEIST_HTTP__LISTEN`
            // maps to `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("ZEITGEIST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load settings from configuration files for tests.
    ///
    /// Paths are relative to a crate directory of the workspace, which is the
    /// working directory `cargo test` uses.
    ///
    /// # Panics
    /// If the test configuration files are missing or invalid.
    pub fn load_for_tests() -> Self {
        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("../config/base"))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            // Merge in test specific config.
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .build()
            .expect("Could not load settings for tests")
            .try_deserialize()
            .expect("Could not convert settings")
    }
}
