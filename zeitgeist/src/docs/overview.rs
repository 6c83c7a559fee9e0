//! # High level overview of Zeitgeist
//!
//! This project is structured as a [Cargo Workspace][] that contains one crate
//! for each broad area of behavior for Zeitgeist. Each crate can be compiled
//! and tested on its own, or together with the rest of the workspace.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! This is a brief overview of the crates found in the repository. For more
//! details, see the specific crate docs.
//!
//! ## [`zeitgeist`](../)
//!
//! The main application, and the only *binary* crate in the repository. It
//! loads settings, sets up logging and metrics, and runs the web server.
//!
//! ## [`zeitgeist-settings`](../../zeitgeist_settings/index.html)
//!
//! Defines and documents the settings of the application. Settings are loaded
//! by the binary and passed into the other crates to configure them.
//!
//! ## [`zeitgeist-web`](../../zeitgeist_web/index.html)
//!
//! The HTTP API. It validates requests, calls the trends service, and wraps
//! results in JSON envelopes. It also serves the Dockerflow endpoints.
//!
//! ## [`zeitgeist-trends`](../../zeitgeist_trends/index.html)
//!
//! The *domain* crate. It defines the query types, fills in defaults for
//! optional input, decodes provider payloads, and fans batches out over the
//! [`TrendProvider`](../../zeitgeist_trends/trait.TrendProvider.html) trait.
//!
//! ## [`zeitgeist-providers`](../../zeitgeist_providers/index.html)
//!
//! Implementations of `TrendProvider`. The only one today speaks the Google
//! Trends web API over HTTP.
//!
//! ## [`zeitgeist-integration-tests`](../../zeitgeist_integration_tests/index.html)
//!
//! Runs the whole service against a mock upstream and exercises it through
//! its public HTTP API.
