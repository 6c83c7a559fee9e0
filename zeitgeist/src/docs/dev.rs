//! # Developer documentation for working on Zeitgeist
//!
//! ## tl;dr
//!
//! Here are some useful commands when working on Zeitgeist.
//!
//! Run the main app
//! ```shell
//! $ cargo run -p zeitgeist
//! ```
//!
//! Run specific tests for one crate
//! ```shell
//! $ cargo test -p zeitgeist-integration-tests -- batch
//! ```
//!
//! ## Dependencies
//!
//! Zeitgeist needs no local services. Trend data comes from the HTTP endpoint
//! in `upstream.endpoint`, which defaults to Google Trends. Metrics are sent
//! over UDP to a statsd sink, and are dropped silently if nothing listens.
//!
//! ## Local configuration
//!
//! The default configuration of Zeitgeist is development, which has
//! human-oriented logging and debugging enabled. For settings that you wish to
//! change in the development configuration, you have three options.
//!
//! > For full details, make sure to check out the documentation for
//! > `zeitgeist_settings`.
//!
//! ### Update the defaults
//!
//! If the change you want to make makes the system better for most development
//! tasks, consider adding it to `config/development.yaml`, so that other
//! developers can take advantage of it. You can look at `config/base.yaml`,
//! which defines all required configuration, to see an example of the structure.
//!
//! ### Create a local override
//!
//! For local changes to adapt to your machine or tastes, you can put the
//! configuration in `config/local.yaml`. This file doesn't exist by default,
//! and is ignored by git.
//!
//! ### Use environment variables
//!
//! Any setting can be overridden by an environment variable prefixed with
//! `ZEITGEIST_`, using `__` between levels. For example, to point at a
//! different provider:
//!
//! ```shell
//! $ ZEITGEIST_UPSTREAM__ENDPOINT=http://localhost:9000 cargo run -p zeitgeist
//! ```
//!
//! To pick a configuration file other than `development`, set `ZEITGEIST_ENV`,
//! such as `ZEITGEIST_ENV=production`.
//!
//! > Note that none of the above overrides are used in tests. If you need to
//! > configure the test environment, you can edit `config/test.yaml` or create
//! > `config/local_test.yaml`.
//!
//! ## Recommended Tools
//!
//! * [rust-analyzer][] - IDE-like tools for many editors.
//! * [cargo-watch][] - A Cargo subcommand that re-runs a task when files change.
//!   Very useful for things like `cargo watch -x clippy`.
//!
//! [rust-analyzer]: https://rust-analyzer.github.io/
//! [cargo-watch]: https://crates.io/crates/cargo-watch
