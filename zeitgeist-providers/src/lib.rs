#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Trend providers that answer queries for the Zeitgeist trends service.

mod google_trends;

pub use crate::google_trends::GoogleTrendsProvider;
