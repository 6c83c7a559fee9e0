//! Middlewares specific to Zeitgeist.

mod metrics;

pub use self::metrics::Metrics;
