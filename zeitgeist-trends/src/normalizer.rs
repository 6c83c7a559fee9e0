//! Resolves optional caller input into fully specified queries.
//!
//! Normalization never fails. Defaults are computed from a [`Clock`], so the
//! date policies can be pinned in tests:
//!
//! - a missing geo is `"US"`,
//! - a missing start time is one calendar month before now,
//! - the daily trends date is always yesterday.

use crate::domain::{
    AutoCompleteQuery, DailyTrendsQuery, InterestByRegionQuery, InterestOverTimeQuery, QuerySpec,
    RealTimeTrendsQuery, RelatedQueriesQuery, RelatedTopicsQuery, StartTime,
};
use chrono::{DateTime, Months, NaiveDate, Utc};
use std::sync::Arc;

/// The region used when a caller does not pick one.
pub const DEFAULT_GEO: &str = "US";

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Only built for tests, here and in
/// crates that enable the `test-support` feature.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct FixedClock(std::sync::Mutex<DateTime<Utc>>);

#[cfg(any(test, feature = "test-support"))]
impl FixedClock {
    /// Make a clock stopped at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(std::sync::Mutex::new(now))
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Applies the default policies to caller input.
#[derive(Clone)]
pub struct Normalizer {
    /// Where "now" comes from.
    clock: Arc<dyn Clock>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Normalizer {
    /// Make a normalizer that reads the time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The start time to use when none is given: one calendar month before now.
    ///
    /// Month arithmetic follows chrono: the time of day is kept, and a day
    /// that does not exist in the previous month is clamped to that month's
    /// last day, so March 31st becomes February 28th (or 29th).
    pub fn default_start_time(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        now.checked_sub_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Resolve a start time. Text is parsed, instants pass through unchanged,
    /// and a missing value becomes [`Self::default_start_time`].
    pub fn resolve_start_time<T: Into<StartTime>>(&self, input: Option<T>) -> StartTime {
        input.map_or_else(|| StartTime::At(self.default_start_time()), Into::into)
    }

    /// Resolve a region. Missing and empty values become [`DEFAULT_GEO`].
    pub fn resolve_geo(&self, input: Option<&str>) -> String {
        match input {
            Some(geo) if !geo.is_empty() => geo.to_string(),
            _ => DEFAULT_GEO.to_string(),
        }
    }

    /// The date daily trends are listed for: the day before today.
    pub fn resolve_trend_date(&self) -> NaiveDate {
        let today = self.clock.now().date_naive();
        today.pred_opt().unwrap_or(NaiveDate::MIN)
    }

    /// Resolve an autocomplete query.
    pub fn auto_complete(&self, term: &str) -> QuerySpec {
        QuerySpec::AutoComplete(AutoCompleteQuery {
            keyword: term.to_string(),
        })
    }

    /// Resolve a daily trends query.
    pub fn daily_trends(&self, geo: Option<&str>) -> QuerySpec {
        QuerySpec::DailyTrends(DailyTrendsQuery {
            trend_date: self.resolve_trend_date(),
            geo: self.resolve_geo(geo),
        })
    }

    /// Resolve an interest over time query.
    pub fn interest_over_time(&self, keyword: &str, start_time: Option<StartTime>) -> QuerySpec {
        QuerySpec::InterestOverTime(InterestOverTimeQuery {
            keyword: keyword.to_string(),
            start_time: self.resolve_start_time(start_time),
        })
    }

    /// Resolve an interest by region query.
    pub fn interest_by_region(
        &self,
        keyword: &str,
        start_time: Option<StartTime>,
        geo: Option<&str>,
    ) -> QuerySpec {
        QuerySpec::InterestByRegion(InterestByRegionQuery {
            keyword: keyword.to_string(),
            start_time: self.resolve_start_time(start_time),
            geo: self.resolve_geo(geo),
        })
    }

    /// Resolve a real-time trends query.
    pub fn real_time_trends(&self, geo: Option<&str>) -> QuerySpec {
        QuerySpec::RealTimeTrends(RealTimeTrendsQuery {
            geo: self.resolve_geo(geo),
        })
    }

    /// Resolve a related queries query.
    pub fn related_queries(&self, keyword: &str) -> QuerySpec {
        QuerySpec::RelatedQueries(RelatedQueriesQuery {
            keyword: keyword.to_string(),
        })
    }

    /// Resolve a related topics query.
    pub fn related_topics(&self, keyword: &str) -> QuerySpec {
        QuerySpec::RelatedTopics(RelatedTopicsQuery {
            keyword: keyword.to_string(),
        })
    }
}
