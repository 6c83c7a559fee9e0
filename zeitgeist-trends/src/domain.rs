//! Datatypes to better represent the domain of Zeitgeist.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The kinds of query the trends provider can answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Keyword suggestions for a partial term.
    AutoComplete,
    /// The list of trending searches for a single day.
    DailyTrends,
    /// Search interest for a keyword across a time window.
    InterestOverTime,
    /// Search interest for a keyword broken down by region.
    InterestByRegion,
    /// The stories trending right now.
    RealTimeTrends,
    /// Queries searched together with a keyword.
    RelatedQueries,
    /// Topics searched together with a keyword.
    RelatedTopics,
}

impl QueryType {
    /// Every query type, in a stable order.
    pub const ALL: [QueryType; 7] = [
        QueryType::AutoComplete,
        QueryType::DailyTrends,
        QueryType::InterestOverTime,
        QueryType::InterestByRegion,
        QueryType::RealTimeTrends,
        QueryType::RelatedQueries,
        QueryType::RelatedTopics,
    ];

    /// A short, stable identifier for the query type, used in logs and metrics.
    pub fn tag(&self) -> &'static str {
        match self {
            QueryType::AutoComplete => "autocomplete",
            QueryType::DailyTrends => "dailyTrends",
            QueryType::InterestOverTime => "interestOverTime",
            QueryType::InterestByRegion => "interestByRegion",
            QueryType::RealTimeTrends => "realTimeTrends",
            QueryType::RelatedQueries => "relatedQueries",
            QueryType::RelatedTopics => "relatedTopics",
        }
    }

    /// A human readable name for the query type, used in error messages.
    pub fn description(&self) -> &'static str {
        match self {
            QueryType::AutoComplete => "autocomplete",
            QueryType::DailyTrends => "daily trends",
            QueryType::InterestOverTime => "interest over time",
            QueryType::InterestByRegion => "interest by region",
            QueryType::RealTimeTrends => "real-time trends",
            QueryType::RelatedQueries => "related queries",
            QueryType::RelatedTopics => "related topics",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The start of a time window.
///
/// Callers may hand in text that is not a date at all. That text is kept as
/// is, instead of failing early, and the provider adapter refuses to send a
/// request for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartTime {
    /// A resolved point in time.
    At(DateTime<Utc>),
    /// Caller supplied text that could not be read as a date.
    Invalid(String),
}

impl StartTime {
    /// Read a start time from text.
    ///
    /// Accepts RFC 3339 timestamps (`2024-05-01T12:00:00Z`), timestamps without
    /// an offset, which are taken to be UTC (`2024-05-01T12:00`,
    /// `2024-05-01T12:00:00.250`), and calendar dates, which are taken to be
    /// midnight UTC (`2024-05-01`).
    pub fn parse(input: &str) -> Self {
        if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
            return StartTime::At(instant.with_timezone(&Utc));
        }

        // Local times without an offset are read as UTC, with or without
        // seconds and fractions.
        let naive = input
            .parse::<NaiveDateTime>()
            .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"));
        if let Ok(naive) = naive {
            return StartTime::At(naive.and_utc());
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map_or_else(
                || StartTime::Invalid(input.to_string()),
                |naive| StartTime::At(naive.and_utc()),
            )
    }

    /// The resolved point in time, if there is one.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            StartTime::At(instant) => Some(*instant),
            StartTime::Invalid(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for StartTime {
    fn from(instant: DateTime<Utc>) -> Self {
        StartTime::At(instant)
    }
}

impl From<&str> for StartTime {
    fn from(input: &str) -> Self {
        StartTime::parse(input)
    }
}

impl From<String> for StartTime {
    fn from(input: String) -> Self {
        StartTime::parse(&input)
    }
}

/// Options for an autocomplete query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoCompleteQuery {
    /// The partial term to complete.
    pub keyword: String,
}

/// Options for a daily trends query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyTrendsQuery {
    /// The day to list trends for.
    pub trend_date: NaiveDate,
    /// The region, as an ISO 3166 code such as "US".
    pub geo: String,
}

/// Options for an interest over time query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterestOverTimeQuery {
    /// The keyword to measure.
    pub keyword: String,
    /// The start of the time window. The window ends now.
    pub start_time: StartTime,
}

/// Options for an interest by region query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterestByRegionQuery {
    /// The keyword to measure.
    pub keyword: String,
    /// The start of the time window. The window ends now.
    pub start_time: StartTime,
    /// The region to break down, as an ISO 3166 code such as "US".
    pub geo: String,
}

/// Options for a real-time trends query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealTimeTrendsQuery {
    /// The region, as an ISO 3166 code such as "US".
    pub geo: String,
}

/// Options for a related queries query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedQueriesQuery {
    /// The keyword to find related queries for.
    pub keyword: String,
}

/// Options for a related topics query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedTopicsQuery {
    /// The keyword to find related topics for.
    pub keyword: String,
}

/// A fully resolved request for one provider call.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum QuerySpec {
    AutoComplete(AutoCompleteQuery),
    DailyTrends(DailyTrendsQuery),
    InterestOverTime(InterestOverTimeQuery),
    InterestByRegion(InterestByRegionQuery),
    RealTimeTrends(RealTimeTrendsQuery),
    RelatedQueries(RelatedQueriesQuery),
    RelatedTopics(RelatedTopicsQuery),
}

impl QuerySpec {
    /// The kind of query this spec is for.
    pub fn query_type(&self) -> QueryType {
        match self {
            QuerySpec::AutoComplete(_) => QueryType::AutoComplete,
            QuerySpec::DailyTrends(_) => QueryType::DailyTrends,
            QuerySpec::InterestOverTime(_) => QueryType::InterestOverTime,
            QuerySpec::InterestByRegion(_) => QueryType::InterestByRegion,
            QuerySpec::RealTimeTrends(_) => QueryType::RealTimeTrends,
            QuerySpec::RelatedQueries(_) => QueryType::RelatedQueries,
            QuerySpec::RelatedTopics(_) => QueryType::RelatedTopics,
        }
    }

    /// The keyword of the query, for query types that have one.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            QuerySpec::AutoComplete(q) => Some(&q.keyword),
            QuerySpec::InterestOverTime(q) => Some(&q.keyword),
            QuerySpec::InterestByRegion(q) => Some(&q.keyword),
            QuerySpec::RelatedQueries(q) => Some(&q.keyword),
            QuerySpec::RelatedTopics(q) => Some(&q.keyword),
            QuerySpec::DailyTrends(_) | QuerySpec::RealTimeTrends(_) => None,
        }
    }
}

/// The raw text a provider answered with. Opaque until decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResult(String);

impl ProviderResult {
    /// Wrap a provider payload.
    pub fn new<S: Into<String>>(body: S) -> Self {
        Self(body.into())
    }

    /// Borrow the payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the payload.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A decoded provider payload. Its shape depends on the query type, and is
/// not fixed by Zeitgeist.
pub type DecodedResult = serde_json::Value;

/// The outcome for a single keyword of a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchItemResult {
    /// The keyword, exactly as it was submitted.
    pub keyword: String,

    /// Either the data for the keyword or why it could not be fetched.
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Exactly one of data or an error. Serialized as a `data` or `error` key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum BatchOutcome {
    Data(DecodedResult),
    Error(String),
}

impl BatchItemResult {
    /// The data fetched for the keyword, if fetching succeeded.
    pub fn data(&self) -> Option<&DecodedResult> {
        match &self.outcome {
            BatchOutcome::Data(data) => Some(data),
            BatchOutcome::Error(_) => None,
        }
    }

    /// The error message for the keyword, if fetching failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Data(_) => None,
            BatchOutcome::Error(message) => Some(message),
        }
    }
}

/// One entry per submitted keyword, in submission order.
pub type BatchResult = Vec<BatchItemResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn start_time_reads_rfc3339() {
        assert_eq!(
            StartTime::parse("2024-05-01T12:30:00+02:00"),
            StartTime::At(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn start_time_reads_calendar_dates_as_midnight_utc() {
        assert_eq!(
            StartTime::parse("2024-05-01"),
            StartTime::At(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            StartTime::parse("2024-05-01T08:00:00"),
            StartTime::At(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn start_time_reads_local_times_without_seconds_or_with_fractions() {
        assert_eq!(
            StartTime::parse("2024-05-01T12:00"),
            StartTime::At(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            StartTime::parse("2024-05-01T12:00:00.000"),
            StartTime::At(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            StartTime::parse("2024-05-01T12:00:30.250").instant(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 30)
                .single()
                .map(|instant| instant + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            StartTime::parse("2024-05-01T12"),
            StartTime::Invalid("2024-05-01T12".to_string())
        );
    }

    #[test]
    fn start_time_keeps_unreadable_text() {
        let start_time = StartTime::parse("last tuesday");
        assert_eq!(start_time, StartTime::Invalid("last tuesday".to_string()));
        assert_eq!(start_time.instant(), None);
    }

    #[test]
    fn query_spec_reports_type_and_keyword() {
        let spec = QuerySpec::RelatedTopics(RelatedTopicsQuery {
            keyword: "rust".to_string(),
        });
        assert_eq!(spec.query_type(), QueryType::RelatedTopics);
        assert_eq!(spec.keyword(), Some("rust"));

        let spec = QuerySpec::RealTimeTrends(RealTimeTrendsQuery {
            geo: "DE".to_string(),
        });
        assert_eq!(spec.query_type(), QueryType::RealTimeTrends);
        assert_eq!(spec.keyword(), None);
    }

    #[test]
    fn batch_items_serialize_exactly_one_outcome() {
        let ok = BatchItemResult {
            keyword: "a".to_string(),
            outcome: BatchOutcome::Data(json!({"default": []})),
        };
        let failed = BatchItemResult {
            keyword: "b".to_string(),
            outcome: BatchOutcome::Error("Error fetching trend data".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"keyword": "a", "data": {"default": []}})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"keyword": "b", "error": "Error fetching trend data"})
        );
    }
}
