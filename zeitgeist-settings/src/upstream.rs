use serde::{Deserialize, Serialize};

/// Settings for the upstream trend-data provider.
///
/// The provider is spoken to over HTTP. Every query type is served from a
/// fixed path below `endpoint`, so pointing `endpoint` at a mock server is
/// enough to run the service without network access.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the provider, without a trailing slash, such as
    /// `https://trends.google.com`.
    pub endpoint: String,

    /// The host language sent with every request (`hl`), such as `en-US`.
    pub language: String,

    /// Timezone offset from UTC in minutes sent with every request (`tz`).
    /// Follows the provider's convention, where positive values are west of UTC.
    pub timezone_offset: i32,

    /// The `User-Agent` header sent to the provider.
    pub user_agent: String,
}
