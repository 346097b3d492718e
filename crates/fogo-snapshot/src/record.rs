//! Wire-level fire record as reported by the upstream snapshot JSON.
//!
//! Every field except `id` is optional: the upstream feed drops and renames
//! fields freely, and a record that decodes partially is still worth
//! tracking.  The raw JSON object is kept alongside the typed fields so the
//! event log can persist the payload verbatim.

use serde::Deserialize;
use serde_json::Value;

/// Nested epoch-seconds timestamp object (`{"sec": 1690000000}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EpochSec {
    /// UTC epoch seconds.
    pub sec: i64,
}

/// One fire as listed in a single snapshot.
///
/// Ephemeral: produced by [`parse_snapshot`][crate::parse_snapshot],
/// consumed by the classifier and the reconciliation engine, discarded after
/// the commit is folded into tracked state.
#[derive(Debug, Clone, Deserialize)]
pub struct FireRecord {
    /// Stable external id. The feed emits it as either a string or an
    /// integer; both normalise to a string key.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,

    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub localidade: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub concelho: Option<String>,
    #[serde(default)]
    pub freguesia: Option<String>,

    /// Classification text (e.g. "Mato").
    #[serde(default)]
    pub natureza: Option<String>,
    /// Classification code as emitted by the feed.
    #[serde(default, rename = "naturezaCode")]
    pub natureza_code: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<i64>,
    #[serde(default, rename = "statusColor")]
    pub status_color: Option<String>,

    #[serde(default)]
    pub important: Option<bool>,

    /// Ground personnel count.
    #[serde(default)]
    pub man: Option<i64>,
    /// Ground vehicle count.
    #[serde(default)]
    pub terrain: Option<i64>,
    /// Aerial unit count.
    #[serde(default)]
    pub aerial: Option<i64>,
    /// Water unit count.
    #[serde(default)]
    pub meios_aquaticos: Option<i64>,

    /// Activity flag; absent is treated as inactive.
    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub updated: Option<EpochSec>,
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<EpochSec>,

    /// The raw JSON object this record was decoded from.  Filled in by the
    /// parser, not by serde.
    #[serde(skip)]
    pub raw: Value,
}

impl FireRecord {
    /// Data-side observation timestamp: `updated.sec`, falling back to
    /// `dateTime.sec`.
    pub fn data_timestamp(&self) -> Option<i64> {
        self.updated
            .map(|u| u.sec)
            .or_else(|| self.date_time.map(|d| d.sec))
    }
}

/// The feed is inconsistent about id types; accept both `"123"` and `123`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "fire id must be a string or number, got {other}"
        ))),
    }
}
